//! Guess a zod type from an environment variable name

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::ZodType;

static URL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|_)(URL|URI)($|_)").expect("Invalid url regex"));
static NUMBER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|_)(PORT|COUNT|SIZE|TIMEOUT|MS|TTL|LIMIT|MAX|MIN|RETRIES)($|_)")
        .expect("Invalid number regex")
});
static BOOLEAN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(IS|ENABLE|DISABLE|USE|HAS)_|_(ENABLED|DISABLED)$|(^|_)DEBUG($|_)")
        .expect("Invalid boolean regex")
});

/// All types, most likely first. `Other` always comes last.
pub fn rank(name: &str) -> Vec<ZodType> {
    let upper = name.to_uppercase();

    let best = if URL_NAME.is_match(&upper) {
        ZodType::Url
    } else if NUMBER_NAME.is_match(&upper) {
        ZodType::Number
    } else if BOOLEAN_NAME.is_match(&upper) {
        ZodType::Boolean
    } else {
        ZodType::String
    };

    let mut ranked = vec![best];
    ranked.extend(ZodType::ALL.into_iter().filter(|t| *t != best));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn best(name: &str) -> ZodType {
        rank(name)[0]
    }

    #[test]
    fn url_names() {
        assert_eq!(best("DATABASE_URL"), ZodType::Url);
        assert_eq!(best("NEXTAUTH_URL"), ZodType::Url);
        assert_eq!(best("REDIS_URL_PRIMARY"), ZodType::Url);
        assert_eq!(best("MONGO_URI"), ZodType::Url);
    }

    #[test]
    fn number_names() {
        assert_eq!(best("PORT"), ZodType::Number);
        assert_eq!(best("SMTP_PORT"), ZodType::Number);
        assert_eq!(best("REQUEST_TIMEOUT_MS"), ZodType::Number);
        assert_eq!(best("CACHE_TTL"), ZodType::Number);
    }

    #[test]
    fn boolean_names() {
        assert_eq!(best("IS_PREVIEW"), ZodType::Boolean);
        assert_eq!(best("ENABLE_SIGNUPS"), ZodType::Boolean);
        assert_eq!(best("ANALYTICS_ENABLED"), ZodType::Boolean);
        assert_eq!(best("DEBUG"), ZodType::Boolean);
    }

    #[test]
    fn everything_else_is_a_string() {
        assert_eq!(best("NEXTAUTH_SECRET"), ZodType::String);
        assert_eq!(best("CURLY"), ZodType::String);
        assert_eq!(best("SUPPORT_EMAIL"), ZodType::String);
    }

    #[test]
    fn ranking_holds_every_type_once_with_other_last() {
        let ranked = rank("SMTP_PORT");
        assert_eq!(
            ranked,
            vec![
                ZodType::Number,
                ZodType::String,
                ZodType::Url,
                ZodType::Boolean,
                ZodType::Other
            ]
        );
    }
}
