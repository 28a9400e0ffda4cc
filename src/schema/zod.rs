//! Zod field types and how they are written into a schema

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("Invalid identifier regex"));

/// Primitive types offered when adding a variable to the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZodType {
    String,
    Url,
    Number,
    Boolean,
    Other,
}

impl ZodType {
    pub const ALL: [ZodType; 5] = [
        ZodType::String,
        ZodType::Url,
        ZodType::Number,
        ZodType::Boolean,
        ZodType::Other,
    ];

    /// Call expression validating this type, e.g. `z.string().url()`.
    /// `Other` has no expression; the user fills that field in by hand.
    pub fn expression(self, namespace: &str) -> Option<String> {
        let expr = match self {
            Self::String => format!("{namespace}.string()"),
            Self::Url => format!("{namespace}.string().url()"),
            Self::Number => format!("{namespace}.number()"),
            Self::Boolean => format!("{namespace}.boolean()"),
            Self::Other => return None,
        };
        Some(expr)
    }
}

impl std::fmt::Display for ZodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Url => write!(f, "url"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Object key for `name`: bare when it is a valid identifier, quoted otherwise.
pub fn property_key(name: &str) -> String {
    if IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        serde_json::Value::String(name.to_string()).to_string()
    }
}
