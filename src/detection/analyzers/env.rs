//! Environment variable collection

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::{EnvConfig, EnvSource};

const DOTENV_FILES: [&str; 4] = [".env", ".env.local", ".env.development", ".env.example"];

/// Collect the names of the variables the project actually runs with.
///
/// `process_env` is the name list of the process environment; it is passed in
/// so callers decide whether that is `std::env::vars()` or a fixture.
pub async fn collect<I>(root: &Path, config: &EnvConfig, process_env: I) -> Result<BTreeSet<String>>
where
    I: IntoIterator<Item = String>,
{
    let mut names: BTreeSet<String> = match config.source {
        EnvSource::Process => process_env.into_iter().collect(),
        EnvSource::Dotenv => dotenv_names(root).await?,
    };

    for ignored in &config.ignore {
        names.remove(ignored);
    }

    tracing::debug!(count = names.len(), source = ?config.source, "collected env names");
    Ok(names)
}

pub fn process_env_names() -> Vec<String> {
    std::env::vars_os()
        .filter_map(|(k, _)| k.into_string().ok())
        .collect()
}

/// Names in `actual` the schema does not declare.
pub fn missing_from(actual: &BTreeSet<String>, declared: &BTreeSet<String>) -> BTreeSet<String> {
    actual.difference(declared).cloned().collect()
}

async fn dotenv_names(root: &Path) -> Result<BTreeSet<String>> {
    let mut dotenv_vars = BTreeSet::new();

    for env_file in DOTENV_FILES {
        let path = root.join(env_file);
        if !path.exists() {
            continue;
        }

        let content = tokio::fs::read_to_string(&path).await?;
        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            if let Some((name, _)) = line.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    dotenv_vars.insert(name.to_string());
                }
            }
        }
    }

    Ok(dotenv_vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reports_exactly_the_undeclared_names() {
        let missing = missing_from(&set(&["A", "B", "C"]), &set(&["A", "B"]));
        assert_eq!(missing, set(&["C"]));
    }

    #[tokio::test]
    async fn process_source_drops_ignored_names() {
        let dir = tempdir().unwrap();
        let config = EnvConfig {
            source: EnvSource::Process,
            ignore: vec!["PATH".to_string()],
        };

        let names = collect(
            dir.path(),
            &config,
            ["PATH", "DATABASE_URL"].map(String::from),
        )
        .await
        .unwrap();
        assert_eq!(names, set(&["DATABASE_URL"]));
    }

    #[tokio::test]
    async fn dotenv_source_reads_all_env_files() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "# comment\nDATABASE_URL=postgres://x\n\nexport NEXTAUTH_SECRET=\"abc\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join(".env.local"), "DATABASE_URL=other\nPORT=3000\n").unwrap();

        let config = EnvConfig {
            source: EnvSource::Dotenv,
            ignore: Vec::new(),
        };
        let names = collect(dir.path(), &config, Vec::new()).await.unwrap();
        assert_eq!(names, set(&["DATABASE_URL", "NEXTAUTH_SECRET", "PORT"]));
    }
}
