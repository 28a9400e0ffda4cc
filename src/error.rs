//! Domain errors for the env schema check

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Could not find a package.json in {0} or any parent directory")]
    NoProjectRoot(PathBuf),

    #[error("Could not find env folder at {0}. Please create it.")]
    MissingEnvFolder(PathBuf),

    #[error("Could not find a schema file in {0}")]
    NoSchemaFile(PathBuf),

    #[error("This CLI can only work with \"{0}\" and an scaffolded project from \"create-t3-app\"")]
    NotUsingZod(String),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Could not find a `{0}` object in the schema file")]
    ServerSchemaNotFound(String),
}
