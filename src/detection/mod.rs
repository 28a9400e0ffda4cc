//! Project detection: root discovery and env folder layout

pub mod analyzers;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::SchemaConfig;
use crate::error::CheckError;

const LEGACY_SCHEMA_NAME: &str = "schema.mjs";

/// Full project context after analysis
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub name: String,
    pub node: Option<analyzers::node::NodeProject>,
}

/// Paths the env check works with, resolved against the project root
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub env_dir: PathBuf,
}

/// Main project detector
pub struct ProjectDetector {
    root: PathBuf,
}

impl ProjectDetector {
    /// Walk up from `start` to the nearest directory holding a `package.json`.
    pub fn locate(start: &Path) -> Result<Self, CheckError> {
        let root = start
            .ancestors()
            .find(|dir| dir.join("package.json").is_file())
            .ok_or_else(|| CheckError::NoProjectRoot(start.to_path_buf()))?;

        tracing::debug!(root = %root.display(), "located project root");
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self, schema: &SchemaConfig, source_dir: &Path) -> Result<ProjectLayout> {
        let env_dir = self.root.join(&schema.env_dir);
        if !env_dir.is_dir() {
            return Err(CheckError::MissingEnvFolder(env_dir).into());
        }

        Ok(ProjectLayout {
            root: self.root.clone(),
            source_dir: self.root.join(source_dir),
            env_dir,
        })
    }

    pub async fn analyze(&self) -> Result<ProjectContext> {
        let node = analyzers::node::analyze(&self.root).await?;

        let name = node
            .as_ref()
            .and_then(|n| n.name.clone())
            .unwrap_or_else(|| {
                self.root
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("project")
                    .to_string()
            });

        Ok(ProjectContext {
            root: self.root.clone(),
            name,
            node,
        })
    }
}

/// Pick the schema module among the `*.mjs` files of the env folder.
///
/// An explicit `schema_file` wins. Otherwise `schema.mjs`, then the first
/// module that declares `server_schema`, then the second module in name
/// order (the layout create-t3-app used to scaffold).
pub fn select_schema_file(env_dir: &Path, schema: &SchemaConfig) -> Result<PathBuf> {
    if let Some(name) = &schema.schema_file {
        let path = env_dir.join(name);
        if !path.is_file() {
            return Err(CheckError::NoSchemaFile(env_dir.to_path_buf()).into());
        }
        return Ok(path);
    }

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(env_dir)
        .with_context(|| format!("failed to read {}", env_dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "mjs") {
            candidates.push(path);
        }
    }
    candidates.sort();

    if let Some(path) = candidates
        .iter()
        .find(|p| p.file_name().is_some_and(|n| n == LEGACY_SCHEMA_NAME))
    {
        return Ok(path.clone());
    }

    for path in &candidates {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if content.contains(&schema.server_schema) {
            return Ok(path.clone());
        }
    }

    candidates
        .into_iter()
        .nth(1)
        .ok_or_else(|| CheckError::NoSchemaFile(env_dir.to_path_buf()).into())
}
