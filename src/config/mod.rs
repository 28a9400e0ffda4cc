//! Configuration system for envcheck

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_FILE: &str = ".envcheck.toml";

/// Global application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub scan: ScanConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("envcheck").join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub spinners: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { spinners: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: ["js", "jsx", "ts", "tsx", "mjs", "cjs"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Project-specific configuration (.envcheck.toml)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    pub schema: SchemaConfig,
    pub env: EnvConfig,
    pub scan: ProjectScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Folder holding the env modules, relative to the project root
    pub env_dir: PathBuf,
    /// Explicit schema file name inside `env_dir`
    pub schema_file: Option<String>,
    pub server_schema: String,
    pub library: String,
    pub namespace: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            env_dir: PathBuf::from("src").join("env"),
            schema_file: None,
            server_schema: "serverSchema".to_string(),
            library: "zod".to_string(),
            namespace: "z".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvSource {
    #[default]
    Process,
    Dotenv,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EnvConfig {
    pub source: EnvSource,
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectScanConfig {
    pub source_dir: PathBuf,
    /// Directory names skipped while walking `source_dir`
    pub exclude: Vec<String>,
}

impl Default for ProjectScanConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            exclude: vec!["node_modules".to_string(), ".next".to_string()],
        }
    }
}

impl ProjectConfig {
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(PROJECT_CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let config: ProjectConfig = toml::from_str(&content)?;
        Ok(Some(config))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(PROJECT_CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Initialize a new project configuration
pub fn init_project_config(dir: &Path, force: bool) -> Result<()> {
    let path = dir.join(PROJECT_CONFIG_FILE);

    if path.exists() && !force {
        anyhow::bail!("Configuration already exists. Use --force to overwrite.");
    }

    ProjectConfig::default().save(dir)?;
    println!("Created {}", PROJECT_CONFIG_FILE);
    Ok(())
}
