//! Node.js project analyzer

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Npm => write!(f, "npm"),
            Self::Yarn => write!(f, "yarn"),
            Self::Pnpm => write!(f, "pnpm"),
            Self::Bun => write!(f, "bun"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFramework {
    NextJs,
    Remix,
    Vite,
}

impl std::fmt::Display for NodeFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NextJs => write!(f, "next"),
            Self::Remix => write!(f, "remix"),
            Self::Vite => write!(f, "vite"),
        }
    }
}

/// What the env check needs to know about a Node project
#[derive(Debug, Clone)]
pub struct NodeProject {
    pub name: Option<String>,
    pub package_manager: PackageManager,
    pub framework: Option<NodeFramework>,
    pub uses_zod: bool,
}

#[derive(Deserialize)]
struct PackageJson {
    name: Option<String>,
    dependencies: Option<indexmap::IndexMap<String, String>>,
    #[serde(rename = "devDependencies")]
    dev_dependencies: Option<indexmap::IndexMap<String, String>>,
}

impl PackageJson {
    fn depends_on(&self, package: &str) -> bool {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .any(|deps| deps.contains_key(package))
    }
}

pub async fn analyze(root: &Path) -> Result<Option<NodeProject>> {
    let pkg_path = root.join("package.json");
    if !pkg_path.exists() {
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(&pkg_path).await?;
    let pkg: PackageJson = serde_json::from_str(&content)
        .with_context(|| format!("invalid {}", pkg_path.display()))?;

    let uses_zod = pkg.depends_on("zod");
    if !uses_zod {
        tracing::warn!("package.json does not list zod as a dependency");
    }

    Ok(Some(NodeProject {
        framework: detect_framework(&pkg),
        package_manager: detect_package_manager(root),
        uses_zod,
        name: pkg.name,
    }))
}

fn detect_package_manager(root: &Path) -> PackageManager {
    if root.join("bun.lockb").exists() {
        PackageManager::Bun
    } else if root.join("pnpm-lock.yaml").exists() {
        PackageManager::Pnpm
    } else if root.join("yarn.lock").exists() {
        PackageManager::Yarn
    } else {
        PackageManager::Npm
    }
}

fn detect_framework(pkg: &PackageJson) -> Option<NodeFramework> {
    if pkg.depends_on("next") {
        Some(NodeFramework::NextJs)
    } else if pkg.depends_on("@remix-run/react") {
        Some(NodeFramework::Remix)
    } else if pkg.depends_on("vite") {
        Some(NodeFramework::Vite)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_t3_package_json() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{
  "name": "my-t3-app",
  "dependencies": { "next": "13.0.0", "zod": "^3.20.0" },
  "devDependencies": { "typescript": "^4.9.0" }
}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("pnpm-lock.yaml"), "").unwrap();

        let project = analyze(dir.path()).await.unwrap().unwrap();
        assert_eq!(project.name.as_deref(), Some("my-t3-app"));
        assert_eq!(project.framework, Some(NodeFramework::NextJs));
        assert_eq!(project.package_manager, PackageManager::Pnpm);
        assert!(project.uses_zod);
    }

    #[tokio::test]
    async fn no_package_json_is_not_a_node_project() {
        let dir = tempdir().unwrap();
        assert!(analyze(dir.path()).await.unwrap().is_none());
    }
}
