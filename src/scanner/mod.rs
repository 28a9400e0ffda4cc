//! Source tree scanner for `process.env` references

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swc_core::ecma::ast::{Expr, Lit, MemberExpr, MemberProp, Module};
use swc_core::ecma::visit::{Visit, VisitWith};

use crate::syntax::{self, SourceKind};

/// List source files under `dir` with one of `extensions`, skipping any path
/// that goes through a directory named in `exclude`.
pub fn find_source_files(dir: &Path, extensions: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = Vec::new();

    for ext in extensions {
        let pattern = format!("{}/**/*.{}", base, ext);
        for entry in glob::glob(&pattern).with_context(|| format!("bad pattern {pattern}"))? {
            let path = entry?;
            if !path.is_file() {
                continue;
            }
            let excluded = path
                .strip_prefix(dir)
                .unwrap_or(&path)
                .components()
                .any(|c| exclude.iter().any(|e| c.as_os_str() == e.as_str()));
            if !excluded {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Parse every file concurrently and collect the undeclared env names they use.
///
/// Each file contributes at most one name: the first undeclared reference in it.
pub async fn undeclared_references(
    files: Vec<PathBuf>,
    declared: &BTreeSet<String>,
) -> Result<BTreeSet<String>> {
    let declared = Arc::new(declared.clone());

    let tasks = files.into_iter().map(|path| {
        let declared = Arc::clone(&declared);
        tokio::task::spawn_blocking(move || scan_file(&path, &declared))
    });

    let mut missing = BTreeSet::new();
    for result in futures::future::try_join_all(tasks).await? {
        if let Some(name) = result? {
            missing.insert(name);
        }
    }
    Ok(missing)
}

fn scan_file(path: &Path, declared: &BTreeSet<String>) -> Result<Option<String>> {
    let Some(kind) = SourceKind::from_path(path) else {
        return Ok(None);
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = syntax::parse_module(path, source, kind)?;

    let found = first_undeclared(&parsed.module, declared);
    if let Some(name) = &found {
        tracing::debug!(path = %path.display(), name, "undeclared env reference");
    }
    Ok(found)
}

/// First `process.env.NAME` in the module whose name is not declared.
pub fn first_undeclared(module: &Module, declared: &BTreeSet<String>) -> Option<String> {
    let mut visitor = EnvReferences {
        declared,
        found: None,
    };
    module.visit_with(&mut visitor);
    visitor.found
}

struct EnvReferences<'a> {
    declared: &'a BTreeSet<String>,
    found: Option<String>,
}

impl Visit for EnvReferences<'_> {
    fn visit_member_expr(&mut self, expr: &MemberExpr) {
        if self.found.is_some() {
            return;
        }
        if let Some(name) = env_name(expr) {
            if !self.declared.contains(&name) {
                self.found = Some(name);
                return;
            }
        }
        expr.visit_children_with(self);
    }
}

/// `NAME` of `process.env.NAME` or `process.env["NAME"]`
fn env_name(expr: &MemberExpr) -> Option<String> {
    let Expr::Member(env) = &*expr.obj else {
        return None;
    };
    let Expr::Ident(process) = &*env.obj else {
        return None;
    };
    if &*process.sym != "process" {
        return None;
    }
    match &env.prop {
        MemberProp::Ident(prop) if &*prop.sym == "env" => {}
        _ => return None,
    }

    match &expr.prop {
        MemberProp::Ident(name) => Some(name.sym.to_string()),
        MemberProp::Computed(computed) => match &*computed.expr {
            Expr::Lit(Lit::Str(name)) => Some(name.value.to_string()),
            _ => None,
        },
        _ => None,
    }
}
