//! The env schema module: declared names, library guard and field insertion

pub mod zod;

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use swc_core::ecma::ast::{
    Callee, Expr, Module, ModuleDecl, ModuleItem, Pat, Prop, PropName, PropOrSpread, VarDeclarator,
};
use swc_core::ecma::visit::{Visit, VisitMut, VisitMutWith, VisitWith};

use crate::config::SchemaConfig;
use crate::error::CheckError;
use crate::syntax::{self, ParsedModule, SourceKind};

pub use zod::ZodType;

/// The schema file, parsed, with the names it declares
pub struct SchemaFile {
    path: PathBuf,
    kind: SourceKind,
    parsed: ParsedModule,
    declared: BTreeSet<String>,
    pending: Vec<String>,
}

impl SchemaFile {
    pub async fn load(path: &Path) -> Result<Self> {
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read schema {}", path.display()))?;
        Ok(Self::parse(path, source)?)
    }

    pub fn parse(path: &Path, source: String) -> Result<Self, CheckError> {
        let kind = SourceKind::from_path(path).unwrap_or(SourceKind::Module);
        let parsed = syntax::parse_module(path, source, kind)?;
        let declared = declared_names(&parsed.module);
        tracing::debug!(path = %path.display(), declared = declared.len(), "parsed schema");

        Ok(Self {
            path: path.to_path_buf(),
            kind,
            parsed,
            declared,
            pending: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn declared(&self) -> &BTreeSet<String> {
        &self.declared
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Fail unless the schema imports `library`.
    pub fn assert_library(&self, library: &str) -> Result<(), CheckError> {
        if imports_library(&self.parsed.module, library) {
            Ok(())
        } else {
            Err(CheckError::NotUsingZod(library.to_string()))
        }
    }

    /// Append `name: <type expression>` to the server schema object.
    ///
    /// Returns `false` when nothing was added: the name is already declared or
    /// the type has no expression.
    pub fn add_field(&mut self, name: &str, ty: ZodType, config: &SchemaConfig) -> Result<bool> {
        if self.declared.contains(name) {
            return Ok(false);
        }
        let Some(expression) = ty.expression(&config.namespace) else {
            return Ok(false);
        };

        let field = self
            .parsed
            .parse_property(&format!("{}: {}", zod::property_key(name), expression))?;

        let mut append = AppendField {
            server_schema: &config.server_schema,
            namespace: &config.namespace,
            field: &field,
            appended: false,
        };
        self.parsed.module.visit_mut_with(&mut append);
        if !append.appended {
            return Err(CheckError::ServerSchemaNotFound(config.server_schema.clone()).into());
        }

        tracing::info!(name, %ty, "added field to schema");
        self.declared.insert(name.to_string());
        self.pending.push(name.to_string());
        Ok(true)
    }

    /// Print the module and overwrite the schema file if fields were added.
    pub async fn write(&mut self) -> Result<bool> {
        if !self.has_pending_changes() {
            return Ok(false);
        }

        let code = self.parsed.print()?;
        tokio::fs::write(&self.path, &code)
            .await
            .with_context(|| format!("failed to write schema {}", self.path.display()))?;
        // Printing consumed the comments; pick them up again from what is on disk.
        self.parsed = syntax::parse_module(&self.path, code, self.kind)?;

        tracing::info!(path = %self.path.display(), added = ?self.pending, "wrote schema");
        self.pending.clear();
        Ok(true)
    }
}

/// Every identifier or string key of an object literal in the module.
pub fn declared_names(module: &Module) -> BTreeSet<String> {
    let mut keys = DeclaredKeys::default();
    module.visit_with(&mut keys);
    keys.names
}

pub fn imports_library(module: &Module, library: &str) -> bool {
    module.body.iter().any(|item| {
        matches!(
            item,
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) if &*import.src.value == library
        )
    })
}

#[derive(Default)]
struct DeclaredKeys {
    names: BTreeSet<String>,
}

impl Visit for DeclaredKeys {
    fn visit_prop(&mut self, prop: &Prop) {
        match prop {
            Prop::KeyValue(kv) => match &kv.key {
                PropName::Ident(key) => {
                    self.names.insert(key.sym.to_string());
                }
                PropName::Str(key) => {
                    self.names.insert(key.value.to_string());
                }
                _ => {}
            },
            Prop::Shorthand(ident) => {
                self.names.insert(ident.sym.to_string());
            }
            _ => {}
        }
        prop.visit_children_with(self);
    }
}

struct AppendField<'a> {
    server_schema: &'a str,
    namespace: &'a str,
    field: &'a PropOrSpread,
    appended: bool,
}

impl VisitMut for AppendField<'_> {
    fn visit_mut_var_declarator(&mut self, decl: &mut VarDeclarator) {
        decl.visit_mut_children_with(self);
        if self.appended {
            return;
        }

        let Pat::Ident(binding) = &decl.name else {
            return;
        };
        if &*binding.id.sym != self.server_schema {
            return;
        }
        let Some(Expr::Call(call)) = decl.init.as_deref_mut() else {
            return;
        };
        if !is_namespace_call(&call.callee, self.namespace) {
            return;
        }

        let object = call.args.iter_mut().find_map(|arg| match &mut *arg.expr {
            Expr::Object(object) => Some(object),
            _ => None,
        });
        if let Some(object) = object {
            object.props.push(self.field.clone());
            self.appended = true;
        }
    }
}

/// `ns.something(...)`
fn is_namespace_call(callee: &Callee, namespace: &str) -> bool {
    let Callee::Expr(expr) = callee else {
        return false;
    };
    match &**expr {
        Expr::Member(member) => matches!(&*member.obj, Expr::Ident(obj) if &*obj.sym == namespace),
        _ => false,
    }
}
