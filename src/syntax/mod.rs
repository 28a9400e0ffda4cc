//! Parsing and printing JavaScript/TypeScript modules with swc

use anyhow::{Context, Result};
use std::path::Path;
use swc_core::common::comments::{Comments, SingleThreadedComments};
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceMap, Spanned};
use swc_core::ecma::ast::{EsVersion, Expr, Module, PropOrSpread};
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config as CodegenConfig, Emitter};
use swc_core::ecma::parser::error::Error as ParseError;
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::error::CheckError;

/// Dialect a source file is parsed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Plain ES module, no JSX (env modules)
    Module,
    Jsx,
    Typescript { tsx: bool },
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "mjs" | "cjs" => Some(Self::Module),
            "js" | "jsx" => Some(Self::Jsx),
            "ts" | "mts" | "cts" => Some(Self::Typescript { tsx: false }),
            "tsx" => Some(Self::Typescript { tsx: true }),
            _ => None,
        }
    }

    fn syntax(self) -> Syntax {
        match self {
            Self::Module => Syntax::Es(EsSyntax::default()),
            Self::Jsx => Syntax::Es(EsSyntax {
                jsx: true,
                ..Default::default()
            }),
            Self::Typescript { tsx } => Syntax::Typescript(TsSyntax {
                tsx,
                ..Default::default()
            }),
        }
    }
}

/// A parsed module together with the source map and comments needed to print it back.
pub struct ParsedModule {
    pub module: Module,
    cm: Lrc<SourceMap>,
    comments: SingleThreadedComments,
}

pub fn parse_module(path: &Path, source: String, kind: SourceKind) -> Result<ParsedModule, CheckError> {
    let cm: Lrc<SourceMap> = Default::default();
    let comments = SingleThreadedComments::default();
    let fm = cm.new_source_file(FileName::Real(path.to_path_buf()).into(), source);

    let lexer = Lexer::new(
        kind.syntax(),
        EsVersion::EsNext,
        StringInput::from(&*fm),
        Some(&comments as &dyn Comments),
    );
    let mut parser = Parser::new_from(lexer);

    let module = parser
        .parse_module()
        .map_err(|err| parse_error(&cm, path, err))?;

    // Recoverable errors still mean the file is not what we expect.
    if let Some(err) = parser.take_errors().into_iter().next() {
        return Err(parse_error(&cm, path, err));
    }

    Ok(ParsedModule {
        module,
        cm,
        comments,
    })
}

fn parse_error(cm: &SourceMap, path: &Path, err: ParseError) -> CheckError {
    let loc = cm.lookup_char_pos(err.span().lo);
    CheckError::Parse {
        path: path.to_path_buf(),
        message: format!("{} (line {}, column {})", err.kind().msg(), loc.line, loc.col_display + 1),
    }
}

impl ParsedModule {
    /// Parse a single `{ key: value }` property, sharing this module's source map
    /// so the new node never collides with positions of existing comments.
    pub fn parse_property(&self, snippet: &str) -> Result<PropOrSpread> {
        let fm = self
            .cm
            .new_source_file(FileName::Anon.into(), format!("({{ {} }})", snippet));
        let lexer = Lexer::new(
            Syntax::Es(EsSyntax::default()),
            EsVersion::EsNext,
            StringInput::from(&*fm),
            None,
        );
        let mut parser = Parser::new_from(lexer);
        let expr = parser
            .parse_expr()
            .map_err(|err| anyhow::anyhow!("invalid property `{}`: {}", snippet, err.kind().msg()))?;

        let expr = match *expr {
            Expr::Paren(paren) => *paren.expr,
            other => other,
        };
        match expr {
            Expr::Object(object) => object
                .props
                .into_iter()
                .next()
                .with_context(|| format!("`{}` produced no property", snippet)),
            _ => anyhow::bail!("`{}` is not an object property", snippet),
        }
    }

    /// Print the module back to source text, keeping its comments.
    ///
    /// The emitter drains the comment maps, so a module prints its comments
    /// once. Callers that print again must re-parse the output first.
    pub fn print(&self) -> Result<String> {
        let mut buf = Vec::new();
        {
            let mut emitter = Emitter {
                cfg: CodegenConfig::default(),
                cm: self.cm.clone(),
                comments: Some(&self.comments as &dyn Comments),
                wr: JsWriter::new(self.cm.clone(), "\n", &mut buf, None),
            };
            emitter
                .emit_module(&self.module)
                .context("failed to print module")?;
        }
        Ok(break_after_doc_comments(&String::from_utf8(buf)?))
    }
}

/// Codegen keeps a block comment on the line of the statement it documents
/// (` */ export const a = 1;`). Move the statement back onto its own line.
fn break_after_doc_comments(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for line in code.split_inclusive('\n') {
        let trimmed = line.trim_start();
        match trimmed.strip_prefix("*/ ") {
            Some(rest) if !rest.trim().is_empty() => {
                let indent = &line[..line.len() - trimmed.len()];
                out.push_str(indent);
                out.push_str("*/\n");
                out.push_str(indent.strip_suffix(' ').unwrap_or(indent));
                out.push_str(rest);
            }
            _ => out.push_str(line),
        }
    }
    out
}
