#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

//! Driver: runs lexer, parser and generator in order and owns everything
//! that touches the file system.

use anyhow::{bail, Context, Result};
use pd_ast::ast::{NodeId, NodeKind, TypeExpr};
use pd_ast::{Ast, Diagnostic, Diagnostics, Options};
use pd_parse::token::{Tok, TokKind};
use pd_parse::Lexed;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Maximum source file size in bytes (1MB)
pub const MAX_SOURCE_SIZE: usize = 1_000_000;

/// C text plus every non-fatal diagnostic from all stages.
#[derive(Debug, Clone, Serialize)]
pub struct Compilation {
    pub c: String,
    pub diagnostics: Diagnostics,
}

pub fn compile_source(src: &str, opts: &Options) -> Result<Compilation, Diagnostics> {
    let parsed = pd_parse::parse_source(src, opts)?;
    let mut diagnostics = parsed.diagnostics;
    match pd_codegen::generate(&parsed.ast, opts) {
        Ok(generated) => {
            diagnostics.extend(generated.diagnostics);
            Ok(Compilation {
                c: generated.c,
                diagnostics,
            })
        }
        Err(fatal) => {
            diagnostics.extend(fatal);
            Err(diagnostics)
        }
    }
}

/// Compile `input` and write the C output to `output`.
///
/// A failed compilation comes back as an error wrapping [`Diagnostics`],
/// so callers can downcast and render each one.
pub fn compile_file(input: &Path, output: &Path, opts: &Options) -> Result<Compilation> {
    let src = read_source(input)?;
    let compilation = compile_source(&src, opts).map_err(anyhow::Error::new)?;
    std::fs::write(output, &compilation.c)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("wrote {} bytes to {}", compilation.c.len(), output.display());
    Ok(compilation)
}

pub fn read_source(path: &Path) -> Result<String> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if src.len() > MAX_SOURCE_SIZE {
        bail!(
            "source file exceeds {}MB limit ({} bytes)",
            MAX_SOURCE_SIZE / 1_000_000,
            src.len()
        );
    }
    Ok(src)
}

/// Options from a JSON file; missing fields take their defaults.
pub fn load_options(path: &Path) -> Result<Options> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid options in {}", path.display()))
}

// ======= rendering =======

/// `<file>:<line>:<col>: <kind>: <message>`
pub fn format_diagnostic(file: &str, d: &Diagnostic) -> String {
    match d.span {
        Some(s) => format!("{}:{}:{}: {}: {}", file, s.line, s.col, d.kind, d.message),
        None => format!("{}: {}: {}", file, d.kind, d.message),
    }
}

pub fn report(file: &str, diags: &Diagnostics) {
    for d in diags {
        eprintln!("{}", format_diagnostic(file, d));
    }
}

pub fn format_tokens(lexed: &Lexed) -> String {
    let mut out = String::new();
    for tok in &lexed.tokens {
        let _ = writeln!(out, "{}:{} {}", tok.span.line, tok.span.col, token_text(lexed, tok));
    }
    out
}

fn token_text(lexed: &Lexed, tok: &Tok) -> String {
    match tok.kind {
        TokKind::Ident(sym) => format!("identifier `{}`", lexed.interner.resolve(sym)),
        TokKind::Str(sym) => format!("string {:?}", lexed.interner.resolve(sym)),
        TokKind::Char(c) => format!("char {:?}", c as char),
        other => other.describe(),
    }
}

/// Indented outline of the tree, one node per line.
pub fn format_ast(ast: &Ast) -> String {
    let mut out = String::new();
    outline(ast, ast.root, 0, &mut out);
    out
}

fn outline(ast: &Ast, id: NodeId, depth: usize, out: &mut String) {
    let kind = ast.kind(id);
    let detail = match kind {
        NodeKind::Function { name, public, .. } => {
            format!(" {}{}", if *public { "pub " } else { "" }, ast.name(*name))
        }
        NodeKind::Struct { name, .. }
        | NodeKind::Field { name, .. }
        | NodeKind::Param { name, .. }
        | NodeKind::Let { name, .. } => format!(" {}", ast.name(*name)),
        NodeKind::StructLit { name, .. } | NodeKind::Ident(name) => format!(" {}", ast.name(*name)),
        NodeKind::Import { path } => {
            let path: Vec<&str> = path.iter().map(|s| ast.name(*s)).collect();
            format!(" {}", path.join("::"))
        }
        NodeKind::For { var, .. } => format!(" {}", ast.name(*var)),
        NodeKind::FieldAccess { field, .. } => format!(" .{}", ast.name(*field)),
        NodeKind::Assign { op, .. } => format!(" {}", op.as_str()),
        NodeKind::Binary { op, .. } => format!(" {}", op.as_str()),
        NodeKind::Unary { op, .. } => format!(" {}", op.as_str()),
        NodeKind::Range { inclusive, .. } => (if *inclusive { " ..=" } else { " .." }).to_string(),
        NodeKind::Int(v) => format!(" {}", v),
        NodeKind::Float(v) => format!(" {}", v),
        NodeKind::Str(sym) => format!(" {:?}", ast.name(*sym)),
        NodeKind::Char(c) => format!(" {:?}", *c as char),
        NodeKind::Bool(b) => format!(" {}", b),
        NodeKind::Type(TypeExpr::Prim(p)) => format!(" {}", p.name()),
        NodeKind::Type(TypeExpr::Custom(sym)) => format!(" {}", ast.name(*sym)),
        NodeKind::Type(TypeExpr::Array { len, .. }) => format!(" [; {}]", len),
        NodeKind::Type(TypeExpr::Ref { mutable, .. }) => {
            (if *mutable { " &mut" } else { " &" }).to_string()
        }
        _ => String::new(),
    };
    let _ = writeln!(out, "{}{}{}", "  ".repeat(depth), kind.name(), detail);
    for child in kind.children() {
        outline(ast, child, depth + 1, out);
    }
}
