#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

mod lexer;
mod parser;
pub mod token;

pub use lexer::Lexed;
pub use parser::Parsed;

use pd_ast::{Ast, Diagnostics, Options};

/// Lex `src` into tokens terminated by a single `Eof`.
///
/// A token-limit violation always fails. In strict mode any lexical
/// diagnostic fails too; in lenient mode they ride along in the result.
pub fn tokenize(src: &str, opts: &Options) -> Result<Lexed, Diagnostics> {
    let lexed = lexer::Lexer::new(src).tokenize(&opts.limits)?;
    log::debug!(
        "lexed {} tokens ({} diagnostics)",
        lexed.tokens.len(),
        lexed.diagnostics.len()
    );
    if opts.is_strict() && !lexed.diagnostics.is_empty() {
        return Err(lexed.diagnostics);
    }
    Ok(lexed)
}

/// Parse a token stream into an AST. Lexer diagnostics carried by `lexed`
/// are kept ahead of the parser's own.
pub fn parse(lexed: Lexed, opts: &Options) -> Result<Parsed, Diagnostics> {
    parser::Parser::new(lexed, opts).parse()
}

pub fn parse_source(src: &str, opts: &Options) -> Result<Parsed, Diagnostics> {
    let lexed = tokenize(src, opts)?;
    parse(lexed, opts)
}

/// Strict-mode convenience wrapper; `file` only labels the error.
pub fn parse_str(file: &str, src: &str) -> anyhow::Result<Ast> {
    parse_source(src, &Options::strict())
        .map(|parsed| parsed.ast)
        .map_err(|diags| anyhow::anyhow!("{}: {}", file, diags))
}
