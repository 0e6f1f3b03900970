#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

mod generator;
pub mod runtime;
mod symbols;
pub mod types;

pub use generator::{Generated, Generator};
pub use symbols::{FnSig, SymbolTable};
pub use types::CType;

use pd_ast::{Ast, Diagnostics, Options};

/// Lower a parsed program to C source.
///
/// Constructs without a C rendering are skipped and reported as
/// `CodegenError` diagnostics; in strict mode any such diagnostic fails.
pub fn generate(ast: &Ast, opts: &Options) -> Result<Generated, Diagnostics> {
    Generator::new(ast, opts).generate()
}
