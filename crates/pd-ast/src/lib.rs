#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod ast;
pub mod diag;
pub mod intern;
pub mod options;

pub mod span {
    use serde::{Deserialize, Serialize};

    /// Byte range plus the 1-based line/column of its first byte.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Span {
        pub start: u32,
        pub end: u32,
        pub line: u32,
        pub col: u32,
    }

    impl Span {
        pub fn new(start: u32, end: u32, line: u32, col: u32) -> Self {
            Self {
                start,
                end,
                line,
                col,
            }
        }

        /// Span covering `self` through the end of `other`.
        pub fn to(self, other: Span) -> Span {
            Span {
                start: self.start,
                end: other.end.max(self.end),
                line: self.line,
                col: self.col,
            }
        }
    }
}

pub use ast::{Arena, Ast, Node, NodeId, NodeKind};
pub use diag::{Diagnostic, DiagnosticKind, Diagnostics};
pub use intern::{Interner, Symbol};
pub use options::{Limits, Mode, Options, RuntimeMode};
pub use span::Span;
