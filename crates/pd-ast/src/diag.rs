//! Structured diagnostics collected by every stage.
//!
//! The core never prints. Each stage pushes [`Diagnostic`] values into a
//! [`Diagnostics`] collector and hands it back to the caller, either next to
//! its output (lenient mode) or as the error value (strict mode, or any
//! capacity violation).

use crate::span::Span;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Unrecognized character, unterminated string/char/comment, bad literal.
    Lex,
    /// Unexpected token or missing delimiter.
    Parse,
    /// Token, node, children or nesting limit exceeded.
    Capacity,
    /// AST shape the C generator cannot render.
    Codegen,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::Lex => "LexError",
            DiagnosticKind::Parse => "ParseError",
            DiagnosticKind::Capacity => "CapacityError",
            DiagnosticKind::Codegen => "CodegenError",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Lex, message, Some(span))
    }

    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Parse, message, Some(span))
    }

    pub fn capacity(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::new(DiagnosticKind::Capacity, message, span)
    }

    pub fn codegen(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Codegen, message, Some(span))
    }

    pub fn is_capacity(&self) -> bool {
        self.kind == DiagnosticKind::Capacity
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(sp) => write!(f, "{} at {}:{}: {}", self.kind, sp.line, sp.col, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Ordered collection of diagnostics; doubles as the error type of every stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.items.push(diag);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.items.first()
    }

    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.items.iter().any(|d| d.kind == kind)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diag: Diagnostic) -> Self {
        Self { items: vec![diag] }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
