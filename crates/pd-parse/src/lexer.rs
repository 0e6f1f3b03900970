use crate::token::{Tok, TokKind, OPERATORS};
use pd_ast::diag::{Diagnostic, Diagnostics};
use pd_ast::intern::Interner;
use pd_ast::options::Limits;
use pd_ast::span::Span;

/// Output of the lexing stage.
#[derive(Debug, Clone)]
pub struct Lexed {
    /// Always ends with exactly one `Eof`.
    pub tokens: Vec<Tok>,
    pub interner: Interner,
    /// Non-fatal lexical diagnostics, in source order.
    pub diagnostics: Diagnostics,
}

pub struct Lexer<'a> {
    text: &'a str,
    src: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    interner: Interner,
    diags: Diagnostics,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            text: src,
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            interner: Interner::new(),
            diags: Diagnostics::new(),
        }
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.src.get(self.pos).copied()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }
    fn peek2(&self) -> Option<u8> {
        self.src.get(self.pos + 1).copied()
    }
    fn peek_at(&self, n: usize) -> Option<u8> {
        self.src.get(self.pos + n).copied()
    }

    fn span_from(&self, start: usize, line: u32, col: u32) -> Span {
        Span::new(start as u32, self.pos as u32, line, col)
    }

    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
                self.bump();
            }
            // line comment: //
            if self.peek() == Some(b'/') && self.peek2() == Some(b'/') {
                while let Some(b) = self.peek() {
                    if b == b'\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }
            // block comment: /* ... */ (not nested)
            if self.peek() == Some(b'/') && self.peek2() == Some(b'*') {
                let (start, line, col) = (self.pos, self.line, self.col);
                self.bump();
                self.bump();
                let mut closed = false;
                while let Some(b) = self.bump() {
                    if b == b'*' && self.peek() == Some(b'/') {
                        self.bump();
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    let span = self.span_from(start, line, col);
                    self.diags
                        .push(Diagnostic::lex("unterminated block comment", span));
                }
                continue;
            }
            break;
        }
    }

    /// Next token; unrecognized characters are reported and skipped.
    pub fn next_tok(&mut self) -> Tok {
        loop {
            self.skip_trivia();
            let (start, line, col) = (self.pos, self.line, self.col);
            let Some(b) = self.peek() else {
                return Tok {
                    kind: TokKind::Eof,
                    span: self.span_from(start, line, col),
                };
            };

            let kind = if b.is_ascii_digit() {
                self.lex_number(start, line, col)
            } else if b.is_ascii_alphabetic() || b == b'_' {
                self.lex_word()
            } else if b == b'"' {
                self.lex_string(start, line, col)
            } else if b == b'\'' {
                self.lex_char(start, line, col)
            } else if let Some(kind) = self.lex_operator() {
                kind
            } else {
                self.skip_unexpected(start, line, col);
                continue;
            };

            return Tok {
                kind,
                span: self.span_from(start, line, col),
            };
        }
    }

    /// Lex the whole input. Only a token-limit violation fails here; all
    /// other problems travel in [`Lexed::diagnostics`].
    pub fn tokenize(mut self, limits: &Limits) -> Result<Lexed, Diagnostics> {
        let max_tokens = limits.clamped().max_tokens;
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_tok();
            if tokens.len() >= max_tokens {
                self.diags.push(Diagnostic::capacity(
                    format!("token limit of {} exceeded", max_tokens),
                    Some(tok.span),
                ));
                return Err(self.diags);
            }
            let eof = tok.kind == TokKind::Eof;
            tokens.push(tok);
            if eof {
                break;
            }
        }
        Ok(Lexed {
            tokens,
            interner: self.interner,
            diagnostics: self.diags,
        })
    }

    // ======= scanners =======

    fn lex_number(&mut self, start: usize, line: u32, col: u32) -> TokKind {
        let mut s = String::new();
        let mut float = false;
        self.take_digits(&mut s);

        // fraction: only when a digit follows, so `0..5` stays a range
        if self.peek() == Some(b'.') && matches!(self.peek2(), Some(d) if d.is_ascii_digit()) {
            float = true;
            s.push('.');
            self.bump();
            self.take_digits(&mut s);
        }

        // exponent: e, E with optional sign
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let signed = matches!(self.peek2(), Some(b'+' | b'-'));
            let digit_at = if signed { 2 } else { 1 };
            if matches!(self.peek_at(digit_at), Some(d) if d.is_ascii_digit()) {
                float = true;
                s.push('e');
                self.bump();
                if signed {
                    if let Some(sign) = self.bump() {
                        s.push(sign as char);
                    }
                }
                self.take_digits(&mut s);
            }
        }

        if float {
            match s.parse::<f64>() {
                Ok(v) => TokKind::Float(v),
                Err(_) => {
                    let span = self.span_from(start, line, col);
                    self.diags
                        .push(Diagnostic::lex(format!("invalid float literal `{}`", s), span));
                    TokKind::Float(0.0)
                }
            }
        } else {
            match s.parse::<i64>() {
                Ok(v) => TokKind::Int(v),
                Err(_) => {
                    let span = self.span_from(start, line, col);
                    self.diags.push(Diagnostic::lex(
                        format!("integer literal out of range: {}", s),
                        span,
                    ));
                    TokKind::Int(0)
                }
            }
        }
    }

    fn take_digits(&mut self, s: &mut String) {
        while let Some(d) = self.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            s.push(d as char);
            self.bump();
        }
    }

    fn lex_word(&mut self) -> TokKind {
        let mut s = String::new();
        while let Some(b) = self.peek() {
            if !(b.is_ascii_alphanumeric() || b == b'_') {
                break;
            }
            s.push(b as char);
            self.bump();
        }
        match TokKind::keyword(&s) {
            Some(kw) => kw,
            None => TokKind::Ident(self.interner.intern(&s)),
        }
    }

    fn lex_string(&mut self, start: usize, line: u32, col: u32) -> TokKind {
        self.bump(); // opening quote
        let mut buf = Vec::new();
        let mut closed = false;
        while let Some(b) = self.bump() {
            match b {
                b'"' => {
                    closed = true;
                    break;
                }
                b'\\' => match self.bump() {
                    Some(esc) => buf.push(unescape(esc)),
                    None => break,
                },
                other => buf.push(other),
            }
        }
        if !closed {
            let span = self.span_from(start, line, col);
            self.diags
                .push(Diagnostic::lex("unterminated string literal", span));
        }
        let text = String::from_utf8_lossy(&buf);
        TokKind::Str(self.interner.intern(&text))
    }

    fn lex_char(&mut self, start: usize, line: u32, col: u32) -> TokKind {
        self.bump(); // opening quote
        let value = match self.peek() {
            None | Some(b'\n') => None,
            Some(b'\'') => {
                self.bump();
                let span = self.span_from(start, line, col);
                self.diags.push(Diagnostic::lex("empty char literal", span));
                return TokKind::Char(0);
            }
            Some(b'\\') => {
                self.bump();
                self.bump().map(unescape)
            }
            Some(_) => self.bump(),
        };
        if value.is_some() && self.peek() == Some(b'\'') {
            self.bump();
        } else {
            let span = self.span_from(start, line, col);
            self.diags
                .push(Diagnostic::lex("unterminated char literal", span));
        }
        TokKind::Char(value.unwrap_or(0))
    }

    /// Greedy longest match: the table lists 3-char spellings, then 2, then 1.
    fn lex_operator(&mut self) -> Option<TokKind> {
        let rest = &self.src[self.pos..];
        let &(text, kind) = OPERATORS
            .iter()
            .find(|(text, _)| rest.starts_with(text.as_bytes()))?;
        for _ in 0..text.len() {
            self.bump();
        }
        Some(kind)
    }

    fn skip_unexpected(&mut self, start: usize, line: u32, col: u32) {
        // `pos` can sit inside a multi-byte character after a bad char literal
        let ch = self.text.get(self.pos..).and_then(|rest| rest.chars().next());
        let byte = self.src[self.pos];
        self.pos += ch.map_or(1, char::len_utf8);
        self.col += 1;
        let span = self.span_from(start, line, col);
        let msg = match ch {
            Some(c) => format!("unexpected character '{}'", c),
            None => format!("unexpected byte 0x{:02x}", byte),
        };
        self.diags.push(Diagnostic::lex(msg, span));
    }
}

/// Unknown escapes yield the escaped character itself.
fn unescape(esc: u8) -> u8 {
    match esc {
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'0' => 0,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokKind> {
        Lexer::new(src)
            .tokenize(&Limits::default())
            .unwrap()
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn longest_match_operators() {
        assert_eq!(
            kinds("..= ... .. . <<= << <= <"),
            vec![
                TokKind::DotDotEq,
                TokKind::DotDotDot,
                TokKind::DotDot,
                TokKind::Dot,
                TokKind::ShlEq,
                TokKind::Shl,
                TokKind::Le,
                TokKind::Lt,
                TokKind::Eof,
            ]
        );
        let ops: Vec<TokKind> = kinds("a::b->c=>d")
            .into_iter()
            .filter(|k| !matches!(k, TokKind::Ident(_) | TokKind::Eof))
            .collect();
        assert_eq!(
            ops,
            vec![TokKind::ColonColon, TokKind::Arrow, TokKind::FatArrow]
        );
    }

    #[test]
    fn range_after_integer_is_not_a_float() {
        assert_eq!(
            kinds("0..5"),
            vec![TokKind::Int(0), TokKind::DotDot, TokKind::Int(5), TokKind::Eof]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let lexed = Lexer::new("let x\n  = 1;").tokenize(&Limits::default()).unwrap();
        let pos: Vec<(u32, u32)> = lexed.tokens.iter().map(|t| (t.span.line, t.span.col)).collect();
        assert_eq!(pos, vec![(1, 1), (1, 5), (2, 3), (2, 5), (2, 6), (2, 7)]);
    }

    #[test]
    fn unexpected_character_is_skipped_and_reported() {
        let lexed = Lexer::new("let $ x").tokenize(&Limits::default()).unwrap();
        assert_eq!(lexed.tokens.len(), 3); // let, x, eof
        assert_eq!(lexed.diagnostics.len(), 1);
        let d = lexed.diagnostics.first().unwrap();
        assert!(d.message.contains("unexpected character '$'"));
        assert_eq!(d.span.map(|s| s.col), Some(5));
    }
}
