use crate::lexer::Lexed;
use crate::token::{Tok, TokKind};
use pd_ast::ast::{
    Arena, AssignOp, Ast, BinOp, FieldInit, NodeId, NodeKind, PrimType, TypeExpr, UnOp,
};
use pd_ast::diag::{Diagnostic, Diagnostics};
use pd_ast::intern::{Interner, Symbol};
use pd_ast::options::{Mode, Options};
use pd_ast::span::Span;

/// `Err` aborts the parse: a strict-mode error or a capacity violation.
type PResult<T> = Result<T, Diagnostic>;

/// Output of the parsing stage.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub ast: Ast,
    /// Lexical and syntactic diagnostics recovered from in lenient mode.
    pub diagnostics: Diagnostics,
}

pub struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
    arena: Arena,
    interner: Interner,
    diags: Diagnostics,
    mode: Mode,
    max_depth: usize,
    depth: usize,
    /// Set while parsing `if`/`while`/`for` headers, where `x {` opens the body.
    no_struct_lit: bool,
}

enum Infix {
    Bin(BinOp),
    Range { inclusive: bool },
}

/// Binding power table, low to high.
fn infix(kind: &TokKind) -> Option<(u8, Infix)> {
    Some(match kind {
        TokKind::DotDot => (1, Infix::Range { inclusive: false }),
        TokKind::DotDotEq => (1, Infix::Range { inclusive: true }),
        TokKind::OrOr => (2, Infix::Bin(BinOp::Or)),
        TokKind::AndAnd => (3, Infix::Bin(BinOp::And)),
        TokKind::Pipe => (4, Infix::Bin(BinOp::BitOr)),
        TokKind::Caret => (5, Infix::Bin(BinOp::BitXor)),
        TokKind::Amp => (6, Infix::Bin(BinOp::BitAnd)),
        TokKind::EqEq => (7, Infix::Bin(BinOp::Eq)),
        TokKind::BangEq => (7, Infix::Bin(BinOp::Ne)),
        TokKind::Lt => (8, Infix::Bin(BinOp::Lt)),
        TokKind::Le => (8, Infix::Bin(BinOp::Le)),
        TokKind::Gt => (8, Infix::Bin(BinOp::Gt)),
        TokKind::Ge => (8, Infix::Bin(BinOp::Ge)),
        TokKind::Shl => (9, Infix::Bin(BinOp::Shl)),
        TokKind::Shr => (9, Infix::Bin(BinOp::Shr)),
        TokKind::Plus => (10, Infix::Bin(BinOp::Add)),
        TokKind::Minus => (10, Infix::Bin(BinOp::Sub)),
        TokKind::Star => (11, Infix::Bin(BinOp::Mul)),
        TokKind::Slash => (11, Infix::Bin(BinOp::Div)),
        TokKind::Percent => (11, Infix::Bin(BinOp::Rem)),
        _ => return None,
    })
}

fn assign_op(kind: &TokKind) -> Option<AssignOp> {
    Some(match kind {
        TokKind::Eq => AssignOp::Assign,
        TokKind::PlusEq => AssignOp::Add,
        TokKind::MinusEq => AssignOp::Sub,
        TokKind::StarEq => AssignOp::Mul,
        TokKind::SlashEq => AssignOp::Div,
        TokKind::PercentEq => AssignOp::Rem,
        TokKind::AmpEq => AssignOp::BitAnd,
        TokKind::PipeEq => AssignOp::BitOr,
        TokKind::CaretEq => AssignOp::BitXor,
        TokKind::ShlEq => AssignOp::Shl,
        TokKind::ShrEq => AssignOp::Shr,
        _ => return None,
    })
}

fn starts_item(kind: &TokKind) -> bool {
    matches!(
        kind,
        TokKind::KwFn | TokKind::KwStruct | TokKind::KwUse | TokKind::KwImport | TokKind::KwPub
    )
}

impl Parser {
    pub fn new(lexed: Lexed, opts: &Options) -> Self {
        let mut tokens = lexed.tokens;
        if !matches!(tokens.last(), Some(t) if t.kind == TokKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Tok {
                kind: TokKind::Eof,
                span,
            });
        }
        Self {
            tokens,
            pos: 0,
            arena: Arena::new(&opts.limits),
            interner: lexed.interner,
            diags: lexed.diagnostics,
            mode: opts.mode,
            max_depth: opts.limits.max_depth,
            depth: 0,
            no_struct_lit: false,
        }
    }

    /// Parse the whole token stream into a program.
    pub fn parse(mut self) -> Result<Parsed, Diagnostics> {
        match self.parse_program() {
            Ok(root) => {
                log::debug!(
                    "parsed {} nodes ({} diagnostics)",
                    self.arena.len(),
                    self.diags.len()
                );
                if self.mode == Mode::Strict && !self.diags.is_empty() {
                    return Err(self.diags);
                }
                Ok(Parsed {
                    ast: Ast {
                        arena: self.arena,
                        interner: self.interner,
                        root,
                    },
                    diagnostics: self.diags,
                })
            }
            Err(fatal) => {
                self.diags.push(fatal);
                Err(self.diags)
            }
        }
    }

    // ======= token cursor =======

    fn cur(&self) -> Tok {
        self.tokens[self.pos]
    }

    fn peek_kind(&self, n: usize) -> TokKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[idx].kind
    }

    fn bump(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at(&self, k: &TokKind) -> bool {
        std::mem::discriminant(&self.cur().kind) == std::mem::discriminant(k)
    }

    fn at_eof(&self) -> bool {
        self.cur().kind == TokKind::Eof
    }

    fn eat(&mut self, k: &TokKind) -> bool {
        if self.at(k) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Record a recoverable error; strict mode turns it into an abort.
    fn error(&mut self, diag: Diagnostic) -> PResult<()> {
        match self.mode {
            Mode::Strict => Err(diag),
            Mode::Lenient => {
                log::trace!("recovering from {}", diag);
                self.diags.push(diag);
                Ok(())
            }
        }
    }

    /// Consume `k` or report it missing. A missing token is not consumed.
    fn expect(&mut self, k: TokKind) -> PResult<Span> {
        let tok = self.cur();
        if self.at(&k) {
            self.bump();
            return Ok(tok.span);
        }
        self.error(Diagnostic::parse(
            format!(
                "expected {}, found {}",
                k.describe(),
                tok.kind.describe()
            ),
            tok.span,
        ))?;
        Ok(tok.span)
    }

    fn expect_ident(&mut self) -> PResult<(Symbol, Span)> {
        let tok = self.cur();
        if let TokKind::Ident(sym) = tok.kind {
            self.bump();
            return Ok((sym, tok.span));
        }
        self.error(Diagnostic::parse(
            format!("expected identifier, found {}", tok.kind.describe()),
            tok.span,
        ))?;
        Ok((self.interner.intern("<missing>"), tok.span))
    }

    fn alloc(&mut self, kind: NodeKind, span: Span) -> PResult<NodeId> {
        self.arena.alloc(kind, span)
    }

    fn span(&self, id: NodeId) -> Span {
        self.arena.span(id)
    }

    fn enter(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Diagnostic::capacity(
                format!("nesting depth limit of {} exceeded", self.max_depth),
                Some(self.cur().span),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ======= program / items =======

    fn parse_program(&mut self) -> PResult<NodeId> {
        let start = self.cur().span;
        let mut items = Vec::new();
        while !self.at_eof() {
            let tok = self.cur();
            match tok.kind {
                TokKind::KwFn | TokKind::KwStruct | TokKind::KwPub => {
                    items.push(self.parse_item()?);
                }
                TokKind::KwUse | TokKind::KwImport => items.push(self.parse_import()?),
                _ => {
                    self.error(Diagnostic::parse(
                        format!("unexpected {} at top level", tok.kind.describe()),
                        tok.span,
                    ))?;
                    self.recover_to_item();
                }
            }
        }
        let end = self.cur().span;
        self.alloc(NodeKind::Program { items }, start.to(end))
    }

    /// Panic-mode recovery: drop tokens until something that starts an item.
    fn recover_to_item(&mut self) {
        self.bump();
        while !self.at_eof() && !starts_item(&self.cur().kind) {
            self.bump();
        }
    }

    fn parse_item(&mut self) -> PResult<NodeId> {
        let start = self.cur().span;
        let public = self.eat(&TokKind::KwPub);
        if self.at(&TokKind::KwStruct) {
            return self.parse_struct(start);
        }
        self.parse_function(public, start)
    }

    fn parse_function(&mut self, public: bool, start: Span) -> PResult<NodeId> {
        self.expect(TokKind::KwFn)?;
        let (name, _) = self.expect_ident()?;

        self.expect(TokKind::LParen)?;
        let mut params = Vec::new();
        while !self.at(&TokKind::RParen) && !self.at_eof() {
            params.push(self.parse_param()?);
            if !self.eat(&TokKind::Comma) {
                break;
            }
        }
        self.expect(TokKind::RParen)?;

        let ret = if self.eat(&TokKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        let span = start.to(self.span(body));
        self.alloc(
            NodeKind::Function {
                name,
                public,
                params,
                ret,
                body,
            },
            span,
        )
    }

    fn parse_param(&mut self) -> PResult<NodeId> {
        let start = self.cur().span;
        let mutable = self.eat(&TokKind::KwMut);
        let (name, _) = self.expect_ident()?;
        self.expect(TokKind::Colon)?;
        let ty = self.parse_type()?;
        let span = start.to(self.span(ty));
        self.alloc(NodeKind::Param { name, mutable, ty }, span)
    }

    fn parse_struct(&mut self, start: Span) -> PResult<NodeId> {
        self.expect(TokKind::KwStruct)?;
        let (name, _) = self.expect_ident()?;
        self.expect(TokKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(&TokKind::RBrace) && !self.at_eof() {
            let fstart = self.cur().span;
            let (fname, _) = self.expect_ident()?;
            self.expect(TokKind::Colon)?;
            let ty = self.parse_type()?;
            let span = fstart.to(self.span(ty));
            fields.push(self.alloc(NodeKind::Field { name: fname, ty }, span)?);
            if !self.eat(&TokKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokKind::RBrace)?;
        self.alloc(NodeKind::Struct { name, fields }, start.to(end))
    }

    /// `use a::b::c;` or `import a.b` (trailing `;` optional).
    fn parse_import(&mut self) -> PResult<NodeId> {
        let start = self.cur().span;
        self.bump(); // use / import
        let (first, mut end) = self.expect_ident()?;
        let mut path = vec![first];
        while self.eat(&TokKind::ColonColon) || self.eat(&TokKind::Dot) {
            let (seg, span) = self.expect_ident()?;
            path.push(seg);
            end = span;
        }
        if self.at(&TokKind::Semicolon) {
            end = self.cur().span;
            self.bump();
        }
        self.alloc(NodeKind::Import { path }, start.to(end))
    }

    // ======= types =======

    fn parse_type(&mut self) -> PResult<NodeId> {
        self.enter()?;
        let result = self.parse_type_inner();
        self.leave();
        result
    }

    fn parse_type_inner(&mut self) -> PResult<NodeId> {
        let tok = self.cur();
        match tok.kind {
            TokKind::Amp => {
                self.bump();
                let mutable = self.eat(&TokKind::KwMut);
                let inner = self.parse_type()?;
                let span = tok.span.to(self.span(inner));
                self.alloc(NodeKind::Type(TypeExpr::Ref { mutable, inner }), span)
            }
            TokKind::LBracket => {
                self.bump();
                let elem = self.parse_type()?;
                self.expect(TokKind::Semicolon)?;
                let len_tok = self.cur();
                let len = match len_tok.kind {
                    TokKind::Int(n) if n >= 0 => {
                        self.bump();
                        n as u64
                    }
                    other => {
                        self.error(Diagnostic::parse(
                            format!(
                                "expected array length, found {}",
                                other.describe()
                            ),
                            len_tok.span,
                        ))?;
                        0
                    }
                };
                let end = self.expect(TokKind::RBracket)?;
                self.alloc(NodeKind::Type(TypeExpr::Array { elem, len }), tok.span.to(end))
            }
            TokKind::Ident(sym) => {
                self.bump();
                let ty = match PrimType::from_name(self.interner.resolve(sym)) {
                    Some(prim) => TypeExpr::Prim(prim),
                    None => TypeExpr::Custom(sym),
                };
                self.alloc(NodeKind::Type(ty), tok.span)
            }
            other => {
                self.error(Diagnostic::parse(
                    format!("expected type, found {}", other.describe()),
                    tok.span,
                ))?;
                let missing = self.interner.intern("<missing>");
                self.alloc(NodeKind::Type(TypeExpr::Custom(missing)), tok.span)
            }
        }
    }

    // ======= blocks and statements =======

    fn parse_block(&mut self) -> PResult<NodeId> {
        self.enter()?;
        let result = self.parse_block_inner();
        self.leave();
        result
    }

    fn parse_block_inner(&mut self) -> PResult<NodeId> {
        let start = self.cur().span;
        self.expect(TokKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.at(&TokKind::RBrace) && !self.at_eof() {
            if self.eat(&TokKind::Semicolon) {
                continue;
            }
            let before = self.pos;
            let stmt = self.parse_stmt()?;
            if self.pos == before {
                // nothing consumed: skip the offending token
                self.bump();
                continue;
            }
            stmts.push(stmt);
        }
        let end = self.expect(TokKind::RBrace)?;
        self.alloc(NodeKind::Block { stmts }, start.to(end))
    }

    fn parse_stmt(&mut self) -> PResult<NodeId> {
        let tok = self.cur();
        match tok.kind {
            TokKind::KwLet => self.parse_let(),
            TokKind::KwReturn => {
                self.bump();
                let value = if self.at(&TokKind::Semicolon) || self.at(&TokKind::RBrace) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let end = self.expect(TokKind::Semicolon)?;
                self.alloc(NodeKind::Return { value }, tok.span.to(end))
            }
            TokKind::KwIf => self.parse_if(),
            TokKind::KwWhile => {
                self.bump();
                let cond = self.parse_header_expr()?;
                let body = self.parse_block()?;
                let span = tok.span.to(self.span(body));
                self.alloc(NodeKind::While { cond, body }, span)
            }
            TokKind::KwFor => {
                self.bump();
                let (var, _) = self.expect_ident()?;
                self.expect(TokKind::KwIn)?;
                let iter = self.parse_header_expr()?;
                let body = self.parse_block()?;
                let span = tok.span.to(self.span(body));
                self.alloc(NodeKind::For { var, iter, body }, span)
            }
            TokKind::KwBreak => {
                self.bump();
                let end = self.expect(TokKind::Semicolon)?;
                self.alloc(NodeKind::Break, tok.span.to(end))
            }
            TokKind::KwContinue => {
                self.bump();
                let end = self.expect(TokKind::Semicolon)?;
                self.alloc(NodeKind::Continue, tok.span.to(end))
            }
            TokKind::LBrace => self.parse_block(),
            _ => self.parse_expr_or_assign(),
        }
    }

    /// Parse a let statement: `let [mut] name [: Type] [= expr];`
    fn parse_let(&mut self) -> PResult<NodeId> {
        let start = self.cur().span;
        self.expect(TokKind::KwLet)?;
        let mutable = self.eat(&TokKind::KwMut);
        let (name, _) = self.expect_ident()?;
        let ty = if self.eat(&TokKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.eat(&TokKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let end = self.expect(TokKind::Semicolon)?;
        self.alloc(
            NodeKind::Let {
                name,
                mutable,
                ty,
                init,
            },
            start.to(end),
        )
    }

    /// `if cond { } [else { } | else if ...]`
    fn parse_if(&mut self) -> PResult<NodeId> {
        self.enter()?;
        let result = self.parse_if_inner();
        self.leave();
        result
    }

    fn parse_if_inner(&mut self) -> PResult<NodeId> {
        let start = self.cur().span;
        self.expect(TokKind::KwIf)?;
        let cond = self.parse_header_expr()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.eat(&TokKind::KwElse) {
            if self.at(&TokKind::KwIf) {
                Some(self.parse_if()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        let last = else_branch.unwrap_or(then_branch);
        let span = start.to(self.span(last));
        self.alloc(
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        )
    }

    /// Assignment and expression statements share a prefix; one token after
    /// the left-hand expression decides which one this is.
    fn parse_expr_or_assign(&mut self) -> PResult<NodeId> {
        let lhs = self.parse_expr()?;
        let lhs_span = self.span(lhs);
        if let Some(op) = assign_op(&self.cur().kind) {
            if !self.is_place(lhs) {
                self.error(Diagnostic::parse(
                    "invalid assignment target",
                    lhs_span,
                ))?;
            }
            self.bump();
            let value = self.parse_expr()?;
            let end = self.expect(TokKind::Semicolon)?;
            return self.alloc(
                NodeKind::Assign {
                    target: lhs,
                    op,
                    value,
                },
                lhs_span.to(end),
            );
        }
        let end = self.expect(TokKind::Semicolon)?;
        self.alloc(NodeKind::ExprStmt { expr: lhs }, lhs_span.to(end))
    }

    fn is_place(&self, id: NodeId) -> bool {
        matches!(
            self.arena.kind(id),
            NodeKind::Ident(_)
                | NodeKind::Index { .. }
                | NodeKind::FieldAccess { .. }
                | NodeKind::Unary {
                    op: UnOp::Deref,
                    ..
                }
        )
    }

    // ======= expressions (precedence climbing) =======

    pub(crate) fn parse_expr(&mut self) -> PResult<NodeId> {
        self.parse_binary(1)
    }

    /// Expression in an `if`/`while`/`for` header.
    fn parse_header_expr(&mut self) -> PResult<NodeId> {
        let saved = std::mem::replace(&mut self.no_struct_lit, true);
        let result = self.parse_expr();
        self.no_struct_lit = saved;
        result
    }

    /// Expression inside delimiters, where struct literals are unambiguous.
    fn parse_nested_expr(&mut self) -> PResult<NodeId> {
        let saved = std::mem::replace(&mut self.no_struct_lit, false);
        let result = self.parse_expr();
        self.no_struct_lit = saved;
        result
    }

    /// Every operator folded into the chain counts as one level of depth.
    fn parse_binary(&mut self, min_prec: u8) -> PResult<NodeId> {
        let depth = self.depth;
        let result = self.parse_binary_chain(min_prec);
        self.depth = depth;
        result
    }

    fn parse_binary_chain(&mut self, min_prec: u8) -> PResult<NodeId> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some((prec, op)) = infix(&self.cur().kind) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.enter()?;
            self.bump(); // operator
            let rhs = self.parse_binary(prec + 1)?;
            let span = self.span(lhs).to(self.span(rhs));
            let kind = match op {
                Infix::Bin(op) => NodeKind::Binary { op, lhs, rhs },
                Infix::Range { inclusive } => NodeKind::Range {
                    start: lhs,
                    end: rhs,
                    inclusive,
                },
            };
            lhs = self.alloc(kind, span)?;
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<NodeId> {
        self.enter()?;
        let result = self.parse_unary_inner();
        self.leave();
        result
    }

    fn parse_unary_inner(&mut self) -> PResult<NodeId> {
        let tok = self.cur();
        let op = match tok.kind {
            TokKind::Bang => UnOp::Not,
            TokKind::Minus => UnOp::Neg,
            TokKind::Star => UnOp::Deref,
            TokKind::Amp => {
                self.bump();
                let op = if self.eat(&TokKind::KwMut) {
                    UnOp::RefMut
                } else {
                    UnOp::Ref
                };
                return self.finish_unary(op, tok.span);
            }
            // `&&x` is a reference to a reference
            TokKind::AndAnd => {
                self.bump();
                let inner_span = self.cur().span;
                let inner = self.finish_unary(UnOp::Ref, inner_span)?;
                let span = tok.span.to(self.span(inner));
                return self.alloc(
                    NodeKind::Unary {
                        op: UnOp::Ref,
                        operand: inner,
                    },
                    span,
                );
            }
            _ => return self.parse_postfix(),
        };
        self.bump();
        self.finish_unary(op, tok.span)
    }

    fn finish_unary(&mut self, op: UnOp, start: Span) -> PResult<NodeId> {
        let operand = self.parse_unary()?;
        let span = start.to(self.span(operand));
        self.alloc(NodeKind::Unary { op, operand }, span)
    }

    /// Calls, indexing and field access, applied left to right.
    fn parse_postfix(&mut self) -> PResult<NodeId> {
        let depth = self.depth;
        let result = self.parse_postfix_chain();
        self.depth = depth;
        result
    }

    fn parse_postfix_chain(&mut self) -> PResult<NodeId> {
        let mut expr = self.parse_primary()?;
        loop {
            if matches!(
                self.cur().kind,
                TokKind::LParen | TokKind::LBracket | TokKind::Dot
            ) {
                self.enter()?;
            }
            match self.cur().kind {
                TokKind::LParen => {
                    self.bump();
                    let mut args = Vec::new();
                    while !self.at(&TokKind::RParen) && !self.at_eof() {
                        args.push(self.parse_nested_expr()?);
                        if !self.eat(&TokKind::Comma) {
                            break;
                        }
                    }
                    let end = self.expect(TokKind::RParen)?;
                    let span = self.span(expr).to(end);
                    expr = self.alloc(NodeKind::Call { callee: expr, args }, span)?;
                }
                TokKind::LBracket => {
                    self.bump();
                    let index = self.parse_nested_expr()?;
                    let end = self.expect(TokKind::RBracket)?;
                    let span = self.span(expr).to(end);
                    expr = self.alloc(NodeKind::Index { base: expr, index }, span)?;
                }
                TokKind::Dot => {
                    self.bump();
                    let (field, end) = self.expect_ident()?;
                    let span = self.span(expr).to(end);
                    expr = self.alloc(NodeKind::FieldAccess { base: expr, field }, span)?;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        let tok = self.cur();
        let kind = match tok.kind {
            TokKind::Int(v) => NodeKind::Int(v),
            TokKind::Float(v) => NodeKind::Float(v),
            TokKind::Str(sym) => NodeKind::Str(sym),
            TokKind::Char(c) => NodeKind::Char(c),
            TokKind::KwTrue => NodeKind::Bool(true),
            TokKind::KwFalse => NodeKind::Bool(false),
            TokKind::Ident(sym) => {
                self.bump();
                if !self.no_struct_lit && self.at_struct_lit_body() {
                    return self.parse_struct_lit(sym, tok.span);
                }
                return self.alloc(NodeKind::Ident(sym), tok.span);
            }
            TokKind::LParen => {
                self.bump();
                let inner = self.parse_nested_expr()?;
                self.expect(TokKind::RParen)?;
                return Ok(inner);
            }
            TokKind::LBracket => return self.parse_array_lit(),
            other => {
                self.error(Diagnostic::parse(
                    format!("expected expression, found {}", other.describe()),
                    tok.span,
                ))?;
                // placeholder; the token is left for the caller to resync on
                return self.alloc(NodeKind::Int(0), tok.span);
            }
        };
        self.bump();
        self.alloc(kind, tok.span)
    }

    /// `{ }` or `{ name :` after an identifier.
    fn at_struct_lit_body(&self) -> bool {
        if !self.at(&TokKind::LBrace) {
            return false;
        }
        match (self.peek_kind(1), self.peek_kind(2)) {
            (TokKind::RBrace, _) => true,
            (TokKind::Ident(_), TokKind::Colon) => true,
            _ => false,
        }
    }

    fn parse_struct_lit(&mut self, name: Symbol, start: Span) -> PResult<NodeId> {
        self.expect(TokKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(&TokKind::RBrace) && !self.at_eof() {
            let (fname, fspan) = self.expect_ident()?;
            self.expect(TokKind::Colon)?;
            let value = self.parse_nested_expr()?;
            fields.push(FieldInit {
                name: fname,
                value,
                span: fspan.to(self.span(value)),
            });
            if !self.eat(&TokKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokKind::RBrace)?;
        self.alloc(NodeKind::StructLit { name, fields }, start.to(end))
    }

    fn parse_array_lit(&mut self) -> PResult<NodeId> {
        let start = self.expect(TokKind::LBracket)?;
        let mut elems = Vec::new();
        while !self.at(&TokKind::RBracket) && !self.at_eof() {
            elems.push(self.parse_nested_expr()?);
            if !self.eat(&TokKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokKind::RBracket)?;
        self.alloc(NodeKind::ArrayLit { elems }, start.to(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parser_for(src: &str) -> Parser {
        let opts = Options::strict();
        let lexed = Lexer::new(src).tokenize(&opts.limits).unwrap();
        Parser::new(lexed, &opts)
    }

    #[test]
    fn precedence_table_is_ordered() {
        let order = [
            TokKind::DotDot,
            TokKind::OrOr,
            TokKind::AndAnd,
            TokKind::Pipe,
            TokKind::Caret,
            TokKind::Amp,
            TokKind::EqEq,
            TokKind::Lt,
            TokKind::Shl,
            TokKind::Plus,
            TokKind::Star,
        ];
        let precs: Vec<u8> = order.iter().map(|k| infix(k).unwrap().0).collect();
        assert!(precs.windows(2).all(|w| w[0] < w[1]), "{:?}", precs);
    }

    #[test]
    fn bare_expression_parses() {
        let mut p = parser_for("a.b[1](2)");
        let id = p.parse_expr().unwrap();
        assert!(matches!(p.arena.kind(id), NodeKind::Call { .. }));
        let NodeKind::Call { callee, args } = p.arena.kind(id).clone() else {
            unreachable!()
        };
        assert_eq!(args.len(), 1);
        assert!(matches!(p.arena.kind(callee), NodeKind::Index { .. }));
    }
}
