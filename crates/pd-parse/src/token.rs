use pd_ast::intern::Symbol;
use pd_ast::span::Span;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TokKind {
    // eof
    Eof,
    // literals
    Int(i64),
    Float(f64),
    Str(Symbol),
    Char(u8),
    Ident(Symbol),
    // keywords
    KwFn,
    KwLet,
    KwMut,
    KwIf,
    KwElse,
    KwWhile,
    KwFor,
    KwIn,
    KwLoop,
    KwReturn,
    KwBreak,
    KwContinue,
    KwStruct,
    KwEnum,
    KwTrait,
    KwImpl,
    KwMatch,
    KwImport,
    KwUse,
    KwPub,
    KwAs,
    KwSelfType, // Self
    KwSelfValue, // self
    KwType,
    KwConst,
    KwStatic,
    KwUnsafe,
    KwAsync,
    KwAwait,
    KwMacro,
    KwExtern,
    KwMod,
    KwWhere,
    KwMove,
    KwRef,
    KwDyn,
    KwCrate,
    KwSuper,
    KwTrue,
    KwFalse,
    // delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    // punctuation
    Semicolon,
    Comma,
    Colon,
    ColonColon,
    Dot,
    DotDot,
    DotDotEq,
    DotDotDot,
    Arrow,    // ->
    FatArrow, // =>
    Question,
    Hash,
    At,
    // assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    // arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    // bitwise / shift
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,
    // equality
    EqEq,
    BangEq,
    // relational
    Lt,
    Le,
    Gt,
    Ge,
    // logical
    AndAnd,
    OrOr,
    Bang,
}

impl TokKind {
    pub fn keyword(word: &str) -> Option<TokKind> {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == word)
            .map(|&(_, kind)| kind)
    }

    /// Human-readable form used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokKind::Eof => "end of file".to_string(),
            TokKind::Int(v) => format!("integer `{}`", v),
            TokKind::Float(v) => format!("float `{}`", v),
            TokKind::Str(_) => "string literal".to_string(),
            TokKind::Char(_) => "char literal".to_string(),
            TokKind::Ident(_) => "identifier".to_string(),
            other => match other.spelling() {
                Some(s) => format!("`{}`", s),
                None => format!("{:?}", other),
            },
        }
    }

    /// Source spelling of keywords and operators.
    pub fn spelling(&self) -> Option<&'static str> {
        if let Some(&(text, _)) = KEYWORDS.iter().find(|(_, k)| k == self) {
            return Some(text);
        }
        OPERATORS
            .iter()
            .find(|(_, k)| k == self)
            .map(|&(text, _)| text)
    }
}

pub(crate) const KEYWORDS: &[(&str, TokKind)] = &[
    ("fn", TokKind::KwFn),
    ("let", TokKind::KwLet),
    ("mut", TokKind::KwMut),
    ("if", TokKind::KwIf),
    ("else", TokKind::KwElse),
    ("while", TokKind::KwWhile),
    ("for", TokKind::KwFor),
    ("in", TokKind::KwIn),
    ("loop", TokKind::KwLoop),
    ("return", TokKind::KwReturn),
    ("break", TokKind::KwBreak),
    ("continue", TokKind::KwContinue),
    ("struct", TokKind::KwStruct),
    ("enum", TokKind::KwEnum),
    ("trait", TokKind::KwTrait),
    ("impl", TokKind::KwImpl),
    ("match", TokKind::KwMatch),
    ("import", TokKind::KwImport),
    ("use", TokKind::KwUse),
    ("pub", TokKind::KwPub),
    ("as", TokKind::KwAs),
    ("Self", TokKind::KwSelfType),
    ("self", TokKind::KwSelfValue),
    ("type", TokKind::KwType),
    ("const", TokKind::KwConst),
    ("static", TokKind::KwStatic),
    ("unsafe", TokKind::KwUnsafe),
    ("async", TokKind::KwAsync),
    ("await", TokKind::KwAwait),
    ("macro", TokKind::KwMacro),
    ("extern", TokKind::KwExtern),
    ("mod", TokKind::KwMod),
    ("where", TokKind::KwWhere),
    ("move", TokKind::KwMove),
    ("ref", TokKind::KwRef),
    ("dyn", TokKind::KwDyn),
    ("crate", TokKind::KwCrate),
    ("super", TokKind::KwSuper),
    ("true", TokKind::KwTrue),
    ("false", TokKind::KwFalse),
];

/// Operators and punctuation, longest spellings first within each width.
pub(crate) const OPERATORS: &[(&str, TokKind)] = &[
    // 3-char
    ("..=", TokKind::DotDotEq),
    ("...", TokKind::DotDotDot),
    ("<<=", TokKind::ShlEq),
    (">>=", TokKind::ShrEq),
    // 2-char
    ("::", TokKind::ColonColon),
    ("->", TokKind::Arrow),
    ("=>", TokKind::FatArrow),
    ("..", TokKind::DotDot),
    ("==", TokKind::EqEq),
    ("!=", TokKind::BangEq),
    ("<=", TokKind::Le),
    (">=", TokKind::Ge),
    ("<<", TokKind::Shl),
    (">>", TokKind::Shr),
    ("&&", TokKind::AndAnd),
    ("||", TokKind::OrOr),
    ("+=", TokKind::PlusEq),
    ("-=", TokKind::MinusEq),
    ("*=", TokKind::StarEq),
    ("/=", TokKind::SlashEq),
    ("%=", TokKind::PercentEq),
    ("&=", TokKind::AmpEq),
    ("|=", TokKind::PipeEq),
    ("^=", TokKind::CaretEq),
    // 1-char
    ("(", TokKind::LParen),
    (")", TokKind::RParen),
    ("{", TokKind::LBrace),
    ("}", TokKind::RBrace),
    ("[", TokKind::LBracket),
    ("]", TokKind::RBracket),
    (";", TokKind::Semicolon),
    (",", TokKind::Comma),
    (":", TokKind::Colon),
    (".", TokKind::Dot),
    ("?", TokKind::Question),
    ("#", TokKind::Hash),
    ("@", TokKind::At),
    ("=", TokKind::Eq),
    ("+", TokKind::Plus),
    ("-", TokKind::Minus),
    ("*", TokKind::Star),
    ("/", TokKind::Slash),
    ("%", TokKind::Percent),
    ("&", TokKind::Amp),
    ("|", TokKind::Pipe),
    ("^", TokKind::Caret),
    ("~", TokKind::Tilde),
    ("<", TokKind::Lt),
    (">", TokKind::Gt),
    ("!", TokKind::Bang),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tok {
    pub kind: TokKind,
    pub span: Span,
}
