//! Arena-allocated AST.
//!
//! Nodes live in a single append-only [`Arena`] and refer to each other by
//! [`NodeId`]. Children are built before their parent, so a parent's id is
//! always greater than its children's ids and the program root is the last
//! node allocated. The arena is bounded: exceeding the node or per-node
//! children limit is reported as a capacity diagnostic instead of dropping
//! anything.

use crate::diag::Diagnostic;
use crate::intern::{Interner, Symbol};
use crate::options::Limits;
use crate::span::Span;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinOp {
    // logical
    Or,
    And,
    // bitwise
    BitOr,
    BitXor,
    BitAnd,
    // equality
    Eq,
    Ne,
    // relational
    Lt,
    Le,
    Gt,
    Ge,
    // shift
    Shl,
    Shr,
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }

    /// Comparison and logical operators yield a truth value.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinOp::Or
                | BinOp::And
                | BinOp::Eq
                | BinOp::Ne
                | BinOp::Lt
                | BinOp::Le
                | BinOp::Gt
                | BinOp::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnOp {
    Not,
    Neg,
    Deref,
    Ref,
    RefMut,
}

impl UnOp {
    /// C spelling; both reference forms take an address.
    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Neg => "-",
            UnOp::Deref => "*",
            UnOp::Ref | UnOp::RefMut => "&",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Bool,
    Char,
    String,
    Str,
}

impl PrimType {
    pub fn from_name(name: &str) -> Option<PrimType> {
        Some(match name {
            "i8" => PrimType::I8,
            "i16" => PrimType::I16,
            "i32" => PrimType::I32,
            "i64" => PrimType::I64,
            "u8" => PrimType::U8,
            "u16" => PrimType::U16,
            "u32" => PrimType::U32,
            "u64" => PrimType::U64,
            "usize" => PrimType::Usize,
            "f32" => PrimType::F32,
            "f64" => PrimType::F64,
            "bool" => PrimType::Bool,
            "char" => PrimType::Char,
            "String" => PrimType::String,
            "str" => PrimType::Str,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimType::I8 => "i8",
            PrimType::I16 => "i16",
            PrimType::I32 => "i32",
            PrimType::I64 => "i64",
            PrimType::U8 => "u8",
            PrimType::U16 => "u16",
            PrimType::U32 => "u32",
            PrimType::U64 => "u64",
            PrimType::Usize => "usize",
            PrimType::F32 => "f32",
            PrimType::F64 => "f64",
            PrimType::Bool => "bool",
            PrimType::Char => "char",
            PrimType::String => "String",
            PrimType::Str => "str",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeExpr {
    Prim(PrimType),
    /// User-defined (struct) type name.
    Custom(Symbol),
    /// `[elem; len]`
    Array { elem: NodeId, len: u64 },
    /// `&inner` / `&mut inner`
    Ref { mutable: bool, inner: NodeId },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInit {
    pub name: Symbol,
    pub value: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    // ======= declarations =======
    Program {
        items: Vec<NodeId>,
    },
    Function {
        name: Symbol,
        public: bool,
        params: Vec<NodeId>,
        ret: Option<NodeId>,
        body: NodeId,
    },
    Struct {
        name: Symbol,
        fields: Vec<NodeId>,
    },
    Field {
        name: Symbol,
        ty: NodeId,
    },
    Param {
        name: Symbol,
        mutable: bool,
        ty: NodeId,
    },
    Import {
        path: Vec<Symbol>,
    },

    // ======= statements =======
    Block {
        stmts: Vec<NodeId>,
    },
    Let {
        name: Symbol,
        mutable: bool,
        ty: Option<NodeId>,
        init: Option<NodeId>,
    },
    Assign {
        target: NodeId,
        op: AssignOp,
        value: NodeId,
    },
    Return {
        value: Option<NodeId>,
    },
    ExprStmt {
        expr: NodeId,
    },
    If {
        cond: NodeId,
        then_branch: NodeId,
        /// A `Block`, or another `If` for `else if`.
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    For {
        var: Symbol,
        iter: NodeId,
        body: NodeId,
    },
    Break,
    Continue,

    // ======= expressions =======
    Ident(Symbol),
    Int(i64),
    Float(f64),
    Str(Symbol),
    Char(u8),
    Bool(bool),
    Binary {
        op: BinOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnOp,
        operand: NodeId,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    Index {
        base: NodeId,
        index: NodeId,
    },
    FieldAccess {
        base: NodeId,
        field: Symbol,
    },
    ArrayLit {
        elems: Vec<NodeId>,
    },
    StructLit {
        name: Symbol,
        fields: Vec<FieldInit>,
    },
    Range {
        start: NodeId,
        end: NodeId,
        inclusive: bool,
    },

    // ======= types =======
    Type(TypeExpr),
}

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { items } => items.clone(),
            NodeKind::Function {
                params, ret, body, ..
            } => {
                let mut out = params.clone();
                out.extend(ret.iter().copied());
                out.push(*body);
                out
            }
            NodeKind::Struct { fields, .. } => fields.clone(),
            NodeKind::Field { ty, .. } | NodeKind::Param { ty, .. } => vec![*ty],
            NodeKind::Block { stmts } => stmts.clone(),
            NodeKind::Let { ty, init, .. } => ty.iter().chain(init.iter()).copied().collect(),
            NodeKind::Assign { target, value, .. } => vec![*target, *value],
            NodeKind::Return { value } => value.iter().copied().collect(),
            NodeKind::ExprStmt { expr } => vec![*expr],
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut out = vec![*cond, *then_branch];
                out.extend(else_branch.iter().copied());
                out
            }
            NodeKind::While { cond, body } => vec![*cond, *body],
            NodeKind::For { iter, body, .. } => vec![*iter, *body],
            NodeKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::Unary { operand, .. } => vec![*operand],
            NodeKind::Call { callee, args } => {
                let mut out = vec![*callee];
                out.extend(args.iter().copied());
                out
            }
            NodeKind::Index { base, index } => vec![*base, *index],
            NodeKind::FieldAccess { base, .. } => vec![*base],
            NodeKind::ArrayLit { elems } => elems.clone(),
            NodeKind::StructLit { fields, .. } => fields.iter().map(|f| f.value).collect(),
            NodeKind::Range { start, end, .. } => vec![*start, *end],
            NodeKind::Type(TypeExpr::Array { elem, .. }) => vec![*elem],
            NodeKind::Type(TypeExpr::Ref { inner, .. }) => vec![*inner],
            NodeKind::Type(_)
            | NodeKind::Import { .. }
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Ident(_)
            | NodeKind::Int(_)
            | NodeKind::Float(_)
            | NodeKind::Str(_)
            | NodeKind::Char(_)
            | NodeKind::Bool(_) => Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::Function { .. } => "Function",
            NodeKind::Struct { .. } => "Struct",
            NodeKind::Field { .. } => "Field",
            NodeKind::Param { .. } => "Param",
            NodeKind::Import { .. } => "Import",
            NodeKind::Block { .. } => "Block",
            NodeKind::Let { .. } => "Let",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::Return { .. } => "Return",
            NodeKind::ExprStmt { .. } => "ExprStmt",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::For { .. } => "For",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::Ident(_) => "Ident",
            NodeKind::Int(_) => "Int",
            NodeKind::Float(_) => "Float",
            NodeKind::Str(_) => "Str",
            NodeKind::Char(_) => "Char",
            NodeKind::Bool(_) => "Bool",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Call { .. } => "Call",
            NodeKind::Index { .. } => "Index",
            NodeKind::FieldAccess { .. } => "FieldAccess",
            NodeKind::ArrayLit { .. } => "ArrayLit",
            NodeKind::StructLit { .. } => "StructLit",
            NodeKind::Range { .. } => "Range",
            NodeKind::Type(_) => "Type",
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self, NodeKind::Type(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Bounded, append-only node store.
#[derive(Debug, Clone, Serialize)]
pub struct Arena {
    nodes: Vec<Node>,
    #[serde(skip)]
    max_nodes: usize,
    #[serde(skip)]
    max_children: usize,
}

impl Arena {
    pub fn new(limits: &Limits) -> Self {
        let limits = limits.clamped();
        Self {
            nodes: Vec::new(),
            max_nodes: limits.max_nodes,
            max_children: limits.max_children,
        }
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> Result<NodeId, Diagnostic> {
        let fan_out = kind.children().len();
        if fan_out > self.max_children {
            return Err(Diagnostic::capacity(
                format!(
                    "{} node has {} children, limit is {}",
                    kind.name(),
                    fan_out,
                    self.max_children
                ),
                Some(span),
            ));
        }
        let index = match u32::try_from(self.nodes.len()) {
            Ok(index) if self.nodes.len() < self.max_nodes => index,
            _ => {
                return Err(Diagnostic::capacity(
                    format!("AST node limit of {} exceeded", self.max_nodes),
                    Some(span),
                ))
            }
        };
        let id = NodeId(index);
        self.nodes.push(Node { kind, span });
        Ok(id)
    }

    /// Panics on an id from another arena.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.get(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).span
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }
}

/// A parsed compilation unit: read-only from here on.
#[derive(Debug, Clone, Serialize)]
pub struct Ast {
    pub arena: Arena,
    pub interner: Interner,
    pub root: NodeId,
}

impl Ast {
    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.get(id)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.arena.kind(id)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.arena.span(id)
    }

    pub fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    /// Top-level items of the root program.
    pub fn items(&self) -> &[NodeId] {
        match self.kind(self.root) {
            NodeKind::Program { items } => items,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_nodes: usize, max_children: usize) -> Limits {
        Limits {
            max_nodes,
            max_children,
            ..Limits::default()
        }
    }

    #[test]
    fn ids_are_sequential() {
        let mut arena = Arena::new(&Limits::default());
        let a = arena.alloc(NodeKind::Int(1), Span::default()).unwrap();
        let b = arena.alloc(NodeKind::Int(2), Span::default()).unwrap();
        let sum = arena
            .alloc(
                NodeKind::Binary {
                    op: BinOp::Add,
                    lhs: a,
                    rhs: b,
                },
                Span::default(),
            )
            .unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(sum.index(), 2);
        assert_eq!(arena.kind(sum).children(), vec![a, b]);
    }

    #[test]
    fn node_limit_is_an_error_not_a_drop() {
        let mut arena = Arena::new(&limits(2, 8));
        arena.alloc(NodeKind::Break, Span::default()).unwrap();
        arena.alloc(NodeKind::Continue, Span::default()).unwrap();
        let err = arena.alloc(NodeKind::Break, Span::default()).unwrap_err();
        assert!(err.is_capacity());
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn huge_node_limit_still_allocates() {
        let mut arena = Arena::new(&limits(usize::MAX, 8));
        let id = arena.alloc(NodeKind::Break, Span::default()).unwrap();
        assert_eq!(id.index(), 0);
    }

    #[test]
    fn children_limit_is_an_error_not_a_drop() {
        let mut arena = Arena::new(&limits(100, 2));
        let ids: Vec<NodeId> = (0..3)
            .map(|i| arena.alloc(NodeKind::Int(i), Span::default()).unwrap())
            .collect();
        let err = arena
            .alloc(NodeKind::ArrayLit { elems: ids }, Span::default())
            .unwrap_err();
        assert!(err.is_capacity());
        assert!(err.message.contains("ArrayLit"));
    }
}
