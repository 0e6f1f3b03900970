//! C-side types and how Palladium types lower to them.

use pd_ast::ast::{NodeId, NodeKind, PrimType, TypeExpr};
use pd_ast::Ast;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CType {
    Void,
    /// Scalar spelled verbatim, e.g. `long long` or `const char*`.
    Named(&'static str),
    /// `struct <Name>`
    Struct(String),
    Ptr(Box<CType>),
    /// Fixed-size array; only meaningful in declarators.
    Array(Box<CType>, u64),
}

impl CType {
    pub fn int() -> Self {
        CType::Named("long long")
    }
    pub fn double() -> Self {
        CType::Named("double")
    }
    pub fn bool_() -> Self {
        CType::Named("int")
    }
    pub fn char_() -> Self {
        CType::Named("char")
    }
    pub fn string() -> Self {
        CType::Named("const char*")
    }

    pub fn from_prim(p: PrimType) -> Self {
        CType::Named(match p {
            PrimType::I8 => "signed char",
            PrimType::I16 => "short",
            PrimType::I32 => "int",
            PrimType::I64 => "long long",
            PrimType::U8 => "unsigned char",
            PrimType::U16 => "unsigned short",
            PrimType::U32 => "unsigned int",
            PrimType::U64 | PrimType::Usize => "unsigned long long",
            PrimType::F32 => "float",
            PrimType::F64 => "double",
            PrimType::Bool => "int",
            PrimType::Char => "char",
            PrimType::String | PrimType::Str => "const char*",
        })
    }

    /// Lower a `Type` node. Returns `None` for anything that is not one.
    pub fn from_node(ast: &Ast, id: NodeId) -> Option<Self> {
        let NodeKind::Type(ty) = ast.kind(id) else {
            return None;
        };
        Some(match ty {
            TypeExpr::Prim(p) => CType::from_prim(*p),
            TypeExpr::Custom(sym) => CType::Struct(ast.name(*sym).to_string()),
            TypeExpr::Array { elem, len } => {
                CType::Array(Box::new(CType::from_node(ast, *elem)?), *len)
            }
            TypeExpr::Ref { inner, .. } => match CType::from_node(ast, *inner)? {
                // strings are already pointers
                s @ CType::Named("const char*") => s,
                // a reference to an array decays to a pointer to its element
                CType::Array(elem, _) => CType::Ptr(elem),
                other => CType::Ptr(Box::new(other)),
            },
        })
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, CType::Ptr(_))
    }

    /// Element type of an array or pointer.
    pub fn elem(&self) -> Option<&CType> {
        match self {
            CType::Array(elem, _) | CType::Ptr(elem) => Some(&**elem),
            _ => None,
        }
    }

    /// Struct name, looking through one level of pointer.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            CType::Struct(name) => Some(name.as_str()),
            CType::Ptr(inner) => match &**inner {
                CType::Struct(name) => Some(name.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Type as written in a cast or return position; arrays decay.
    pub fn render(&self) -> String {
        match self {
            CType::Void => "void".to_string(),
            CType::Named(s) => s.to_string(),
            CType::Struct(name) => format!("struct {}", name),
            CType::Ptr(inner) | CType::Array(inner, _) => format!("{}*", inner.render()),
        }
    }

    /// Declarator for `name`: `long long xs[2][3]`, `struct P* p`.
    pub fn declare(&self, name: &str) -> String {
        let mut base = self;
        let mut dims = String::new();
        while let CType::Array(elem, len) = base {
            dims.push_str(&format!("[{}]", len));
            base = &**elem;
        }
        format!("{} {}{}", base.render(), name, dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarators() {
        assert_eq!(CType::int().declare("a"), "long long a");
        let grid = CType::Array(Box::new(CType::Array(Box::new(CType::int()), 3)), 2);
        assert_eq!(grid.declare("m"), "long long m[2][3]");
        let p = CType::Ptr(Box::new(CType::Struct("Point".into())));
        assert_eq!(p.declare("p"), "struct Point* p");
        assert_eq!(p.struct_name(), Some("Point"));
    }

    #[test]
    fn primitive_mapping() {
        assert_eq!(CType::from_prim(PrimType::Bool).render(), "int");
        assert_eq!(CType::from_prim(PrimType::Usize).render(), "unsigned long long");
        assert_eq!(CType::from_prim(PrimType::Str).render(), "const char*");
        assert_eq!(CType::from_prim(PrimType::I8).render(), "signed char");
    }
}
