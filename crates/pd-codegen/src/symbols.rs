use crate::types::CType;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct FnSig {
    pub params: Vec<CType>,
    pub ret: CType,
}

/// What the generator knows about names.
///
/// Variables live in one flat scope per function: a `let` overwrites any
/// earlier entry and nothing is popped at block end. Function and struct
/// signatures are global and collected before any body is emitted.
#[derive(Debug, Default)]
pub struct SymbolTable {
    vars: HashMap<String, CType>,
    fns: HashMap<String, FnSig>,
    structs: HashMap<String, Vec<(String, CType)>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all variables; called on entry to each function.
    pub fn reset_vars(&mut self) {
        self.vars.clear();
    }

    pub fn declare_var(&mut self, name: &str, ty: CType) {
        self.vars.insert(name.to_string(), ty);
    }

    pub fn var(&self, name: &str) -> Option<&CType> {
        self.vars.get(name)
    }

    pub fn declare_fn(&mut self, name: &str, sig: FnSig) {
        self.fns.insert(name.to_string(), sig);
    }

    pub fn func(&self, name: &str) -> Option<&FnSig> {
        self.fns.get(name)
    }

    pub fn declare_struct(&mut self, name: &str, fields: Vec<(String, CType)>) {
        self.structs.insert(name.to_string(), fields);
    }

    pub fn fields(&self, name: &str) -> Option<&[(String, CType)]> {
        self.structs.get(name).map(Vec::as_slice)
    }

    pub fn field_type(&self, struct_name: &str, field: &str) -> Option<&CType> {
        self.fields(struct_name)?
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, ty)| ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn let_overwrites_and_reset_clears() {
        let mut st = SymbolTable::new();
        st.declare_var("x", CType::int());
        st.declare_var("x", CType::string());
        assert_eq!(st.var("x"), Some(&CType::string()));
        st.reset_vars();
        assert!(st.var("x").is_none());
    }

    #[test]
    fn struct_fields_keep_order() {
        let mut st = SymbolTable::new();
        st.declare_struct(
            "P",
            vec![("y".into(), CType::double()), ("x".into(), CType::int())],
        );
        let names: Vec<&str> = st.fields("P").unwrap().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["y", "x"]);
        assert_eq!(st.field_type("P", "x"), Some(&CType::int()));
        assert!(st.field_type("P", "z").is_none());
    }
}
