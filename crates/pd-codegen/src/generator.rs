use crate::runtime;
use crate::symbols::{FnSig, SymbolTable};
use crate::types::CType;
use pd_ast::ast::{FieldInit, NodeId, NodeKind, UnOp};
use pd_ast::{Ast, Diagnostic, Diagnostics, Mode, Options, RuntimeMode};

/// Output of the generation stage.
#[derive(Debug, Clone)]
pub struct Generated {
    pub c: String,
    /// Constructs that were skipped because they have no C rendering.
    pub diagnostics: Diagnostics,
}

const INDENT: &str = "    ";

pub struct Generator<'a> {
    ast: &'a Ast,
    out: String,
    indent: usize,
    symbols: SymbolTable,
    diags: Diagnostics,
    mode: Mode,
    runtime: RuntimeMode,
    /// `main` is emitted as `int main(void)`, so a bare return needs a value.
    in_main: bool,
}

impl<'a> Generator<'a> {
    pub fn new(ast: &'a Ast, opts: &Options) -> Self {
        Self {
            ast,
            out: String::new(),
            indent: 0,
            symbols: SymbolTable::new(),
            diags: Diagnostics::new(),
            mode: opts.mode,
            runtime: opts.runtime,
            in_main: false,
        }
    }

    /// Emit one C translation unit for the whole program.
    pub fn generate(mut self) -> Result<Generated, Diagnostics> {
        let ast = self.ast;
        self.collect_signatures();

        self.out.push_str(runtime::HEADERS);
        self.out.push('\n');
        match self.runtime {
            RuntimeMode::Declarations => self.out.push_str(&runtime::declarations()),
            RuntimeMode::Embedded => self.out.push_str(runtime::EMBEDDED),
        }
        self.out.push('\n');

        for &item in ast.items() {
            if let NodeKind::Struct { name, .. } = ast.kind(item) {
                self.emit_struct(ast.name(*name));
            }
        }

        let mut prototypes = Vec::new();
        for &item in ast.items() {
            if let NodeKind::Function { name, params, ret, .. } = ast.kind(item) {
                let name = ast.name(*name);
                if name != "main" {
                    prototypes.push(self.signature(name, params, *ret));
                }
            }
        }
        if !prototypes.is_empty() {
            for proto in prototypes {
                self.out.push_str(&proto);
                self.out.push_str(";\n");
            }
            self.out.push('\n');
        }

        for &item in ast.items() {
            match ast.kind(item) {
                NodeKind::Function {
                    name,
                    params,
                    ret,
                    body,
                    ..
                } => self.emit_function(ast.name(*name), params, *ret, *body),
                NodeKind::Import { path } => {
                    let path: Vec<&str> = path.iter().map(|s| ast.name(*s)).collect();
                    log::debug!("skipping import {}", path.join("::"));
                }
                NodeKind::Struct { .. } => {}
                other => self.unsupported(item, &format!("{} at top level", other.name())),
            }
        }

        log::debug!(
            "generated {} bytes of C ({} diagnostics)",
            self.out.len(),
            self.diags.len()
        );
        if self.mode == Mode::Strict && !self.diags.is_empty() {
            return Err(self.diags);
        }
        Ok(Generated {
            c: self.out,
            diagnostics: self.diags,
        })
    }

    // ======= helpers =======

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn unsupported(&mut self, id: NodeId, what: &str) {
        let span = self.ast.span(id);
        log::warn!("{}:{}: no C rendering for {}", span.line, span.col, what);
        self.diags
            .push(Diagnostic::codegen(format!("no C rendering for {}", what), span));
    }

    /// Lower a type node, falling back to `long long` on a malformed one.
    fn lower(&mut self, id: NodeId) -> CType {
        match CType::from_node(self.ast, id) {
            Some(ty) => ty,
            None => {
                let what = format!("{} in type position", self.ast.kind(id).name());
                self.unsupported(id, &what);
                CType::int()
            }
        }
    }

    fn collect_signatures(&mut self) {
        let ast = self.ast;
        for &item in ast.items() {
            match ast.kind(item) {
                NodeKind::Struct { name, fields } => {
                    let mut lowered = Vec::new();
                    for &field in fields {
                        if let NodeKind::Field { name, ty } = ast.kind(field) {
                            let ty = self.lower(*ty);
                            lowered.push((ast.name(*name).to_string(), ty));
                        }
                    }
                    self.symbols.declare_struct(ast.name(*name), lowered);
                }
                NodeKind::Function {
                    name, params, ret, ..
                } => {
                    let params = params
                        .iter()
                        .filter_map(|&p| match ast.kind(p) {
                            NodeKind::Param { ty, .. } => Some(*ty),
                            _ => None,
                        })
                        .map(|ty| self.lower(ty))
                        .collect();
                    let name = ast.name(*name);
                    let ret = match (name, ret) {
                        ("main", _) => CType::Named("int"),
                        (_, Some(ty)) => self.lower(*ty),
                        (_, None) => CType::Void,
                    };
                    self.symbols.declare_fn(name, FnSig { params, ret });
                }
                _ => {}
            }
        }
    }

    // ======= items =======

    fn emit_struct(&mut self, name: &str) {
        self.line(&format!("typedef struct {} {{", name));
        let lowered = self.symbols.fields(name).map(<[_]>::to_vec).unwrap_or_default();
        self.indent += 1;
        for (field, ty) in &lowered {
            self.line(&format!("{};", ty.declare(field)));
        }
        self.indent -= 1;
        self.line(&format!("}} {};", name));
        self.out.push('\n');
    }

    fn signature(&mut self, name: &str, params: &[NodeId], ret: Option<NodeId>) -> String {
        if name == "main" {
            return "int main(void)".to_string();
        }
        let ast = self.ast;
        let ret = match ret {
            Some(ty) => self.lower(ty),
            None => CType::Void,
        };
        let mut rendered = Vec::new();
        for &p in params {
            if let NodeKind::Param { name, ty, .. } = ast.kind(p) {
                let ty = self.lower(*ty);
                rendered.push(ty.declare(ast.name(*name)));
            }
        }
        let params = if rendered.is_empty() {
            "void".to_string()
        } else {
            rendered.join(", ")
        };
        format!("{} {}({})", ret.render(), name, params)
    }

    fn emit_function(&mut self, name: &str, params: &[NodeId], ret: Option<NodeId>, body: NodeId) {
        let ast = self.ast;
        self.symbols.reset_vars();
        self.in_main = name == "main";
        for &p in params {
            if let NodeKind::Param { name, ty, .. } = ast.kind(p) {
                let ty = self.lower(*ty);
                self.symbols.declare_var(ast.name(*name), ty);
            }
        }

        let sig = self.signature(name, params, ret);
        self.line(&format!("{} {{", sig));
        self.emit_body(body);
        if name == "main" {
            self.indent += 1;
            self.line("return 0;");
            self.indent -= 1;
        }
        self.line("}");
        self.out.push('\n');
    }

    // ======= statements =======

    /// Statements of a block, one level deeper than the current line.
    fn emit_body(&mut self, block: NodeId) {
        let ast = self.ast;
        self.indent += 1;
        match ast.kind(block) {
            NodeKind::Block { stmts } => {
                for &stmt in stmts {
                    self.emit_stmt(stmt);
                }
            }
            _ => self.emit_stmt(block),
        }
        self.indent -= 1;
    }

    fn emit_stmt(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Let { name, ty, init, .. } => self.emit_let(ast.name(*name), *ty, *init),
            NodeKind::Assign { target, op, value } => {
                let target = self.expr(*target);
                let value = self.expr(*value);
                self.line(&format!("{} {} {};", target, op.as_str(), value));
            }
            NodeKind::Return { value: None } if self.in_main => self.line("return 0;"),
            NodeKind::Return { value: None } => self.line("return;"),
            NodeKind::Return { value: Some(v) } => {
                let v = self.expr(*v);
                self.line(&format!("return {};", v));
            }
            NodeKind::ExprStmt { expr } => {
                let e = self.expr(*expr);
                self.line(&format!("{};", e));
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.emit_if(*cond, *then_branch, *else_branch),
            NodeKind::While { cond, body } => {
                let c = self.cond(*cond);
                self.line(&format!("while ({}) {{", c));
                self.emit_body(*body);
                self.line("}");
            }
            NodeKind::For { var, iter, body } => self.emit_for(ast.name(*var), *iter, *body),
            NodeKind::Break => self.line("break;"),
            NodeKind::Continue => self.line("continue;"),
            NodeKind::Block { .. } => {
                self.line("{");
                self.emit_body(id);
                self.line("}");
            }
            other => {
                let what = format!("{} in statement position", other.name());
                self.unsupported(id, &what);
            }
        }
    }

    fn emit_let(&mut self, name: &str, ty: Option<NodeId>, init: Option<NodeId>) {
        let ty = match (ty, init) {
            (Some(t), _) => self.lower(t),
            (None, Some(e)) => self.infer(e).unwrap_or_else(|| {
                log::debug!("no type known for `{}`, using long long", name);
                CType::int()
            }),
            (None, None) => CType::int(),
        };
        let decl = ty.declare(name);
        let text = match init {
            Some(e) => {
                let value = self.initializer(e);
                format!("{} = {};", decl, value)
            }
            None => format!("{};", decl),
        };
        self.symbols.declare_var(name, ty);
        self.line(&text);
    }

    fn emit_if(&mut self, cond: NodeId, then_branch: NodeId, else_branch: Option<NodeId>) {
        let ast = self.ast;
        let c = self.cond(cond);
        self.line(&format!("if ({}) {{", c));
        self.emit_body(then_branch);
        let mut next = else_branch;
        while let Some(branch) = next {
            match ast.kind(branch) {
                NodeKind::If {
                    cond,
                    then_branch,
                    else_branch,
                } => {
                    let c = self.cond(*cond);
                    self.line(&format!("}} else if ({}) {{", c));
                    self.emit_body(*then_branch);
                    next = *else_branch;
                }
                _ => {
                    self.line("} else {");
                    self.emit_body(branch);
                    next = None;
                }
            }
        }
        self.line("}");
    }

    fn emit_for(&mut self, var: &str, iter: NodeId, body: NodeId) {
        let ast = self.ast;
        let NodeKind::Range {
            start,
            end,
            inclusive,
        } = ast.kind(iter)
        else {
            self.unsupported(iter, "`for` over a non-range");
            return;
        };
        let start = self.expr(*start);
        let end = self.expr(*end);
        let cmp = if *inclusive { "<=" } else { "<" };
        self.symbols.declare_var(var, CType::int());
        self.line(&format!(
            "for (long long {v} = {}; {v} {} {}; {v}++) {{",
            start,
            cmp,
            end,
            v = var
        ));
        self.emit_body(body);
        self.line("}");
    }

    // ======= expressions =======

    /// `if`/`while` condition without the outer parentheses of a binary.
    fn cond(&mut self, id: NodeId) -> String {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Binary { op, lhs, rhs } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                format!("{} {} {}", self.expr(lhs), op.as_str(), self.expr(rhs))
            }
            _ => self.expr(id),
        }
    }

    /// Right-hand side of a declaration, where brace lists are allowed.
    fn initializer(&mut self, id: NodeId) -> String {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::ArrayLit { elems } => self.brace_list(elems),
            NodeKind::StructLit { fields, .. } => self.designated(fields),
            _ => self.expr(id),
        }
    }

    fn brace_list(&mut self, elems: &[NodeId]) -> String {
        let parts: Vec<String> = elems.iter().map(|&e| self.initializer(e)).collect();
        format!("{{{}}}", parts.join(", "))
    }

    fn designated(&mut self, fields: &[FieldInit]) -> String {
        if fields.is_empty() {
            return "{0}".to_string();
        }
        let ast = self.ast;
        let parts: Vec<String> = fields
            .iter()
            .map(|f| format!(".{} = {}", ast.name(f.name), self.initializer(f.value)))
            .collect();
        format!("{{ {} }}", parts.join(", "))
    }

    fn expr(&mut self, id: NodeId) -> String {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Ident(sym) => ast.name(*sym).to_string(),
            NodeKind::Int(v) => v.to_string(),
            NodeKind::Float(v) if v.is_finite() => format!("{:?}", v),
            NodeKind::Float(_) => {
                self.unsupported(id, "non-finite float literal");
                String::new()
            }
            NodeKind::Str(sym) => c_string(ast.name(*sym)),
            NodeKind::Char(c) => c_char(*c),
            NodeKind::Bool(b) => i32::from(*b).to_string(),
            NodeKind::Binary { op, lhs, rhs } => {
                format!("({} {} {})", self.expr(*lhs), op.as_str(), self.expr(*rhs))
            }
            NodeKind::Unary { op, operand } => format!("({}{})", op.as_str(), self.expr(*operand)),
            NodeKind::Call { callee, args } => {
                let callee = match ast.kind(*callee) {
                    NodeKind::Ident(sym) => runtime::c_name(ast.name(*sym)).to_string(),
                    _ => self.expr(*callee),
                };
                let args: Vec<String> = args.iter().map(|&a| self.expr(a)).collect();
                format!("{}({})", callee, args.join(", "))
            }
            NodeKind::Index { base, index } => {
                format!("{}[{}]", self.expr(*base), self.expr(*index))
            }
            NodeKind::FieldAccess { base, field } => {
                let through_ptr = matches!(ast.kind(*base), NodeKind::Ident(sym)
                    if self.symbols.var(ast.name(*sym)).is_some_and(CType::is_ptr));
                let sep = if through_ptr { "->" } else { "." };
                format!("{}{}{}", self.expr(*base), sep, ast.name(*field))
            }
            NodeKind::ArrayLit { elems } => {
                let elem = elems
                    .first()
                    .and_then(|&e| self.infer(e))
                    .unwrap_or_else(CType::int);
                format!("({}[]){}", elem.render(), self.brace_list(elems))
            }
            NodeKind::StructLit { name, fields } => {
                format!("(struct {}){}", ast.name(*name), self.designated(fields))
            }
            NodeKind::Range { .. } => {
                self.unsupported(id, "range outside a `for` header");
                String::new()
            }
            other => {
                let what = format!("{} in expression position", other.name());
                self.unsupported(id, &what);
                String::new()
            }
        }
    }

    /// Best-effort C type of an expression, for untyped `let`.
    fn infer(&self, id: NodeId) -> Option<CType> {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Int(_) => Some(CType::int()),
            NodeKind::Float(_) => Some(CType::double()),
            NodeKind::Str(_) => Some(CType::string()),
            NodeKind::Bool(_) => Some(CType::bool_()),
            NodeKind::Char(_) => Some(CType::char_()),
            NodeKind::Ident(sym) => self.symbols.var(ast.name(*sym)).cloned(),
            NodeKind::Binary { op, lhs, rhs } => {
                if op.is_boolean() {
                    Some(CType::bool_())
                } else {
                    self.infer(*lhs).or_else(|| self.infer(*rhs))
                }
            }
            NodeKind::Unary { op, operand } => match op {
                UnOp::Not => Some(CType::bool_()),
                UnOp::Neg => self.infer(*operand),
                UnOp::Deref => self.infer(*operand)?.elem().cloned(),
                UnOp::Ref | UnOp::RefMut => Some(CType::Ptr(Box::new(self.infer(*operand)?))),
            },
            NodeKind::Call { callee, .. } => {
                let NodeKind::Ident(sym) = ast.kind(*callee) else {
                    return None;
                };
                let name = ast.name(*sym);
                match runtime::lookup(name) {
                    Some(builtin) => Some(builtin.ret_type()),
                    None => self.symbols.func(name).map(|sig| sig.ret.clone()),
                }
            }
            NodeKind::Index { base, .. } => match self.infer(*base)? {
                CType::Named("const char*") => Some(CType::char_()),
                ty => ty.elem().cloned(),
            },
            NodeKind::FieldAccess { base, field } => {
                let base = self.infer(*base)?;
                self.symbols
                    .field_type(base.struct_name()?, ast.name(*field))
                    .cloned()
            }
            NodeKind::ArrayLit { elems } => {
                let elem = elems
                    .first()
                    .and_then(|&e| self.infer(e))
                    .unwrap_or_else(CType::int);
                Some(CType::Array(Box::new(elem), elems.len() as u64))
            }
            NodeKind::StructLit { name, .. } => Some(CType::Struct(ast.name(*name).to_string())),
            _ => None,
        }
    }
}

/// Escape one byte for a C literal delimited by `quote`.
fn escape_into(out: &mut String, b: u8, quote: u8) {
    match b {
        b'\n' => out.push_str("\\n"),
        b'\r' => out.push_str("\\r"),
        b'\t' => out.push_str("\\t"),
        b'\\' => out.push_str("\\\\"),
        _ if b == quote => {
            out.push('\\');
            out.push(b as char);
        }
        0x20..=0x7e => out.push(b as char),
        // octal escapes stop after three digits, unlike \x
        _ => out.push_str(&format!("\\{:03o}", b)),
    }
}

fn c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for &b in s.as_bytes() {
        escape_into(&mut out, b, b'"');
    }
    out.push('"');
    out
}

fn c_char(c: u8) -> String {
    let mut out = String::from("'");
    escape_into(&mut out, c, b'\'');
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_escapes() {
        assert_eq!(c_string("a\"b\\c\n"), r#""a\"b\\c\n""#);
        assert_eq!(c_string("\0"), r#""\000""#);
        assert_eq!(c_string("é"), r#""\303\251""#);
    }

    #[test]
    fn char_escapes() {
        assert_eq!(c_char(b'a'), "'a'");
        assert_eq!(c_char(b'\''), r"'\''");
        assert_eq!(c_char(b'"'), "'\"'");
        assert_eq!(c_char(b'\t'), r"'\t'");
    }
}
