use pd_ast::ast::{AssignOp, NodeId, NodeKind, PrimType, TypeExpr};
use pd_ast::Ast;
use pd_parse::parse_str;

/// Parse a single function and return the statements of its body.
fn body(src: &str) -> (Ast, Vec<NodeId>) {
    let ast = parse_str("<mem>", src).expect("parse ok");
    let NodeKind::Function { body, .. } = ast.kind(ast.items()[0]) else {
        panic!("expected Function");
    };
    let NodeKind::Block { stmts } = ast.kind(*body) else {
        panic!("expected Block");
    };
    let stmts = stmts.clone();
    (ast, stmts)
}

// ============ Items ============

#[test]
fn function_signature() {
    let ast = parse_str("<mem>", "pub fn add(a: i64, mut b: &i64) -> i64 { return a; }").unwrap();
    let NodeKind::Function {
        name,
        public,
        params,
        ret,
        ..
    } = ast.kind(ast.items()[0])
    else {
        panic!("expected Function");
    };
    assert_eq!(ast.name(*name), "add");
    assert!(*public);
    assert_eq!(params.len(), 2);
    let NodeKind::Param { mutable, ty, .. } = ast.kind(params[1]) else {
        panic!("expected Param");
    };
    assert!(*mutable);
    assert!(matches!(
        ast.kind(*ty),
        NodeKind::Type(TypeExpr::Ref { mutable: false, .. })
    ));
    let ret = ret.expect("return type");
    assert_eq!(ast.kind(ret), &NodeKind::Type(TypeExpr::Prim(PrimType::I64)));
}

#[test]
fn struct_and_imports() {
    let src = "use std::io;\nimport util.strings\nstruct P { x: i32, y: [u8; 4], }\nfn main() {}";
    let ast = parse_str("<mem>", src).unwrap();
    assert_eq!(ast.items().len(), 4);
    let NodeKind::Import { path } = ast.kind(ast.items()[0]) else {
        panic!("expected Import");
    };
    let segs: Vec<&str> = path.iter().map(|s| ast.name(*s)).collect();
    assert_eq!(segs, ["std", "io"]);
    assert!(matches!(ast.kind(ast.items()[1]), NodeKind::Import { path } if path.len() == 2));
    let NodeKind::Struct { fields, .. } = ast.kind(ast.items()[2]) else {
        panic!("expected Struct");
    };
    assert_eq!(fields.len(), 2);
    let NodeKind::Field { ty, .. } = ast.kind(fields[1]) else {
        panic!("expected Field");
    };
    assert!(matches!(
        ast.kind(*ty),
        NodeKind::Type(TypeExpr::Array { len: 4, .. })
    ));
}

// ============ Statements ============

#[test]
fn let_forms() {
    let (ast, stmts) = body("fn f() { let x = 1; let mut y: i32 = 2; let z: bool; }");
    assert_eq!(stmts.len(), 3);
    let NodeKind::Let { mutable, ty, init, .. } = ast.kind(stmts[1]) else {
        panic!("expected Let");
    };
    assert!(*mutable);
    assert!(ty.is_some() && init.is_some());
    assert!(matches!(ast.kind(stmts[2]), NodeKind::Let { init: None, .. }));
}

#[test]
fn assignment_targets_and_compound_ops() {
    let (ast, stmts) = body("fn f() { x = 1; a[i] += 2; p.x <<= 1; *r = 0; }");
    let ops: Vec<AssignOp> = stmts
        .iter()
        .map(|s| match ast.kind(*s) {
            NodeKind::Assign { op, .. } => *op,
            other => panic!("expected Assign, got {:?}", other),
        })
        .collect();
    assert_eq!(
        ops,
        [AssignOp::Assign, AssignOp::Add, AssignOp::Shl, AssignOp::Assign]
    );
}

#[test]
fn invalid_assignment_target_is_an_error() {
    let err = parse_str("<mem>", "fn f() { 1 + 2 = 3; }").unwrap_err().to_string();
    assert!(err.contains("invalid assignment target"), "{}", err);
}

#[test]
fn return_with_and_without_value() {
    let (ast, stmts) = body("fn f() { return; return 42; }");
    assert!(matches!(ast.kind(stmts[0]), NodeKind::Return { value: None }));
    let NodeKind::Return { value: Some(v) } = ast.kind(stmts[1]) else {
        panic!("expected Return with value");
    };
    assert!(matches!(ast.kind(*v), NodeKind::Int(42)));
}

#[test]
fn empty_statements_are_skipped() {
    let (_, stmts) = body("fn f() { ;; let x = 1;; }");
    assert_eq!(stmts.len(), 1);
}

// ============ Control flow ============

#[test]
fn if_else_if_chain() {
    let (ast, stmts) = body("fn f() { if a { } else if b { } else { x = 1; } }");
    let NodeKind::If { else_branch: Some(e), .. } = ast.kind(stmts[0]) else {
        panic!("expected If with else");
    };
    let NodeKind::If { else_branch: Some(last), .. } = ast.kind(*e) else {
        panic!("expected nested If");
    };
    assert!(matches!(ast.kind(*last), NodeKind::Block { stmts } if stmts.len() == 1));
}

#[test]
fn struct_literal_not_parsed_in_conditions() {
    // `x {` opens the body, it is not a struct literal
    let (ast, stmts) = body("fn f() { while x { break; } }");
    let NodeKind::While { cond, body } = ast.kind(stmts[0]) else {
        panic!("expected While");
    };
    assert!(matches!(ast.kind(*cond), NodeKind::Ident(_)));
    let NodeKind::Block { stmts } = ast.kind(*body) else {
        panic!("expected Block");
    };
    assert!(matches!(ast.kind(stmts[0]), NodeKind::Break));
}

#[test]
fn for_over_range() {
    let (ast, stmts) = body("fn f() { for i in 0..10 { continue; } }");
    let NodeKind::For { var, iter, .. } = ast.kind(stmts[0]) else {
        panic!("expected For");
    };
    assert_eq!(ast.name(*var), "i");
    assert!(matches!(ast.kind(*iter), NodeKind::Range { inclusive: false, .. }));
}

#[test]
fn nested_block_statement() {
    let (ast, stmts) = body("fn f() { { let x = 1; } }");
    assert!(matches!(ast.kind(stmts[0]), NodeKind::Block { .. }));
}
