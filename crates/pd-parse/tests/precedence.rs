use pd_ast::ast::{BinOp, NodeId, NodeKind, UnOp};
use pd_ast::Ast;
use pd_parse::parse_str;

/// Parse `fn f() { let v = <src>; }` and return the initializer.
fn val(src: &str) -> (Ast, NodeId) {
    let ast = parse_str("<mem>", &format!("fn f() {{ let v = {src}; }}")).unwrap();
    let NodeKind::Function { body, .. } = ast.kind(ast.items()[0]) else {
        panic!("expected Function");
    };
    let NodeKind::Block { stmts } = ast.kind(*body) else {
        panic!("expected Block");
    };
    let NodeKind::Let { init: Some(init), .. } = ast.kind(stmts[0]) else {
        panic!("expected Let with initializer");
    };
    let init = *init;
    (ast, init)
}

fn bin(ast: &Ast, id: NodeId) -> (BinOp, NodeId, NodeId) {
    let NodeKind::Binary { op, lhs, rhs } = ast.kind(id) else {
        panic!("expected Binary, got {:?}", ast.kind(id));
    };
    (*op, *lhs, *rhs)
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let (ast, e) = val("1 + 2 * 3");
    let (op, lhs, rhs) = bin(&ast, e);
    assert_eq!(op, BinOp::Add);
    assert!(matches!(ast.kind(lhs), NodeKind::Int(1)));
    assert_eq!(bin(&ast, rhs).0, BinOp::Mul);
}

#[test]
fn subtraction_is_left_associative() {
    // (10 - 3) - 2
    let (ast, e) = val("10 - 3 - 2");
    let (op, lhs, rhs) = bin(&ast, e);
    assert_eq!(op, BinOp::Sub);
    assert!(matches!(ast.kind(rhs), NodeKind::Int(2)));
    let (inner, a, b) = bin(&ast, lhs);
    assert_eq!(inner, BinOp::Sub);
    assert!(matches!(ast.kind(a), NodeKind::Int(10)));
    assert!(matches!(ast.kind(b), NodeKind::Int(3)));
}

#[test]
fn logical_layers() {
    // ((1 + 2*3 == 7) && (4 < 5)) || (0 == 1)
    let (ast, e) = val("1 + 2*3 == 7 && 4 < 5 || 0 == 1");
    let (op, lhs, rhs) = bin(&ast, e);
    assert_eq!(op, BinOp::Or);
    assert_eq!(bin(&ast, lhs).0, BinOp::And);
    assert_eq!(bin(&ast, rhs).0, BinOp::Eq);
}

#[test]
fn bitwise_between_logical_and_equality() {
    // a | (b ^ (c & (d == e)))
    let (ast, e) = val("a | b ^ c & d == e");
    let (op, _, rhs) = bin(&ast, e);
    assert_eq!(op, BinOp::BitOr);
    let (op, _, rhs) = bin(&ast, rhs);
    assert_eq!(op, BinOp::BitXor);
    let (op, _, rhs) = bin(&ast, rhs);
    assert_eq!(op, BinOp::BitAnd);
    assert_eq!(bin(&ast, rhs).0, BinOp::Eq);
}

#[test]
fn shift_between_relational_and_additive() {
    // (1 << (2 + 3)) < 4
    let (ast, e) = val("1 << 2 + 3 < 4");
    let (op, lhs, _) = bin(&ast, e);
    assert_eq!(op, BinOp::Lt);
    let (op, _, rhs) = bin(&ast, lhs);
    assert_eq!(op, BinOp::Shl);
    assert_eq!(bin(&ast, rhs).0, BinOp::Add);
}

#[test]
fn parentheses_override_precedence() {
    let (ast, e) = val("(1 + 2) * 3");
    let (op, lhs, _) = bin(&ast, e);
    assert_eq!(op, BinOp::Mul);
    assert_eq!(bin(&ast, lhs).0, BinOp::Add);
}

#[test]
fn unary_binds_tighter_than_binary() {
    let (ast, e) = val("-a * !b");
    let (op, lhs, rhs) = bin(&ast, e);
    assert_eq!(op, BinOp::Mul);
    assert!(matches!(ast.kind(lhs), NodeKind::Unary { op: UnOp::Neg, .. }));
    assert!(matches!(ast.kind(rhs), NodeKind::Unary { op: UnOp::Not, .. }));
}

#[test]
fn reference_forms() {
    let (ast, e) = val("&mut x");
    assert!(matches!(ast.kind(e), NodeKind::Unary { op: UnOp::RefMut, .. }));

    let (ast, e) = val("&&x");
    let NodeKind::Unary { op: UnOp::Ref, operand } = ast.kind(e) else {
        panic!("expected Ref");
    };
    assert!(matches!(ast.kind(*operand), NodeKind::Unary { op: UnOp::Ref, .. }));
}

#[test]
fn range_is_loosest() {
    let (ast, e) = val("0..n + 1");
    let NodeKind::Range { start, end, inclusive } = ast.kind(e) else {
        panic!("expected Range");
    };
    assert!(!inclusive);
    assert!(matches!(ast.kind(*start), NodeKind::Int(0)));
    assert_eq!(bin(&ast, *end).0, BinOp::Add);

    let (ast, e) = val("1..=10");
    assert!(matches!(ast.kind(e), NodeKind::Range { inclusive: true, .. }));
}
