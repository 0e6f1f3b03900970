use pd_ast::{DiagnosticKind, Options};
use pd_cli::compile_source;

#[test]
fn stages_run_in_order() {
    let out = compile_source("fn main() { print(\"hello\"); }", &Options::strict()).unwrap();
    assert!(out.diagnostics.is_empty());
    assert!(out.c.contains("__pd_print(\"hello\");"));
}

#[test]
fn lenient_diagnostics_from_all_stages_are_kept() {
    let src = "fn main() { let r = 0..2 }";
    let out = compile_source(src, &Options::lenient()).unwrap();
    let kinds: Vec<DiagnosticKind> = out.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, [DiagnosticKind::Parse, DiagnosticKind::Codegen]);
}

#[test]
fn strict_codegen_failure_carries_earlier_diagnostics() {
    let err = compile_source("fn main() { let r = 0..2; }", &Options::strict()).unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.has_kind(DiagnosticKind::Codegen));
}

#[test]
fn long_operator_chain_is_a_capacity_error() {
    let terms = vec!["1"; 20_000].join(" + ");
    let src = format!("fn main() {{ let x = {}; }}", terms);
    let err = compile_source(&src, &Options::lenient()).unwrap_err();
    assert!(err.has_kind(DiagnosticKind::Capacity));
}
