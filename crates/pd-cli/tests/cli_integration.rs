//! Invoke the built `pdc` binary end to end.

use std::path::Path;
use std::process::{Command, Output};

fn pdc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pdc"))
}

fn run(args: &[&str]) -> Output {
    pdc().args(args).output().expect("run binary")
}

fn write(dir: &Path, name: &str, src: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, src).expect("write source");
    path.to_str().unwrap().to_string()
}

#[test]
fn compile_writes_c_next_to_input() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(
        dir.path(),
        "add.pd",
        "fn add(a: i64, b: i64) -> i64 { return a + b; }\nfn main() { print_int(add(1, 2)); }\n",
    );

    let output = run(&["compile", &file]);
    assert!(
        output.status.success(),
        "pdc compile should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let c = std::fs::read_to_string(dir.path().join("add.c")).expect("read output");
    assert!(c.contains("long long add(long long a, long long b) {\n    return (a + b);\n}\n"));
    assert!(c.contains("__pd_print_int(add(1, 2));"));
}

#[test]
fn compile_to_explicit_output() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(dir.path(), "m.pd", "fn main() { }");
    let out = dir.path().join("build.c");

    let output = run(&["compile", &file, "-o", out.to_str().unwrap(), "--embed-runtime"]);
    assert!(output.status.success());
    let c = std::fs::read_to_string(&out).expect("read output");
    assert!(c.contains("#define PD_MAX_FILES 256"));
}

#[test]
fn strict_failure_reports_location_and_exits_nonzero() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(dir.path(), "bad.pd", "fn main() {\n    let x = 1\n}\n");

    let output = run(&["compile", &file, "--strict"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let expected = format!("{}:3:1: ParseError: expected `;`, found `}}`", file);
    assert!(stderr.contains(&expected), "stderr: {}", stderr);
    assert!(!dir.path().join("bad.c").exists());
}

#[test]
fn lenient_compile_succeeds_with_warnings() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(dir.path(), "warn.pd", "fn main() { let x = 1 $ ; }");

    let output = run(&["compile", &file]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("LexError: unexpected character '$'"), "stderr: {}", stderr);
}

#[test]
fn capacity_limit_from_flag() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(dir.path(), "big.pd", "fn main() { let x = 1 + 2 + 3; }");

    let output = run(&["compile", &file, "--max-tokens", "5"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CapacityError: token limit of 5 exceeded"), "stderr: {}", stderr);
}

#[test]
fn depth_limit_from_flag() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(dir.path(), "deep.pd", "fn main() { let x = 1 + 2 + 3; }");

    assert!(run(&["compile", &file]).status.success());
    let output = run(&["compile", &file, "--max-depth", "2"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("CapacityError: nesting depth limit of 2 exceeded"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn long_operator_chain_fails_cleanly() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let terms = vec!["1"; 20_000].join(" + ");
    let file = write(dir.path(), "chain.pd", &format!("fn main() {{ let x = {}; }}\n", terms));

    let output = run(&["compile", &file]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nesting depth limit of 256 exceeded"), "stderr: {}", stderr);
}

#[test]
fn options_from_config_file() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(dir.path(), "c.pd", "fn main() { f(1, 2, 3); }");
    let config = write(dir.path(), "opts.json", r#"{ "limits": { "max_children": 2 } }"#);

    let output = run(&["compile", &file, "--config", &config]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Call node has 4 children, limit is 2"), "stderr: {}", stderr);
}

#[test]
fn tokens_dump() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(dir.path(), "t.pd", "let x = \"hi\";");

    let output = run(&["tokens", &file]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "1:1 `let`",
            "1:5 identifier `x`",
            "1:7 `=`",
            "1:9 string \"hi\"",
            "1:13 `;`",
            "1:14 end of file",
        ]
    );
}

#[test]
fn parse_json_is_valid() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(dir.path(), "p.pd", "fn main() { return; }");

    let output = run(&["parse", &file, "--format", "json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert!(json["arena"]["nodes"].is_array());
    assert!(json["root"].is_number());
}

#[test]
fn parse_pretty_outline() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let file = write(dir.path(), "p.pd", "struct S { a: i32 }");

    let output = run(&["parse", &file]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "Program\n  Struct S\n    Field a\n      Type i32\n");
}

#[test]
fn oversized_source_is_rejected() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let big = "// padding\n".repeat(100_000);
    let file = write(dir.path(), "huge.pd", &big);

    let output = run(&["compile", &file]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exceeds 1MB limit"), "stderr: {}", stderr);
}

#[test]
fn missing_file_is_an_error() {
    let output = run(&["compile", "/definitely/not/here.pd"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"), "stderr: {}", stderr);
}
