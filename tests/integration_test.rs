//! End-to-end tests driving the full lex → parse → resolve → evaluate
//! pipeline through the crate's public `run` entry point.

use wixme::run;

#[test]
fn closures_capture_by_reference() {
    let outcome = run("var f; { var x = 1; fun g() { return x; } x = 2; f = g; } print(f());");
    assert!(!outcome.had_error(), "{:?} / {:?}", outcome.diagnostics, outcome.runtime_error.map(|e| e.message));
    assert_eq!(outcome.output, "2\n");
}

#[test]
fn class_initializer_and_method() {
    let outcome = run("class P { init(x) { this.x = x; } get() { return this.x; } } print(P(7).get());");
    assert!(!outcome.had_error());
    assert_eq!(outcome.output, "7\n");
}

#[test]
fn list_mutation_aliases() {
    let outcome = run("var a = [1,2,3]; var b = a; b[0] = 9; print(a);");
    assert!(!outcome.had_error());
    assert_eq!(outcome.output, "[9, 2, 3]\n");
}

#[test]
fn string_slice_and_concatenation() {
    let outcome = run(r#"print("hello"[1:4] + "p!");"#);
    assert!(!outcome.had_error());
    assert_eq!(outcome.output, "ellp!\n");
}

#[test]
fn short_circuit_returns_operand() {
    let outcome = run(r#"print(nil or "x"); print(0 and "y");"#);
    assert!(!outcome.had_error());
    assert_eq!(outcome.output, "x\ny\n");
}

#[test]
fn for_desugar_matches_explicit_while_rewrite() {
    let outcome = run("fun s(n) { var t = 0; for (var i = 0; i < n; i = i + 1) t = t + i; return t; } print(s(5));");
    assert!(!outcome.had_error());
    assert_eq!(outcome.output, "10\n");
}

#[test]
fn shadowing_does_not_mutate_outer_binding() {
    let outcome = run("var x = 1; { var x = 2; } print(x);");
    assert!(!outcome.had_error());
    assert_eq!(outcome.output, "1\n");
}

#[test]
fn lex_errors_are_reported_and_do_not_run_the_program() {
    let outcome = run("print(1); @ print(2);");
    assert!(outcome.had_error());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0].to_line().contains("Unexpected character"));
    assert_eq!(outcome.output, "");
}

#[test]
fn parse_errors_prevent_evaluation_but_report_position() {
    let outcome = run("var = 1;");
    assert!(outcome.had_error());
    assert!(outcome.diagnostics[0].to_line().starts_with("[line 1, col"));
}

#[test]
fn resolution_errors_prevent_evaluation() {
    let outcome = run("print(this);");
    assert!(outcome.had_error());
    assert!(outcome.diagnostics[0].message.contains("'this' outside"));
    assert_eq!(outcome.output, "");
}

#[test]
fn runtime_errors_abort_after_partial_output() {
    let outcome = run(r#"print("before"); var a = [1]; a[9] = 2; print("after");"#);
    assert_eq!(outcome.output, "before\n");
    let err = outcome.runtime_error.expect("expected a runtime error");
    assert_eq!(err.message, "Index out of range.");
}

#[test]
fn diagnostic_format_matches_the_wire_contract() {
    let outcome = run("1 @ 2;");
    let line = outcome.diagnostics[0].to_line();
    assert_eq!(line, "[line 1, col 3] Error at '@': Unexpected character @.");
}

#[test]
fn runtime_error_diagnostic_is_annotated_during_runtime() {
    let outcome = run("print(undefined_name);");
    let err = outcome.runtime_error.expect("expected a runtime error");
    let diag = err.to_diagnostic();
    assert!(diag.to_line().contains("during runtime"));
}

#[test]
fn native_globals_are_available() {
    let outcome = run("print(len([1,2,3])); print(len(\"hi\")); print(toString(5)); print(toNumber(\"5\") + 1);");
    assert!(!outcome.had_error(), "{:?}", outcome.runtime_error.map(|e| e.message));
    assert_eq!(outcome.output, "3\n2\n5\n6\n");
}

#[test]
fn clock_returns_a_number() {
    let outcome = run("var t = clock(); print(t >= 0);");
    assert!(!outcome.had_error());
    assert_eq!(outcome.output, "true\n");
}

#[test]
fn nested_block_comments_are_skipped() {
    let outcome = run("/* outer /* inner */ still outer */ print(1);");
    assert!(!outcome.had_error());
    assert_eq!(outcome.output, "1\n");
}

#[test]
fn unterminated_block_comment_is_reported_at_outer_open() {
    let outcome = run("/* outer /* inner */ print(1);");
    assert!(outcome.had_error());
    assert!(outcome.diagnostics[0].message.contains("Unterminated multiline comment"));
}
