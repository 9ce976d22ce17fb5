//! Whole-program behavioral tests, driven through the compiled `jlox`
//! binary against real script files. Exercises the exit-code contract
//! end to end, not just the library entry point.

use std::io::Write;
use std::process::{Command, Output};

fn run_script(source: &str) -> Output {
    let mut file = tempfile::Builder::new()
        .suffix(".lox")
        .tempfile()
        .expect("failed to create temp script file");
    write!(file, "{source}").expect("failed to write temp script");

    Command::new(env!("CARGO_BIN_EXE_jlox"))
        .arg(file.path())
        .output()
        .expect("failed to run jlox binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_empty_program_produces_no_output_and_exits_zero() {
    let output = run_script("");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_print_nil() {
    let output = run_script("print nil;");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "nil\n");
}

#[test]
fn test_arithmetic_and_precedence() {
    let output = run_script("print 1 + 2 * 3;");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "7\n");
}

#[test]
fn test_string_concat_with_number() {
    let output = run_script(r#"print "x=" + 3;"#);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "x=3\n");
}

#[test]
fn test_closures_capture_by_reference() {
    let output = run_script(
        "fun makeCounter() { var n = 0; fun c() { n = n + 1; return n; } return c; }
         var c = makeCounter(); print c(); print c(); print c();",
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "1\n2\n3\n");
}

#[test]
fn test_resolver_fixes_late_binding() {
    let output = run_script(
        "var a = \"global\";
         { fun show() { print a; } show(); var a = \"local\"; show(); }",
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "global\nglobal\n");
}

#[test]
fn test_self_initializer_is_rejected_with_exit_65() {
    let output = run_script("{ var a = a; }");
    assert_eq!(output.status.code(), Some(65));
    assert!(stderr(&output).contains("Can't read local variable in its own initializer."));
}

#[test]
fn test_divide_by_zero_is_a_runtime_error_with_exit_70() {
    let output = run_script("print 1/0;");
    assert_eq!(output.status.code(), Some(70));
    assert!(stderr(&output).contains("RuntimeError [line 1]: Cannot divide by zero."));
}

#[test]
fn test_negating_a_string_names_the_offending_type() {
    let output = run_script(r#"print -"nope";"#);
    assert_eq!(output.status.code(), Some(70));
    assert!(stderr(&output).contains("Operand must be a number, got string."));
}

#[test]
fn test_break_exits_its_loop() {
    let output = run_script(
        "var i = 0; while (true) { if (i == 3) break; i = i + 1; } print i;",
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "3\n");
}

#[test]
fn test_class_instance_display() {
    let output = run_script("class P { } var p = P(); print p;");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "P instance\n");
}

#[test]
fn test_too_many_cli_arguments_reports_usage_and_exits_64() {
    let output = Command::new(env!("CARGO_BIN_EXE_jlox"))
        .arg("a.lox")
        .arg("b.lox")
        .output()
        .expect("failed to run jlox binary");
    assert_eq!(output.status.code(), Some(64));
    assert_eq!(stdout(&output), "Usage: jlox [script]\n");
}

#[test]
fn test_unknown_script_path_exits_with_software_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_jlox"))
        .arg("/nonexistent/path/does-not-exist.lox")
        .output()
        .expect("failed to run jlox binary");
    assert_eq!(output.status.code(), Some(70));
}

#[test]
fn test_class_method_using_this() {
    let output = run_script(
        "class Counter {
             init() { this.n = 0; }
             increment() { this.n = this.n + 1; return this.n; }
         }
         var c = Counter();
         print c.increment();
         print c.increment();",
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "1\n2\n");
}

#[test]
fn test_undefined_variable_is_a_runtime_error() {
    let output = run_script("print undefinedThing;");
    assert_eq!(output.status.code(), Some(70));
}

#[test]
fn test_for_loop_desugars_correctly() {
    let output = run_script("for (var i = 0; i < 3; i = i + 1) print i;");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "0\n1\n2\n");
}
