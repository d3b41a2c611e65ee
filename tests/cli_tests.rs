//! Binary-level tests for the nanojs CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn nanojs() -> Command {
    Command::cargo_bin("nanojs").expect("binary builds")
}

fn script(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write script");
    file
}

#[test]
fn run_executes_a_script_file() {
    let file = script("print(1 + 2 * 3);");
    nanojs()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("7\n");
}

#[test]
fn run_reads_stdin_when_no_file_given() {
    nanojs()
        .arg("run")
        .write_stdin("print(\"hi\");")
        .assert()
        .success()
        .stdout("hi\n");
}

#[test]
fn run_reads_stdin_for_dash() {
    nanojs()
        .arg("run")
        .arg("-")
        .write_stdin("print(40 + 2);")
        .assert()
        .success()
        .stdout("42\n");
}

#[test]
fn eval_errors_exit_nonzero_with_diagnostic() {
    let file = script("var a = 1;\nprint(a + nope);\n");
    nanojs()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("[Eval Error] in line: 2"))
        .stderr(predicate::str::contains(
            "ReferenceError: 'nope' is not defined.",
        ));
}

#[test]
fn parse_errors_exit_nonzero_with_template() {
    let file = script("print(1 + ;");
    nanojs()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("[PARSER_ERROR]"));
}

#[test]
fn lex_errors_name_the_line() {
    let file = script("var ok = 1;\nvar s = \"unclosed;\n");
    nanojs()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("[Lexer Error] line 2"));
}

#[test]
fn check_parses_without_running() {
    let file = script("print(undefined_is_fine);");
    nanojs()
        .arg("check")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Check passed"));
}

#[test]
fn check_fails_on_bad_syntax() {
    let file = script("function ( {");
    nanojs().arg("check").arg(file.path()).assert().failure();
}

#[test]
fn tokens_dumps_the_stream() {
    let file = script("var x = 1;");
    nanojs()
        .arg("tokens")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("VarOrLet"))
        .stdout(predicate::str::contains("Identifier"))
        .stdout(predicate::str::contains("Integer"));
}

#[test]
fn time_flag_reports_on_stderr() {
    let file = script("print(1);");
    nanojs()
        .arg("run")
        .arg("--time")
        .arg(file.path())
        .assert()
        .success()
        .stdout("1\n")
        .stderr(predicate::str::contains("Time :"));
}

#[test]
fn missing_file_reports_an_error() {
    nanojs()
        .arg("run")
        .arg("/no/such/script.njs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn warning_for_undefined_print_argument_goes_to_stdout() {
    let file = script("print(ghost);");
    nanojs()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("Warning: 'ghost' is not defined.\n");
}
