//! End-to-end interpreter tests: source text in, printed lines out.

use nanojs::run_source;

fn run(source: &str) -> Vec<String> {
    let result = run_source(source);
    assert!(
        result.error.is_none(),
        "unexpected error: {:?}",
        result.error
    );
    result.lines
}

fn run_err(source: &str) -> String {
    run_source(source).error.expect("expected an error")
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(run("print(1 + 2 * 3);"), vec!["7"]);
}

#[test]
fn string_number_coercion() {
    assert_eq!(
        run(r#"print("a" + 1); print(1 + "a"); print(1.5 + "x");"#),
        vec!["a1", "1a", "1.500000x"]
    );
}

#[test]
fn function_with_default_and_early_return() {
    let source = "
function f(a, b = 10) { if (a > b) { return a; } return b; }
print(f(5)); print(f(20));
";
    assert_eq!(run(source), vec!["10", "20"]);
}

#[test]
fn loop_with_break_and_continue() {
    let source = "
var s = 0;
for (let i = 0; i < 10; i = i + 1) {
  if (i == 5) break;
  if (i % 2 == 0) continue;
  s = s + i;
}
print(s);
";
    assert_eq!(run(source), vec!["4"]);
}

#[test]
fn scope_discipline() {
    let source = "
var x = 1;
function g() { let x = 2; return x; }
print(g()); print(x);
";
    assert_eq!(run(source), vec!["2", "1"]);
}

#[test]
fn short_circuit_identity() {
    assert_eq!(
        run(r#"print(0 || "hello"); print("hello" && 42);"#),
        vec!["hello", "42"]
    );
}

#[test]
fn recursion_through_dynamic_lookup() {
    let source = "
function fact(n) { if (n < 2) { return 1; } return n * fact(n - 1); }
print(fact(5));
";
    assert_eq!(run(source), vec!["120"]);
}

#[test]
fn iterative_fibonacci() {
    let source = "
function fib(n) {
  var a = 0;
  var b = 1;
  while (n > 0) {
    let t = a + b;
    a = b;
    b = t;
    n = n - 1;
  }
  return a;
}
print(fib(10));
";
    assert_eq!(run(source), vec!["55"]);
}

#[test]
fn do_while_runs_body_at_least_once() {
    let source = "
var n = 0;
do { n = n + 1; } while (0);
print(n);
do { n = n + 1; } while (n < 5);
print(n);
";
    assert_eq!(run(source), vec!["1", "5"]);
}

#[test]
fn else_if_chain_picks_first_truthy_branch() {
    let source = "
function grade(n) {
  if (n >= 90) { return \"a\"; }
  else if (n >= 80) { return \"b\"; }
  else if (n >= 70) { return \"c\"; }
  else { return \"f\"; }
}
print(grade(95)); print(grade(85)); print(grade(72)); print(grade(10));
";
    assert_eq!(run(source), vec!["a", "b", "c", "f"]);
}

#[test]
fn single_statement_branches() {
    let source = "
var x = 0;
if (1) x = 3; else x = 4;
print(x);
if (0) x = 5; else x = 6;
print(x);
while (x < 10) x = x + 1;
print(x);
";
    assert_eq!(run(source), vec!["3", "6", "10"]);
}

#[test]
fn break_escapes_innermost_loop_only() {
    let source = "
var total = 0;
for (let i = 0; i < 3; i = i + 1) {
  for (let j = 0; j < 10; j = j + 1) {
    if (j == 2) break;
    total = total + 1;
  }
}
print(total);
";
    assert_eq!(run(source), vec!["6"]);
}

#[test]
fn return_unwinds_nested_loops() {
    let source = "
function find() {
  for (let i = 0; i < 10; i = i + 1) {
    while (1) {
      return i + 40;
    }
  }
  return -1;
}
print(find());
";
    assert_eq!(run(source), vec!["40"]);
}

#[test]
fn bare_return_yields_nothing() {
    assert_eq!(
        run("function f() { return; } print(f());"),
        vec!["0"]
    );
}

#[test]
fn empty_function_body_yields_nothing() {
    assert_eq!(run("function f() { } print(f());"), vec!["0"]);
}

#[test]
fn nothing_coerces_to_zero_in_arithmetic() {
    assert_eq!(
        run("function f() { } print(f() + 1);"),
        vec!["1"]
    );
}

#[test]
fn var_from_function_body_is_visible_at_top_level() {
    let source = "
function setup() { var ready = 1; }
setup();
print(ready);
";
    assert_eq!(run(source), vec!["1"]);
}

#[test]
fn let_in_loop_does_not_leak_out() {
    let source = "
for (let i = 0; i < 3; i = i + 1) { }
print(i);
";
    assert_eq!(run(source), vec!["Warning: 'i' is not defined."]);
}

#[test]
fn functions_see_caller_bindings() {
    // dynamic resolution: free names bind through the call-time chain
    let source = "
function show() { return label; }
function tagged() { let label = \"inner\"; return show(); }
var label = \"outer\";
print(show()); print(tagged());
";
    assert_eq!(run(source), vec!["outer", "inner"]);
}

#[test]
fn default_is_not_memoized() {
    let source = "
var base = 1;
function next(n = base + 1) { return n; }
print(next());
base = 10;
print(next());
print(next(100));
";
    assert_eq!(run(source), vec!["2", "11", "100"]);
}

#[test]
fn comma_operator_sequences() {
    assert_eq!(run("var x = (1, 2); print(x);"), vec!["2"]);
}

#[test]
fn double_negation_round_trips() {
    assert_eq!(
        run("var x = 7; print(- -x); print(!!x); print(!!0);"),
        vec!["7", "1", "0"]
    );
}

#[test]
fn chained_assignment_fails_at_runtime() {
    // `=` is left-associative, so a = b = 1 binds (a = b) = 1 and the second
    // assignment has no variable on its left
    let err = run_err("var b = 0; var a = 0; a = b = 1;");
    assert!(
        err.contains("Expected a variable before '='."),
        "got: {}",
        err
    );
}

#[test]
fn string_less_than_is_an_error() {
    let err = run_err(r#"print("a" < "b");"#);
    assert!(err.contains("Invalid '<' expression."), "got: {}", err);
}

#[test]
fn string_equality_compares_contents() {
    assert_eq!(
        run(r#"var a = "x" + 1; print(a == "x1"); print(a != "x1");"#),
        vec!["1", "0"]
    );
}

#[test]
fn bitwise_chain() {
    // shifts bind looser than & | ^ here, so this is 1 << (((4|2)&3)^1)
    assert_eq!(run("print(1 << 4 | 2 & 3 ^ 1);"), vec!["8"]);
}

#[test]
fn float_modulus() {
    assert_eq!(run("print(7.5 % 2);"), vec!["1.5"]);
}

#[test]
fn multiline_strings_are_accepted() {
    assert_eq!(run("print(\"a\nb\");"), vec!["a\nb"]);
}

#[test]
fn print_each_argument_on_its_own_line() {
    assert_eq!(run("print(1, 2.5, \"x\");"), vec!["1", "2.5", "x"]);
}

#[test]
fn continue_at_top_level_is_illegal() {
    let err = run_err("continue;");
    assert!(
        err.contains("Uncaught SyntaxError: Illegal continue statement"),
        "got: {}",
        err
    );
}

#[test]
fn break_at_top_level_is_illegal() {
    let err = run_err("if (1) { break; }");
    assert!(
        err.contains("Uncaught SyntaxError: Illegal break statement"),
        "got: {}",
        err
    );
}

#[test]
fn error_reports_deepest_line() {
    let err = run_err("var ok = 1;\nfunction f() {\n  return missing + 1;\n}\nf();\n");
    assert!(err.contains("in line: 3"), "got: {}", err);
}
