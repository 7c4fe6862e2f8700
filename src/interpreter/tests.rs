use super::*;
use crate::{lexer, parser};

fn run_source(src: &str) -> AxisResult<i32> {
    let lex = lexer::tokenize(src);
    assert!(lex.errors.is_empty(), "{:?}", lex.errors);
    let program = parser::parse(lex.tokens).expect("parse failed");
    run(&program)
}

#[test]
fn returns_exit_code_from_bare_top_level_statements() {
    assert_eq!(run_source("mode script\ngive 7\n").unwrap(), 7);
}

#[test]
fn rejects_compile_mode_programs() {
    let err = run_source("mode compile\nfunc main() -> i32:\n    give 0\n").unwrap_err();
    assert!(matches!(err, AxisError::Runtime(_)));
}

#[test]
fn variables_and_arithmetic() {
    let code = "mode script\nx: i32 = 2\ny: i32 = 3\ngive x + y * 4\n";
    assert_eq!(run_source(code).unwrap(), 14);
}

#[test]
fn while_loop_with_break() {
    let code = "mode script\ni: i32 = 0\nwhile True:\n    i = i + 1\n    when i == 5:\n        break\ngive i\n";
    assert_eq!(run_source(code).unwrap(), 5);
}

#[test]
fn loop_desugars_to_while_true() {
    let code = "mode script\ni: i32 = 0\nloop:\n    i = i + 1\n    when i == 5:\n        break\ngive i\n";
    assert_eq!(run_source(code).unwrap(), 5);
}

#[test]
fn string_concatenation() {
    let code = "mode script\ns: str = \"foo\" + \"bar\"\nwriteln(s)\ngive 0\n";
    assert_eq!(run_source(code).unwrap(), 0);
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let code = "mode script\nz: i32 = 0\ngive 1 / z\n";
    assert!(run_source(code).is_err());
}

#[test]
fn floor_division_rounds_toward_negative_infinity() {
    let code = "mode script\ngive -7 / 2\n";
    assert_eq!(run_source(code).unwrap(), -4);
}

#[test]
fn calling_a_function_with_parameters_is_rejected_in_script_mode() {
    let code = "mode script\nfunc add(a: i32, b: i32) -> i32:\n    give a + b\ngive add(1, 2)\n";
    assert!(run_source(code).is_err());
}

#[test]
fn calling_a_zero_arg_function_from_top_level_works() {
    let code = "mode script\nfunc seven() -> i32:\n    give 7\ngive seven()\n";
    assert_eq!(run_source(code).unwrap(), 7);
}
