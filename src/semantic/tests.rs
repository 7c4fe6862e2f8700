use super::*;
use crate::lexer::tokenize;
use crate::parser::parse;

fn analyze_src(src: &str) -> AxisResult<AnalyzedProgram> {
    let lex = tokenize(src);
    let prog = parse(lex.tokens).unwrap();
    analyze(prog)
}

#[test]
fn simple_function_analyzes_cleanly() {
    let src = "func main() -> i32:\n    x: i32 = 10\n    give x\n";
    let result = analyze_src(src).unwrap();
    assert_eq!(result.functions[0].frame_size % 16, 0);
}

#[test]
fn duplicate_function_is_rejected() {
    let src = "func f() -> i32:\n    give 0\n\nfunc f() -> i32:\n    give 1\n";
    assert!(analyze_src(src).is_err());
}

#[test]
fn undefined_variable_is_rejected() {
    let src = "func main() -> i32:\n    give y\n";
    assert!(analyze_src(src).is_err());
}

#[test]
fn literal_coerces_to_smaller_int_type() {
    let src = "func main() -> i32:\n    x: i8 = 10\n    give 0\n";
    assert!(analyze_src(src).is_ok());
}

#[test]
fn literal_out_of_range_is_rejected() {
    let src = "func main() -> i32:\n    x: i8 = 1000\n    give 0\n";
    assert!(analyze_src(src).is_err());
}

#[test]
fn named_value_does_not_implicitly_convert() {
    let src = "func main() -> i32:\n    x: i32 = 10\n    y: i8 = x\n    give 0\n";
    assert!(analyze_src(src).is_err());
}

#[test]
fn frame_layout_allocates_negative_offsets() {
    let src = "func main() -> i32:\n    a: i64 = 1\n    b: i8 = 2\n    give 0\n";
    let result = analyze_src(src).unwrap();
    let info = &result.functions[0];
    let a = info.symbols.lookup("a").unwrap();
    let b = info.symbols.lookup("b").unwrap();
    assert!(a.stack_offset < 0);
    assert!(b.stack_offset < a.stack_offset);
}

#[test]
fn call_with_too_many_arguments_is_rejected() {
    let src = "func f(a: i32, b: i32, c: i32, d: i32, e: i32, ff: i32, g: i32) -> i32:\n    give 0\n\nfunc main() -> i32:\n    give f(1, 2, 3, 4, 5, 6, 7)\n";
    assert!(analyze_src(src).is_err());
}

#[test]
fn string_concatenation_is_allowed() {
    let src = "func main() -> i32:\n    write(\"a\" + \"b\")\n    give 0\n";
    assert!(analyze_src(src).is_ok());
}

#[test]
fn when_condition_must_be_bool_not_integer() {
    let src = "func main() -> i32:\n    when 1:\n        give 1\n    give 0\n";
    assert!(analyze_src(src).is_err());
}

#[test]
fn readln_infers_integer_type_from_declaration_target() {
    let src = "func main() -> i32:\n    n: i32 = readln()\n    give n\n";
    let result = analyze_src(src).unwrap();
    let sym = result.functions[0].symbols.lookup("n").unwrap();
    assert_eq!(sym.ty, Type::I32);
}

#[test]
fn readchar_cannot_be_assigned_to_str() {
    let src = "func main() -> i32:\n    s: str = readchar()\n    give 0\n";
    assert!(analyze_src(src).is_err());
}

#[test]
fn pointer_dereference_parses_but_is_rejected_as_unimplemented() {
    let src = "func f(p: ptr) -> i32:\n    give *p\n";
    let err = analyze_src(src).unwrap_err();
    assert!(format!("{err}").contains("not yet implemented"));
}

#[test]
fn loop_desugars_to_while_and_analyzes_cleanly() {
    let src = "func main() -> i32:\n    i: i32 = 0\n    loop:\n        i = i + 1\n        when i == 3:\n            break\n    give i\n";
    assert!(analyze_src(src).is_ok());
}
