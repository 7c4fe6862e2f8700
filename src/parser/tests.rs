use super::*;
use crate::lexer::tokenize;

fn parse_src(src: &str) -> AxisResult<Program> {
    let lex = tokenize(src);
    assert!(lex.errors.is_empty(), "lex errors: {:?}", lex.errors);
    parse(lex.tokens)
}

#[test]
fn parses_minimal_function() {
    let src = "func main() -> i32:\n    give 0\n";
    let prog = parse_src(src).expect("should parse");
    assert_eq!(prog.mode, Mode::Compile);
    assert_eq!(prog.functions.len(), 1);
    assert_eq!(prog.functions[0].name, "main");
    assert_eq!(prog.functions[0].return_type, Type::I32);
}

#[test]
fn parses_mode_pragma() {
    let src = "mode script\ngive 0\n";
    let prog = parse_src(src).expect("should parse");
    assert_eq!(prog.mode, Mode::Script);
}

#[test]
fn compile_mode_requires_a_main_function() {
    let src = "mode compile\nfunc helper() -> i32:\n    give 0\n";
    assert!(parse_src(src).is_err());
}

#[test]
fn compile_mode_rejects_bare_top_level_statements() {
    let src = "mode compile\ngive 0\n";
    assert!(parse_src(src).is_err());
}

#[test]
fn script_mode_accepts_bare_top_level_statements() {
    let src = "mode script\nx: i32 = 1\ngive x\n";
    let prog = parse_src(src).unwrap();
    assert_eq!(prog.statements.len(), 2);
    assert!(prog.functions.is_empty());
}

#[test]
fn parses_vardecl_and_return() {
    let src = "func main() -> i32:\n    x: i32 = 10\n    give x\n";
    let prog = parse_src(src).unwrap();
    let body = &prog.functions[0].body;
    assert_eq!(body.len(), 2);
    assert!(matches!(body[0], Stmt::VarDecl { .. }));
    assert!(matches!(body[1], Stmt::Return(Some(_), _)));
}

#[test]
fn parses_when_else() {
    let src = "func main() -> i32:\n    when True:\n        give 1\n    else:\n        give 0\n";
    let prog = parse_src(src).unwrap();
    let body = &prog.functions[0].body;
    match &body[0] {
        Stmt::If { else_branch, .. } => assert!(else_branch.is_some()),
        _ => panic!("expected an if statement"),
    }
}

#[test]
fn parses_while_with_break_continue() {
    let src = "func main() -> i32:\n    while True:\n        break\n    give 0\n";
    let prog = parse_src(src).unwrap();
    assert!(matches!(prog.functions[0].body[0], Stmt::While { .. }));
}

#[test]
fn loop_and_repeat_desugar_to_while_true() {
    for keyword in ["loop", "repeat"] {
        let src = format!("func main() -> i32:\n    {keyword}:\n        break\n    give 0\n");
        let prog = parse_src(&src).unwrap();
        match &prog.functions[0].body[0] {
            Stmt::While { cond, .. } => assert!(matches!(cond, Expr::BoolLiteral(true, _))),
            _ => panic!("expected 'loop'/'repeat' to desugar to a while loop"),
        }
    }
}

#[test]
fn binary_operator_precedence() {
    // 1 + 2 * 3 should parse as 1 + (2 * 3)
    let src = "func main() -> i32:\n    give 1 + 2 * 3\n";
    let prog = parse_src(src).unwrap();
    if let Stmt::Return(Some(Expr::BinaryOp { op, right, .. }), _) = &prog.functions[0].body[0] {
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(**right, Expr::BinaryOp { op: BinOp::Mul, .. }));
    } else {
        panic!("expected a binary add at the top");
    }
}

#[test]
fn parses_function_call_with_args() {
    let src = "func add(a: i32, b: i32) -> i32:\n    give a + b\n\nfunc main() -> i32:\n    give add(1, 2)\n";
    let prog = parse_src(src).unwrap();
    assert_eq!(prog.functions.len(), 2);
    assert_eq!(prog.functions[0].params.len(), 2);
}

#[test]
fn missing_arrow_is_a_syntax_error() {
    let src = "func main() i32:\n    give 0\n";
    assert!(parse_src(src).is_err());
}

#[test]
fn write_requires_parentheses() {
    let src = "func main() -> i32:\n    write \"hi\"\n    give 0\n";
    assert!(parse_src(src).is_err());
}

#[test]
fn writeln_sets_the_newline_flag() {
    let src = "func main() -> i32:\n    writeln(\"hi\")\n    give 0\n";
    let prog = parse_src(src).unwrap();
    match &prog.functions[0].body[0] {
        Stmt::Write { newline, .. } => assert!(*newline),
        _ => panic!("expected a write statement"),
    }
}

#[test]
fn write_without_ln_leaves_the_newline_flag_unset() {
    let src = "func main() -> i32:\n    write(\"hi\")\n    give 0\n";
    let prog = parse_src(src).unwrap();
    match &prog.functions[0].body[0] {
        Stmt::Write { newline, .. } => assert!(!*newline),
        _ => panic!("expected a write statement"),
    }
}

#[test]
fn read_primitives_require_empty_parens() {
    let src = "func main() -> i32:\n    x: str = read\n    give 0\n";
    assert!(parse_src(src).is_err());
}

#[test]
fn pointer_dereference_parses() {
    let src = "func f(p: ptr) -> i32:\n    give *p\n";
    let prog = parse_src(src).unwrap();
    assert!(matches!(
        &prog.functions[0].body[0],
        Stmt::Return(Some(Expr::Deref { .. }), _)
    ));
}
