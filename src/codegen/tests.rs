use super::*;
use crate::parser;
use crate::semantic;

fn compile_source(src: &str) -> CodegenOutput {
    let lex = crate::lexer::tokenize(src);
    assert!(lex.errors.is_empty(), "{:?}", lex.errors);
    let program = parser::parse(lex.tokens).expect("parse failed");
    let analyzed = semantic::analyze(program).expect("analysis failed");
    compile(&analyzed).expect("codegen failed")
}

#[test]
fn compiles_minimal_function_with_prologue_epilogue() {
    let out = compile_source("mode compile\nfunc main() -> i32:\n    give 0\n");
    assert!(out.assembly.contains("main:"));
    assert!(out.assembly.contains("main_epilog:"));
    assert!(out.assembly.contains("push rbp"));
    assert!(out.assembly.contains("pop rbp"));
    assert!(out.assembly.contains("ret"));
}

#[test]
fn writeln_integer_literal_emits_digit_loop_and_newline() {
    let out = compile_source("mode compile\nfunc main() -> i32:\n    writeln(42)\n    give 0\n");
    assert!(out.assembly.contains("div rcx"));
    assert!(out.string_data.iter().any(|(_, c)| c == "\n"));
}

#[test]
fn write_without_ln_emits_no_trailing_newline_string() {
    let out = compile_source("mode compile\nfunc main() -> i32:\n    write(\"hi\")\n    give 0\n");
    assert!(!out.string_data.iter().any(|(_, c)| c == "\n"));
}

#[test]
fn write_string_literal_registers_string_data() {
    let out = compile_source("mode compile\nfunc main() -> i32:\n    write(\"hi\")\n    give 0\n");
    assert!(out.string_data.iter().any(|(_, c)| c == "hi"));
    assert!(out.assembly.contains("movabs rax, @str0"));
}

#[test]
fn binary_expression_spills_left_operand_across_temp_register() {
    let out = compile_source("mode compile\nfunc main() -> i32:\n    x: i32 = 1 + 2 * 3\n    give x\n");
    assert!(out.assembly.contains("imul eax, ecx"));
    assert!(out.assembly.contains("add eax, ecx"));
}

#[test]
fn if_else_emits_matching_labels() {
    let out = compile_source(
        "mode compile\nfunc main() -> i32:\n    when 1 == 1:\n        give 1\n    else:\n        give 0\n",
    );
    assert!(out.assembly.contains("sete al"));
    assert!(out.assembly.contains("je @.Lelse"));
}

#[test]
fn while_loop_with_break_and_continue() {
    let out = compile_source(
        "mode compile\nfunc main() -> i32:\n    i: i32 = 0\n    while i < 10:\n        i = i + 1\n        break\n    give i\n",
    );
    assert!(out.assembly.contains(".Lwcond"));
    assert!(out.assembly.contains(".Lwend"));
}

#[test]
fn loop_desugars_to_the_same_while_labels() {
    let out = compile_source(
        "mode compile\nfunc main() -> i32:\n    i: i32 = 0\n    loop:\n        i = i + 1\n        when i == 3:\n            break\n    give i\n",
    );
    assert!(out.assembly.contains(".Lwcond"));
    assert!(out.assembly.contains(".Lwend"));
}

#[test]
fn function_call_passes_arguments_in_registers() {
    let out = compile_source(
        "mode compile\nfunc add(a: i32, b: i32) -> i32:\n    give a + b\nfunc main() -> i32:\n    give add(1, 2)\n",
    );
    assert!(out.assembly.contains("pop rdi"));
    assert!(out.assembly.contains("pop rsi"));
    assert!(out.assembly.contains("call @add"));
}

#[test]
fn read_failed_sets_needs_bss() {
    let out = compile_source(
        "mode compile\nfunc main() -> i32:\n    s: str = readln()\n    when read_failed():\n        give 1\n    give 0\n",
    );
    assert!(out.needs_bss);
    assert!(out.assembly.contains("@_read_failed"));
}

#[test]
fn readln_into_integer_target_emits_digit_parser_not_a_raw_pointer() {
    let out = compile_source("mode compile\nfunc main() -> i32:\n    n: i32 = readln()\n    give n\n");
    assert!(out.assembly.contains("imul rax, rax, 10"));
    assert!(!out.assembly.contains("mov rax, rbx"));
}
