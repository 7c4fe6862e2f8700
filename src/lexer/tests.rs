use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    let result = tokenize(source);
    assert!(result.errors.is_empty(), "unexpected lexer errors: {:?}", result.errors);
    result.tokens.into_iter().map(|t| t.kind).collect()
}

#[test]
fn empty_source_is_just_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
}

#[test]
fn simple_vardecl_statement() {
    let tokens = kinds("x: i32 = 10\n");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Identifier("x".into()),
            TokenKind::Colon,
            TokenKind::TyI32,
            TokenKind::Eq,
            TokenKind::IntLiteral(10),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn indent_and_dedent_are_emitted() {
    let src = "func main() -> i32:\n    x: i32 = 1\n    give x\n";
    let tokens = kinds(src);
    assert!(tokens.contains(&TokenKind::Indent));
    assert!(tokens.contains(&TokenKind::Dedent));
}

#[test]
fn nested_blocks_produce_matching_indent_dedent_counts() {
    let src = "func f() -> i32:\n    when True:\n        give 1\n    give 0\n";
    let tokens = kinds(src);
    let indents = tokens.iter().filter(|t| **t == TokenKind::Indent).count();
    let dedents = tokens.iter().filter(|t| **t == TokenKind::Dedent).count();
    assert_eq!(indents, dedents);
    assert_eq!(indents, 2);
}

#[test]
fn blank_and_comment_lines_do_not_affect_indentation() {
    let src = "func f() -> i32:\n    x: i32 = 1\n\n    # a comment\n    give x\n";
    let tokens = kinds(src);
    let indents = tokens.iter().filter(|t| **t == TokenKind::Indent).count();
    assert_eq!(indents, 1);
}

#[test]
fn slash_slash_comments_are_also_supported() {
    let src = "func f() -> i32:\n    x: i32 = 1 // inline comment\n    give x\n";
    let tokens = kinds(src);
    assert!(!tokens.iter().any(|t| matches!(t, TokenKind::Slash)));
}

#[test]
fn hex_and_binary_literals() {
    let tokens = kinds("0x1F\n0b1010\n");
    assert_eq!(
        tokens,
        vec![
            TokenKind::IntLiteral(31),
            TokenKind::Newline,
            TokenKind::IntLiteral(10),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_literal_with_escapes() {
    let tokens = kinds("\"hi\\n\"\n");
    assert_eq!(tokens[0], TokenKind::StringLiteral("hi\n".to_string()));
}

#[test]
fn unterminated_string_is_an_error() {
    let result = tokenize("\"unterminated\n");
    assert!(!result.errors.is_empty());
}

#[test]
fn two_char_operators() {
    let tokens = kinds("a == b != c <= d >= e << f >> g -> h\n");
    assert!(tokens.contains(&TokenKind::EqEq));
    assert!(tokens.contains(&TokenKind::NotEq));
    assert!(tokens.contains(&TokenKind::LtEq));
    assert!(tokens.contains(&TokenKind::GtEq));
    assert!(tokens.contains(&TokenKind::Shl));
    assert!(tokens.contains(&TokenKind::Shr));
    assert!(tokens.contains(&TokenKind::Arrow));
}

#[test]
fn keywords_are_recognized() {
    let tokens = kinds("func give when else while loop repeat break continue mode True False\n");
    assert_eq!(
        tokens,
        vec![
            TokenKind::KwFunc,
            TokenKind::KwGive,
            TokenKind::KwWhen,
            TokenKind::KwElse,
            TokenKind::KwWhile,
            TokenKind::KwLoop,
            TokenKind::KwRepeat,
            TokenKind::KwBreak,
            TokenKind::KwContinue,
            TokenKind::KwMode,
            TokenKind::KwTrue,
            TokenKind::KwFalse,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn read_primitives_and_ptr_type_are_recognized() {
    let tokens = kinds("read readln readchar read_failed ptr\n");
    assert_eq!(
        tokens,
        vec![
            TokenKind::KwRead,
            TokenKind::KwReadln,
            TokenKind::KwReadchar,
            TokenKind::KwReadFailed,
            TokenKind::TyPtr,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}
