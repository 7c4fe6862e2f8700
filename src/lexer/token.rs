//! # Token Types
//!
//! Defines all token types for the AXIS language.
//!
//! Each token contains:
//! - `kind`: the token type (keyword, literal, operator, structural...)
//! - `lexeme`: the original text from source code
//! - `span`: location in source for error reporting

use crate::error::Span;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self { kind, lexeme: lexeme.into(), span }
    }
}

/// Token kinds for the AXIS language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Keywords ===
    KwFunc,
    KwGive,
    KwWhen,
    KwElse,
    KwWhile,
    KwLoop,
    KwRepeat,
    KwBreak,
    KwContinue,
    KwMode,
    KwTrue,
    KwFalse,
    KwWrite,
    KwWriteln,
    KwRead,
    KwReadln,
    KwReadchar,
    KwReadFailed,

    // === Type names ===
    TyI8,
    TyU8,
    TyI16,
    TyU16,
    TyI32,
    TyU32,
    TyI64,
    TyU64,
    TyBool,
    TyStr,
    TyPtr,

    // === Literals ===
    IntLiteral(i64),
    StringLiteral(String),
    Identifier(String),

    // === Operators ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    Bang,

    // === Punctuation ===
    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Arrow,

    // === Structural (indentation sensitivity) ===
    Indent,
    Dedent,
    Newline,

    Eof,
}

impl TokenKind {
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match s {
            "func" => KwFunc,
            "give" => KwGive,
            "when" => KwWhen,
            "else" => KwElse,
            "while" => KwWhile,
            "loop" => KwLoop,
            "repeat" => KwRepeat,
            "break" => KwBreak,
            "continue" => KwContinue,
            "mode" => KwMode,
            "True" => KwTrue,
            "False" => KwFalse,
            "write" => KwWrite,
            "writeln" => KwWriteln,
            "read" => KwRead,
            "readln" => KwReadln,
            "readchar" => KwReadchar,
            "read_failed" => KwReadFailed,
            "i8" => TyI8,
            "u8" => TyU8,
            "i16" => TyI16,
            "u16" => TyU16,
            "i32" => TyI32,
            "u32" => TyU32,
            "i64" => TyI64,
            "u64" => TyU64,
            "ptr" => TyPtr,
            "bool" => TyBool,
            "str" => TyStr,
            _ => return None,
        })
    }

    pub fn is_type_keyword(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            TyI8 | TyU8 | TyI16 | TyU16 | TyI32 | TyU32 | TyI64 | TyU64 | TyBool | TyStr | TyPtr
        )
    }
}
