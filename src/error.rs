//! # Error Types
//!
//! Shared error type for every compilation phase. Each variant carries a
//! [`Span`] pointing at the offending source location, or a zero `Span`
//! for byte-level errors (encoder/ELF writer) that have no source origin.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub col: usize,
    pub offset: usize,
}

impl Span {
    pub fn new(line: usize, col: usize, offset: usize) -> Self {
        Self { line, col, offset }
    }

    /// A span with no meaningful source location.
    pub fn none() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "offset {}", self.offset)
        } else {
            write!(f, "{}:{}", self.line, self.col)
        }
    }
}

/// Unified error type for every compilation phase.
#[derive(Debug, Error)]
pub enum AxisError {
    #[error("{0}: lexical error: {1}")]
    Lexical(Span, String),

    #[error("{0}: syntax error: {1}")]
    Syntactic(Span, String),

    #[error("{0}: semantic error: {1}")]
    Semantic(Span, String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("branch relaxation did not converge after {0} iterations")]
    Relaxation(usize),

    #[error("ELF generation error: {0}")]
    Elf(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AxisError {
    pub fn lexical(span: Span, msg: impl Into<String>) -> Self {
        Self::Lexical(span, msg.into())
    }

    pub fn syntactic(span: Span, msg: impl Into<String>) -> Self {
        Self::Syntactic(span, msg.into())
    }

    pub fn semantic(span: Span, msg: impl Into<String>) -> Self {
        Self::Semantic(span, msg.into())
    }

    pub fn duplicate_function(span: Span, name: &str) -> Self {
        Self::Semantic(span, format!("function '{name}' is defined more than once"))
    }

    pub fn undefined_symbol(span: Span, name: &str) -> Self {
        Self::Semantic(span, format!("undefined symbol '{name}'"))
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn elf(msg: impl Into<String>) -> Self {
        Self::Elf(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}

pub type AxisResult<T> = Result<T, AxisError>;
