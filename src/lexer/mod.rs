//! # Lexer
//!
//! Tokenizes AXIS source code into a flat token stream, synthesizing
//! `Indent`/`Dedent`/`Newline` tokens the way Python's own tokenizer does.
//!
//! A tab advances the column to the next multiple of 4 for the purpose of
//! computing indent width; blank lines and comment-only lines never push or
//! pop the indent stack. `#` and `//` both start a line comment that runs
//! to end of line and is discarded — neither ever produces a token.

pub mod cursor;
pub mod token;

use crate::error::{AxisError, AxisResult, Span};
use cursor::Cursor;
pub use token::{Token, TokenKind};

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<AxisError>,
}

/// Tokenize `source` into a [`LexResult`].
pub fn tokenize(source: &str) -> LexResult {
    let mut lexer = Lexer::new(source);
    lexer.run();
    LexResult { tokens: lexer.tokens, errors: lexer.errors }
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
    errors: Vec<AxisError>,
    indent_stack: Vec<usize>,
    /// true at the start of a logical line, before any non-whitespace token.
    at_line_start: bool,
    /// pending DEDENT tokens queued for emission before the next real token.
    pending_dedents: usize,
    paren_depth: usize,
}

const TAB_WIDTH: usize = 4;

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
            errors: Vec::new(),
            indent_stack: vec![0],
            at_line_start: true,
            pending_dedents: 0,
            paren_depth: 0,
        }
    }

    fn run(&mut self) {
        while !self.cursor.is_at_end() {
            if self.at_line_start && self.paren_depth == 0 {
                if !self.handle_line_start() {
                    continue;
                }
            }
            self.lex_token();
        }
        self.finish();
    }

    /// Consumes leading whitespace/blank/comment lines and emits
    /// Indent/Dedent tokens. Returns `true` if there is real content left on
    /// this line to lex, `false` if the caller should loop again (EOF or a
    /// fully-blank line was consumed).
    fn handle_line_start(&mut self) -> bool {
        if self.pending_dedents > 0 {
            let (line, col) = self.cursor.current_pos();
            self.pending_dedents -= 1;
            self.tokens.push(Token::new(TokenKind::Dedent, "", Span::new(line, col, self.cursor.pos())));
            return self.pending_dedents == 0;
        }

        let mut width = 0usize;
        loop {
            match self.cursor.peek() {
                Some(' ') => {
                    self.cursor.advance();
                    width += 1;
                }
                Some('\t') => {
                    self.cursor.advance();
                    width += TAB_WIDTH - (width % TAB_WIDTH);
                }
                _ => break,
            }
        }

        match self.cursor.peek() {
            None => {
                self.at_line_start = false;
                return false;
            }
            Some('\n') | Some('\r') => {
                self.lex_newline();
                return false;
            }
            _ => {}
        }
        if self.at_comment_start() {
            self.skip_comment();
            return false;
        }

        self.at_line_start = false;
        let current = *self.indent_stack.last().unwrap();
        if width > current {
            self.indent_stack.push(width);
            let (line, col) = self.cursor.current_pos();
            self.tokens.push(Token::new(TokenKind::Indent, "", Span::new(line, col, self.cursor.pos())));
        } else if width < current {
            let mut count = 0;
            while *self.indent_stack.last().unwrap() > width {
                self.indent_stack.pop();
                count += 1;
            }
            if *self.indent_stack.last().unwrap() != width {
                let (line, col) = self.cursor.current_pos();
                self.errors.push(AxisError::lexical(
                    Span::new(line, col, self.cursor.pos()),
                    "inconsistent indentation",
                ));
            }
            if count > 0 {
                self.pending_dedents = count - 1;
                let (line, col) = self.cursor.current_pos();
                self.tokens.push(Token::new(TokenKind::Dedent, "", Span::new(line, col, self.cursor.pos())));
            }
        }
        true
    }

    fn finish(&mut self) {
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            let (line, col) = self.cursor.current_pos();
            self.tokens.push(Token::new(TokenKind::Dedent, "", Span::new(line, col, self.cursor.pos())));
        }
        let (line, col) = self.cursor.current_pos();
        self.tokens.push(Token::new(TokenKind::Eof, "", Span::new(line, col, self.cursor.pos())));
    }

    fn at_comment_start(&self) -> bool {
        self.cursor.peek() == Some('#')
            || (self.cursor.peek() == Some('/') && self.cursor.peek_next() == Some('/'))
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.cursor.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.cursor.advance();
        }
    }

    fn lex_newline(&mut self) {
        let (line, col) = self.cursor.current_pos();
        let off = self.cursor.pos();
        if self.cursor.peek() == Some('\r') {
            self.cursor.advance();
        }
        if self.cursor.peek() == Some('\n') {
            self.cursor.advance();
        }
        if self.paren_depth == 0 {
            self.tokens.push(Token::new(TokenKind::Newline, "\n", Span::new(line, col, off)));
        }
        self.at_line_start = true;
    }

    fn lex_token(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(' ') | Some('\t') => {
                    self.cursor.advance();
                }
                _ => break,
            }
        }

        let (start_line, start_col) = self.cursor.current_pos();
        let start_off = self.cursor.pos();
        let span = Span::new(start_line, start_col, start_off);

        let c = match self.cursor.peek() {
            Some(c) => c,
            None => return,
        };

        if c == '\n' || c == '\r' {
            self.lex_newline();
            return;
        }
        if self.at_comment_start() {
            self.skip_comment();
            return;
        }

        let result = match c {
            '"' => self.lex_string(span),
            '0'..='9' => self.lex_number(span),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(Some(self.lex_word(span))),
            _ => self.lex_operator(span),
        };

        match result {
            Ok(Some(tok)) => self.tokens.push(tok),
            Ok(None) => {}
            Err(e) => self.errors.push(e),
        }
    }

    fn lex_string(&mut self, span: Span) -> AxisResult<Option<Token>> {
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(AxisError::lexical(span, "unterminated string literal"));
                }
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    self.cursor.advance();
                    let esc = self.cursor.advance().ok_or_else(|| {
                        AxisError::lexical(span, "unterminated escape sequence")
                    })?;
                    let decoded = match esc {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        '\\' => '\\',
                        '"' => '"',
                        '0' => '\0',
                        other => {
                            return Err(AxisError::lexical(
                                span,
                                format!("invalid escape sequence '\\{other}'"),
                            ))
                        }
                    };
                    value.push(decoded);
                }
                Some(c) => {
                    self.cursor.advance();
                    value.push(c);
                }
            }
        }
        Ok(Some(Token::new(TokenKind::StringLiteral(value.clone()), value, span)))
    }

    fn lex_number(&mut self, span: Span) -> AxisResult<Option<Token>> {
        let mut lexeme = String::new();
        if self.cursor.peek() == Some('0') && matches!(self.cursor.peek_next(), Some('x') | Some('X')) {
            lexeme.push(self.cursor.advance().unwrap());
            lexeme.push(self.cursor.advance().unwrap());
            let mut digits = String::new();
            while let Some(c) = self.cursor.peek() {
                if c.is_ascii_hexdigit() {
                    digits.push(c);
                    lexeme.push(c);
                    self.cursor.advance();
                } else {
                    break;
                }
            }
            if digits.is_empty() {
                return Err(AxisError::lexical(span, "invalid hex literal"));
            }
            let value = i64::from_str_radix(&digits, 16)
                .map_err(|_| AxisError::lexical(span, "hex literal out of range"))?;
            return Ok(Some(Token::new(TokenKind::IntLiteral(value), lexeme, span)));
        }
        if self.cursor.peek() == Some('0') && matches!(self.cursor.peek_next(), Some('b') | Some('B')) {
            lexeme.push(self.cursor.advance().unwrap());
            lexeme.push(self.cursor.advance().unwrap());
            let mut digits = String::new();
            while let Some(c) = self.cursor.peek() {
                if c == '0' || c == '1' {
                    digits.push(c);
                    lexeme.push(c);
                    self.cursor.advance();
                } else {
                    break;
                }
            }
            if digits.is_empty() {
                return Err(AxisError::lexical(span, "invalid binary literal"));
            }
            let value = i64::from_str_radix(&digits, 2)
                .map_err(|_| AxisError::lexical(span, "binary literal out of range"))?;
            return Ok(Some(Token::new(TokenKind::IntLiteral(value), lexeme, span)));
        }

        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }
        let value: i64 = lexeme
            .parse()
            .map_err(|_| AxisError::lexical(span, "decimal literal out of range"))?;
        Ok(Some(Token::new(TokenKind::IntLiteral(value), lexeme, span)))
    }

    fn lex_word(&mut self, span: Span) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }
        if let Some(kind) = TokenKind::keyword_from_str(&lexeme) {
            Token::new(kind, lexeme, span)
        } else {
            Token::new(TokenKind::Identifier(lexeme.clone()), lexeme, span)
        }
    }

    fn lex_operator(&mut self, span: Span) -> AxisResult<Option<Token>> {
        let c = self.cursor.advance().unwrap();
        macro_rules! two_char {
            ($second:expr, $two:expr, $one:expr) => {{
                if self.cursor.peek() == Some($second) {
                    self.cursor.advance();
                    $two
                } else {
                    $one
                }
            }};
        }
        let kind = match c {
            '(' => {
                self.paren_depth += 1;
                TokenKind::LParen
            }
            ')' => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                TokenKind::RParen
            }
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '&' => TokenKind::Amp,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '-' => two_char!('>', TokenKind::Arrow, TokenKind::Minus),
            '=' => two_char!('=', TokenKind::EqEq, TokenKind::Eq),
            '!' => two_char!('=', TokenKind::NotEq, TokenKind::Bang),
            '<' => {
                if self.cursor.peek() == Some('<') {
                    self.cursor.advance();
                    TokenKind::Shl
                } else {
                    two_char!('=', TokenKind::LtEq, TokenKind::Lt)
                }
            }
            '>' => {
                if self.cursor.peek() == Some('>') {
                    self.cursor.advance();
                    TokenKind::Shr
                } else {
                    two_char!('=', TokenKind::GtEq, TokenKind::Gt)
                }
            }
            other => return Err(AxisError::lexical(span, format!("unexpected character '{other}'"))),
        };
        Ok(Some(Token::new(kind, c.to_string(), span)))
    }
}

#[cfg(test)]
mod tests;
