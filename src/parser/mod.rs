//! # Parser
//!
//! Recursive-descent parser with one-token lookahead. Builds the AXIS AST
//! from the lexer's token stream.
//!
//! The binary-operator precedence chain (lowest to highest: bitwise-or,
//! xor, and, equality/comparison, shift, additive, multiplicative) is
//! generated by the [`macros::binary_level`] macro rather than hand-written
//! nine times over.

pub mod ast;
mod macros;

use crate::error::{AxisError, AxisResult, Span};
use crate::lexer::{Token, TokenKind};
pub use ast::*;
use macros::binary_level;

pub fn parse(tokens: Vec<Token>) -> AxisResult<Program> {
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> AxisResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(AxisError::syntactic(
                self.peek().span,
                format!("expected {what}, found '{}'", self.peek().lexeme_or_kind()),
            ))
        }
    }

    /// Skip any number of blank `Newline` tokens (e.g. between statements).
    fn skip_newlines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline) {
            self.advance();
        }
    }

    // ---- top level -----------------------------------------------------

    fn parse_program(&mut self) -> AxisResult<Program> {
        self.skip_newlines();
        let mode = self.parse_mode_decl()?;
        let mut functions = Vec::new();
        let mut statements = Vec::new();
        self.skip_newlines();
        while !matches!(self.peek_kind(), TokenKind::Eof) {
            if matches!(self.peek_kind(), TokenKind::KwFunc) {
                functions.push(self.parse_function()?);
            } else if mode == Mode::Script {
                statements.push(self.parse_stmt()?);
            } else {
                let tok = self.peek().clone();
                return Err(AxisError::syntactic(
                    tok.span,
                    format!(
                        "unexpected token '{}' in compile mode (only functions allowed)",
                        tok.lexeme_or_kind()
                    ),
                ));
            }
            self.skip_newlines();
        }
        if mode == Mode::Compile && !functions.iter().any(|f| f.name == "main") {
            return Err(AxisError::syntactic(
                self.peek().span,
                "compile mode requires a 'func main()' definition",
            ));
        }
        Ok(Program { mode, functions, statements })
    }

    fn parse_mode_decl(&mut self) -> AxisResult<Mode> {
        if matches!(self.peek_kind(), TokenKind::KwMode) {
            self.advance();
            let tok = self.expect(TokenKind::Identifier(String::new()), "'script' or 'compile'")?;
            let mode = match tok.lexeme.as_str() {
                "script" => Mode::Script,
                "compile" => Mode::Compile,
                other => {
                    return Err(AxisError::syntactic(
                        tok.span,
                        format!("unknown mode '{other}', expected 'script' or 'compile'"),
                    ))
                }
            };
            self.skip_newlines();
            Ok(mode)
        } else {
            // No pragma: default to compile mode, matching a freestanding AOT target.
            Ok(Mode::Compile)
        }
    }

    fn parse_type(&mut self) -> AxisResult<Type> {
        let tok = self.advance();
        let ty = match tok.kind {
            TokenKind::TyI8 => Type::I8,
            TokenKind::TyU8 => Type::U8,
            TokenKind::TyI16 => Type::I16,
            TokenKind::TyU16 => Type::U16,
            TokenKind::TyI32 => Type::I32,
            TokenKind::TyU32 => Type::U32,
            TokenKind::TyI64 => Type::I64,
            TokenKind::TyU64 => Type::U64,
            TokenKind::TyBool => Type::Bool,
            TokenKind::TyStr => Type::Str,
            TokenKind::TyPtr => Type::Ptr,
            _ => {
                return Err(AxisError::syntactic(tok.span, format!("expected a type, found '{}'", tok.lexeme)))
            }
        };
        Ok(ty)
    }

    fn parse_function(&mut self) -> AxisResult<Function> {
        let start = self.expect(TokenKind::KwFunc, "'func'")?.span;
        let name_tok = self.expect(TokenKind::Identifier(String::new()), "function name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RParen) {
            loop {
                let pname = self.expect(TokenKind::Identifier(String::new()), "parameter name")?;
                self.expect(TokenKind::Colon, "':'")?;
                let ty = self.parse_type()?;
                params.push(Param { name: pname.lexeme, ty, span: pname.span });
                if matches!(self.peek_kind(), TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Arrow, "'->'")?;
        let return_type = self.parse_type()?;
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_block()?;
        Ok(Function { name: name_tok.lexeme, params, return_type, body, span: start })
    }

    /// Parses `NEWLINE INDENT stmt+ DEDENT`.
    fn parse_block(&mut self) -> AxisResult<Block> {
        self.expect(TokenKind::Newline, "newline before an indented block")?;
        self.skip_newlines();
        self.expect(TokenKind::Indent, "an indented block")?;
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !matches!(self.peek_kind(), TokenKind::Dedent | TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        self.expect(TokenKind::Dedent, "end of indented block")?;
        Ok(stmts)
    }

    // ---- statements ------------------------------------------------------

    fn parse_stmt(&mut self) -> AxisResult<Stmt> {
        if let TokenKind::Identifier(_) = self.peek_kind() {
            if matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::Colon)) {
                return self.parse_vardecl();
            }
        }
        match self.peek_kind().clone() {
            TokenKind::KwGive => {
                let span = self.advance().span;
                let expr = if matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Ok(Stmt::Return(expr, span))
            }
            TokenKind::KwWhen => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwLoop | TokenKind::KwRepeat => self.parse_loop(),
            TokenKind::KwBreak => {
                let span = self.advance().span;
                Ok(Stmt::Break(span))
            }
            TokenKind::KwContinue => {
                let span = self.advance().span;
                Ok(Stmt::Continue(span))
            }
            TokenKind::KwWrite | TokenKind::KwWriteln => self.parse_write(),
            TokenKind::Identifier(_) => self.parse_assignment_or_expr_stmt(),
            _ => {
                let tok = self.peek().clone();
                Err(AxisError::syntactic(tok.span, format!("unexpected token '{}'", tok.lexeme)))
            }
        }
    }

    fn parse_vardecl(&mut self) -> AxisResult<Stmt> {
        let name_tok = self.expect(TokenKind::Identifier(String::new()), "variable name")?;
        let span = name_tok.span;
        self.expect(TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        let init = if matches!(self.peek_kind(), TokenKind::Eq) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Stmt::VarDecl { name: name_tok.lexeme, ty, init, span })
    }

    fn parse_assignment_or_expr_stmt(&mut self) -> AxisResult<Stmt> {
        let name_tok = self.advance();
        let name = match &name_tok.kind {
            TokenKind::Identifier(n) => n.clone(),
            _ => unreachable!(),
        };
        if matches!(self.peek_kind(), TokenKind::Eq) {
            self.advance();
            let expr = self.parse_expr()?;
            Ok(Stmt::Assignment { name, expr, span: name_tok.span })
        } else if matches!(self.peek_kind(), TokenKind::LParen) {
            let args = self.parse_call_args()?;
            Ok(Stmt::ExprStmt(Expr::Call { name, args, span: name_tok.span }, name_tok.span))
        } else {
            Err(AxisError::syntactic(
                self.peek().span,
                "expected '=' or '(' after identifier used as a statement",
            ))
        }
    }

    fn parse_if(&mut self) -> AxisResult<Stmt> {
        let span = self.expect(TokenKind::KwWhen, "'when'")?.span;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Colon, "':'")?;
        let then_branch = self.parse_block()?;
        self.skip_newlines();
        let else_branch = if matches!(self.peek_kind(), TokenKind::KwElse) {
            self.advance();
            if matches!(self.peek_kind(), TokenKind::KwWhen) {
                Some(vec![self.parse_if()?])
            } else {
                self.expect(TokenKind::Colon, "':'")?;
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If { cond, then_branch, else_branch, span })
    }

    fn parse_while(&mut self) -> AxisResult<Stmt> {
        let span = self.expect(TokenKind::KwWhile, "'while'")?.span;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body, span })
    }

    /// `loop:`/`repeat:` are sugar for an infinite `while True:` loop.
    fn parse_loop(&mut self) -> AxisResult<Stmt> {
        let span = self.advance().span; // 'loop' or 'repeat'
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_block()?;
        let cond = Expr::BoolLiteral(true, span);
        Ok(Stmt::While { cond, body, span })
    }

    fn parse_write(&mut self) -> AxisResult<Stmt> {
        let tok = self.advance(); // 'write' or 'writeln'
        let newline = matches!(tok.kind, TokenKind::KwWriteln);
        self.expect(TokenKind::LParen, "'('")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(Stmt::Write { value, newline, span: tok.span })
    }

    fn parse_call_args(&mut self) -> AxisResult<Vec<Expr>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if matches!(self.peek_kind(), TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    // ---- expressions -----------------------------------------------------

    fn parse_expr(&mut self) -> AxisResult<Expr> {
        self.parse_bitor()
    }

    binary_level!(parse_bitor, parse_bitxor, TokenKind::Pipe => BinOp::BitOr);
    binary_level!(parse_bitxor, parse_bitand, TokenKind::Caret => BinOp::BitXor);
    binary_level!(parse_bitand, parse_equality, TokenKind::Amp => BinOp::BitAnd);
    binary_level!(parse_equality, parse_comparison,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::NotEq => BinOp::Ne,
    );
    binary_level!(parse_comparison, parse_shift,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::LtEq => BinOp::Le,
        TokenKind::GtEq => BinOp::Ge,
    );
    binary_level!(parse_shift, parse_additive,
        TokenKind::Shl => BinOp::Shl,
        TokenKind::Shr => BinOp::Shr,
    );
    binary_level!(parse_additive, parse_multiplicative,
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
    );
    binary_level!(parse_multiplicative, parse_unary,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Percent => BinOp::Mod,
    );

    fn parse_unary(&mut self) -> AxisResult<Expr> {
        match self.peek_kind() {
            TokenKind::Minus => {
                let span = self.advance().span;
                let expr = self.parse_unary()?;
                Ok(Expr::UnaryOp { op: UnOp::Neg, expr: Box::new(expr), span })
            }
            TokenKind::Bang => {
                let span = self.advance().span;
                let expr = self.parse_unary()?;
                Ok(Expr::UnaryOp { op: UnOp::Not, expr: Box::new(expr), span })
            }
            TokenKind::Star => {
                let span = self.advance().span;
                let operand = self.parse_unary()?;
                Ok(Expr::Deref { operand: Box::new(operand), span })
            }
            _ => self.parse_primary(),
        }
    }

    /// `read`/`readln`/`readchar`/`read_failed` are always called with an
    /// empty argument list, e.g. `readln()`.
    fn expect_empty_read_parens(&mut self, name: &str) -> AxisResult<()> {
        self.expect(TokenKind::LParen, &format!("'(' after '{name}'"))?;
        self.expect(TokenKind::RParen, &format!("')' to close '{name}('"))?;
        Ok(())
    }

    fn parse_primary(&mut self) -> AxisResult<Expr> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::IntLiteral(v) => {
                self.advance();
                Ok(Expr::IntLiteral(v, tok.span))
            }
            TokenKind::StringLiteral(ref s) => {
                let s = s.clone();
                self.advance();
                Ok(Expr::StringLiteral(s, tok.span))
            }
            TokenKind::KwTrue => {
                self.advance();
                Ok(Expr::BoolLiteral(true, tok.span))
            }
            TokenKind::KwFalse => {
                self.advance();
                Ok(Expr::BoolLiteral(false, tok.span))
            }
            TokenKind::KwRead => {
                self.advance();
                self.expect_empty_read_parens("read")?;
                Ok(Expr::Read(tok.span))
            }
            TokenKind::KwReadln => {
                self.advance();
                self.expect_empty_read_parens("readln")?;
                Ok(Expr::Readln(tok.span))
            }
            TokenKind::KwReadchar => {
                self.advance();
                self.expect_empty_read_parens("readchar")?;
                Ok(Expr::Readchar(tok.span))
            }
            TokenKind::KwReadFailed => {
                self.advance();
                self.expect_empty_read_parens("read_failed")?;
                Ok(Expr::ReadFailed(tok.span))
            }
            TokenKind::Identifier(ref name) => {
                let name = name.clone();
                self.advance();
                if matches!(self.peek_kind(), TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call { name, args, span: tok.span })
                } else {
                    Ok(Expr::Identifier(name, tok.span))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            _ => Err(AxisError::syntactic(tok.span, format!("expected an expression, found '{}'", tok.lexeme))),
        }
    }
}

impl Token {
    fn lexeme_or_kind(&self) -> String {
        if self.lexeme.is_empty() {
            format!("{:?}", self.kind)
        } else {
            self.lexeme.clone()
        }
    }
}

#[cfg(test)]
mod tests;
