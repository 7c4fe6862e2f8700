//! # Semantic Analyzer
//!
//! Two-pass analysis over the parsed AST:
//!
//! 1. Collect every function's signature, rejecting duplicate names.
//! 2. Walk each function body, resolving identifiers against a flat
//!    per-function symbol table, inferring/coercing literal-only integer
//!    types, and computing the function's stack frame layout.
//!
//! Only integer *literals* ever coerce to a target type; a named value
//! (an identifier or the result of an expression) must already match the
//! type it's used in, or analysis fails with a semantic error.

pub mod scope;
pub mod types;

use crate::error::{AxisError, AxisResult, Span};
use crate::parser::ast::*;
use scope::{FunctionSig, Symbol, SymbolTable};

pub struct AnalyzedProgram {
    pub program: Program,
    pub functions: Vec<FunctionInfo>,
}

pub struct FunctionInfo {
    pub name: String,
    pub symbols: SymbolTable,
    pub frame_size: usize,
}

pub fn analyze(program: Program) -> AxisResult<AnalyzedProgram> {
    let mut analyzer = Analyzer::new();
    analyzer.pass1(&program)?;
    let mut infos = Vec::new();
    for f in &program.functions {
        infos.push(analyzer.pass2(f)?);
    }
    Ok(AnalyzedProgram { program, functions: infos })
}

struct Analyzer {
    signatures: Vec<FunctionSig>,
}

impl Analyzer {
    fn new() -> Self {
        Self { signatures: Vec::new() }
    }

    fn lookup_sig(&self, name: &str) -> Option<&FunctionSig> {
        self.signatures.iter().find(|s| s.name == name)
    }

    fn pass1(&mut self, program: &Program) -> AxisResult<()> {
        for f in &program.functions {
            if self.lookup_sig(&f.name).is_some() {
                return Err(AxisError::duplicate_function(f.span, &f.name));
            }
            self.signatures.push(FunctionSig {
                name: f.name.clone(),
                params: f.params.iter().map(|p| p.ty).collect(),
                return_type: f.return_type,
            });
        }
        Ok(())
    }

    fn pass2(&self, f: &Function) -> AxisResult<FunctionInfo> {
        let mut symbols = SymbolTable::new();
        let mut offset = 0usize;

        for p in &f.params {
            if symbols.lookup(&p.name).is_some() {
                return Err(AxisError::semantic(p.span, format!("duplicate parameter '{}'", p.name)));
            }
            offset = alloc_slot(&mut symbols, &p.name, p.ty, offset, true);
        }

        let mut ctx = FnCtx { analyzer: self, symbols: &mut symbols, offset, return_type: f.return_type };
        ctx.check_block(&f.body)?;
        let offset = ctx.offset;

        let frame_size = round_up(offset, 16);
        Ok(FunctionInfo { name: f.name.clone(), symbols, frame_size })
    }
}

fn alloc_slot(symbols: &mut SymbolTable, name: &str, ty: Type, offset: usize, is_param: bool) -> usize {
    let alignment = ty.size().min(8);
    let mut running = offset;
    if alignment > 0 {
        running = round_up(running, alignment);
    }
    running += ty.size();
    symbols.insert(Symbol { name: name.to_string(), ty, stack_offset: -(running as i64), is_param });
    running
}

fn round_up(value: usize, to: usize) -> usize {
    if to == 0 {
        return value;
    }
    (value + to - 1) / to * to
}

struct FnCtx<'a> {
    analyzer: &'a Analyzer,
    symbols: &'a mut SymbolTable,
    offset: usize,
    return_type: Type,
}

impl<'a> FnCtx<'a> {
    fn check_block(&mut self, block: &Block) -> AxisResult<()> {
        for stmt in block {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> AxisResult<()> {
        match stmt {
            Stmt::VarDecl { name, ty, init, span } => {
                if let Some(expr) = init {
                    let actual = self.check_read_or_expr(expr, *ty)?;
                    types::check_assignable(*ty, actual, expr, *span)?;
                }
                if self.symbols.lookup(name).is_some() {
                    return Err(AxisError::semantic(*span, format!("duplicate variable '{name}'")));
                }
                self.offset = alloc_slot(self.symbols, name, *ty, self.offset, false);
                Ok(())
            }
            Stmt::Assignment { name, expr, span } => {
                let sym = self
                    .symbols
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| AxisError::undefined_symbol(*span, name))?;
                let actual = self.check_read_or_expr(expr, sym.ty)?;
                types::check_assignable(sym.ty, actual, expr, *span)?;
                Ok(())
            }
            Stmt::If { cond, then_branch, else_branch, span } => {
                self.check_condition(cond, *span)?;
                self.check_block(then_branch)?;
                if let Some(els) = else_branch {
                    self.check_block(els)?;
                }
                Ok(())
            }
            Stmt::While { cond, body, span } => {
                self.check_condition(cond, *span)?;
                self.check_block(body)
            }
            Stmt::Break(_) | Stmt::Continue(_) => Ok(()),
            Stmt::Return(expr, span) => {
                if let Some(e) = expr {
                    let actual = self.check_expr(e)?;
                    types::check_assignable(self.return_type, actual, e, *span)?;
                }
                Ok(())
            }
            Stmt::Write { value, .. } => {
                self.check_expr(value)?;
                Ok(())
            }
            Stmt::ExprStmt(expr, _) => {
                self.check_expr(expr)?;
                Ok(())
            }
        }
    }

    fn check_condition(&mut self, cond: &Expr, span: Span) -> AxisResult<()> {
        let ty = self.check_expr(cond)?;
        if ty != Type::Bool {
            return Err(AxisError::semantic(span, format!("condition must be bool, found {ty}")));
        }
        Ok(())
    }

    /// `read()`/`readln()`/`readchar()` are typed from the declaration or
    /// assignment target rather than in isolation; every other expression
    /// still goes through the ordinary [`Self::check_expr`].
    fn check_read_or_expr(&mut self, expr: &Expr, target: Type) -> AxisResult<Type> {
        match expr {
            Expr::Read(span) | Expr::Readln(span) => {
                if !target.is_integer() && target != Type::Str {
                    let name = if matches!(expr, Expr::Read(_)) { "read()" } else { "readln()" };
                    return Err(AxisError::semantic(
                        *span,
                        format!("{name} can only be assigned to integer or str types, not {target}"),
                    ));
                }
                Ok(target)
            }
            Expr::Readchar(span) => {
                if target == Type::Str {
                    return Err(AxisError::semantic(
                        *span,
                        "readchar() cannot be assigned to str type - use read() or readln() instead",
                    ));
                }
                Ok(Type::I32)
            }
            _ => self.check_expr(expr),
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> AxisResult<Type> {
        match expr {
            Expr::IntLiteral(_, _) => Ok(Type::I32),
            Expr::BoolLiteral(_, _) => Ok(Type::Bool),
            Expr::StringLiteral(_, _) => Ok(Type::Str),
            Expr::Identifier(name, span) => self
                .symbols
                .lookup(name)
                .map(|s| s.ty)
                .ok_or_else(|| AxisError::undefined_symbol(*span, name)),
            Expr::BinaryOp { op, left, right, span } => {
                let lt = self.check_expr(left)?;
                let rt = self.check_expr(right)?;
                types::check_binary_op(*op, lt, rt, left, right, *span)
            }
            Expr::UnaryOp { op, expr, span } => {
                let ty = self.check_expr(expr)?;
                types::check_unary_op(*op, ty, *span)
            }
            Expr::Call { name, args, span } => {
                let sig = self
                    .analyzer
                    .lookup_sig(name)
                    .ok_or_else(|| AxisError::undefined_symbol(*span, name))?;
                if args.len() > 6 {
                    return Err(AxisError::semantic(
                        *span,
                        format!("call to '{name}' passes {} arguments, at most 6 are supported", args.len()),
                    ));
                }
                if args.len() != sig.params.len() {
                    return Err(AxisError::semantic(
                        *span,
                        format!(
                            "'{name}' expects {} argument(s), found {}",
                            sig.params.len(),
                            args.len()
                        ),
                    ));
                }
                let param_types = sig.params.clone();
                let return_type = sig.return_type;
                for (arg, expected) in args.iter().zip(param_types.iter()) {
                    let actual = self.check_expr(arg)?;
                    types::check_assignable(*expected, actual, arg, *span)?;
                }
                Ok(return_type)
            }
            Expr::Deref { operand, span } => {
                let operand_ty = self.check_expr(operand)?;
                if operand_ty != Type::Ptr {
                    return Err(AxisError::semantic(
                        *span,
                        format!("cannot dereference non-pointer type: {operand_ty}"),
                    ));
                }
                Err(AxisError::semantic(*span, "pointer dereferencing not yet implemented (need typed pointers)"))
            }
            // Outside of a declaration/assignment target these default to `str`
            // (`read()`/`readln()`) or `i32` (`readchar()`), matching a bare target.
            Expr::Read(_) | Expr::Readln(_) => Ok(Type::Str),
            Expr::Readchar(_) => Ok(Type::I32),
            Expr::ReadFailed(_) => Ok(Type::Bool),
        }
    }
}

#[cfg(test)]
mod tests;
