//! # Tree-Walking Interpreter
//!
//! Executes script-mode programs directly from the AST, without going
//! through the encoder or ELF writer. Used both as a quick way to run a
//! `mode script` source file and, during development, as a differential
//! oracle against the compiled backend.
//!
//! Grounded in `interpreter.py`'s `Interpreter`, including its MVP
//! limitations, carried forward verbatim: no function parameters in script
//! mode (the depth check happens before any argument handling so the error
//! fires even for the no-op case of a zero-arg call to a function that
//! itself declares parameters), a call-depth limit of 1000, and a flat
//! variable namespace that is saved and restored around each call rather
//! than lexically scoped.
//!
//! `run` registers every `func` definition, then executes the program's
//! bare top-level statements directly as the entry point — there is no
//! requirement that a function named `main` exist, matching the
//! reference's own `Interpreter.run`.

use crate::error::{AxisError, AxisResult, Span};
use crate::parser::ast::*;
use std::collections::HashMap;
use std::io::Read as _;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
        }
    }

    fn as_int(&self, span: Span) -> AxisResult<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(*b as i64),
            Value::Str(_) => Err(AxisError::runtime(format!("{span}: expected a number, found a string"))),
        }
    }

    fn display(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Value::Str(s) => s.clone(),
        }
    }
}

/// Non-local control flow produced by executing a statement, the Rust
/// stand-in for the reference's `BreakException`/`ContinueException`/
/// `ReturnException`.
enum Signal {
    None,
    Break,
    Continue,
    Return(Option<Value>),
}

struct InterpreterState<'a> {
    variables: HashMap<String, Value>,
    functions: HashMap<String, &'a Function>,
    call_depth: usize,
    max_call_depth: usize,
    read_failed: bool,
}

const MAX_CALL_DEPTH: usize = 1000;

pub fn run(program: &Program) -> AxisResult<i32> {
    if program.mode != Mode::Script {
        return Err(AxisError::runtime("the interpreter only runs 'mode script' programs"));
    }

    let mut state = InterpreterState {
        variables: HashMap::new(),
        functions: program.functions.iter().map(|f| (f.name.clone(), f)).collect(),
        call_depth: 0,
        max_call_depth: MAX_CALL_DEPTH,
        read_failed: false,
    };

    match execute_block(&mut state, &program.statements)? {
        Signal::Return(Some(Value::Int(code))) => Ok(code as i32),
        _ => Ok(0),
    }
}

fn execute_block(state: &mut InterpreterState, block: &Block) -> AxisResult<Signal> {
    for stmt in block {
        match execute_stmt(state, stmt)? {
            Signal::None => continue,
            other => return Ok(other),
        }
    }
    Ok(Signal::None)
}

fn execute_stmt(state: &mut InterpreterState, stmt: &Stmt) -> AxisResult<Signal> {
    match stmt {
        Stmt::VarDecl { name, init, .. } => {
            let value = match init {
                Some(e) => evaluate(state, e)?,
                None => Value::Int(0),
            };
            state.variables.insert(name.clone(), value);
            Ok(Signal::None)
        }
        Stmt::Assignment { name, expr, span } => {
            let value = evaluate(state, expr)?;
            if !state.variables.contains_key(name) {
                return Err(AxisError::runtime(format!("{span}: undefined variable '{name}'")));
            }
            state.variables.insert(name.clone(), value);
            Ok(Signal::None)
        }
        Stmt::If { cond, then_branch, else_branch, .. } => {
            if evaluate(state, cond)?.truthy() {
                execute_block(state, then_branch)
            } else if let Some(els) = else_branch {
                execute_block(state, els)
            } else {
                Ok(Signal::None)
            }
        }
        Stmt::While { cond, body, .. } => {
            while evaluate(state, cond)?.truthy() {
                match execute_block(state, body)? {
                    Signal::Break => break,
                    Signal::Continue | Signal::None => continue,
                    ret @ Signal::Return(_) => return Ok(ret),
                }
            }
            Ok(Signal::None)
        }
        Stmt::Break(_) => Ok(Signal::Break),
        Stmt::Continue(_) => Ok(Signal::Continue),
        Stmt::Return(expr, _) => {
            let value = match expr {
                Some(e) => Some(evaluate(state, e)?),
                None => None,
            };
            Ok(Signal::Return(value))
        }
        Stmt::Write { value, newline, .. } => {
            let value = evaluate(state, value)?;
            if *newline {
                println!("{}", value.display());
            } else {
                print!("{}", value.display());
            }
            Ok(Signal::None)
        }
        Stmt::ExprStmt(expr, _) => {
            evaluate(state, expr)?;
            Ok(Signal::None)
        }
    }
}

fn evaluate(state: &mut InterpreterState, expr: &Expr) -> AxisResult<Value> {
    match expr {
        Expr::IntLiteral(v, _) => Ok(Value::Int(*v)),
        Expr::BoolLiteral(b, _) => Ok(Value::Bool(*b)),
        Expr::StringLiteral(s, _) => Ok(Value::Str(s.clone())),
        Expr::Identifier(name, span) => state
            .variables
            .get(name)
            .cloned()
            .ok_or_else(|| AxisError::runtime(format!("{span}: undefined variable '{name}'"))),
        Expr::BinaryOp { op, left, right, span } => {
            let l = evaluate(state, left)?;
            let r = evaluate(state, right)?;
            evaluate_binary(*op, l, r, *span)
        }
        Expr::UnaryOp { op, expr, span } => {
            let v = evaluate(state, expr)?;
            evaluate_unary(*op, v, *span)
        }
        Expr::Call { name, args, span } => evaluate_call(state, name, args, *span),
        Expr::Read(_) => Ok(Value::Str(evaluate_read(state))),
        Expr::Readln(_) => Ok(Value::Str(evaluate_readln(state))),
        Expr::Readchar(_) => Ok(Value::Int(evaluate_readchar(state) as i64)),
        Expr::ReadFailed(_) => Ok(Value::Bool(state.read_failed)),
    }
}

fn evaluate_binary(op: BinOp, left: Value, right: Value, span: Span) -> AxisResult<Value> {
    if op == BinOp::Add {
        if let (Value::Str(l), Value::Str(r)) = (&left, &right) {
            return Ok(Value::Str(format!("{l}{r}")));
        }
    }

    use BinOp::*;
    match op {
        Eq => return Ok(Value::Bool(left == right)),
        Ne => return Ok(Value::Bool(left != right)),
        _ => {}
    }

    let l = left.as_int(span)?;
    let r = right.as_int(span)?;
    match op {
        Add => Ok(Value::Int(l + r)),
        Sub => Ok(Value::Int(l - r)),
        Mul => Ok(Value::Int(l * r)),
        Div => {
            if r == 0 {
                return Err(AxisError::runtime(format!("{span}: division by zero")));
            }
            Ok(Value::Int(floor_div(l, r)))
        }
        Mod => {
            if r == 0 {
                return Err(AxisError::runtime(format!("{span}: modulo by zero")));
            }
            Ok(Value::Int(l - floor_div(l, r) * r))
        }
        BitAnd => Ok(Value::Int(l & r)),
        BitOr => Ok(Value::Int(l | r)),
        BitXor => Ok(Value::Int(l ^ r)),
        Shl => Ok(Value::Int(l << r)),
        Shr => Ok(Value::Int(l >> r)),
        Lt => Ok(Value::Bool(l < r)),
        Gt => Ok(Value::Bool(l > r)),
        Le => Ok(Value::Bool(l <= r)),
        Ge => Ok(Value::Bool(l >= r)),
        Eq | Ne => unreachable!("handled above"),
    }
}

/// Integer division that rounds toward negative infinity, matching Python's
/// `//` (the reference's `left // right`).
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn evaluate_unary(op: UnOp, value: Value, span: Span) -> AxisResult<Value> {
    match op {
        UnOp::Neg => Ok(Value::Int(-value.as_int(span)?)),
        UnOp::Not => Ok(Value::Bool(!value.truthy())),
    }
}

fn evaluate_call(state: &mut InterpreterState, name: &str, args: &[Expr], span: Span) -> AxisResult<Value> {
    let func = *state
        .functions
        .get(name)
        .ok_or_else(|| AxisError::runtime(format!("{span}: undefined function '{name}'")))?;

    if state.call_depth >= state.max_call_depth {
        return Err(AxisError::runtime(format!("{span}: stack overflow in script mode")));
    }

    if !args.is_empty() || !func.params.is_empty() {
        return Err(AxisError::runtime(format!(
            "{span}: function parameters are not supported in script mode"
        )));
    }

    let saved_vars = state.variables.clone();
    state.call_depth += 1;
    let result = execute_block(state, &func.body);
    state.variables = saved_vars;
    state.call_depth -= 1;

    match result? {
        Signal::Return(Some(v)) => Ok(v),
        _ => Ok(Value::Int(0)),
    }
}

fn evaluate_read(state: &mut InterpreterState) -> String {
    let mut buf = String::new();
    match std::io::stdin().read_to_string(&mut buf) {
        Ok(_) => {
            state.read_failed = buf.is_empty();
            buf
        }
        Err(_) => {
            state.read_failed = true;
            String::new()
        }
    }
}

fn evaluate_readln(state: &mut InterpreterState) -> String {
    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => {
            state.read_failed = true;
            String::new()
        }
        Ok(_) => {
            state.read_failed = false;
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            line
        }
        Err(_) => {
            state.read_failed = true;
            String::new()
        }
    }
}

fn evaluate_readchar(state: &mut InterpreterState) -> i32 {
    let mut byte = [0u8; 1];
    match std::io::stdin().read(&mut byte) {
        Ok(1) => {
            state.read_failed = false;
            byte[0] as i32
        }
        _ => {
            state.read_failed = true;
            -1
        }
    }
}

#[cfg(test)]
mod tests;
