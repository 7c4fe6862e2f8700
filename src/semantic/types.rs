//! # Type Coercion Rules
//!
//! Only integer *literals* ever coerce to a different target integer type
//! (or to `bool`, if the literal is `0`/`1`). A named value — the result of
//! an identifier, call, or any non-literal expression — must already match
//! the type it's used in.

use crate::error::{AxisError, AxisResult, Span};
use crate::parser::ast::{BinOp, Expr, Type, UnOp};

fn is_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::IntLiteral(_, _))
}

/// Checks whether a value of type `actual`, produced by `expr`, may be used
/// where `expected` is required.
pub fn check_assignable(expected: Type, actual: Type, expr: &Expr, span: Span) -> AxisResult<()> {
    if expected == actual {
        return Ok(());
    }
    if is_literal(expr) {
        if let Expr::IntLiteral(v, _) = expr {
            return check_literal_fits(*v, expected, span);
        }
    }
    Err(AxisError::semantic(span, format!("expected type {expected}, found {actual}")))
}

fn check_literal_fits(value: i64, target: Type, span: Span) -> AxisResult<()> {
    let in_range = match target {
        Type::I8 => (i8::MIN as i64..=i8::MAX as i64).contains(&value),
        Type::U8 => (0..=u8::MAX as i64).contains(&value),
        Type::I16 => (i16::MIN as i64..=i16::MAX as i64).contains(&value),
        Type::U16 => (0..=u16::MAX as i64).contains(&value),
        Type::I32 => (i32::MIN as i64..=i32::MAX as i64).contains(&value),
        Type::U32 => (0..=u32::MAX as i64).contains(&value),
        Type::I64 | Type::U64 => true,
        Type::Bool => value == 0 || value == 1,
        Type::Str | Type::Ptr => false,
    };
    if in_range {
        Ok(())
    } else {
        Err(AxisError::semantic(span, format!("literal {value} does not fit in type {target}")))
    }
}

pub fn check_binary_op(op: BinOp, lt: Type, rt: Type, left: &Expr, right: &Expr, span: Span) -> AxisResult<Type> {
    if op == BinOp::Add && lt == Type::Str && rt == Type::Str {
        return Ok(Type::Str);
    }
    if lt == Type::Str || rt == Type::Str {
        return Err(AxisError::semantic(span, "strings only support '+' concatenation with another string"));
    }
    // Reconcile literal vs. named operand types the same way assignment does.
    let result_ty = if lt == rt {
        lt
    } else if is_literal(left) {
        check_literal_fits(int_literal_value(left), rt, span)?;
        rt
    } else if is_literal(right) {
        check_literal_fits(int_literal_value(right), lt, span)?;
        lt
    } else {
        return Err(AxisError::semantic(span, format!("mismatched operand types {lt} and {rt}")));
    };

    use BinOp::*;
    match op {
        Eq | Ne | Lt | Gt | Le | Ge => Ok(Type::Bool),
        _ => Ok(result_ty),
    }
}

fn int_literal_value(expr: &Expr) -> i64 {
    match expr {
        Expr::IntLiteral(v, _) => *v,
        _ => 0,
    }
}

pub fn check_unary_op(op: UnOp, ty: Type, span: Span) -> AxisResult<Type> {
    match op {
        UnOp::Neg => {
            if ty.is_integer() {
                Ok(ty)
            } else {
                Err(AxisError::semantic(span, format!("cannot negate a value of type {ty}")))
            }
        }
        UnOp::Not => {
            if ty == Type::Bool {
                Ok(Type::Bool)
            } else {
                Err(AxisError::semantic(span, format!("'!' requires a bool, found {ty}")))
            }
        }
    }
}
