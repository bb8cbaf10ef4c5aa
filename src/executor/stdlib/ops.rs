//! Operator built-ins
//!
//! The parser lowers `a + b` to `add(a, b)`, `a < b` to `lt(a, b)` and so on.

use crate::executor::errors::{self, ErrorInfo};
use crate::executor::expressions::EvalResult;
use crate::executor::types::Val;
use std::cmp::Ordering;

fn throw(code: &str, message: impl Into<String>) -> EvalResult {
    EvalResult::Throw {
        error: ErrorInfo::new(code, message),
    }
}

fn expect_args<'a>(args: &'a [Val], count: usize, name: &str) -> Result<&'a [Val], EvalResult> {
    if args.len() != count {
        return Err(throw(
            errors::WRONG_ARG_COUNT,
            format!("{}() expects {} arguments, got {}", name, count, args.len()),
        ));
    }
    Ok(args)
}

/// `add` - numeric addition, or string concatenation when either side is a string
pub fn add(args: &[Val]) -> EvalResult {
    let args = match expect_args(args, 2, "add") {
        Ok(args) => args,
        Err(e) => return e,
    };
    match (&args[0], &args[1]) {
        (Val::Num(a), Val::Num(b)) => EvalResult::Value { v: Val::Num(a + b) },
        (Val::Str(_), _) | (_, Val::Str(_)) => EvalResult::Value {
            v: Val::Str(format!("{}{}", args[0], args[1])),
        },
        (a, b) => throw(
            errors::TYPE_ERROR,
            format!("Cannot add {} and {}", a.type_name(), b.type_name()),
        ),
    }
}

/// Binary numeric operator
pub fn arith(args: &[Val], name: &str, op: fn(f64, f64) -> f64) -> EvalResult {
    let args = match expect_args(args, 2, name) {
        Ok(args) => args,
        Err(e) => return e,
    };
    match (&args[0], &args[1]) {
        (Val::Num(a), Val::Num(b)) => EvalResult::Value { v: Val::Num(op(*a, *b)) },
        (a, b) => throw(
            errors::TYPE_ERROR,
            format!(
                "Operator '{}' expects numbers, got {} and {}",
                name,
                a.type_name(),
                b.type_name()
            ),
        ),
    }
}

pub fn neg(args: &[Val]) -> EvalResult {
    let args = match expect_args(args, 1, "neg") {
        Ok(args) => args,
        Err(e) => return e,
    };
    match &args[0] {
        Val::Num(n) => EvalResult::Value { v: Val::Num(-n) },
        other => throw(
            errors::TYPE_ERROR,
            format!("Cannot negate {}", other.type_name()),
        ),
    }
}

pub fn not(args: &[Val]) -> EvalResult {
    let args = match expect_args(args, 1, "not") {
        Ok(args) => args,
        Err(e) => return e,
    };
    EvalResult::Value {
        v: Val::Bool(!args[0].is_truthy()),
    }
}

/// `eq` / `ne` - structural equality
pub fn equals(args: &[Val], expect_equal: bool) -> EvalResult {
    let name = if expect_equal { "eq" } else { "ne" };
    let args = match expect_args(args, 2, name) {
        Ok(args) => args,
        Err(e) => return e,
    };
    EvalResult::Value {
        v: Val::Bool((args[0] == args[1]) == expect_equal),
    }
}

/// Ordering comparison between two numbers or two strings
pub fn compare(args: &[Val], name: &str, accept: fn(Ordering) -> bool) -> EvalResult {
    let args = match expect_args(args, 2, name) {
        Ok(args) => args,
        Err(e) => return e,
    };
    let ordering = match (&args[0], &args[1]) {
        (Val::Num(a), Val::Num(b)) => a.partial_cmp(b),
        (Val::Str(a), Val::Str(b)) => Some(a.cmp(b)),
        (a, b) => {
            return throw(
                errors::TYPE_ERROR,
                format!(
                    "Cannot compare {} with {}",
                    a.type_name(),
                    b.type_name()
                ),
            )
        }
    };
    // NaN never compares
    EvalResult::Value {
        v: Val::Bool(ordering.map(accept).unwrap_or(false)),
    }
}
