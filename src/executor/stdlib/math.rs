//! Math stdlib functions

use crate::executor::errors::{self, ErrorInfo};
use crate::executor::expressions::EvalResult;
use crate::executor::types::Val;
use std::collections::HashMap;

fn numbers(args: &[Val], count: usize, name: &str) -> Result<Vec<f64>, EvalResult> {
    if args.len() != count {
        return Err(EvalResult::Throw {
            error: ErrorInfo::new(
                errors::WRONG_ARG_COUNT,
                format!("{}() expects {} arguments, got {}", name, count, args.len()),
            ),
        });
    }
    args.iter()
        .enumerate()
        .map(|(i, arg)| match arg {
            Val::Num(n) => Ok(*n),
            other => Err(EvalResult::Throw {
                error: ErrorInfo::new(
                    errors::WRONG_ARG_TYPE,
                    format!(
                        "{}() argument {} must be a number, got {}",
                        name,
                        i + 1,
                        other.type_name()
                    ),
                ),
            }),
        })
        .collect()
}

/// Single-argument numeric function (floor, sin, ...)
pub fn unary(args: &[Val], name: &str, f: fn(f64) -> f64) -> EvalResult {
    match numbers(args, 1, name) {
        Ok(n) => EvalResult::Value { v: Val::Num(f(n[0])) },
        Err(e) => e,
    }
}

pub fn min(args: &[Val]) -> EvalResult {
    match numbers(args, 2, "Math.min") {
        Ok(n) => EvalResult::Value { v: Val::Num(n[0].min(n[1])) },
        Err(e) => e,
    }
}

pub fn max(args: &[Val]) -> EvalResult {
    match numbers(args, 2, "Math.max") {
        Ok(n) => EvalResult::Value { v: Val::Num(n[0].max(n[1])) },
        Err(e) => e,
    }
}

/// Math.clamp(x, lo, hi)
pub fn clamp(args: &[Val]) -> EvalResult {
    match numbers(args, 3, "Math.clamp") {
        Ok(n) if n[1] <= n[2] => EvalResult::Value { v: Val::Num(n[0].clamp(n[1], n[2])) },
        Ok(n) => EvalResult::Throw {
            error: ErrorInfo::new(
                errors::WRONG_ARG_TYPE,
                format!("Math.clamp() lower bound {} exceeds upper bound {}", n[1], n[2]),
            ),
        },
        Err(e) => e,
    }
}

/// Math.lerp(a, b, t)
pub fn lerp(args: &[Val]) -> EvalResult {
    match numbers(args, 3, "Math.lerp") {
        Ok(n) => EvalResult::Value {
            v: Val::Num(n[0] + (n[1] - n[0]) * n[2]),
        },
        Err(e) => e,
    }
}

/// Vec2(x, y) - builds an `{x, y}` object
pub fn vec2(args: &[Val]) -> EvalResult {
    match numbers(args, 2, "Vec2") {
        Ok(n) => {
            let mut obj = HashMap::new();
            obj.insert("x".to_string(), Val::Num(n[0]));
            obj.insert("y".to_string(), Val::Num(n[1]));
            EvalResult::Value { v: Val::Obj(obj) }
        }
        Err(e) => e,
    }
}
