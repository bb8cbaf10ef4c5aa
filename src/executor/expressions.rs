//! Expression evaluation
//!
//! Expressions never suspend and never enter another script function; both
//! happen only at statement boundaries. Evaluation is therefore a plain
//! recursive walk.

use super::errors::{self, ErrorInfo};
use super::host::Host;
use super::stdlib::{self, call_stdlib_func};
use super::types::{BinaryOp, Expr, Val};
use super::vm::VM;

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    /// Expression evaluated to a value
    Value { v: Val },
    /// Expression raised a fault
    Throw { error: ErrorInfo },
}

impl From<Result<Val, ErrorInfo>> for EvalResult {
    fn from(r: Result<Val, ErrorInfo>) -> Self {
        match r {
            Ok(v) => EvalResult::Value { v },
            Err(error) => EvalResult::Throw { error },
        }
    }
}

/// Evaluate an expression to a value
pub fn eval_expr(expr: &Expr, vm: &VM, host: &mut dyn Host) -> EvalResult {
    match expr {
        Expr::LitBool { v, .. } => EvalResult::Value { v: Val::Bool(*v) },
        Expr::LitNum { v, .. } => EvalResult::Value { v: Val::Num(*v) },
        Expr::LitStr { v, .. } => EvalResult::Value { v: Val::Str(v.clone()) },
        Expr::LitNull { .. } => EvalResult::Value { v: Val::Null },

        Expr::Ident { name, .. } => match vm.lookup(name) {
            Some(v) => EvalResult::Value { v: v.clone() },
            None => EvalResult::Throw {
                error: ErrorInfo::new(
                    errors::UNDEFINED_VARIABLE,
                    format!("Undefined variable '{}'", name),
                ),
            },
        },

        Expr::Member {
            object, property, ..
        } => eval_member(expr, object, property, vm, host),

        Expr::Call { callee, args, .. } => {
            let mut arg_vals = Vec::with_capacity(args.len());
            for arg in args {
                match eval_expr(arg, vm, host) {
                    EvalResult::Value { v } => arg_vals.push(v),
                    throw => return throw,
                }
            }
            eval_call(callee, arg_vals, vm, host)
        }

        Expr::BinaryOp {
            op, left, right, ..
        } => {
            let lhs = match eval_expr(left, vm, host) {
                EvalResult::Value { v } => v,
                throw => return throw,
            };
            // Short-circuit: the right side is only evaluated when it decides the result
            match (op, lhs.is_truthy()) {
                (BinaryOp::And, false) | (BinaryOp::Or, true) => EvalResult::Value { v: lhs },
                _ => eval_expr(right, vm, host),
            }
        }
    }
}

/// Split `a.b.c` into `("a", ["b", "c"])` when the chain is rooted at an identifier
pub fn member_path(expr: &Expr) -> Option<(&str, Vec<&str>)> {
    match expr {
        Expr::Ident { name, .. } => Some((name.as_str(), vec![])),
        Expr::Member {
            object, property, ..
        } => {
            let (root, mut path) = member_path(object)?;
            path.push(property.as_str());
            Some((root, path))
        }
        _ => None,
    }
}

fn eval_member(
    whole: &Expr,
    object: &Expr,
    property: &str,
    vm: &VM,
    host: &mut dyn Host,
) -> EvalResult {
    // Reads through the coroutine argument go to the host state in one lookup
    if let Some((root, path)) = member_path(whole) {
        if let Some(Val::StateRef) = vm.lookup(root) {
            return host.read_state(&path).into();
        }
    }

    let obj = match eval_expr(object, vm, host) {
        EvalResult::Value { v } => v,
        throw => return throw,
    };

    match obj {
        Val::Obj(map) => match map.get(property) {
            Some(v) => EvalResult::Value { v: v.clone() },
            None => EvalResult::Throw {
                error: ErrorInfo::new(
                    errors::PROPERTY_NOT_FOUND,
                    format!("Property '{}' not found", property),
                ),
            },
        },
        other => EvalResult::Throw {
            error: ErrorInfo::new(
                errors::TYPE_ERROR,
                format!(
                    "Cannot read property '{}' of {} value",
                    property,
                    other.type_name()
                ),
            ),
        },
    }
}

/// Resolve and invoke a call from inside an expression
///
/// Resolution order: operator built-ins, variables holding native functions,
/// script functions (rejected here), host functions.
fn eval_call(callee: &Expr, args: Vec<Val>, vm: &VM, host: &mut dyn Host) -> EvalResult {
    let name = match callee {
        Expr::Ident { name, .. } => name,
        other => {
            return match eval_expr(other, vm, host) {
                EvalResult::Value {
                    v: Val::NativeFunc(func),
                } => call_stdlib_func(&func, &args),
                EvalResult::Value { v } => not_callable(&v),
                throw => throw,
            }
        }
    };

    if let Some(op) = stdlib::operator(name) {
        return call_stdlib_func(&op, &args);
    }

    if let Some(v) = vm.lookup(name) {
        return match v {
            Val::NativeFunc(func) => call_stdlib_func(func, &args),
            other => not_callable(other),
        };
    }

    if host.function(name).is_some() {
        return EvalResult::Throw {
            error: ErrorInfo::new(
                errors::NESTED_SCRIPT_CALL,
                format!(
                    "Script function '{}' can only be called as a whole statement",
                    name
                ),
            ),
        };
    }

    match host.call_native(name, &args) {
        Some(result) => result.into(),
        None => EvalResult::Throw {
            error: ErrorInfo::new(
                errors::FUNCTION_NOT_FOUND,
                format!("Function '{}' not found", name),
            ),
        },
    }
}

fn not_callable(v: &Val) -> EvalResult {
    EvalResult::Throw {
        error: ErrorInfo::new(
            errors::TYPE_ERROR,
            format!("Value of type {} is not callable", v.type_name()),
        ),
    }
}
