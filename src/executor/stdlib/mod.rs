//! Standard library function implementations
//!
//! This module contains all stdlib function implementations organized by category.

pub mod math;
pub mod ops;

use super::expressions::EvalResult;
use super::types::Val;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/* ===================== Standard Library Function Types ===================== */

/// Standard library function identifiers
///
/// Each variant represents a specific stdlib function.
/// These are serializable and can be stored in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StdlibFunc {
    // Operators (the parser lowers arithmetic and comparisons to these)
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Not,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    // Math
    MathFloor,
    MathCeil,
    MathRound,
    MathAbs,
    MathSqrt,
    MathSin,
    MathCos,
    MathMin,
    MathMax,
    MathClamp,
    MathLerp,
    // Constructors
    Vec2,
}

/// Operator built-in names, as emitted by the parser
pub const OPERATOR_NAMES: &[(&str, StdlibFunc)] = &[
    ("add", StdlibFunc::Add),
    ("sub", StdlibFunc::Sub),
    ("mul", StdlibFunc::Mul),
    ("div", StdlibFunc::Div),
    ("mod", StdlibFunc::Mod),
    ("neg", StdlibFunc::Neg),
    ("not", StdlibFunc::Not),
    ("eq", StdlibFunc::Eq),
    ("ne", StdlibFunc::Ne),
    ("lt", StdlibFunc::Lt),
    ("lte", StdlibFunc::Lte),
    ("gt", StdlibFunc::Gt),
    ("gte", StdlibFunc::Gte),
];

/// Global names injected by `inject_stdlib`
pub const GLOBAL_NAMES: &[&str] = &["Math", "Vec2"];

/// Look up an operator built-in by name
pub fn operator(name: &str) -> Option<StdlibFunc> {
    OPERATOR_NAMES
        .iter()
        .find(|(op, _)| *op == name)
        .map(|(_, func)| *func)
}

/* ===================== Stdlib Dispatcher ===================== */

/// Call a standard library function with arguments
///
/// This dispatcher routes to the appropriate function implementation
/// based on the StdlibFunc variant.
pub fn call_stdlib_func(func: &StdlibFunc, args: &[Val]) -> EvalResult {
    match func {
        StdlibFunc::Add => ops::add(args),
        StdlibFunc::Sub => ops::arith(args, "sub", |a, b| a - b),
        StdlibFunc::Mul => ops::arith(args, "mul", |a, b| a * b),
        StdlibFunc::Div => ops::arith(args, "div", |a, b| a / b),
        StdlibFunc::Mod => ops::arith(args, "mod", |a, b| a % b),
        StdlibFunc::Neg => ops::neg(args),
        StdlibFunc::Not => ops::not(args),
        StdlibFunc::Eq => ops::equals(args, true),
        StdlibFunc::Ne => ops::equals(args, false),
        StdlibFunc::Lt => ops::compare(args, "lt", |o| o.is_lt()),
        StdlibFunc::Lte => ops::compare(args, "lte", |o| o.is_le()),
        StdlibFunc::Gt => ops::compare(args, "gt", |o| o.is_gt()),
        StdlibFunc::Gte => ops::compare(args, "gte", |o| o.is_ge()),
        StdlibFunc::MathFloor => math::unary(args, "Math.floor", f64::floor),
        StdlibFunc::MathCeil => math::unary(args, "Math.ceil", f64::ceil),
        StdlibFunc::MathRound => math::unary(args, "Math.round", f64::round),
        StdlibFunc::MathAbs => math::unary(args, "Math.abs", f64::abs),
        StdlibFunc::MathSqrt => math::unary(args, "Math.sqrt", f64::sqrt),
        StdlibFunc::MathSin => math::unary(args, "Math.sin", f64::sin),
        StdlibFunc::MathCos => math::unary(args, "Math.cos", f64::cos),
        StdlibFunc::MathMin => math::min(args),
        StdlibFunc::MathMax => math::max(args),
        StdlibFunc::MathClamp => math::clamp(args),
        StdlibFunc::MathLerp => math::lerp(args),
        StdlibFunc::Vec2 => math::vec2(args),
    }
}

/* ===================== Environment Injection ===================== */

/// Inject standard library objects into the environment
///
/// This adds stdlib objects like Math to the global scope.
/// Called automatically by VM::new().
pub fn inject_stdlib(env: &mut HashMap<String, Val>) {
    let mut math_obj = HashMap::new();
    for (name, func) in [
        ("floor", StdlibFunc::MathFloor),
        ("ceil", StdlibFunc::MathCeil),
        ("round", StdlibFunc::MathRound),
        ("abs", StdlibFunc::MathAbs),
        ("sqrt", StdlibFunc::MathSqrt),
        ("sin", StdlibFunc::MathSin),
        ("cos", StdlibFunc::MathCos),
        ("min", StdlibFunc::MathMin),
        ("max", StdlibFunc::MathMax),
        ("clamp", StdlibFunc::MathClamp),
        ("lerp", StdlibFunc::MathLerp),
    ] {
        math_obj.insert(name.to_string(), Val::NativeFunc(func));
    }
    math_obj.insert("PI".to_string(), Val::Num(std::f64::consts::PI));

    env.insert("Math".to_string(), Val::Obj(math_obj));
    env.insert("Vec2".to_string(), Val::NativeFunc(StdlibFunc::Vec2));
}
