//! Host functions every engine registers

use super::active;
use super::NativeFn;
use crate::executor::errors::{self, ErrorInfo};
use crate::executor::Val;
use std::rc::Rc;
use tracing::info;

/// Bindings installed by `Engine::new`
pub(super) fn builtin_bindings() -> Vec<(&'static str, NativeFn)> {
    vec![
        ("Yield", Rc::new(script_yield) as NativeFn),
        ("Print", Rc::new(print) as NativeFn),
    ]
}

/// `Yield()`: suspend the calling context after the current statement
fn script_yield(args: &[Val]) -> Result<Val, ErrorInfo> {
    if !args.is_empty() {
        return Err(ErrorInfo::new(
            errors::WRONG_ARG_COUNT,
            format!("Yield expects 0 arguments, got {}", args.len()),
        ));
    }
    active::suspend_active();
    Ok(Val::Null)
}

/// `Print(...)`: log the arguments, space separated
fn print(args: &[Val]) -> Result<Val, ErrorInfo> {
    let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    info!(context = ?active::active_context_id(), "{}", line);
    Ok(Val::Null)
}
