//! Validation Rules
//!
//! Each file in this module contains one validation rule.
//!
//! - `undefined_variable.rs` - Variables used before declaration
//! - `unused_variable.rs` - Variables declared but never used
//! - `nested_call.rs` - Script function calls nested inside other expressions
//! - `break_outside_loop.rs` - Loop control with no enclosing loop
//! - `duplicate_function.rs` - Two functions with one name
//! - `reserved_name.rs` - Functions shadowing built-ins

mod break_outside_loop;
mod duplicate_function;
mod nested_call;
mod reserved_name;
mod undefined_variable;
mod unused_variable;

pub use break_outside_loop::BreakOutsideLoopRule;
pub use duplicate_function::DuplicateFunctionRule;
pub use nested_call::NestedCallRule;
pub use reserved_name::ReservedNameRule;
pub use undefined_variable::UndefinedVariableRule;
pub use unused_variable::UnusedVariableRule;
