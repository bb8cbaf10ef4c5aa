//! # Executor - Resumable Stack-Driven Interpreter
//!
//! ## Core Principles
//!
//! 1. **Stack-driven execution**: All state in `frames: Vec<Frame>`, no recursion
//!    between statements. A context can stop after any step and resume later.
//! 2. **Statement-level calls**: script-to-script calls push a call frame; the
//!    calling statement waits in its `AwaitCall` phase.
//! 3. **Centralized control flow**: `Control` manages break/continue/return/throw
//! 4. **Pure executor**: everything outside the frame stack goes through [`Host`]

pub mod errors;
pub mod exec_loop;
pub mod expressions;
pub mod host;
pub mod statements;
pub mod stdlib;
pub mod types;
pub mod vm;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use errors::ErrorInfo;
pub use exec_loop::{run_until_done, step};
pub use expressions::EvalResult;
pub use host::Host;
pub use types::{Control, Expr, FunctionDef, Stmt, Val};
pub use vm::{Step, VM};
