//! Type definitions for the executor
//!
//! This module contains all the core types used by the executor:
//! - AST nodes (Stmt, Expr, FunctionDef)
//! - Runtime values (Val)
//! - Control flow (Control, Frame, FrameKind)
//! - Execution phases for each statement type

pub mod ast;
pub mod control;
pub mod phase;
pub mod values;

// Re-export all types for convenient access
pub use ast::{BinaryOp, Expr, FunctionDef, Param, Span, Stmt};
pub use control::{Control, Frame, FrameKind};
pub use phase::*;
pub use values::Val;
