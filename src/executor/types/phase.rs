//! Execution phase enums for each statement type
//!
//! Each statement type has its own Phase enum that tracks which execution step
//! it's currently at. These are serialized as u8 for efficiency.

use serde::{Deserialize, Serialize};

/// Execution phase for a function call frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CallPhase {
    /// Push the function body
    Enter = 0,
    /// Body is running; reaching this phase again means it fell off the end
    Body = 1,
}

/// Execution phase for Block statements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockPhase {
    Execute = 0,
}

/// Execution phase for Declare statements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DeclarePhase {
    Eval = 0,
    /// Initializer is a script call; waiting for its return value
    AwaitCall = 1,
}

/// Execution phase for Assign statements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AssignPhase {
    Eval = 0,
    AwaitCall = 1,
}

/// Execution phase for Return statements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReturnPhase {
    Eval = 0,
    AwaitCall = 1,
}

/// Execution phase for Expr statements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExprPhase {
    /// Evaluate the expression
    Eval = 0,
    AwaitCall = 1,
}

/// Execution phase for If statements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum IfPhase {
    /// Evaluate the test and push the chosen branch
    Eval = 0,
    /// Branch finished
    Done = 1,
}

/// Execution phase for While statements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WhilePhase {
    /// Evaluate the test; the frame returns here after every iteration
    Test = 0,
}
