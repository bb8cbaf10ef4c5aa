//! Control flow and execution frame types

use super::super::errors::ErrorInfo;
use super::ast::Stmt;
use super::phase::{
    AssignPhase, BlockPhase, CallPhase, DeclarePhase, ExprPhase, IfPhase, ReturnPhase, WhilePhase,
};
use super::values::Val;
use serde::{Deserialize, Serialize};

/* ===================== Control Flow ===================== */

/// Control flow state
///
/// This represents active control flow (return, break, continue, throw).
/// When control != None, the VM unwinds the stack to find the appropriate handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Control {
    None,
    Break,
    Continue,
    Return(Val),
    /// Runtime fault; there is no catch, so it unwinds every frame
    Throw(ErrorInfo),
}

/* ===================== Frames ===================== */

/// Frame kind - the type and state of a statement being executed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum FrameKind {
    Call { phase: CallPhase, function: String },
    Block { phase: BlockPhase, idx: usize },
    Declare { phase: DeclarePhase },
    Assign { phase: AssignPhase },
    Return { phase: ReturnPhase },
    Expr { phase: ExprPhase },
    If { phase: IfPhase },
    While { phase: WhilePhase },
    Break,
    Continue,
}

/// Execution frame - one per active statement
///
/// The frame stack replaces the system call stack, which is what lets a
/// context stop in the middle of a function and pick up there later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// The kind and state of this frame
    #[serde(flatten)]
    pub kind: FrameKind,

    /// Number of scopes that existed when this frame was pushed.
    /// Popping the frame truncates the scope stack back to this length.
    pub scope_base: usize,

    /// The AST node (statement) this frame represents
    pub node: Stmt,
}
