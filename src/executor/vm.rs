//! Virtual Machine state
//!
//! The VM holds all execution state:
//! - frames: Stack of active statements
//! - scopes: Variable scopes (blocks and function boundaries)
//! - control: Current control flow state (return, break, etc.)

use super::errors::{self, ErrorInfo};
use super::stdlib;
use super::types::{
    BlockPhase, CallPhase, Control, DeclarePhase, AssignPhase, ExprPhase, Frame, FrameKind,
    FunctionDef, IfPhase, ReturnPhase, Stmt, Val, WhilePhase,
};
use std::collections::HashMap;

/* ===================== VM ===================== */

/// One variable scope
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub vars: HashMap<String, Val>,
    /// Function scopes stop the lookup; callers' locals are not visible
    pub boundary: bool,
}

/// Virtual Machine state
///
/// This contains everything needed to execute (and suspend/resume) one
/// function invocation.
#[derive(Debug)]
pub struct VM {
    /// Stack of execution frames
    pub frames: Vec<Frame>,

    /// Stack of variable scopes
    pub scopes: Vec<Scope>,

    /// Stdlib objects visible from every function (Math, Vec2)
    pub globals: HashMap<String, Val>,

    /// Current control flow state
    pub control: Control,

    /// Value handed from a finished call frame to the statement that made the call
    pub returned: Option<Val>,
}

impl VM {
    /// Create a new VM that will run `function` with `args`
    ///
    /// The function is wrapped in a root call frame; nothing runs until `step()`.
    pub fn new(function: &FunctionDef, args: Vec<Val>) -> Result<Self, ErrorInfo> {
        let mut globals = HashMap::new();
        stdlib::inject_stdlib(&mut globals);

        let mut vm = VM {
            frames: vec![],
            scopes: vec![],
            globals,
            control: Control::None,
            returned: None,
        };

        push_call(&mut vm, function, args)?;

        Ok(vm)
    }

    /// True once the root frame is gone
    pub fn is_done(&self) -> bool {
        self.frames.is_empty()
    }

    /// Look up a variable, innermost scope first, stopping at the function boundary
    pub fn lookup(&self, name: &str) -> Option<&Val> {
        for scope in self.scopes.iter().rev() {
            if let Some(v) = scope.vars.get(name) {
                return Some(v);
            }
            if scope.boundary {
                break;
            }
        }
        self.globals.get(name)
    }

    /// Mutable lookup; globals are not assignable
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Val> {
        for scope in self.scopes.iter_mut().rev() {
            if scope.vars.contains_key(name) {
                return scope.vars.get_mut(name);
            }
            if scope.boundary {
                break;
            }
        }
        None
    }

    /// Bind a variable in the innermost scope
    pub fn declare(&mut self, name: &str, value: Val) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.vars.insert(name.to_string(), value);
        }
    }

    /// Replace the kind of the top frame (phase transitions)
    pub fn set_top_kind(&mut self, kind: FrameKind) {
        if let Some(frame) = self.frames.last_mut() {
            frame.kind = kind;
        }
    }
}

/* ===================== Frame Management ===================== */

/// Push a new frame for a statement onto the stack
///
/// This determines the initial phase based on the statement type.
/// Blocks open a new scope.
pub fn push_stmt(vm: &mut VM, stmt: &Stmt) {
    let base = vm.scopes.len();

    let kind = match stmt {
        Stmt::Block { .. } => {
            vm.scopes.push(Scope::default());
            FrameKind::Block {
                phase: BlockPhase::Execute,
                idx: 0,
            }
        }
        Stmt::Declare { .. } => FrameKind::Declare {
            phase: DeclarePhase::Eval,
        },
        Stmt::Assign { .. } => FrameKind::Assign {
            phase: AssignPhase::Eval,
        },
        Stmt::If { .. } => FrameKind::If {
            phase: IfPhase::Eval,
        },
        Stmt::While { .. } => FrameKind::While {
            phase: WhilePhase::Test,
        },
        Stmt::Return { .. } => FrameKind::Return {
            phase: ReturnPhase::Eval,
        },
        Stmt::Expr { .. } => FrameKind::Expr {
            phase: ExprPhase::Eval,
        },
        Stmt::Break { .. } => FrameKind::Break,
        Stmt::Continue { .. } => FrameKind::Continue,
    };

    vm.frames.push(Frame {
        kind,
        scope_base: base,
        node: stmt.clone(),
    });
}

/// Push a call frame for a script function, binding its parameters
pub fn push_call(vm: &mut VM, function: &FunctionDef, args: Vec<Val>) -> Result<(), ErrorInfo> {
    if args.len() != function.params.len() {
        return Err(ErrorInfo::new(
            errors::WRONG_ARG_COUNT,
            format!(
                "Function '{}' expects {} arguments, got {}",
                function.name,
                function.params.len(),
                args.len()
            ),
        ));
    }

    let base = vm.scopes.len();
    let vars = function
        .params
        .iter()
        .map(|p| p.name.clone())
        .zip(args)
        .collect();
    vm.scopes.push(Scope {
        vars,
        boundary: true,
    });

    vm.frames.push(Frame {
        kind: FrameKind::Call {
            phase: CallPhase::Enter,
            function: function.name.clone(),
        },
        scope_base: base,
        node: function.body.clone(),
    });

    Ok(())
}

/// Pop the top frame and drop the scopes it opened
pub fn pop_frame(vm: &mut VM) {
    if let Some(frame) = vm.frames.pop() {
        vm.scopes.truncate(frame.scope_base);
    }
}

/* ===================== Step Result ===================== */

/// Result of executing one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Continue to next step
    Continue,
    /// Execution complete
    Done,
}
