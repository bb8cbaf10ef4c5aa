//! Core execution loop
//!
//! This module contains the step() function - the heart of the interpreter.
//! It processes one frame at a time, advancing execution phases and managing the frame stack.
//!
//! ## Function Organization
//! 1. run_until_done() - Top-level driver (calls step repeatedly)
//! 2. step() - Main execution loop (dispatches to statement handlers)
//! 3. unwind() - Control flow propagation

use super::errors::{self, ErrorInfo};
use super::host::Host;
use super::statements::{
    execute_assign, execute_block, execute_call, execute_declare, execute_expr, execute_if,
    execute_loop_control, execute_return, execute_while,
};
use super::types::{Control, FrameKind, Stmt};
use super::vm::{pop_frame, Step, VM};

/* ===================== Public API ===================== */

/// Run the VM until it completes
///
/// After completion, inspect `vm.control`: `Return(v)` on success,
/// `Throw(e)` on a fault.
pub fn run_until_done(vm: &mut VM, host: &mut dyn Host) {
    loop {
        match step(vm, host) {
            Step::Continue => continue,
            Step::Done => break,
        }
    }
}

/// Execute one step of the VM
///
/// 1. Unwinds if control flow is active
/// 2. Otherwise dispatches the top frame to its statement handler
pub fn step(vm: &mut VM, host: &mut dyn Host) -> Step {
    if vm.control != Control::None {
        return unwind(vm);
    }

    let Some(frame) = vm.frames.last() else {
        return Step::Done;
    };

    // Clone frame data we need (to avoid borrow checker issues)
    let (kind, node) = (frame.kind.clone(), frame.node.clone());

    match (kind, node) {
        (FrameKind::Call { phase, function }, body) => execute_call(vm, phase, function, body),

        (FrameKind::Block { phase, idx }, Stmt::Block { body, .. }) => {
            execute_block(vm, phase, idx, body)
        }

        (FrameKind::Declare { phase }, Stmt::Declare { name, init, .. }) => {
            execute_declare(vm, host, phase, name, init)
        }

        (
            FrameKind::Assign { phase },
            Stmt::Assign {
                var, path, value, ..
            },
        ) => execute_assign(vm, host, phase, var, path, value),

        (FrameKind::Return { phase }, Stmt::Return { value, .. }) => {
            execute_return(vm, host, phase, value)
        }

        (FrameKind::Expr { phase }, Stmt::Expr { expr, .. }) => {
            execute_expr(vm, host, phase, expr)
        }

        (
            FrameKind::If { phase },
            Stmt::If {
                test,
                then_s,
                else_s,
                ..
            },
        ) => execute_if(vm, host, phase, test, then_s, else_s),

        (FrameKind::While { phase }, Stmt::While { test, body, .. }) => {
            execute_while(vm, host, phase, test, body)
        }

        (FrameKind::Break, Stmt::Break { .. }) => execute_loop_control(vm, Control::Break),

        (FrameKind::Continue, Stmt::Continue { .. }) => {
            execute_loop_control(vm, Control::Continue)
        }

        _ => {
            vm.control = Control::Throw(ErrorInfo::new(
                errors::INTERNAL_ERROR,
                "Frame kind does not match statement node",
            ));
            Step::Continue
        }
    }
}

/* ===================== Control Flow ===================== */

/// Unwind the stack when control flow is active
///
/// - Return pops through the nearest call frame and hands the value to the caller
/// - Break/Continue stop at the nearest loop, never crossing a call frame
/// - Throw pops everything; there is no catch
fn unwind(vm: &mut VM) -> Step {
    match vm.control.clone() {
        Control::Return(v) => {
            while let Some(frame) = vm.frames.last() {
                let is_call = matches!(frame.kind, FrameKind::Call { .. });
                pop_frame(vm);
                if is_call {
                    break;
                }
            }

            // Root function returned: leave Return(v) as the final state
            if vm.frames.is_empty() {
                return Step::Done;
            }

            vm.control = Control::None;
            vm.returned = Some(v);
            Step::Continue
        }

        Control::Break | Control::Continue => {
            let is_break = vm.control == Control::Break;
            while let Some(frame) = vm.frames.last() {
                match frame.kind {
                    FrameKind::While { .. } => {
                        if is_break {
                            pop_frame(vm);
                        }
                        vm.control = Control::None;
                        return Step::Continue;
                    }
                    FrameKind::Call { .. } => break,
                    _ => pop_frame(vm),
                }
            }

            vm.control = Control::Throw(ErrorInfo::new(
                errors::LOOP_CONTROL_OUTSIDE_LOOP,
                "break/continue used outside of a loop",
            ));
            Step::Continue
        }

        Control::Throw(_) => {
            while !vm.frames.is_empty() {
                pop_frame(vm);
            }
            Step::Done
        }

        // Nothing to unwind
        Control::None => Step::Continue,
    }
}
