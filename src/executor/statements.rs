//! Statement execution handlers
//!
//! Each statement type has its own handler function that processes
//! the statement based on its current execution phase.
//!
//! A statement whose top-level expression is a direct call to a script
//! function (`walk(state);`, `let d = dist(a, b);`, `x = f();`, `return f();`)
//! pushes a call frame and moves to its `AwaitCall` phase. The callee's return
//! value arrives in `vm.returned`.

use super::errors::{self, ErrorInfo};
use super::expressions::{eval_expr, EvalResult};
use super::host::Host;
use super::stdlib;
use super::types::{
    AssignPhase, BlockPhase, CallPhase, Control, DeclarePhase, Expr, ExprPhase, FrameKind,
    IfPhase, ReturnPhase, Stmt, Val, WhilePhase,
};
use super::vm::{pop_frame, push_call, push_stmt, Step, VM};

/* ===================== Call Sites ===================== */

/// Outcome of evaluating a statement's top-level expression
enum CallSite {
    /// Evaluated in place
    Value(Val),
    /// A script call frame was pushed; the value arrives later
    Pushed,
    /// Fault raised; `vm.control` is set
    Thrown,
}

/// Evaluate `expr`, entering a script function if it is a direct call to one
///
/// `awaiting` is the frame kind the current statement switches to before the
/// callee frame goes on top of it.
fn eval_call_site(vm: &mut VM, host: &mut dyn Host, expr: &Expr, awaiting: FrameKind) -> CallSite {
    if let Expr::Call { callee, args, .. } = expr {
        if let Expr::Ident { name, .. } = callee.as_ref() {
            // Operators and locals shadow script functions
            let shadowed = stdlib::operator(name).is_some() || vm.lookup(name).is_some();
            if let Some(function) = host.function(name).filter(|_| !shadowed) {
                let mut arg_vals = Vec::with_capacity(args.len());
                for arg in args {
                    match eval_expr(arg, vm, host) {
                        EvalResult::Value { v } => arg_vals.push(v),
                        EvalResult::Throw { error } => {
                            vm.control = Control::Throw(error);
                            return CallSite::Thrown;
                        }
                    }
                }

                vm.set_top_kind(awaiting);
                return match push_call(vm, &function, arg_vals) {
                    Ok(()) => CallSite::Pushed,
                    Err(error) => {
                        vm.control = Control::Throw(error);
                        CallSite::Thrown
                    }
                };
            }
        }
    }

    match eval_expr(expr, vm, host) {
        EvalResult::Value { v } => CallSite::Value(v),
        EvalResult::Throw { error } => {
            vm.control = Control::Throw(error);
            CallSite::Thrown
        }
    }
}

/// Take the value a finished callee handed back
fn take_returned(vm: &mut VM) -> Val {
    vm.returned.take().unwrap_or(Val::Null)
}

/* ===================== Statement Handlers ===================== */

/// Execute a function call frame
pub fn execute_call(vm: &mut VM, phase: CallPhase, function: String, body: Stmt) -> Step {
    match phase {
        CallPhase::Enter => {
            vm.set_top_kind(FrameKind::Call {
                phase: CallPhase::Body,
                function,
            });
            push_stmt(vm, &body);
            Step::Continue
        }
        CallPhase::Body => {
            // Body finished without a return statement
            vm.control = Control::Return(Val::Null);
            Step::Continue
        }
    }
}

/// Execute Block statement
pub fn execute_block(vm: &mut VM, phase: BlockPhase, idx: usize, body: Vec<Stmt>) -> Step {
    match phase {
        BlockPhase::Execute => {
            // Check if we've finished all statements in the block
            let Some(child_stmt) = body.get(idx) else {
                pop_frame(vm);
                return Step::Continue;
            };

            // Update our frame to point to the next statement
            vm.set_top_kind(FrameKind::Block {
                phase: BlockPhase::Execute,
                idx: idx + 1,
            });

            push_stmt(vm, child_stmt);

            Step::Continue
        }
    }
}

/// Execute Declare statement (`let name = init;`)
pub fn execute_declare(
    vm: &mut VM,
    host: &mut dyn Host,
    phase: DeclarePhase,
    name: String,
    init: Option<Expr>,
) -> Step {
    let value = match phase {
        DeclarePhase::Eval => match init {
            None => Val::Null,
            Some(expr) => {
                let awaiting = FrameKind::Declare {
                    phase: DeclarePhase::AwaitCall,
                };
                match eval_call_site(vm, host, &expr, awaiting) {
                    CallSite::Value(v) => v,
                    CallSite::Pushed | CallSite::Thrown => return Step::Continue,
                }
            }
        },
        DeclarePhase::AwaitCall => take_returned(vm),
    };

    vm.declare(&name, value);
    pop_frame(vm);
    Step::Continue
}

/// Execute Assign statement (`var = value;` or `var.a.b = value;`)
pub fn execute_assign(
    vm: &mut VM,
    host: &mut dyn Host,
    phase: AssignPhase,
    var: String,
    path: Vec<String>,
    value: Expr,
) -> Step {
    let value = match phase {
        AssignPhase::Eval => {
            let awaiting = FrameKind::Assign {
                phase: AssignPhase::AwaitCall,
            };
            match eval_call_site(vm, host, &value, awaiting) {
                CallSite::Value(v) => v,
                CallSite::Pushed | CallSite::Thrown => return Step::Continue,
            }
        }
        AssignPhase::AwaitCall => take_returned(vm),
    };

    match assign(vm, host, &var, &path, value) {
        Ok(()) => pop_frame(vm),
        // Leave the frame; unwinding pops it
        Err(error) => vm.control = Control::Throw(error),
    }
    Step::Continue
}

/// Store `value` at `var.path...`
fn assign(
    vm: &mut VM,
    host: &mut dyn Host,
    var: &str,
    path: &[String],
    value: Val,
) -> Result<(), ErrorInfo> {
    // A variable holding the state is a reference; assigning to it, with or
    // without a member path, writes through to the host
    if let Some(Val::StateRef) = vm.lookup(var) {
        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        return host.write_state(&path, value);
    }

    let Some(slot) = vm.lookup_mut(var) else {
        return Err(if vm.lookup(var).is_some() {
            ErrorInfo::new(
                errors::TYPE_ERROR,
                format!("Cannot assign to built-in '{}'", var),
            )
        } else {
            ErrorInfo::new(
                errors::UNDEFINED_VARIABLE,
                format!("Undefined variable '{}'", var),
            )
        });
    };

    let Some((last, parents)) = path.split_last() else {
        *slot = value;
        return Ok(());
    };

    let mut target = slot;
    for key in parents {
        target = match target {
            Val::Obj(map) => map.get_mut(key).ok_or_else(|| {
                ErrorInfo::new(
                    errors::PROPERTY_NOT_FOUND,
                    format!("Property '{}' not found", key),
                )
            })?,
            other => return Err(not_an_object(key, other)),
        };
    }

    match target {
        Val::Obj(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        other => Err(not_an_object(last, other)),
    }
}

fn not_an_object(property: &str, v: &Val) -> ErrorInfo {
    ErrorInfo::new(
        errors::TYPE_ERROR,
        format!(
            "Cannot set property '{}' of {} value",
            property,
            v.type_name()
        ),
    )
}

/// Execute Return statement
pub fn execute_return(
    vm: &mut VM,
    host: &mut dyn Host,
    phase: ReturnPhase,
    value: Option<Expr>,
) -> Step {
    let val = match phase {
        ReturnPhase::Eval => match value {
            None => Val::Null,
            Some(expr) => {
                let awaiting = FrameKind::Return {
                    phase: ReturnPhase::AwaitCall,
                };
                match eval_call_site(vm, host, &expr, awaiting) {
                    CallSite::Value(v) => v,
                    CallSite::Pushed | CallSite::Thrown => return Step::Continue,
                }
            }
        },
        ReturnPhase::AwaitCall => take_returned(vm),
    };

    // Unwinding pops this frame along with the rest of the function
    vm.control = Control::Return(val);
    Step::Continue
}

/// Execute an expression statement
pub fn execute_expr(vm: &mut VM, host: &mut dyn Host, phase: ExprPhase, expr: Expr) -> Step {
    match phase {
        ExprPhase::Eval => {
            let awaiting = FrameKind::Expr {
                phase: ExprPhase::AwaitCall,
            };
            match eval_call_site(vm, host, &expr, awaiting) {
                CallSite::Value(_) => pop_frame(vm),
                CallSite::Pushed | CallSite::Thrown => {}
            }
        }
        ExprPhase::AwaitCall => {
            vm.returned = None;
            pop_frame(vm);
        }
    }
    Step::Continue
}

/// Execute If statement
pub fn execute_if(
    vm: &mut VM,
    host: &mut dyn Host,
    phase: IfPhase,
    test: Expr,
    then_s: Box<Stmt>,
    else_s: Option<Box<Stmt>>,
) -> Step {
    match phase {
        IfPhase::Eval => {
            let cond = match eval_expr(&test, vm, host) {
                EvalResult::Value { v } => v.is_truthy(),
                EvalResult::Throw { error } => {
                    vm.control = Control::Throw(error);
                    return Step::Continue;
                }
            };

            let branch = if cond { Some(then_s) } else { else_s };
            match branch {
                Some(stmt) => {
                    vm.set_top_kind(FrameKind::If {
                        phase: IfPhase::Done,
                    });
                    push_stmt(vm, &stmt);
                }
                None => pop_frame(vm),
            }
            Step::Continue
        }
        IfPhase::Done => {
            pop_frame(vm);
            Step::Continue
        }
    }
}

/// Execute While statement
///
/// The frame stays in `Test` for its whole life: every time the body frame
/// pops, the test is evaluated again.
pub fn execute_while(
    vm: &mut VM,
    host: &mut dyn Host,
    phase: WhilePhase,
    test: Expr,
    body: Box<Stmt>,
) -> Step {
    match phase {
        WhilePhase::Test => {
            match eval_expr(&test, vm, host) {
                EvalResult::Value { v } if v.is_truthy() => push_stmt(vm, &body),
                EvalResult::Value { .. } => pop_frame(vm),
                EvalResult::Throw { error } => vm.control = Control::Throw(error),
            }
            Step::Continue
        }
    }
}

/// Execute Break / Continue: raise the control signal for the enclosing loop
pub fn execute_loop_control(vm: &mut VM, control: Control) -> Step {
    pop_frame(vm);
    vm.control = control;
    Step::Continue
}
