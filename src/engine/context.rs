//! One suspendable invocation of a script function

use super::active::ActiveGuard;
use super::{Engine, ScriptModule};
use crate::coroutine::ScriptState;
use crate::executor::errors::{self, ErrorInfo};
use crate::executor::{self, Control, FunctionDef, Host, Step, Val, VM};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Uninitialized,
    Prepared,
    Active,
    Suspended,
    Finished,
    /// Stopped by a runtime fault; see `ExecutionContext::error`
    Failed,
}

impl ExecutionStatus {
    /// Prepared or suspended: `execute` will run something
    pub fn is_runnable(&self) -> bool {
        matches!(self, ExecutionStatus::Prepared | ExecutionStatus::Suspended)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Uninitialized => "uninitialized",
            ExecutionStatus::Prepared => "prepared",
            ExecutionStatus::Active => "active",
            ExecutionStatus::Suspended => "suspended",
            ExecutionStatus::Finished => "finished",
            ExecutionStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("function '{function}' takes {count} parameters; coroutines take at most one")]
    TooManyParams { function: String, count: usize },

    #[error("context is {status}")]
    Busy { status: ExecutionStatus },

    #[error("failed to prepare '{function}': {error}")]
    Prepare { function: String, error: ErrorInfo },
}

/// Owned by exactly one coroutine. Dropping it releases it.
pub struct ExecutionContext {
    id: Uuid,
    engine: Engine,
    module: ScriptModule,
    function: Option<Rc<FunctionDef>>,
    vm: Option<VM>,
    status: ExecutionStatus,
    error: Option<ErrorInfo>,
    result: Option<Val>,
    suspend_requested: Rc<Cell<bool>>,
}

impl ExecutionContext {
    pub(super) fn new(engine: Engine, module: ScriptModule) -> Self {
        let id = Uuid::new_v4();
        debug!(context = %id, module = module.name(), "created context");
        ExecutionContext {
            id,
            engine,
            module,
            function: None,
            vm: None,
            status: ExecutionStatus::Uninitialized,
            error: None,
            result: None,
            suspend_requested: Rc::new(Cell::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Last runtime fault
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Return value once `Finished`
    pub fn result(&self) -> Option<&Val> {
        self.result.as_ref()
    }

    pub fn module(&self) -> &ScriptModule {
        &self.module
    }

    /// Name of the prepared function
    pub fn function_name(&self) -> Option<&str> {
        self.function.as_deref().map(|f| f.name.as_str())
    }

    /// Bind the context to `function` and reset it to the start
    ///
    /// A declared parameter becomes the argument slot: it resolves to
    /// whatever state `execute` is given.
    pub fn prepare(&mut self, function: Rc<FunctionDef>) -> Result<(), ContextError> {
        if self.status == ExecutionStatus::Active {
            return Err(ContextError::Busy {
                status: self.status,
            });
        }
        if function.params.len() > 1 {
            return Err(ContextError::TooManyParams {
                function: function.name.clone(),
                count: function.params.len(),
            });
        }

        let args = if function.params.is_empty() {
            vec![]
        } else {
            vec![Val::StateRef]
        };
        let vm = VM::new(&function, args).map_err(|error| ContextError::Prepare {
            function: function.name.clone(),
            error,
        })?;

        debug!(context = %self.id, function = %function.name, "prepared context");
        self.vm = Some(vm);
        self.function = Some(function);
        self.status = ExecutionStatus::Prepared;
        self.error = None;
        self.result = None;
        Ok(())
    }

    /// Run until the script yields, returns or faults
    ///
    /// `arg` is what the function's parameter reads and writes. Outside
    /// `Prepared` and `Suspended` this does nothing.
    pub fn execute(&mut self, arg: &mut dyn ScriptState) -> ExecutionStatus {
        if !self.status.is_runnable() {
            return self.status;
        }
        let Some(mut vm) = self.vm.take() else {
            return self.status;
        };

        self.status = ExecutionStatus::Active;
        self.suspend_requested.set(false);
        let _active = ActiveGuard::enter(self.id, Rc::clone(&self.suspend_requested));

        let mut host = ContextHost {
            engine: &self.engine,
            module: &self.module,
            state: arg,
        };

        loop {
            match executor::step(&mut vm, &mut host) {
                Step::Continue => {
                    // Faults are never suspended into; let the unwind finish
                    if self.suspend_requested.get() && !matches!(vm.control, Control::Throw(_)) {
                        self.vm = Some(vm);
                        self.status = ExecutionStatus::Suspended;
                        trace!(context = %self.id, "suspended");
                        return self.status;
                    }
                }
                Step::Done => break,
            }
        }

        match std::mem::replace(&mut vm.control, Control::None) {
            Control::Return(value) => {
                trace!(context = %self.id, %value, "finished");
                self.result = Some(value);
                self.status = ExecutionStatus::Finished;
            }
            Control::Throw(error) => self.fail(error),
            other => self.fail(ErrorInfo::new(
                errors::INTERNAL_ERROR,
                format!("execution ended with {:?}", other),
            )),
        }
        self.status
    }

    /// Consume the context; the engine counts the release
    pub fn release(self) {
        drop(self)
    }

    fn fail(&mut self, error: ErrorInfo) {
        warn!(
            context = %self.id,
            function = self.function_name().unwrap_or("?"),
            code = %error.code,
            "script fault: {}",
            error.message
        );
        self.error = Some(error);
        self.status = ExecutionStatus::Failed;
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        self.engine.note_released();
        debug!(context = %self.id, status = %self.status, "released context");
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("id", &self.id)
            .field("module", &self.module.name())
            .field("function", &self.function_name())
            .field("status", &self.status)
            .field("error", &self.error)
            .finish()
    }
}

/// What a running context sees outside its VM
struct ContextHost<'a> {
    engine: &'a Engine,
    module: &'a ScriptModule,
    state: &'a mut dyn ScriptState,
}

impl Host for ContextHost<'_> {
    fn function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.module.function(name)
    }

    fn call_native(&mut self, name: &str, args: &[Val]) -> Option<Result<Val, ErrorInfo>> {
        // Cloned out so the binding may register functions itself
        let native = self.engine.native(name)?;
        Some(native(args))
    }

    fn read_state(&self, path: &[&str]) -> Result<Val, ErrorInfo> {
        self.state.get_field(path).ok_or_else(|| {
            ErrorInfo::new(
                errors::STATE_FIELD_ERROR,
                format!("{} has no field '{}'", self.state.type_name(), path.join(".")),
            )
        })
    }

    fn write_state(&mut self, path: &[&str], value: Val) -> Result<(), ErrorInfo> {
        self.state
            .set_field(path, value)
            .map_err(|e| ErrorInfo::new(errors::STATE_FIELD_ERROR, e.to_string()))
    }
}
