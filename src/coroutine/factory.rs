//! Starting coroutines from compiled modules

use super::{ScriptCoroutine, ScriptState};
use crate::engine::{ContextError, ExecutionContext, ScriptModule};
use crate::executor::FunctionDef;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a coroutine could not be started
#[derive(Debug, Error)]
pub enum CoroutineError {
    #[error("module is empty")]
    EmptyModule,

    #[error("no function '{function}' in module '{module}'")]
    UnknownFunction { module: String, function: String },

    #[error("'{function}' expects {expected} state, got {found}")]
    StateType {
        function: String,
        expected: String,
        found: &'static str,
    },

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Find `function_name` and check that it can run with `initial` as its state
///
/// Creates no context, so hosts can validate a name up front without
/// touching the engine's counters.
pub fn resolve_function<S: ScriptState>(
    module: &ScriptModule,
    function_name: &str,
    initial: &S,
) -> Result<Rc<FunctionDef>, CoroutineError> {
    if module.is_empty() {
        return Err(CoroutineError::EmptyModule);
    }
    let function = module
        .function(function_name)
        .ok_or_else(|| CoroutineError::UnknownFunction {
            module: module.name().to_string(),
            function: function_name.to_string(),
        })?;

    if function.params.len() > 1 {
        return Err(ContextError::TooManyParams {
            function: function.name.clone(),
            count: function.params.len(),
        }
        .into());
    }
    if let Some(expected) = function.params.first().and_then(|p| p.type_name.as_deref()) {
        if expected != initial.type_name() {
            return Err(CoroutineError::StateType {
                function: function.name.clone(),
                expected: expected.to_string(),
                found: initial.type_name(),
            });
        }
    }

    Ok(function)
}

/// Resolve `function_name` and prepare a fresh context for it
///
/// `initial` is only inspected, to check it against the parameter's
/// declared type.
pub fn resolve_context<S: ScriptState>(
    module: &ScriptModule,
    function_name: &str,
    initial: &S,
) -> Result<ExecutionContext, CoroutineError> {
    let function = resolve_function(module, function_name, initial)?;
    let Some(engine) = module.engine() else {
        return Err(CoroutineError::EmptyModule);
    };

    let mut ctx = engine.create_context(module);
    ctx.prepare(function)?;
    Ok(ctx)
}

/// Start `function_name` as a coroutine owning `initial`
///
/// Never fails: when the function cannot be resolved the coroutine is inert
/// (`runnable()` is always false) and the reason is logged.
pub fn create_coroutine<S: ScriptState>(
    module: &ScriptModule,
    function_name: &str,
    initial: S,
) -> ScriptCoroutine<S> {
    match resolve_context(module, function_name, &initial) {
        Ok(ctx) => {
            debug!(context = %ctx.id(), function = function_name, "started coroutine");
            ScriptCoroutine::new(Some(ctx), initial)
        }
        Err(error) => {
            warn!(
                module = module.name(),
                function = function_name,
                %error,
                "coroutine will not run"
            );
            ScriptCoroutine::new(None, initial)
        }
    }
}

impl ScriptModule {
    /// See [`create_coroutine`]
    pub fn create_coroutine<S: ScriptState>(
        &self,
        function_name: &str,
        initial: S,
    ) -> ScriptCoroutine<S> {
        create_coroutine(self, function_name, initial)
    }
}
