//! Script coroutines: a suspendable context bound to one typed state value
//!
//! A [`ScriptCoroutine`] owns its [`ExecutionContext`] and its state. Each
//! `step()` lends the state to the script until the script calls `Yield()`
//! or returns; whatever the script wrote is visible through `state()` right
//! after. Steps past the end are no-ops, so hosts can step every coroutine
//! every tick without checking first.

mod factory;
mod pool;
mod state;


pub use factory::{create_coroutine, resolve_context, resolve_function, CoroutineError};
pub use pool::{CoroutinePool, SharedCoroutine, TickReport};
pub use state::{FieldError, FieldValue, NoState, ScriptState, Vec2};

use crate::engine::{ExecutionContext, ExecutionStatus};
use std::fmt;
use tracing::trace;

/// Move-only: the context is released exactly once, when the coroutine
/// holding it is dropped or calls `release()`.
pub struct ScriptCoroutine<S> {
    context: Option<ExecutionContext>,
    state: S,
}

impl<S: ScriptState> ScriptCoroutine<S> {
    /// `None` makes an inert coroutine that never runs
    pub fn new(context: Option<ExecutionContext>, initial: S) -> Self {
        ScriptCoroutine {
            context,
            state: initial,
        }
    }

    /// True while there is script left to run
    pub fn runnable(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|ctx| ctx.status().is_runnable())
    }

    /// Run the script until its next `Yield()`, return or fault
    pub fn step(&mut self) {
        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        if !ctx.status().is_runnable() {
            return;
        }
        let status = ctx.execute(&mut self.state);
        trace!(context = %ctx.id(), %status, "stepped coroutine");
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// `None` for a null handle
    pub fn status(&self) -> Option<ExecutionStatus> {
        self.context.as_ref().map(|ctx| ctx.status())
    }

    pub fn context(&self) -> Option<&ExecutionContext> {
        self.context.as_ref()
    }

    /// Release the context now; the state stays readable
    pub fn release(&mut self) {
        if let Some(ctx) = self.context.take() {
            ctx.release();
        }
    }

    /// Move the context into a new coroutine with a copy of the state
    ///
    /// `self` keeps its state but is left with a null handle.
    pub fn take(&mut self) -> Self
    where
        S: Clone,
    {
        ScriptCoroutine {
            context: self.context.take(),
            state: self.state.clone(),
        }
    }

    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S: fmt::Debug> fmt::Debug for ScriptCoroutine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptCoroutine")
            .field("context", &self.context)
            .field("state", &self.state)
            .finish()
    }
}
