//! tickflow: script-defined coroutines stepped once per host tick
//!
//! A host compiles a script module, starts one [`ScriptCoroutine`] per
//! behavior with a typed state value, and steps them from its frame loop.
//! Scripts suspend with `Yield()` and mutate their state in place, so the
//! host reads the result straight after each step.
//!
//! ```ignore
//! let engine = Engine::new();
//! let module = engine.compile("cats", source)?;
//! let mut pool = CoroutinePool::new(module);
//! pool.admit("UpdateCat", CatState::default());
//! loop {
//!     pool.tick(|cat| on_screen(cat.pos));
//! }
//! ```

pub mod cli;
pub mod config;
pub mod coroutine;
pub mod demo;
pub mod engine;
pub mod executor;
pub mod parser;

// Re-export main types
pub use coroutine::{
    create_coroutine, CoroutinePool, ScriptCoroutine, ScriptState, SharedCoroutine, TickReport,
};
pub use engine::{Engine, ExecutionContext, ExecutionStatus, ScriptModule};
