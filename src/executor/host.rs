//! The executor's view of its surroundings
//!
//! The VM itself is pure: everything that lives outside the frame stack
//! (other script functions, host bindings, the coroutine argument) is reached
//! through this trait.

use super::errors::ErrorInfo;
use super::types::{FunctionDef, Val};
use std::rc::Rc;

pub trait Host {
    /// Resolve a script function by name for a statement-level call
    fn function(&self, name: &str) -> Option<Rc<FunctionDef>>;

    /// Call a host-registered function. `None` means no such function exists.
    fn call_native(&mut self, name: &str, args: &[Val]) -> Option<Result<Val, ErrorInfo>>;

    /// Read a field of the coroutine argument (`state.pos.x` -> `["pos", "x"]`)
    fn read_state(&self, path: &[&str]) -> Result<Val, ErrorInfo>;

    /// Write a field of the coroutine argument
    fn write_state(&mut self, path: &[&str], value: Val) -> Result<(), ErrorInfo>;
}
