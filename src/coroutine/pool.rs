//! Homogeneous collection of coroutines stepped once per tick

use super::{create_coroutine, ScriptCoroutine, ScriptState};
use crate::engine::ScriptModule;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// A pooled coroutine; the host may keep a handle to read its state
pub type SharedCoroutine<S> = Rc<RefCell<ScriptCoroutine<S>>>;

/// What one `tick` did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Coroutines that ran this tick
    pub stepped: usize,
    /// Coroutines dropped by the liveness check
    pub removed: usize,
    /// Pool size after pruning
    pub remaining: usize,
}

pub struct CoroutinePool<S> {
    module: ScriptModule,
    entries: Vec<SharedCoroutine<S>>,
}

impl<S: ScriptState> CoroutinePool<S> {
    pub fn new(module: ScriptModule) -> Self {
        Self::with_capacity(module, 0)
    }

    pub fn with_capacity(module: ScriptModule, capacity: usize) -> Self {
        CoroutinePool {
            module,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn module(&self) -> &ScriptModule {
        &self.module
    }

    /// Start `function` with `initial` and append it
    ///
    /// Unresolvable functions still join the pool as inert coroutines; the
    /// liveness check decides when they leave.
    pub fn admit(&mut self, function: &str, initial: S) -> SharedCoroutine<S> {
        self.insert(create_coroutine(&self.module, function, initial))
    }

    /// Append an existing coroutine
    pub fn insert(&mut self, coroutine: ScriptCoroutine<S>) -> SharedCoroutine<S> {
        let shared = Rc::new(RefCell::new(coroutine));
        self.entries.push(Rc::clone(&shared));
        shared
    }

    /// Step every entry once, in insertion order; returns how many ran
    pub fn step_all(&mut self) -> usize {
        let mut stepped = 0;
        for entry in &self.entries {
            let Ok(mut coroutine) = entry.try_borrow_mut() else {
                warn!("coroutine is borrowed by the host; skipping this tick");
                continue;
            };
            if coroutine.runnable() {
                coroutine.step();
                stepped += 1;
            }
        }
        stepped
    }

    /// Keep the entries whose state passes `is_alive`; returns how many were removed
    ///
    /// Finished coroutines stay until their state says otherwise.
    pub fn prune(&mut self, mut is_alive: impl FnMut(&S) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| match entry.try_borrow() {
            Ok(coroutine) => is_alive(coroutine.state()),
            Err(_) => true,
        });
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "pruned coroutines");
        }
        removed
    }

    /// `step_all` then `prune`
    pub fn tick(&mut self, is_alive: impl FnMut(&S) -> bool) -> TickReport {
        let stepped = self.step_all();
        let removed = self.prune(is_alive);
        TickReport {
            stepped,
            removed,
            remaining: self.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedCoroutine<S>> {
        self.entries.iter()
    }

    pub fn runnable_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.try_borrow().is_ok_and(|c| c.runnable()))
            .count()
    }

    /// Drop every entry, releasing contexts no one else holds
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
