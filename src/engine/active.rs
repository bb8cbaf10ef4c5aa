//! Thread-local register of the context currently inside `execute()`
//!
//! Host bindings have no handle to the context that called them. `Yield()`
//! and friends reach it through this register instead. Entries are pushed for
//! the dynamic extent of one `execute()` and popped on the way out, so nested
//! executes (a host binding driving another context) restore the outer one.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use uuid::Uuid;

struct ActiveEntry {
    id: Uuid,
    suspend_requested: Rc<Cell<bool>>,
}

thread_local! {
    static ACTIVE: RefCell<Vec<ActiveEntry>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a context registered as active until dropped
#[must_use]
pub(crate) struct ActiveGuard {
    id: Uuid,
}

impl ActiveGuard {
    pub(crate) fn enter(id: Uuid, suspend_requested: Rc<Cell<bool>>) -> Self {
        ACTIVE.with(|active| {
            active.borrow_mut().push(ActiveEntry {
                id,
                suspend_requested,
            })
        });
        ActiveGuard { id }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|entry| entry.id == self.id) {
                active.truncate(pos);
            }
        });
    }
}

/// Ask the active context to suspend once the current statement completes
///
/// Returns false, and does nothing, when no context is executing.
pub fn suspend_active() -> bool {
    ACTIVE.with(|active| match active.borrow().last() {
        Some(entry) => {
            entry.suspend_requested.set(true);
            true
        }
        None => false,
    })
}

/// Id of the context currently executing on this thread
pub fn active_context_id() -> Option<Uuid> {
    ACTIVE.with(|active| active.borrow().last().map(|entry| entry.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspend_without_active_context_is_noop() {
        assert_eq!(active_context_id(), None);
        assert!(!suspend_active());
    }

    #[test]
    fn test_guards_stack_and_restore() {
        let outer_flag = Rc::new(Cell::new(false));
        let inner_flag = Rc::new(Cell::new(false));
        let outer = Uuid::new_v4();
        let inner = Uuid::new_v4();

        let outer_guard = ActiveGuard::enter(outer, outer_flag.clone());
        assert_eq!(active_context_id(), Some(outer));

        {
            let _inner_guard = ActiveGuard::enter(inner, inner_flag.clone());
            assert_eq!(active_context_id(), Some(inner));
            assert!(suspend_active());
        }

        assert!(inner_flag.get());
        assert!(!outer_flag.get());
        assert_eq!(active_context_id(), Some(outer));

        drop(outer_guard);
        assert_eq!(active_context_id(), None);
    }
}
