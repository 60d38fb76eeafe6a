//! Debug-only guard against user callbacks re-entering a map.
//!
//! Both maps call into user code while their structure is mid-update: the
//! hashed map runs `KeyEquivalence::hash`/`equal` while probing, the ordered
//! map runs `Comparator::compare` while descending and rebalancing. A
//! callback that reaches back into the same map (through a raw pointer or
//! shared cell) would observe a half-updated structure. In debug builds the
//! guard panics naming both operations; in release builds it is a zero-cost
//! no-op.

#[cfg(debug_assertions)]
use core::cell::Cell;
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

/// Per-map tracker. Public entry points start with
/// `let _g = self.reentrancy.enter("op");`.
///
/// `Send`, so a map can move to another thread or sit behind a `Mutex`.
/// In debug builds the `Cell` makes it `!Sync`.
#[derive(Debug)]
pub(crate) struct CallbackGuard {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
}

impl CallbackGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
        }
    }

    /// Mark `op` as running. Panics in debug builds if another operation on
    /// the same map has not returned yet.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> Entered<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("map re-entered: `{op}` called from a key callback during `{outer}`");
            }
            self.active.set(Some(op));
            return Entered { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return Entered { _z: PhantomData };
        }
    }
}

impl Default for CallbackGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CallbackGuard {
    // A cloned map starts with no operation in flight.
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// RAII token returned by `CallbackGuard::enter`.
pub(crate) struct Entered<'a> {
    #[cfg(debug_assertions)]
    owner: &'a CallbackGuard,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CallbackGuard;

    #[test]
    fn sequential_operations_are_ok() {
        let g = CallbackGuard::new();
        {
            let _e = g.enter("put");
        }
        let _e = g.enter("get");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_with_both_names() {
        let g = CallbackGuard::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = g.enter("put");
            let _inner = g.enter("get");
        }));
        let err = res.expect_err("expected re-entry to panic in debug builds");
        let msg = err
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default();
        assert!(msg.contains("`get`") && msg.contains("`put`"), "{msg}");
    }

    #[test]
    fn guard_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<CallbackGuard>();
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_noop_in_release() {
        let g = CallbackGuard::new();
        let _outer = g.enter("put");
        let _inner = g.enter("get");
    }
}
