//! Debug-only guard against strategies calling back into their container.
//!
//! Containers invoke user strategies while their index is being probed or
//! rebalanced. A strategy that re-enters the same container at that point
//! would observe (or mutate) a half-updated structure, so in debug builds the
//! second entry panics and names both operations. Release builds compile the
//! guard away.

use core::cell::Cell;
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

/// Embedded in each container; public methods that call a strategy start
/// with `let _g = self.reentrancy.enter("op");`.
///
/// Holding a `Cell` makes the owning container `!Sync`, which matches the
/// single-threaded access model. It stays `Send`, so a container may move
/// between threads or live behind a `Mutex`.
#[derive(Debug, Default)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            #[cfg(not(debug_assertions))]
            _z: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrant call to `{op}` from a strategy callback inside `{outer}`");
            }
            self.active.set(Some(op));
            ReentrancyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            ReentrancyGuard { _z: PhantomData }
        }
    }
}

pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}
