//! Debug-only operation tracker.
//!
//! Records whether a table is inside one of its operations and whether that
//! operation is currently relocating entries. Entering twice without dropping
//! the first guard panics in debug builds. In release builds every method is
//! a no-op and the tracker occupies no space.

#[cfg(debug_assertions)]
use core::cell::Cell;
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

/// Operational phase of a table.
#[cfg_attr(not(debug_assertions), allow(dead_code))]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Phase {
    Stable,
    Growing,
}

/// Per-table tracker. Public operations start with
/// `let _g = self.phase.enter();`.
#[derive(Debug)]
pub(crate) struct PhaseTracker {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    #[cfg(debug_assertions)]
    phase: Cell<Phase>,
}

impl PhaseTracker {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            #[cfg(debug_assertions)]
            phase: Cell::new(Phase::Stable),
        }
    }

    /// Mark the start of an operation. Panics in debug builds if one is
    /// already running on this table.
    #[inline]
    pub(crate) fn enter(&self) -> OperationGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.get(),
                "reentrancy detected: nested entry into hash table"
            );
            self.active.set(true);
            return OperationGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return OperationGuard { _z: PhantomData };
        }
    }

    /// Switch to `Growing` until the returned guard drops. Only valid while
    /// an operation guard is held.
    #[inline]
    pub(crate) fn grow(&self) -> GrowthGuard<'_> {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.active.get(), "growth outside of an operation");
            debug_assert_eq!(self.phase.get(), Phase::Stable);
            self.phase.set(Phase::Growing);
            return GrowthGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return GrowthGuard { _z: PhantomData };
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn phase(&self) -> Phase {
        #[cfg(debug_assertions)]
        {
            return self.phase.get();
        }

        #[cfg(not(debug_assertions))]
        {
            return Phase::Stable;
        }
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `PhaseTracker::enter`.
pub(crate) struct OperationGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a PhaseTracker,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get());
            self.owner.active.set(false);
        }
    }
}

/// RAII guard returned by `PhaseTracker::grow`.
pub(crate) struct GrowthGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a PhaseTracker,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for GrowthGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.phase.set(Phase::Stable);
    }
}
