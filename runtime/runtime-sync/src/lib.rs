//! # Runtime synchronization primitives
//!
//! The heap manager runs on a single core where code paths can be preempted
//! by interrupt-style contexts. Two primitives cover its needs:
//!
//! * [`YieldLock`]: a short-critical-section lock guarding the allocation
//!   fast path. The contended path defers to a [`Relax`] policy, which spins
//!   by default and can be replaced by a scheduler yield.
//! * [`SyncOnceCell`]: a write-once cell used to resolve process-wide
//!   singletons exactly once.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod sync_once_cell;
mod yield_lock;

pub use sync_once_cell::SyncOnceCell;
pub use yield_lock::{YieldLock, YieldLockGuard};

/// What a waiter does while the lock is held by someone else.
pub trait Relax {
    fn relax();
}

/// Busy-wait with a CPU spin hint.
#[derive(Debug, Default, Copy, Clone)]
pub struct Spin;

impl Relax for Spin {
    #[inline]
    fn relax() {
        core::hint::spin_loop();
    }
}
