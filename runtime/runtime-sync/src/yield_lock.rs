use crate::{Relax, Spin};
use core::{
    cell::UnsafeCell,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

/// Short-duration mutual exclusion for the allocate/release fast path.
///
/// Not a blocking wait: holders must not sleep or run long operations.
/// Waiters call `R::relax()` between attempts.
pub struct YieldLock<T, R = Spin> {
    /// lock state
    /// * `false`: unlocked
    /// * `true`: locked
    locked: AtomicBool,
    inner: UnsafeCell<T>,
    _relax: PhantomData<fn() -> R>,
}

// Safety: mutual exclusion; only T: Send may cross contexts.
unsafe impl<T: Send, R> Sync for YieldLock<T, R> {}

impl<T, R> YieldLock<T, R> {
    #[must_use]
    pub const fn new(inner: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            inner: UnsafeCell::new(inner),
            _relax: PhantomData,
        }
    }

    /// Whether the lock is currently held.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Mutable access when you have `&mut self` (no contention possible).
    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T, R: Relax> YieldLock<T, R> {
    /// Try once; returns immediately.
    #[inline]
    pub fn try_lock(&self) -> Option<YieldLockGuard<'_, T, R>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(YieldLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Relax until acquired (TATAS), then return a guard.
    #[inline]
    pub fn lock(&self) -> YieldLockGuard<'_, T, R> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // Contended path: wait on a plain read before retrying the CAS.
            while self.locked.load(Ordering::Relaxed) {
                R::relax();
            }
        }
        YieldLockGuard { lock: self }
    }

    /// Closure convenience, built on the guard.
    #[inline]
    pub fn with_lock<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        let mut g = self.lock();
        f(&mut g)
    }
}

pub struct YieldLockGuard<'a, T, R: Relax> {
    lock: &'a YieldLock<T, R>,
}

impl<T, R: Relax> Deref for YieldLockGuard<'_, T, R> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.inner.get() }
    }
}

impl<T, R: Relax> DerefMut for YieldLockGuard<'_, T, R> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.inner.get() }
    }
}

impl<T, R: Relax> Drop for YieldLockGuard<'_, T, R> {
    fn drop(&mut self) {
        // Release publishes the critical section.
        self.lock.locked.store(false, Ordering::Release);
    }
}
