/// Entry point of the garbage collector, as seen by the heap.
///
/// `collect` runs a full cycle synchronously. It is called without the
/// allocation lock held, so the sweep may release blocks through
/// [`Heap::free_from_managed_heap`](crate::Heap::free_from_managed_heap).
pub trait Collector: Sync {
    fn collect(&self);
}

/// For images without a collector: exhaustion fails right after the retry.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoCollector;

impl Collector for NoCollector {
    #[inline]
    fn collect(&self) {}
}

impl<C: Collector + ?Sized> Collector for &C {
    #[inline]
    fn collect(&self) {
        (**self).collect();
    }
}
