#![allow(dead_code)]

use runtime_heap::{
    Collector, FirstFitManager, Heap, HeapAddress, HeapConfig, ManagedHeap, MemoryAttributes,
    MemoryManager, SegmentTable,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

/// Leak `bytes` of 8-byte aligned memory and return it as a range.
pub fn leak_range(bytes: usize) -> (HeapAddress, HeapAddress) {
    let words = Box::leak(vec![0_u64; bytes.div_ceil(8)].into_boxed_slice());
    let beginning = HeapAddress::from_ptr(words.as_mut_ptr());
    (beginning, beginning.increment(bytes))
}

/// Ranges of the given sizes, ready for `Heap::boot`.
pub fn ranges(sizes: &[usize]) -> Vec<(HeapAddress, HeapAddress, MemoryAttributes)> {
    sizes
        .iter()
        .map(|&size| {
            let (beginning, end) = leak_range(size);
            (beginning, end, MemoryAttributes::internal_ram())
        })
        .collect()
}

pub fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

/// A booted first-fit heap over freshly leaked ranges.
pub fn first_fit_heap<C: Collector>(
    sizes: &[usize],
    collector: C,
) -> &'static Heap<FirstFitManager, C> {
    let heap = leak(Heap::new(
        FirstFitManager::new(HeapConfig::DEFAULT.with_zero_free_memory(true)),
        collector,
    ));
    unsafe { heap.boot(ranges(sizes)) };
    heap
}

/// Counts collection requests.
#[derive(Debug, Default)]
pub struct CountingCollector {
    calls: AtomicUsize,
}

impl CountingCollector {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Collector for CountingCollector {
    fn collect(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Frees a queue of objects through the process heap when asked to collect.
#[derive(Default)]
pub struct SweepingCollector {
    pub heap: OnceLock<&'static dyn ManagedHeap>,
    pub garbage: Mutex<Vec<HeapAddress>>,
    pub calls: AtomicUsize,
}

impl Collector for SweepingCollector {
    fn collect(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let heap = self.heap.get().expect("heap not wired");
        for object in self.garbage.lock().unwrap().drain(..) {
            unsafe { heap.free_from_managed_heap(object) };
        }
    }
}

/// First-fit strategy that records every call it receives.
pub struct RecordingManager {
    inner: FirstFitManager,
    /// Fail every allocation.
    pub starve: bool,
    pub requests: Vec<usize>,
    pub releases: Vec<HeapAddress>,
}

impl RecordingManager {
    pub fn new(starve: bool) -> Self {
        Self {
            inner: FirstFitManager::new(HeapConfig::DEFAULT),
            starve,
            requests: Vec::new(),
            releases: Vec::new(),
        }
    }
}

impl MemoryManager for RecordingManager {
    fn segments(&self) -> &SegmentTable {
        self.inner.segments()
    }

    fn segments_mut(&mut self) -> &mut SegmentTable {
        self.inner.segments_mut()
    }

    fn allocate(&mut self, size: usize) -> Option<HeapAddress> {
        self.requests.push(size);
        if self.starve {
            None
        } else {
            self.inner.allocate(size)
        }
    }

    unsafe fn release(&mut self, address: HeapAddress) {
        self.releases.push(address);
        unsafe { self.inner.release(address) };
    }

    fn contains_address(&self, address: HeapAddress) -> bool {
        self.inner.contains_address(address)
    }
}
