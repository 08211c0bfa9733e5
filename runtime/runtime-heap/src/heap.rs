//! # Managed heap
//!
//! [`Heap`] binds a placement strategy, the allocation lock and a collector,
//! and implements the managed-object paths on top of them:
//!
//! * allocation adds an [`ObjectHeader`], rounds to 4 bytes, asks the
//!   strategy, collects once and retries once on exhaustion, and stamps the
//!   header `UnreclaimableObject | Marked`;
//! * freeing stamps the header `FreeBlock | Unmarked` and hands the header
//!   address back to the strategy.
//!
//! Strategies customize placement only. These two paths are the same for all
//! of them.

use crate::{Collector, HeapError, MemoryAttributes, MemoryManager, ObjectHeader, SegmentId};
use core::fmt;
use log::{error, warn};
use runtime_addresses::{Align4, Alignment, HeapAddress, checked_align_up};
use runtime_sync::{Relax, Spin, YieldLock};

/// Alignment of every managed allocation.
pub const MANAGED_ALIGNMENT: usize = Align4::SIZE;

/// Bytes requested from the strategy for a managed object of `requested` bytes.
///
/// Returns `None` if the header-adjusted size overflows.
#[must_use]
pub const fn managed_allocation_size(requested: usize) -> Option<usize> {
    match requested.checked_add(ObjectHeader::HEADER_SIZE) {
        Some(size) => checked_align_up(size, MANAGED_ALIGNMENT),
        None => None,
    }
}

/// A placement strategy `M` behind the allocation lock, plus its collector `C`.
pub struct Heap<M, C, R = Spin> {
    strategy: YieldLock<M, R>,
    collector: C,
}

impl<M, C, R> Heap<M, C, R> {
    #[must_use]
    pub const fn new(strategy: M, collector: C) -> Self {
        Self {
            strategy: YieldLock::new(strategy),
            collector,
        }
    }

    #[must_use]
    pub const fn collector(&self) -> &C {
        &self.collector
    }
}

impl<M, C, R> Heap<M, C, R>
where
    M: MemoryManager,
    C: Collector,
    R: Relax,
{
    /// Allocate a managed object of `requested` bytes.
    ///
    /// The returned address points just past the object's header, is 4-byte
    /// aligned relative to its segment, and the header reads
    /// `UnreclaimableObject | Marked`.
    ///
    /// # Errors
    /// [`HeapError::OutOfMemory`] if the request cannot be met even after one
    /// collection.
    pub fn allocate_from_managed_heap(&self, requested: usize) -> Result<HeapAddress, HeapError> {
        let out_of_memory = HeapError::OutOfMemory { requested };
        let Some(size) = managed_allocation_size(requested) else {
            error!("Managed allocation of {requested} bytes overflows");
            return Err(out_of_memory);
        };

        if let Some(object) = self.try_allocate(size) {
            return Ok(object);
        }

        // The lock is not held here so the sweep can free blocks.
        warn!("Heap exhausted allocating {requested} bytes, collecting");
        self.collector.collect();

        self.try_allocate(size).ok_or_else(|| {
            error!("Out of memory allocating {requested} bytes after collection");
            out_of_memory
        })
    }

    /// Free a managed object.
    ///
    /// # Safety
    /// `object` must have been returned by
    /// [`allocate_from_managed_heap`](Self::allocate_from_managed_heap) on
    /// this heap and must not have been freed since.
    pub unsafe fn free_from_managed_heap(&self, object: HeapAddress) {
        let header = object.decrement(ObjectHeader::HEADER_SIZE);
        self.strategy.with_lock(|strategy| unsafe {
            ObjectHeader::cast_as_object_header(header).stamp_free();
            strategy.release(header);
        });
    }

    fn try_allocate(&self, size: usize) -> Option<HeapAddress> {
        self.strategy.with_lock(|strategy| {
            let header = strategy.allocate(size)?;
            debug_assert!(header.is_aligned::<Align4>(), "misaligned block at {header}");
            // SAFETY: the strategy handed out at least `size` bytes at `header`
            unsafe { ObjectHeader::cast_as_object_header(header).stamp_allocated() };
            Some(header.increment(ObjectHeader::HEADER_SIZE))
        })
    }

    /// Run `f` on the strategy under the allocation lock.
    pub fn with_strategy<T>(&self, f: impl FnOnce(&mut M) -> T) -> T {
        self.strategy.with_lock(f)
    }

    /// Reset the strategy, register `ranges` in order and complete initialization.
    ///
    /// # Safety
    /// See [`MemoryManager::add_linear_section`]: every range must be valid,
    /// writable and exclusive to this heap for the rest of the program.
    pub unsafe fn boot<I>(&self, ranges: I)
    where
        I: IntoIterator<Item = (HeapAddress, HeapAddress, MemoryAttributes)>,
    {
        self.with_strategy(|strategy| {
            strategy.initialize_memory_manager();
            for (beginning, end, attributes) in ranges {
                unsafe { strategy.add_linear_section(beginning, end, attributes) };
            }
            strategy.initialization_complete();
        });
    }

    #[must_use]
    pub fn statistics(&self) -> HeapStatistics {
        self.with_strategy(|strategy| {
            let segments = strategy.segments();
            HeapStatistics {
                segments: segments.len(),
                size: segments.iter().map(crate::MemorySegment::size).sum(),
                available: strategy.available_memory(),
                allocated: strategy.allocated_memory(),
            }
        })
    }
}

/// Snapshot of the heap-wide counters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct HeapStatistics {
    pub segments: usize,
    /// Bytes covered by all segments.
    pub size: usize,
    pub available: usize,
    pub allocated: usize,
}

impl HeapStatistics {
    /// Bytes spent on block tags and alignment.
    #[must_use]
    pub const fn overhead(&self) -> usize {
        self.size - self.available - self.allocated
    }
}

impl fmt::Display for HeapStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} segments, {} bytes: {} available, {} allocated, {} overhead",
            self.segments,
            self.size,
            self.available,
            self.allocated,
            self.overhead()
        )
    }
}

/// Object-safe view of a [`Heap`], as stored in the process-wide registry.
pub trait ManagedHeap: Sync {
    /// See [`Heap::allocate_from_managed_heap`].
    ///
    /// # Errors
    /// [`HeapError::OutOfMemory`] after the collect-and-retry failed.
    fn allocate_from_managed_heap(&self, requested: usize) -> Result<HeapAddress, HeapError>;

    /// See [`Heap::free_from_managed_heap`].
    ///
    /// # Safety
    /// `object` must come from this heap's allocation path and be live.
    unsafe fn free_from_managed_heap(&self, object: HeapAddress);

    fn contains_address(&self, address: HeapAddress) -> bool;

    fn available_memory(&self) -> usize;

    fn allocated_memory(&self) -> usize;

    fn start_of_heap(&self) -> Option<SegmentId>;

    /// # Errors
    /// See [`MemoryManager::consistency_check`].
    fn consistency_check(&self) -> Result<(), HeapError>;

    /// # Errors
    /// See [`MemoryManager::is_object_alive`].
    fn is_object_alive(&self, object: HeapAddress) -> Result<bool, HeapError>;

    fn zero_free_memory(&self);

    fn dirty_free_memory(&self);

    fn statistics(&self) -> HeapStatistics;
}

impl<M, C, R> ManagedHeap for Heap<M, C, R>
where
    M: MemoryManager + Send,
    C: Collector,
    R: Relax,
{
    fn allocate_from_managed_heap(&self, requested: usize) -> Result<HeapAddress, HeapError> {
        Self::allocate_from_managed_heap(self, requested)
    }

    unsafe fn free_from_managed_heap(&self, object: HeapAddress) {
        unsafe { Self::free_from_managed_heap(self, object) }
    }

    fn contains_address(&self, address: HeapAddress) -> bool {
        self.with_strategy(|s| s.contains_address(address))
    }

    fn available_memory(&self) -> usize {
        self.with_strategy(|s| s.available_memory())
    }

    fn allocated_memory(&self) -> usize {
        self.with_strategy(|s| s.allocated_memory())
    }

    fn start_of_heap(&self) -> Option<SegmentId> {
        self.with_strategy(|s| s.start_of_heap())
    }

    fn consistency_check(&self) -> Result<(), HeapError> {
        self.with_strategy(|s| s.consistency_check())
    }

    fn is_object_alive(&self, object: HeapAddress) -> Result<bool, HeapError> {
        self.with_strategy(|s| s.is_object_alive(object))
    }

    fn zero_free_memory(&self) {
        self.with_strategy(MemoryManager::zero_free_memory);
    }

    fn dirty_free_memory(&self) {
        self.with_strategy(MemoryManager::dirty_free_memory);
    }

    fn statistics(&self) -> HeapStatistics {
        Self::statistics(self)
    }
}
