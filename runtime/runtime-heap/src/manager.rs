//! # Heap manager contract
//!
//! A [`MemoryManager`] is a placement strategy over a [`SegmentTable`]. The
//! strategy decides where blocks go; segment registration, heap-wide fills
//! and the accounting queries are shared by every strategy and provided
//! here.
//!
//! Strategies never collect and never block: exhaustion is reported as
//! `None` and handled by [`Heap`](crate::Heap).

use crate::{HeapError, MemoryAttributes, MemorySegment, SegmentId, SegmentTable};
use log::{debug, trace, warn};
use runtime_addresses::{AlignWord, HeapAddress};

pub trait MemoryManager {
    /// The segment chain owned by this strategy.
    fn segments(&self) -> &SegmentTable;

    fn segments_mut(&mut self) -> &mut SegmentTable;

    /// Find `size` bytes of free space.
    ///
    /// Returns `None` if no segment can satisfy the request.
    fn allocate(&mut self, size: usize) -> Option<HeapAddress>;

    /// Return a block to its owning segment.
    ///
    /// # Safety
    /// `address` must have been returned by [`allocate`](Self::allocate) on
    /// this instance and must not have been released since.
    unsafe fn release(&mut self, address: HeapAddress);

    /// Whether `address` lies in memory managed by this strategy.
    fn contains_address(&self, address: HeapAddress) -> bool;

    /// Smallest range accepted by [`add_linear_section`](Self::add_linear_section).
    ///
    /// Strategies may raise it; values below
    /// [`MemorySegment::MINIMUM_SPACE_REQUIRED`] are not honored.
    fn minimum_segment_size(&self) -> usize {
        MemorySegment::MINIMUM_SPACE_REQUIRED
    }

    /// Forget all registered segments. Called once before registration.
    fn initialize_memory_manager(&mut self) {
        self.segments_mut().reset();
    }

    /// Hook run once after the last range has been registered.
    fn initialization_complete(&mut self) {}

    fn zero_free_memory(&mut self) {
        let table = self.segments_mut();
        for id in table.ids() {
            if let Some(segment) = table.get_mut(id) {
                segment.zero_free_memory();
            }
        }
    }

    /// Poison free memory with [`DIRTY_PATTERN`](crate::DIRTY_PATTERN) to
    /// flush out reads of released objects.
    fn dirty_free_memory(&mut self) {
        let table = self.segments_mut();
        for id in table.ids() {
            if let Some(segment) = table.get_mut(id) {
                segment.dirty_free_memory();
            }
        }
    }

    /// Verify the strategy's bookkeeping. Never mutates.
    ///
    /// # Errors
    /// [`HeapError::Inconsistent`] from strategies that check anything.
    fn consistency_check(&self) -> Result<(), HeapError> {
        Ok(())
    }

    /// Whether `address` refers to a live object.
    ///
    /// # Errors
    /// [`HeapError::Unsupported`] unless the strategy can answer.
    fn is_object_alive(&self, address: HeapAddress) -> Result<bool, HeapError> {
        let _ = address;
        Err(HeapError::Unsupported("is_object_alive"))
    }

    /// Register `[beginning, end)` as a new segment at the tail of the chain.
    ///
    /// Ranges below [`minimum_segment_size`](Self::minimum_segment_size) are
    /// ignored, as are ranges that no longer fit into the segment table.
    ///
    /// `beginning` is expected to be word aligned. Blocks start on the first
    /// word boundary of the range, so only an aligned base keeps managed
    /// objects 4-byte aligned relative to the segment. Debug builds assert it.
    ///
    /// # Safety
    /// The range must be valid, writable and not used by anything else for
    /// the rest of the program.
    unsafe fn add_linear_section(
        &mut self,
        beginning: HeapAddress,
        end: HeapAddress,
        attributes: MemoryAttributes,
    ) {
        let size = end.offset_from(beginning).unwrap_or(0);
        let minimum = self
            .minimum_segment_size()
            .max(MemorySegment::MINIMUM_SPACE_REQUIRED);
        if size < minimum {
            trace!("Ignoring {size} byte range {beginning}..{end}, below {minimum} bytes");
            return;
        }

        debug_assert!(
            beginning.is_aligned::<AlignWord>(),
            "segment base {beginning} is not word aligned"
        );
        match unsafe { self.segments_mut().push(beginning, end, attributes) } {
            Some(id) => debug!("Registered segment {id} at {beginning}..{end} ({size} bytes)"),
            None => warn!("Segment table full, discarding range {beginning}..{end}"),
        }
    }

    fn available_memory(&self) -> usize {
        self.segments().iter().map(MemorySegment::available_memory).sum()
    }

    fn allocated_memory(&self) -> usize {
        self.segments().iter().map(MemorySegment::allocated_memory).sum()
    }

    /// The head of the segment chain.
    fn start_of_heap(&self) -> Option<SegmentId> {
        self.segments().first()
    }

    fn segment(&self, id: SegmentId) -> Option<&MemorySegment> {
        self.segments().get(id)
    }
}
