use crate::{MemoryManager, SegmentTable};
use runtime_addresses::HeapAddress;

/// Strategy that owns no memory.
///
/// Backs the process-wide heap until a real one is installed: every
/// allocation fails, releases are ignored and every address is claimed, so
/// nothing is ever reported as foreign.
#[derive(Debug, Default)]
pub struct EmptyManager {
    table: SegmentTable,
}

impl EmptyManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: SegmentTable::new(crate::HeapConfig::DEFAULT),
        }
    }
}

impl MemoryManager for EmptyManager {
    fn segments(&self) -> &SegmentTable {
        &self.table
    }

    fn segments_mut(&mut self) -> &mut SegmentTable {
        &mut self.table
    }

    fn allocate(&mut self, _size: usize) -> Option<HeapAddress> {
        None
    }

    unsafe fn release(&mut self, _address: HeapAddress) {}

    fn contains_address(&self, _address: HeapAddress) -> bool {
        true
    }

    /// No range is ever large enough.
    fn minimum_segment_size(&self) -> usize {
        usize::MAX
    }

    fn initialize_memory_manager(&mut self) {}

    fn zero_free_memory(&mut self) {}

    fn dirty_free_memory(&mut self) {}
}
