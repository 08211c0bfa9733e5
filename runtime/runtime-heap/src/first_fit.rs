//! # First-fit strategy
//!
//! Places each request in the first free block large enough, starting with
//! the segment that served the previous request and falling back to a walk
//! over the whole chain.

use crate::{HeapConfig, HeapError, MemoryManager, SegmentId, SegmentTable};
use log::debug;
use runtime_addresses::HeapAddress;

#[derive(Debug, Default)]
pub struct FirstFitManager {
    table: SegmentTable,
}

impl FirstFitManager {
    #[must_use]
    pub const fn new(config: HeapConfig) -> Self {
        Self {
            table: SegmentTable::new(config),
        }
    }

    fn allocate_in(&mut self, id: SegmentId, size: usize) -> Option<HeapAddress> {
        let zero = self.table.config().zero_free_memory;
        let address = self.table.get_mut(id)?.allocate(size, zero)?;
        self.table.set_active(Some(id));
        Some(address)
    }
}

impl MemoryManager for FirstFitManager {
    fn segments(&self) -> &SegmentTable {
        &self.table
    }

    fn segments_mut(&mut self) -> &mut SegmentTable {
        &mut self.table
    }

    fn allocate(&mut self, size: usize) -> Option<HeapAddress> {
        let active = self.table.active();
        if let Some(address) = active.and_then(|id| self.allocate_in(id, size)) {
            return Some(address);
        }
        self.table
            .ids()
            .filter(|id| Some(*id) != active)
            .find_map(|id| self.allocate_in(id, size))
    }

    unsafe fn release(&mut self, address: HeapAddress) {
        let zero = self.table.config().zero_free_memory;
        if let Some(segment) = self.table.find_containing_mut(address) {
            unsafe { segment.release(address, zero) };
        } else {
            debug_assert!(false, "released {address} outside every segment");
        }
    }

    fn contains_address(&self, address: HeapAddress) -> bool {
        self.table.find_containing(address).is_some()
    }

    /// Segments were zeroed as they were registered, so this only reports.
    fn initialization_complete(&mut self) {
        debug!(
            "Heap ready: {} segments, {} bytes available",
            self.table.len(),
            self.available_memory()
        );
    }

    fn consistency_check(&self) -> Result<(), HeapError> {
        self.table.iter().try_for_each(crate::MemorySegment::check)
    }

    fn is_object_alive(&self, address: HeapAddress) -> Result<bool, HeapError> {
        Ok(self
            .table
            .find_containing(address)
            .and_then(|segment| segment.block_containing(address))
            .is_some_and(|block| !block.free && !block.header().free_block()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryAttributes;

    fn manager(backing: &mut [u64], ranges: &[(usize, usize)]) -> FirstFitManager {
        let base = HeapAddress::from_ptr(backing.as_mut_ptr());
        let mut m = FirstFitManager::new(HeapConfig::DEFAULT.with_zero_free_memory(true));
        m.initialize_memory_manager();
        for &(from, to) in ranges {
            unsafe {
                m.add_linear_section(
                    base.increment(from),
                    base.increment(to),
                    MemoryAttributes::internal_ram(),
                );
            }
        }
        m.initialization_complete();
        m
    }

    #[test]
    fn active_segment_moves_on_exhaustion() {
        let mut backing = vec![0_u64; 64];
        let mut m = manager(&mut backing, &[(0, 256), (256, 512)]);
        assert_eq!(m.segments().len(), 2);

        let a = m.allocate(200).unwrap();
        assert_eq!(m.segments().active(), Some(SegmentId::new(0)));
        let b = m.allocate(200).unwrap();
        assert_eq!(m.segments().active(), Some(SegmentId::new(1)));
        assert!(m.segment(SegmentId::new(0)).unwrap().contains(a));
        assert!(m.segment(SegmentId::new(1)).unwrap().contains(b));
        assert_eq!(m.allocate(200), None);
        m.consistency_check().unwrap();
    }

    #[test]
    fn earlier_segment_is_reused_after_release() {
        let mut backing = vec![0_u64; 64];
        let mut m = manager(&mut backing, &[(0, 256), (256, 512)]);
        let a = m.allocate(200).unwrap();
        let _b = m.allocate(200).unwrap();
        unsafe { m.release(a) };
        assert_eq!(m.allocate(200), Some(a));
        m.consistency_check().unwrap();
    }

    #[test]
    fn completing_boot_leaves_free_memory_alone() {
        let mut backing = vec![0_u64; 64];
        let base = HeapAddress::from_ptr(backing.as_mut_ptr());
        let mut m = FirstFitManager::new(HeapConfig::DEFAULT.with_zero_free_memory(true));
        unsafe {
            m.add_linear_section(base, base.increment(512), MemoryAttributes::internal_ram());
        }
        let last_word = base.increment(512 - 4);
        assert_eq!(unsafe { last_word.as_ptr::<u32>().read() }, 0);

        m.dirty_free_memory();
        m.initialization_complete();
        assert_eq!(unsafe { last_word.as_ptr::<u32>().read() }, crate::DIRTY_PATTERN);
    }

    #[test]
    fn liveness_follows_block_state() {
        let mut backing = vec![0_u64; 64];
        let mut m = manager(&mut backing, &[(0, 512)]);
        let a = m.allocate(40).unwrap();
        assert_eq!(m.is_object_alive(a), Ok(true));
        assert_eq!(m.is_object_alive(a.increment(8)), Ok(true));
        unsafe { m.release(a) };
        assert_eq!(m.is_object_alive(a), Ok(false));
        assert_eq!(m.is_object_alive(HeapAddress::new(8)), Ok(false));
    }
}
