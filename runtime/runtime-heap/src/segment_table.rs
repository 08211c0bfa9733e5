//! # Segment table
//!
//! Fixed-capacity arena of [`MemorySegment`] descriptors. Segments are linked
//! by index into a doubly linked chain in registration order, so the chain
//! can be walked from either end without any pointer juggling.

use crate::{HeapConfig, MemoryAttributes, MemorySegment};
use core::fmt;
use runtime_addresses::HeapAddress;

/// Number of segments a table can hold.
pub const MAX_SEGMENTS: usize = 16;

/// Index of a segment in its [`SegmentTable`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(u16);

impl SegmentId {
    #[inline]
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The segment chain of one memory manager.
#[derive(Debug)]
pub struct SegmentTable {
    slots: [Option<MemorySegment>; MAX_SEGMENTS],
    len: usize,
    /// Segment the last allocation was served from.
    active: Option<SegmentId>,
    config: HeapConfig,
}

impl SegmentTable {
    #[must_use]
    pub const fn new(config: HeapConfig) -> Self {
        Self {
            slots: [const { None }; MAX_SEGMENTS],
            len: 0,
            active: None,
            config,
        }
    }

    /// Forget all segments. The memory they covered is not touched.
    pub fn reset(&mut self) {
        self.slots = [const { None }; MAX_SEGMENTS];
        self.len = 0;
        self.active = None;
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> HeapConfig {
        self.config
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == MAX_SEGMENTS
    }

    /// First segment of the chain.
    #[inline]
    #[must_use]
    pub const fn first(&self) -> Option<SegmentId> {
        if self.len == 0 { None } else { Some(SegmentId(0)) }
    }

    /// Last segment of the chain.
    #[inline]
    #[must_use]
    pub const fn last(&self) -> Option<SegmentId> {
        match self.len {
            0 => None,
            #[allow(clippy::cast_possible_truncation)]
            n => Some(SegmentId((n - 1) as u16)),
        }
    }

    #[inline]
    #[must_use]
    pub const fn active(&self) -> Option<SegmentId> {
        self.active
    }

    #[inline]
    pub const fn set_active(&mut self, id: Option<SegmentId>) {
        self.active = id;
    }

    #[must_use]
    pub fn get(&self, id: SegmentId) -> Option<&MemorySegment> {
        self.slots.get(id.index())?.as_ref()
    }

    #[must_use]
    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut MemorySegment> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Append a segment for `[beginning, end)` and initialize its free space.
    ///
    /// Returns `None` if the table is full.
    ///
    /// # Safety
    /// - The range must satisfy the contract of [`MemorySegment`]: valid,
    ///   writable, exclusive and at least
    ///   [`MemorySegment::MINIMUM_SPACE_REQUIRED`] bytes.
    pub unsafe fn push(
        &mut self,
        beginning: HeapAddress,
        end: HeapAddress,
        attributes: MemoryAttributes,
    ) -> Option<SegmentId> {
        if self.is_full() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let id = SegmentId(self.len as u16);
        let previous = self.last();
        let mut segment = MemorySegment::new(id, beginning, end, attributes, previous);
        unsafe { segment.initialize(self.config.zero_free_memory) };

        if let Some(prev) = previous.and_then(|p| self.get_mut(p)) {
            prev.set_next(Some(id));
        }
        self.slots[id.index()] = Some(segment);
        self.len += 1;
        Some(id)
    }

    /// Walk the chain from the first segment via the `next` links.
    #[must_use]
    pub const fn iter(&self) -> Chain<'_> {
        Chain {
            table: self,
            cursor: self.first(),
            forward: true,
        }
    }

    /// Walk the chain from the last segment via the `previous` links.
    #[must_use]
    pub const fn iter_rev(&self) -> Chain<'_> {
        Chain {
            table: self,
            cursor: self.last(),
            forward: false,
        }
    }

    /// Ids in chain order, for callers that need mutable access per segment.
    pub fn ids(&self) -> impl Iterator<Item = SegmentId> + use<> {
        #[allow(clippy::cast_possible_truncation)]
        (0..self.len).map(|i| SegmentId(i as u16))
    }

    /// The segment whose range contains `address`.
    #[must_use]
    pub fn find_containing(&self, address: HeapAddress) -> Option<&MemorySegment> {
        self.iter().find(|s| s.contains(address))
    }

    #[must_use]
    pub fn find_containing_mut(&mut self, address: HeapAddress) -> Option<&mut MemorySegment> {
        self.slots
            .iter_mut()
            .take(self.len)
            .filter_map(Option::as_mut)
            .find(|s| s.contains(address))
    }
}

impl Default for SegmentTable {
    fn default() -> Self {
        Self::new(HeapConfig::DEFAULT)
    }
}

/// Iterator over the segment chain, see [`SegmentTable::iter`].
pub struct Chain<'a> {
    table: &'a SegmentTable,
    cursor: Option<SegmentId>,
    forward: bool,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a MemorySegment;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.table.get(self.cursor?)?;
        self.cursor = if self.forward {
            segment.next()
        } else {
            segment.previous()
        };
        Some(segment)
    }
}

impl<'a> IntoIterator for &'a SegmentTable {
    type Item = &'a MemorySegment;
    type IntoIter = Chain<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
