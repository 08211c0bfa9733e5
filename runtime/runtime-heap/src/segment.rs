//! # Memory Segment
//!
//! One registered, contiguous memory range and the free-space bookkeeping
//! inside it.
//!
//! Every block in the range, free or allocated, starts with a one-word size
//! tag. The low bit of the tag marks free blocks. Free blocks additionally
//! carry an [`ObjectHeader`] stamped `FreeBlock | Unmarked` (so the collector
//! can walk the segment block by block) and the address of the next free
//! block:
//!
//! ```text
//! free block
//! +-----------+----------------+-----------+---------------------------+
//! | size | 1  | header (FREE)  | next free |  free payload ...         |
//! +-----------+----------------+-----------+---------------------------+
//! ^ block     ^ block + TAG (the address handed out on allocation)
//!
//! allocated block
//! +-----------+------------------------------------------------------- +
//! | size | 0  |  payload (object header + object, written by caller)   |
//! +-----------+--------------------------------------------------------+
//! ```
//!
//! Free blocks are kept in a singly linked list **sorted by address** so that
//! neighbors can be coalesced when a block is released.
//!
//! ## Accounting
//! - `available` is the sum of free payload bytes.
//! - `allocated` is the sum of allocated payload bytes.
//! - `available + allocated + tags + alignment slack == size` at all times.

use crate::config::DIRTY_PATTERN;
use crate::object_header::{GarbageCollectorFlags, ObjectHeader};
use crate::{HeapError, MemoryAttributes, SegmentId};
use core::ptr;
use runtime_addresses::{AlignWord, HeapAddress, checked_align_up};

const WORD: usize = size_of::<usize>();

/// Size tag in front of every block.
pub(crate) const TAG_SIZE: usize = WORD;

/// Space reserved for the object header at the start of every payload.
const HEADER_SLOT: usize = WORD;

/// Payload bytes occupied by the bookkeeping of a free block.
const NODE_FIELDS: usize = HEADER_SLOT + WORD;

/// Low tag bit marking a free block.
const FREE_BIT: usize = 1;

const _: () = assert!(HEADER_SLOT >= ObjectHeader::HEADER_SIZE);
const _: () = assert!(
    MemorySegment::MINIMUM_SPACE_REQUIRED
        >= 2 * (WORD - 1) + TAG_SIZE + MemorySegment::MIN_BLOCK_PAYLOAD
);

/// Block as seen when walking a segment.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HeapBlock {
    /// Start of the payload; the object header lives here.
    pub address: HeapAddress,
    /// Payload size in bytes.
    pub size: usize,
    pub free: bool,
}

impl HeapBlock {
    /// One past the last payload byte.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> HeapAddress {
        self.address.increment(self.size)
    }

    /// The collector flags stored in the block's header slot.
    #[inline]
    #[must_use]
    pub fn header(&self) -> GarbageCollectorFlags {
        // SAFETY: every block was created as a free node with a stamped header
        unsafe { ObjectHeader::cast_as_object_header(self.address).flags() }
    }
}

/// Descriptor of one registered memory range.
#[derive(Debug, Clone)]
pub struct MemorySegment {
    id: SegmentId,
    beginning: HeapAddress,
    end: HeapAddress,
    attributes: MemoryAttributes,
    next: Option<SegmentId>,
    previous: Option<SegmentId>,
    /// First word-aligned block inside the range.
    first_block: HeapAddress,
    /// Word-aligned end of the last block.
    limit: HeapAddress,
    /// First free block, or null if the segment is full.
    free_head: HeapAddress,
    available: usize,
    allocated: usize,
    blocks: usize,
}

impl MemorySegment {
    /// Smallest range a segment is created for.
    ///
    /// Below this the range cannot hold more than a handful of words after
    /// alignment and tagging.
    pub const MINIMUM_SPACE_REQUIRED: usize = 64;

    /// Smallest payload of any block.
    pub const MIN_BLOCK_PAYLOAD: usize = NODE_FIELDS;

    pub(crate) const fn new(
        id: SegmentId,
        beginning: HeapAddress,
        end: HeapAddress,
        attributes: MemoryAttributes,
        previous: Option<SegmentId>,
    ) -> Self {
        Self {
            id,
            beginning,
            end,
            attributes,
            next: None,
            previous,
            first_block: beginning,
            limit: beginning,
            free_head: HeapAddress::NULL,
            available: 0,
            allocated: 0,
            blocks: 0,
        }
    }

    /// Establish the free-space bookkeeping: one free block spanning the range.
    ///
    /// # Safety
    /// - `[beginning, end)` must be **valid**, **writable** and **exclusive** to
    ///   this segment for the rest of the program.
    /// - The range size must be at least [`Self::MINIMUM_SPACE_REQUIRED`].
    pub(crate) unsafe fn initialize(&mut self, zero: bool) {
        debug_assert!(self.size() >= Self::MINIMUM_SPACE_REQUIRED);
        self.first_block = self.beginning.align_up::<AlignWord>();
        self.limit = self.end.align_down::<AlignWord>();
        let payload = self.first_block.range_size(self.limit) - TAG_SIZE;
        unsafe {
            write_free_node(self.first_block, payload, HeapAddress::NULL);
            if zero {
                fill_free_payload(self.first_block, payload, 0);
            }
        }
        self.free_head = self.first_block;
        self.available = payload;
        self.allocated = 0;
        self.blocks = 1;
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> SegmentId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn beginning(&self) -> HeapAddress {
        self.beginning
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> HeapAddress {
        self.end
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.beginning.range_size(self.end)
    }

    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> MemoryAttributes {
        self.attributes
    }

    #[inline]
    #[must_use]
    pub const fn next(&self) -> Option<SegmentId> {
        self.next
    }

    #[inline]
    #[must_use]
    pub const fn previous(&self) -> Option<SegmentId> {
        self.previous
    }

    pub(crate) const fn set_next(&mut self, next: Option<SegmentId>) {
        self.next = next;
    }

    #[inline]
    #[must_use]
    pub const fn available_memory(&self) -> usize {
        self.available
    }

    #[inline]
    #[must_use]
    pub const fn allocated_memory(&self) -> usize {
        self.allocated
    }

    /// Bytes spent on block tags and alignment slack.
    #[inline]
    #[must_use]
    pub const fn overhead(&self) -> usize {
        self.size() - self.available - self.allocated
    }

    /// Number of blocks, free and allocated.
    #[inline]
    #[must_use]
    pub const fn block_count(&self) -> usize {
        self.blocks
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, address: HeapAddress) -> bool {
        address.is_within(self.beginning, self.end)
    }

    /// Walk every block in address order.
    #[must_use]
    pub const fn blocks(&self) -> Blocks<'_> {
        Blocks {
            segment: self,
            cursor: self.first_block,
        }
    }

    /// Walk the free list.
    #[must_use]
    pub const fn free_blocks(&self) -> FreeBlocks<'_> {
        FreeBlocks {
            segment: self,
            cursor: self.free_head,
        }
    }

    /// The block whose payload contains `address`.
    #[must_use]
    pub fn block_containing(&self, address: HeapAddress) -> Option<HeapBlock> {
        if !address.is_within(self.first_block, self.limit) {
            return None;
        }
        self.blocks()
            .take_while(|b| b.address.decrement(TAG_SIZE) <= address)
            .find(|b| address.is_within(b.address, b.end()))
    }

    /// First-fit: carve `size` bytes out of the first free block that is large enough.
    ///
    /// Returns the payload address, or `None` if no free block fits.
    /// When `zero` is set, the whole payload is cleared. Free payload may
    /// still hold the tags and headers of blocks merged into it.
    pub(crate) fn allocate(&mut self, size: usize, zero: bool) -> Option<HeapAddress> {
        let payload = block_payload_for(size)?;
        let mut prev = HeapAddress::NULL;
        let mut current = self.free_head;
        while !current.is_null() {
            // SAFETY: free list nodes lie inside the segment range (see `initialize`)
            let (current_size, next) = unsafe { (tag_size(current), next_free(current)) };
            if current_size >= payload {
                let remainder = current_size - payload;
                let (taken, replacement) = if remainder >= TAG_SIZE + Self::MIN_BLOCK_PAYLOAD {
                    // Split: the tail stays free in place of `current`.
                    let tail = current.increment(TAG_SIZE + payload);
                    unsafe { write_free_node(tail, remainder - TAG_SIZE, next) };
                    self.blocks += 1;
                    self.available -= payload + TAG_SIZE;
                    (payload, tail)
                } else {
                    self.available -= current_size;
                    (current_size, next)
                };
                unsafe {
                    self.link_after(prev, replacement);
                    set_tag(current, taken, false);
                    if zero {
                        ptr::write_bytes(current.increment(TAG_SIZE).as_ptr::<u8>(), 0, taken);
                    }
                }
                self.allocated += taken;
                return Some(current.increment(TAG_SIZE));
            }
            prev = current;
            current = next;
        }
        None
    }

    /// Return the block at `address` to free space, coalescing with its neighbors.
    ///
    /// # Safety
    /// - `address` must have been returned by [`allocate`](Self::allocate) on
    ///   this segment and not been released since.
    pub(crate) unsafe fn release(&mut self, address: HeapAddress, zero: bool) {
        let block = address.decrement(TAG_SIZE);
        let (size, free) = unsafe { read_tag(block) };
        debug_assert!(!free, "block at {address} released twice");

        self.allocated -= size;
        self.available += size;

        // Insert sorted by address to enable coalescing.
        let mut prev = HeapAddress::NULL;
        let mut current = self.free_head;
        while !current.is_null() && current < block {
            prev = current;
            current = unsafe { next_free(current) };
        }
        unsafe {
            write_free_node(block, size, current);
            if zero {
                fill_free_payload(block, size, 0);
            }
            self.link_after(prev, block);

            if !current.is_null() && block.increment(TAG_SIZE + size) == current {
                self.absorb(block, current, zero);
            }
            if !prev.is_null() && prev.increment(TAG_SIZE + tag_size(prev)) == block {
                self.absorb(prev, block, zero);
            }
        }
    }

    /// Clear every free payload byte outside the free-list bookkeeping.
    pub fn zero_free_memory(&mut self) {
        self.fill_free(0);
    }

    /// Overwrite every free payload byte with [`DIRTY_PATTERN`].
    pub fn dirty_free_memory(&mut self) {
        self.fill_free(DIRTY_PATTERN);
    }

    fn fill_free(&mut self, pattern: u32) {
        let mut current = self.free_head;
        while !current.is_null() {
            // SAFETY: free list nodes lie inside the segment range
            unsafe {
                fill_free_payload(current, tag_size(current), pattern);
                current = next_free(current);
            }
        }
    }

    /// Cross-check the block chain, the free list and the counters.
    ///
    /// # Errors
    /// [`HeapError::Inconsistent`] naming the first broken block.
    pub fn check(&self) -> Result<(), HeapError> {
        let fail = |address: HeapAddress, reason: &'static str| HeapError::Inconsistent {
            segment: self.id,
            address,
            reason,
        };

        let (mut available, mut allocated, mut count, mut free_count) = (0, 0, 0, 0);
        let mut previous_free = false;
        let mut cursor = self.first_block;
        while cursor < self.limit {
            let (size, free) = unsafe { read_tag(cursor) };
            if size < Self::MIN_BLOCK_PAYLOAD || !size.is_multiple_of(WORD) {
                return Err(fail(cursor, "block size is malformed"));
            }
            let end = cursor
                .checked_increment(TAG_SIZE + size)
                .filter(|end| *end <= self.limit)
                .ok_or_else(|| fail(cursor, "block overruns the segment"))?;
            if free {
                if previous_free {
                    return Err(fail(cursor, "adjacent free blocks were not coalesced"));
                }
                let header = HeapBlock {
                    address: cursor.increment(TAG_SIZE),
                    size,
                    free,
                }
                .header();
                if !header.free_block() {
                    return Err(fail(cursor, "free block without a free header"));
                }
                available += size;
                free_count += 1;
            } else {
                allocated += size;
            }
            previous_free = free;
            count += 1;
            cursor = end;
        }

        if available != self.available || allocated != self.allocated {
            return Err(fail(self.first_block, "byte counters disagree with the blocks"));
        }
        if count != self.blocks {
            return Err(fail(self.first_block, "block counter disagrees with the blocks"));
        }

        let mut listed = 0_usize;
        let mut last = HeapAddress::NULL;
        let mut node = self.free_head;
        while !node.is_null() {
            if !node.is_within(self.first_block, self.limit) {
                return Err(fail(node, "free list leaves the segment"));
            }
            if node <= last {
                return Err(fail(node, "free list is not address ordered"));
            }
            let (_, free) = unsafe { read_tag(node) };
            if !free {
                return Err(fail(node, "allocated block on the free list"));
            }
            listed += 1;
            last = node;
            node = unsafe { next_free(node) };
        }
        if listed != free_count {
            return Err(fail(self.first_block, "free list misses free blocks"));
        }
        Ok(())
    }

    /// Make `block` the successor of `prev` (or the list head if `prev` is null).
    unsafe fn link_after(&mut self, prev: HeapAddress, block: HeapAddress) {
        if prev.is_null() {
            self.free_head = block;
        } else {
            unsafe { set_next_free(prev, block) };
        }
    }

    /// Merge the free block `victim` into its free lower neighbor `into`.
    ///
    /// The victim's header slot keeps reading `FreeBlock | Unmarked`, so an
    /// object freed into a free neighbor still shows as free.
    unsafe fn absorb(&mut self, into: HeapAddress, victim: HeapAddress, zero: bool) {
        unsafe {
            let merged = tag_size(into) + TAG_SIZE + tag_size(victim);
            set_next_free(into, next_free(victim));
            set_tag(into, merged, true);
            if zero {
                ptr::write_bytes(victim.as_ptr::<u8>(), 0, TAG_SIZE + NODE_FIELDS);
                ObjectHeader::cast_as_object_header(victim.increment(TAG_SIZE)).stamp_free();
            }
        }
        self.available += TAG_SIZE;
        self.blocks -= 1;
    }
}

/// Iterator over all blocks of a segment, see [`MemorySegment::blocks`].
pub struct Blocks<'a> {
    segment: &'a MemorySegment,
    cursor: HeapAddress,
}

impl Iterator for Blocks<'_> {
    type Item = HeapBlock;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.segment.limit {
            return None;
        }
        let (size, free) = unsafe { read_tag(self.cursor) };
        let block = HeapBlock {
            address: self.cursor.increment(TAG_SIZE),
            size,
            free,
        };
        // A malformed tag ends the walk instead of running past the segment.
        self.cursor = match block.address.checked_increment(size) {
            Some(end) if size > 0 => end,
            _ => self.segment.limit,
        };
        Some(block)
    }
}

/// Iterator over the free list of a segment, see [`MemorySegment::free_blocks`].
pub struct FreeBlocks<'a> {
    segment: &'a MemorySegment,
    cursor: HeapAddress,
}

impl Iterator for FreeBlocks<'_> {
    type Item = HeapBlock;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.is_null() || !self.segment.contains(self.cursor) {
            return None;
        }
        let (size, free) = unsafe { read_tag(self.cursor) };
        let block = HeapBlock {
            address: self.cursor.increment(TAG_SIZE),
            size,
            free,
        };
        self.cursor = unsafe { next_free(self.cursor) };
        Some(block)
    }
}

/// Payload size of a block able to hold `size` bytes and later rejoin free space.
const fn block_payload_for(size: usize) -> Option<usize> {
    match checked_align_up(size, WORD) {
        Some(p) if p < MemorySegment::MIN_BLOCK_PAYLOAD => Some(MemorySegment::MIN_BLOCK_PAYLOAD),
        other => other,
    }
}

#[inline]
unsafe fn read_word(address: HeapAddress) -> usize {
    unsafe { address.as_ptr::<usize>().read() }
}

#[inline]
unsafe fn write_word(address: HeapAddress, value: usize) {
    unsafe { address.as_ptr::<usize>().write(value) }
}

#[inline]
unsafe fn read_tag(block: HeapAddress) -> (usize, bool) {
    let tag = unsafe { read_word(block) };
    (tag & !FREE_BIT, tag & FREE_BIT != 0)
}

#[inline]
unsafe fn tag_size(block: HeapAddress) -> usize {
    unsafe { read_tag(block).0 }
}

#[inline]
unsafe fn set_tag(block: HeapAddress, size: usize, free: bool) {
    unsafe { write_word(block, size | usize::from(free)) }
}

#[inline]
unsafe fn next_free(block: HeapAddress) -> HeapAddress {
    HeapAddress::new(unsafe { read_word(block.increment(TAG_SIZE + HEADER_SLOT)) })
}

#[inline]
unsafe fn set_next_free(block: HeapAddress, next: HeapAddress) {
    unsafe { write_word(block.increment(TAG_SIZE + HEADER_SLOT), next.as_usize()) }
}

/// Write tag, `FreeBlock | Unmarked` header and link of a free block.
unsafe fn write_free_node(block: HeapAddress, size: usize, next: HeapAddress) {
    unsafe {
        set_tag(block, size, true);
        let header = block.increment(TAG_SIZE);
        // Clear the padding of the header slot before stamping.
        ptr::write_bytes(header.as_ptr::<u8>(), 0, HEADER_SLOT);
        ObjectHeader::cast_as_object_header(header).stamp_free();
        set_next_free(block, next);
    }
}

/// Fill the payload of a free block past its bookkeeping with `pattern`.
unsafe fn fill_free_payload(block: HeapAddress, size: usize, pattern: u32) {
    let start = block.increment(TAG_SIZE + NODE_FIELDS);
    let len = size - NODE_FIELDS;
    if pattern == 0 {
        unsafe { ptr::write_bytes(start.as_ptr::<u8>(), 0, len) };
        return;
    }
    let words = start.as_ptr::<u32>();
    for i in 0..len / size_of::<u32>() {
        unsafe { words.add(i).write(pattern) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Word-aligned scratch memory standing in for a physical range.
    struct Arena(Vec<usize>);

    impl Arena {
        fn new(bytes: usize) -> Self {
            Self(vec![usize::MAX; bytes / WORD])
        }

        fn range(&mut self) -> (HeapAddress, HeapAddress) {
            let beginning = HeapAddress::from_ptr(self.0.as_mut_ptr());
            (beginning, beginning.increment(self.0.len() * WORD))
        }
    }

    fn segment(arena: &mut Arena, zero: bool) -> MemorySegment {
        let (beginning, end) = arena.range();
        let mut s = MemorySegment::new(
            SegmentId::new(0),
            beginning,
            end,
            MemoryAttributes::internal_ram(),
            None,
        );
        unsafe { s.initialize(zero) };
        s
    }

    fn assert_accounting(s: &MemorySegment) {
        let tags = s.block_count() * TAG_SIZE;
        assert_eq!(s.available_memory() + s.allocated_memory() + tags, s.size());
        s.check().unwrap();
    }

    #[test]
    fn initialize_creates_one_free_block() {
        let mut arena = Arena::new(1024);
        let s = segment(&mut arena, true);
        assert_eq!(s.block_count(), 1);
        assert_eq!(s.available_memory(), 1024 - TAG_SIZE);
        assert_eq!(s.allocated_memory(), 0);
        let blocks: Vec<_> = s.blocks().collect();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].free);
        assert_eq!(blocks[0].header(), GarbageCollectorFlags::FREE_BLOCK);
        assert_accounting(&s);
    }

    #[test]
    fn allocate_splits_and_rounds_to_words() {
        let mut arena = Arena::new(1024);
        let mut s = segment(&mut arena, true);

        let a = s.allocate(13, true).unwrap();
        assert_eq!(a, s.beginning().increment(TAG_SIZE));
        assert!(a.is_aligned::<AlignWord>());
        let block = s.block_containing(a).unwrap();
        assert_eq!(block.size, 16_usize.max(MemorySegment::MIN_BLOCK_PAYLOAD));
        assert!(!block.free);
        assert_eq!(s.block_count(), 2);
        assert_accounting(&s);
    }

    #[test]
    fn small_remainder_is_handed_out_whole() {
        let mut arena = Arena::new(256);
        let mut s = segment(&mut arena, false);
        let whole = s.available_memory();
        let a = s.allocate(whole - TAG_SIZE, false).unwrap();
        assert_eq!(s.block_containing(a).unwrap().size, whole);
        assert_eq!(s.available_memory(), 0);
        assert!(s.allocate(1, false).is_none());
        assert_accounting(&s);
    }

    #[test]
    fn release_coalesces_back_to_one_block() {
        let mut arena = Arena::new(2048);
        let mut s = segment(&mut arena, true);
        let initial = s.available_memory();

        let a = s.allocate(40, true).unwrap();
        let b = s.allocate(64, true).unwrap();
        let c = s.allocate(24, true).unwrap();
        assert_accounting(&s);

        unsafe {
            s.release(b, true);
            assert_accounting(&s);
            s.release(a, true);
            assert_accounting(&s);
            s.release(c, true);
        }
        assert_accounting(&s);
        assert_eq!(s.block_count(), 1);
        assert_eq!(s.available_memory(), initial);
        assert_eq!(s.free_blocks().count(), 1);
    }

    #[test]
    fn freed_space_is_reused_first_fit() {
        let mut arena = Arena::new(2048);
        let mut s = segment(&mut arena, true);
        let a = s.allocate(64, true).unwrap();
        let _b = s.allocate(64, true).unwrap();
        unsafe { s.release(a, true) };
        assert_eq!(s.allocate(32, true), Some(a));
        assert_accounting(&s);
    }

    #[test]
    fn zero_policy_hands_out_cleared_payload() {
        let mut arena = Arena::new(1024);
        let mut s = segment(&mut arena, true);
        let a = s.allocate(96, true).unwrap();
        unsafe {
            ptr::write_bytes(a.as_ptr::<u8>(), 0xAB, 96);
            s.release(a, true);
        }
        let b = s.allocate(96, true).unwrap();
        assert_eq!(a, b);
        let bytes = unsafe { core::slice::from_raw_parts(b.as_ptr::<u8>(), 96) };
        assert!(bytes.iter().all(|&x| x == 0));
    }

    #[test]
    fn block_merged_into_free_neighbor_keeps_free_header() {
        let mut arena = Arena::new(1024);
        let mut s = segment(&mut arena, true);
        let a = s.allocate(24, true).unwrap();
        let b = s.allocate(24, true).unwrap();
        let _c = s.allocate(24, true).unwrap();
        unsafe {
            ObjectHeader::cast_as_object_header(b).stamp_allocated();
            s.release(a, true);
            s.release(b, true);
        }
        let header = unsafe { ObjectHeader::cast_as_object_header(b).flags() };
        assert_eq!(header, GarbageCollectorFlags::FREE_BLOCK);
        assert_eq!(s.block_containing(b).unwrap().address, a);
        assert_accounting(&s);

        // The merged block is handed out without the stale header inside.
        let merged = s.allocate(24 + TAG_SIZE + 24, true).unwrap();
        assert_eq!(merged, a);
        let bytes = unsafe { core::slice::from_raw_parts(merged.as_ptr::<u8>(), 48 + TAG_SIZE) };
        assert!(bytes.iter().all(|&x| x == 0));
    }

    #[test]
    fn dirty_and_zero_fill_cover_free_payload_only() {
        let mut arena = Arena::new(1024);
        let mut s = segment(&mut arena, true);
        let a = s.allocate(32, true).unwrap();
        unsafe { ptr::write_bytes(a.as_ptr::<u8>(), 0x11, 32) };

        s.dirty_free_memory();
        let used = unsafe { core::slice::from_raw_parts(a.as_ptr::<u8>(), 32) };
        assert!(used.iter().all(|&x| x == 0x11));
        let free = s.free_blocks().next().unwrap();
        let pattern_start = free.address.increment(NODE_FIELDS);
        let word = unsafe { pattern_start.as_ptr::<u32>().read() };
        assert_eq!(word, DIRTY_PATTERN);
        assert_accounting(&s);

        s.zero_free_memory();
        let word = unsafe { pattern_start.as_ptr::<u32>().read() };
        assert_eq!(word, 0);
        assert_accounting(&s);
    }

    #[test]
    fn check_detects_corrupted_tag() {
        let mut arena = Arena::new(1024);
        let mut s = segment(&mut arena, true);
        let a = s.allocate(32, true).unwrap();
        unsafe { write_word(a.decrement(TAG_SIZE), 3) };
        assert!(matches!(
            s.check(),
            Err(HeapError::Inconsistent { reason: "block size is malformed", .. })
        ));
    }

    #[test]
    fn block_containing_finds_interior_addresses() {
        let mut arena = Arena::new(1024);
        let mut s = segment(&mut arena, true);
        let a = s.allocate(32, true).unwrap();
        let b = s.allocate(32, true).unwrap();
        assert_eq!(s.block_containing(a.increment(31)).unwrap().address, a);
        assert_eq!(s.block_containing(b).unwrap().address, b);
        assert!(s.block_containing(s.end()).is_none());
    }
}
