//! # Object Header
//!
//! Every heap-resident managed object is prefixed by an [`ObjectHeader`]:
//!
//! ```text
//! +----------------------+----------------------------------+
//! | ObjectHeader (4 B)   |        object payload            |
//! +----------------------+----------------------------------+
//! ^ header address       ^ object address = header + HEADER_SIZE
//! ```
//!
//! The header carries a single packed [`GarbageCollectorFlags`] word shared
//! between the heap manager and the collector. Ownership of the bits:
//!
//! | Bit | Name                  | Set by                 | Cleared by             |
//! |-----|-----------------------|------------------------|------------------------|
//! | 0   | `marked`              | manager (alloc), collector (mark) | manager (free), collector (sweep) |
//! | 1   | `free_block`          | manager (free)         | manager (alloc)        |
//! | 3   | `unreclaimable`       | manager (alloc)        | collector / runtime once the object is reachable |
//!
//! The remaining bits are reserved for the runtime (hash codes, locking
//! state) and are preserved by the single-bit transitions, but cleared by the
//! whole-word stamps the manager performs on allocation and free.

use bitfield_struct::bitfield;
use runtime_addresses::HeapAddress;

/// Packed collector state of one heap block.
#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct GarbageCollectorFlags {
    /// Bit 0: Marked (`0` = unmarked).
    ///
    /// Reached by the collector's mark phase during the current cycle.
    pub marked: bool,

    /// Bit 1: Free block.
    ///
    /// The block belongs to free space and holds no object.
    pub free_block: bool,

    /// Bit 2: Reserved.
    #[bits(1)]
    _reserved_2: u8,

    /// Bit 3: Unreclaimable object.
    ///
    /// The block must not be swept even if unmarked. Set on allocation so a
    /// new object survives until its creator has linked it into a root.
    pub unreclaimable: bool,

    /// Bits 4–31: Runtime extension word.
    #[bits(28)]
    pub extension: u32,
}

impl GarbageCollectorFlags {
    /// `Unmarked`: the all-clear collector state.
    pub const UNMARKED: Self = Self::new();

    /// `FreeBlock | Unmarked`: the stamp of a released block.
    pub const FREE_BLOCK: Self = Self::new().with_free_block(true);

    /// `UnreclaimableObject | Marked`: the stamp of a fresh allocation.
    pub const NEW_OBJECT: Self = Self::new().with_unreclaimable(true).with_marked(true);

    /// Whether the collector may reclaim this block in a sweep.
    #[inline]
    #[must_use]
    pub const fn is_reclaimable_garbage(self) -> bool {
        !self.free_block() && !self.marked() && !self.unreclaimable()
    }
}

/// Collector-visible metadata immediately preceding a managed object.
#[repr(C, align(4))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ObjectHeader {
    multi_use_word: GarbageCollectorFlags,
}

const _: () = assert!(size_of::<ObjectHeader>() == 4);

impl ObjectHeader {
    /// Bytes between a header and the object it describes.
    pub const HEADER_SIZE: usize = size_of::<Self>();

    #[must_use]
    pub const fn new(flags: GarbageCollectorFlags) -> Self {
        Self {
            multi_use_word: flags,
        }
    }

    /// View the header stored at `address`.
    ///
    /// # Safety
    /// - `address` must be 4-byte aligned and point at `HEADER_SIZE` bytes of
    ///   heap memory that stay valid and unaliased for `'a`.
    #[inline]
    #[must_use]
    pub const unsafe fn cast_as_object_header<'a>(address: HeapAddress) -> &'a mut Self {
        unsafe { &mut *address.as_ptr::<Self>() }
    }

    /// The header of the object starting at `object`.
    ///
    /// # Safety
    /// Same as [`cast_as_object_header`](Self::cast_as_object_header) for
    /// `object - HEADER_SIZE`.
    #[inline]
    #[must_use]
    pub const unsafe fn of_object<'a>(object: HeapAddress) -> &'a mut Self {
        unsafe { Self::cast_as_object_header(object.decrement(Self::HEADER_SIZE)) }
    }

    #[inline]
    #[must_use]
    pub const fn flags(&self) -> GarbageCollectorFlags {
        self.multi_use_word
    }

    #[inline]
    pub const fn set_flags(&mut self, flags: GarbageCollectorFlags) {
        self.multi_use_word = flags;
    }

    /// Manager: stamp a freshly allocated block as `UnreclaimableObject | Marked`.
    #[inline]
    pub const fn stamp_allocated(&mut self) {
        self.multi_use_word = GarbageCollectorFlags::NEW_OBJECT;
    }

    /// Manager: stamp a released block as `FreeBlock | Unmarked`.
    #[inline]
    pub const fn stamp_free(&mut self) {
        self.multi_use_word = GarbageCollectorFlags::FREE_BLOCK;
    }

    /// Collector: mark as reached in this cycle.
    #[inline]
    pub fn mark(&mut self) {
        self.multi_use_word.set_marked(true);
    }

    /// Collector: clear the mark before the next cycle.
    #[inline]
    pub fn unmark(&mut self) {
        self.multi_use_word.set_marked(false);
    }

    /// Collector/runtime: the object is linked into a root, let normal
    /// reachability decide from now on.
    #[inline]
    pub fn make_reclaimable(&mut self) {
        self.multi_use_word.set_unreclaimable(false);
    }

    /// Pin the object against collection.
    #[inline]
    pub fn make_unreclaimable(&mut self) {
        self.multi_use_word.set_unreclaimable(true);
    }

    #[inline]
    #[must_use]
    pub const fn is_free_block(&self) -> bool {
        self.multi_use_word.free_block()
    }

    #[inline]
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.multi_use_word.marked()
    }

    #[inline]
    #[must_use]
    pub const fn is_unreclaimable(&self) -> bool {
        self.multi_use_word.unreclaimable()
    }
}
