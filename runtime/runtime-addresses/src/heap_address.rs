use crate::Alignment;
use core::fmt;

/// Raw address handled by the heap manager.
///
/// The zero value is [`HeapAddress::NULL`] and doubles as the "no memory"
/// answer of low-level allocation paths.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HeapAddress(usize);

impl HeapAddress {
    /// The zero address.
    pub const NULL: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr.expose_provenance())
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Reinterpret the address as a raw pointer.
    ///
    /// Dereferencing the result is only sound if the address refers to
    /// memory handed to the heap manager.
    #[inline]
    #[must_use]
    pub const fn as_ptr<T>(self) -> *mut T {
        self.0 as *mut T
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Number of bytes in `[self, end)`.
    ///
    /// The caller guarantees `end >= self`; debug builds assert it.
    #[inline]
    #[must_use]
    pub const fn range_size(self, end: Self) -> usize {
        debug_assert!(end.0 >= self.0, "range end precedes its beginning");
        end.0.wrapping_sub(self.0)
    }

    /// Distance from `base` up to `self`, or `None` if `self` lies below `base`.
    #[inline]
    #[must_use]
    pub const fn offset_from(self, base: Self) -> Option<usize> {
        self.0.checked_sub(base.0)
    }

    #[inline]
    #[must_use]
    pub const fn increment(self, bytes: usize) -> Self {
        Self(self.0 + bytes)
    }

    #[inline]
    #[must_use]
    pub const fn decrement(self, bytes: usize) -> Self {
        Self(self.0 - bytes)
    }

    #[inline]
    #[must_use]
    pub const fn checked_increment(self, bytes: usize) -> Option<Self> {
        match self.0.checked_add(bytes) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Align up to the boundary of `A`.
    #[inline]
    #[must_use]
    pub const fn align_up<A: Alignment>(self) -> Self {
        Self((self.0 + A::MASK) & !A::MASK)
    }

    /// Align down to the boundary of `A`.
    #[inline]
    #[must_use]
    pub const fn align_down<A: Alignment>(self) -> Self {
        Self(self.0 & !A::MASK)
    }

    #[inline]
    #[must_use]
    pub const fn is_aligned<A: Alignment>(self) -> bool {
        self.0 & A::MASK == 0
    }

    /// Whether `self` lies in `[beginning, end)`.
    #[inline]
    #[must_use]
    pub const fn is_within(self, beginning: Self, end: Self) -> bool {
        self.0 >= beginning.0 && self.0 < end.0
    }
}

impl fmt::Debug for HeapAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeapAddress({:#010X})", self.0)
    }
}

impl fmt::Display for HeapAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}
