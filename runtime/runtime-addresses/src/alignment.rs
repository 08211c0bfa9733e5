mod sealed {
    pub trait Sealed {}
}

/// A power-of-two boundary the heap places data on.
///
/// Used as a type parameter of the [`HeapAddress`](crate::HeapAddress)
/// alignment helpers, so call sites name the rule instead of a number.
pub trait Alignment: sealed::Sealed + Copy + core::fmt::Debug {
    /// Boundary in bytes.
    const SIZE: usize;

    /// Bits that must be clear in an aligned address.
    const MASK: usize = Self::SIZE - 1;
}

/// Granularity of managed objects and their headers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Align4;

/// Pointer width; block tags and free-list links sit on this boundary.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AlignWord;

impl sealed::Sealed for Align4 {}
impl sealed::Sealed for AlignWord {}

impl Alignment for Align4 {
    const SIZE: usize = 4;
}

impl Alignment for AlignWord {
    const SIZE: usize = size_of::<usize>();
}

const _: () = assert!(Align4::SIZE.is_power_of_two() && AlignWord::SIZE.is_power_of_two());
const _: () = assert!(AlignWord::SIZE >= Align4::SIZE);
