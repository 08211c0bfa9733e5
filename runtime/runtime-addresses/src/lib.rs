//! # Heap Address Types
//!
//! Strongly typed wrapper for raw heap addresses and the address arithmetic
//! used by the heap manager.
//!
//! ## Overview
//!
//! The heap manager works on raw memory it does not own in the Rust sense:
//! ranges handed over at boot, block tags written into free space, object
//! headers stamped in front of managed objects. Passing plain `usize` values
//! around makes it easy to confuse a size with an address, or a header
//! address with the user address that follows it. This crate provides:
//!
//! | Concept | Generic | Description |
//! |----------|----------|-------------|
//! | [`HeapAddress`] | – | A raw address inside (or outside) the managed heap. |
//! | [`Alignment`] | – | Marker trait for the alignments the heap relies on. |
//!
//! ## Alignments
//!
//! - [`Align4`]: 4 bytes, the granularity of every managed allocation
//! - [`AlignWord`]: the native pointer width, used for block tags
//!
//! ## Typical Usage
//!
//! ```rust
//! # use runtime_addresses::*;
//! let beginning = HeapAddress::new(0x2000_0000);
//! let end = HeapAddress::new(0x2000_1000);
//! assert_eq!(beginning.range_size(end), 0x1000);
//!
//! let header = HeapAddress::new(0x2000_0102);
//! let aligned = header.align_up::<Align4>();
//! assert_eq!(aligned.as_usize(), 0x2000_0104);
//! assert!(aligned.is_aligned::<Align4>());
//!
//! assert_eq!(aligned.decrement(4).increment(4), aligned);
//! ```
//!
//! ## Design Notes
//!
//! - [`HeapAddress`] is `#[repr(transparent)]` over `usize` and `Copy`, so it
//!   is free to pass around and can live inside raw memory.
//! - All helpers are `const fn`.
//! - The zero address is [`HeapAddress::NULL`]; it is never a valid
//!   allocation result.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code, clippy::inline_always)]

mod alignment;
mod heap_address;

pub use alignment::{Align4, AlignWord, Alignment};
pub use heap_address::HeapAddress;

/// Round `value` up to the next multiple of `align` (must be a power of two).
///
/// Returns `None` when the rounded value does not fit into `usize`.
#[inline]
#[must_use]
pub const fn checked_align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}
