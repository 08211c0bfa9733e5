//! # Heap configuration
//!
//! Boot-time options. The defaults are compile-time constants driven by cargo
//! features, so an image that never builds a [`HeapConfig`] by hand still gets
//! a well-defined behavior.

/// Word written over free memory by `dirty_free_memory`.
pub const DIRTY_PATTERN: u32 = 0xDEAD_BEEF;

/// Boot-time heap options.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HeapConfig {
    /// Zero-fill blocks as they return to free space.
    ///
    /// Keeps free memory zeroed so fresh objects start out cleared, at the
    /// cost of a fill on every release.
    pub zero_free_memory: bool,
}

impl HeapConfig {
    /// The build's default: zero-fill unless the `zero-free-memory` feature is off.
    pub const DEFAULT: Self = Self {
        zero_free_memory: cfg!(feature = "zero-free-memory"),
    };

    #[must_use]
    pub const fn with_zero_free_memory(mut self, enabled: bool) -> Self {
        self.zero_free_memory = enabled;
        self
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
