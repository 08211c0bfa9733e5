use crate::SegmentId;
use runtime_addresses::HeapAddress;

/// Failures that cross the heap manager boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeapError {
    /// Allocation, forced collection and retry all failed.
    #[error("out of memory while allocating {requested} bytes")]
    OutOfMemory { requested: usize },
    /// The active strategy does not implement the named operation.
    #[error("operation not supported by this memory manager: {0}")]
    Unsupported(&'static str),
    /// A strict consistency check found broken bookkeeping.
    #[error("segment {segment} is inconsistent at {address}: {reason}")]
    Inconsistent {
        segment: SegmentId,
        address: HeapAddress,
        reason: &'static str,
    },
    /// The process-wide heap was already installed or resolved.
    #[error("a heap instance is already installed")]
    AlreadyInstalled,
}
