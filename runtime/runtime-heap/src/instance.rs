//! # Process-wide heap
//!
//! The runtime reaches its heap through [`instance`]. Boot code installs the
//! real heap once with [`install`]; until then, and forever if it never
//! does, the instance is a heap over [`EmptyManager`] that fails every
//! allocation.
//!
//! The first resolution is final: once [`instance`] has handed out the
//! fallback, installing a heap is refused.

use crate::{EmptyManager, Heap, HeapError, ManagedHeap, NoCollector};
use log::debug;
use runtime_sync::SyncOnceCell;

static INSTANCE: SyncOnceCell<&'static dyn ManagedHeap> = SyncOnceCell::new();

static FALLBACK: Heap<EmptyManager, NoCollector> = Heap::new(EmptyManager::new(), NoCollector);

/// Make `heap` the process-wide heap.
///
/// # Errors
/// [`HeapError::AlreadyInstalled`] if a heap was installed before or the
/// fallback has already been resolved.
pub fn install(heap: &'static dyn ManagedHeap) -> Result<(), HeapError> {
    INSTANCE
        .set(heap)
        .map_err(|_| HeapError::AlreadyInstalled)?;
    debug!("Installed process-wide heap");
    Ok(())
}

/// The process-wide heap.
#[must_use]
pub fn instance() -> &'static dyn ManagedHeap {
    *INSTANCE.get_or_init(|| {
        debug!("No heap installed, falling back to the empty heap");
        &FALLBACK
    })
}

/// Whether [`instance`] has been decided, by [`install`] or by falling back.
#[must_use]
pub fn is_resolved() -> bool {
    INSTANCE.is_initialized()
}
