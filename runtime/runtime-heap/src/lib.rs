//! # Managed Runtime Heap
//!
//! The heap manager of an ahead-of-time compiled managed runtime for small,
//! bare-metal targets. It owns the physical memory ranges handed over at
//! boot, places and reclaims managed objects inside them, and asks the
//! garbage collector for help when memory runs out.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │            Heap<M, C> / dyn ManagedHeap             │
//! │    • Object header stamping                         │
//! │    • 4-byte sizing, collect once, retry once        │
//! │    • Allocation lock                                │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │          MemoryManager (placement strategy)         │
//! │    • FirstFitManager, EmptyManager                  │
//! │    • Segment registration and heap-wide queries     │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │          SegmentTable / MemorySegment               │
//! │    • Fixed-capacity chain of registered ranges      │
//! │    • Tagged blocks, address-ordered free list       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Boot
//!
//! ```no_run
//! # use runtime_heap::*;
//! static HEAP: Heap<FirstFitManager, NoCollector> =
//!     Heap::new(FirstFitManager::new(HeapConfig::DEFAULT), NoCollector);
//!
//! unsafe {
//!     HEAP.boot([(
//!         HeapAddress::new(0x2000_0000),
//!         HeapAddress::new(0x2002_0000),
//!         MemoryAttributes::internal_ram(),
//!     )]);
//! }
//! install(&HEAP).unwrap();
//!
//! let object = instance().allocate_from_managed_heap(20).unwrap();
//! unsafe { instance().free_from_managed_heap(object) };
//! ```
//!
//! ## Logging
//!
//! Records go through the [`log`] facade: `debug!` for registration and boot,
//! `trace!` for ranges too small to use, `warn!` when the segment table is
//! full or an allocation has to collect, `error!` when it still fails.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod collector;
mod config;
mod empty;
mod error;
mod first_fit;
mod heap;
pub mod instance;
mod manager;
mod memory_attributes;
mod object_header;
mod segment;
mod segment_table;

pub use collector::{Collector, NoCollector};
pub use config::{DIRTY_PATTERN, HeapConfig};
pub use empty::EmptyManager;
pub use error::HeapError;
pub use first_fit::FirstFitManager;
pub use heap::{Heap, HeapStatistics, MANAGED_ALIGNMENT, ManagedHeap, managed_allocation_size};
pub use instance::{install, instance};
pub use manager::MemoryManager;
pub use memory_attributes::MemoryAttributes;
pub use object_header::{GarbageCollectorFlags, ObjectHeader};
pub use segment::{Blocks, FreeBlocks, HeapBlock, MemorySegment};
pub use segment_table::{Chain, MAX_SEGMENTS, SegmentId, SegmentTable};

pub use runtime_addresses::HeapAddress;
