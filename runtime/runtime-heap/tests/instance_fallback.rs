mod common;

use common::{CountingCollector, first_fit_heap};
use runtime_heap::instance::is_resolved;
use runtime_heap::{GarbageCollectorFlags, HeapAddress, HeapError, ObjectHeader, install, instance};

#[test]
fn unset_instance_falls_back_to_the_empty_heap() {
    assert!(!is_resolved());
    let heap = instance();
    assert!(is_resolved());
    assert!(core::ptr::addr_eq(heap, instance()));

    assert_eq!(
        heap.allocate_from_managed_heap(8),
        Err(HeapError::OutOfMemory { requested: 8 })
    );
    assert!(heap.contains_address(HeapAddress::new(0x1234)));
    assert!(heap.contains_address(HeapAddress::NULL));
    assert_eq!(heap.start_of_heap(), None);
    assert_eq!(heap.available_memory(), 0);
    assert_eq!(heap.allocated_memory(), 0);
    assert_eq!(heap.consistency_check(), Ok(()));
    assert_eq!(
        heap.is_object_alive(HeapAddress::new(0x1234)),
        Err(HeapError::Unsupported("is_object_alive"))
    );
    heap.zero_free_memory();
    heap.dirty_free_memory();

    // Freeing still stamps the header; the strategy ignores the block.
    let mut object = [u32::MAX; 2];
    let header = HeapAddress::from_ptr(object.as_mut_ptr());
    unsafe { heap.free_from_managed_heap(header.increment(ObjectHeader::HEADER_SIZE)) };
    assert_eq!(object[0], GarbageCollectorFlags::FREE_BLOCK.into_bits());
    assert_eq!(object[1], u32::MAX);

    // The fallback was handed out, so it stays.
    let real = first_fit_heap(&[0x1000], CountingCollector::default());
    assert_eq!(install(real), Err(HeapError::AlreadyInstalled));
    assert!(instance().allocate_from_managed_heap(8).is_err());
}
