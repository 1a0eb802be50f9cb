use super::*;

// ============================================================================
// Unbounded
// ============================================================================

#[test]
fn test_sequential_alloc() {
    let mut alloc = SlotAllocator::new();
    assert_eq!(alloc.alloc(), Some(0));
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), Some(2));
    assert_eq!(alloc.len(), 3);
    assert_eq!(alloc.capacity(), None);
}

#[test]
fn test_lowest_free_slot_is_reused_first() {
    let mut alloc = SlotAllocator::new();
    for _ in 0..4 {
        alloc.alloc();
    }
    alloc.free(3);
    alloc.free(1);
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), Some(3));
    assert_eq!(alloc.alloc(), Some(4));
}

#[test]
fn test_default_is_empty() {
    let alloc = SlotAllocator::default();
    assert!(alloc.is_empty());
    assert!(!alloc.is_allocated(0));
}

// ============================================================================
// Bounded
// ============================================================================

#[test]
fn test_bounded_exhaustion() {
    let mut alloc = SlotAllocator::with_capacity(2);
    assert_eq!(alloc.alloc(), Some(0));
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), None);
    assert_eq!(alloc.len(), 2);

    alloc.free(0);
    assert!(!alloc.is_allocated(0));
    assert_eq!(alloc.alloc(), Some(0));
}

#[test]
fn test_zero_capacity_never_allocates() {
    let mut alloc = SlotAllocator::with_capacity(0);
    assert_eq!(alloc.alloc(), None);
    assert!(alloc.is_empty());
}
