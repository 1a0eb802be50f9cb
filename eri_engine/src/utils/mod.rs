//! Small shared helpers

mod slot_allocator;

pub use slot_allocator::SlotAllocator;
