/// Allocates and recycles small integer slots, optionally bounded.
///
/// Used for hardware light slots (bounded) and renderer handle ids
/// (unbounded). The lowest free slot is always handed out first.
///
/// # Example
///
/// ```ignore
/// let mut lights = SlotAllocator::with_capacity(2);
/// let a = lights.alloc();  // Some(0)
/// let b = lights.alloc();  // Some(1)
/// lights.alloc();          // None, exhausted
/// lights.free(0);
/// lights.alloc();          // Some(0)
/// ```
pub struct SlotAllocator {
    used: Vec<bool>,
    capacity: Option<usize>,
    len: usize,
}

impl SlotAllocator {
    /// Unbounded allocator
    pub fn new() -> Self {
        Self { used: Vec::new(), capacity: None, len: 0 }
    }

    /// Allocator that never hands out more than `capacity` slots at once
    pub fn with_capacity(capacity: usize) -> Self {
        Self { used: vec![false; capacity], capacity: Some(capacity), len: 0 }
    }

    /// Take the lowest free slot
    pub fn alloc(&mut self) -> Option<usize> {
        let slot = match self.used.iter().position(|used| !used) {
            Some(slot) => slot,
            None => {
                if self.capacity.is_some() {
                    return None;
                }
                self.used.push(false);
                self.used.len() - 1
            }
        };
        self.used[slot] = true;
        self.len += 1;
        Some(slot)
    }

    /// Return a slot; freeing a slot that is not taken is ignored
    pub fn free(&mut self, slot: usize) {
        debug_assert!(self.is_allocated(slot), "freeing an unallocated slot: {}", slot);
        if let Some(used) = self.used.get_mut(slot) {
            if *used {
                *used = false;
                self.len -= 1;
            }
        }
    }

    pub fn is_allocated(&self, slot: usize) -> bool {
        self.used.get(slot).copied().unwrap_or(false)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of currently allocated slots
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
