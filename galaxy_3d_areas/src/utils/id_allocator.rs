/// Allocates and recycles dense `u32` ids.
///
/// Backs area ids: each id indexes a record array and a visibility bit, so
/// ids must stay small and dense. Freed ids go on a stack and are handed out
/// again most-recently-freed first.
///
/// Liveness is tracked per id so that freeing twice, or freeing an id that
/// was never handed out, is caught as a contract violation.
///
/// # Example
///
/// ```ignore
/// let mut ids = IdAllocator::new();
/// let a = ids.alloc();  // 0
/// let b = ids.alloc();  // 1
/// ids.free(a);
/// ids.free(b);
/// assert_eq!(ids.alloc(), 1);  // last freed first
/// assert_eq!(ids.alloc(), 0);
/// ```
pub struct IdAllocator {
    free_list: Vec<u32>,
    live: Vec<bool>,
    len: u32,
}

impl IdAllocator {
    /// Create a new empty allocator
    pub fn new() -> Self {
        Self {
            free_list: Vec::new(),
            live: Vec::new(),
            len: 0,
        }
    }

    /// Allocate an id, reusing the most recently freed one if any
    pub fn alloc(&mut self) -> u32 {
        self.len += 1;
        match self.free_list.pop() {
            Some(id) => {
                self.live[id as usize] = true;
                id
            }
            None => {
                let id = self.live.len() as u32;
                self.live.push(true);
                id
            }
        }
    }

    /// Return an id to the pool
    ///
    /// # Panics
    ///
    /// Panics if `id` is not currently allocated.
    pub fn free(&mut self, id: u32) {
        assert!(self.is_allocated(id), "freeing an id that is not allocated: {}", id);
        self.live[id as usize] = false;
        self.len -= 1;
        self.free_list.push(id);
    }

    /// Whether `id` is currently handed out
    pub fn is_allocated(&self, id: u32) -> bool {
        self.live.get(id as usize).copied().unwrap_or(false)
    }

    /// Highest id ever allocated + 1 (minimum size of id-indexed storage)
    pub fn high_water_mark(&self) -> u32 {
        self.live.len() as u32
    }

    /// Number of currently allocated ids
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no ids are currently allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "id_allocator_tests.rs"]
mod tests;
