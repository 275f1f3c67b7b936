//! Bump-arena allocation policy for batch-destroy workloads
//!
//! Bump allocation is extremely fast for allocation-heavy workloads where
//! objects share a lifetime and can be released all at once. Nodes handed
//! out by this policy are never freed individually; the whole arena is
//! released when the owning tree is dropped.

use crate::memory::MemoryPolicy;
use std::alloc::{alloc, dealloc, Layout};
use std::cell::Cell;
use std::ptr::NonNull;

/// A bump arena that carves node blocks sequentially out of one buffer.
///
/// `free` is intentionally the no-op default: releasing memory is deferred
/// to [`kill`](MemoryPolicy::kill), which drops the whole buffer. An
/// exhausted arena reports allocation failure instead of growing.
pub struct BumpPolicy {
    buffer: NonNull<u8>,
    capacity: usize,
    current: Cell<usize>,
    allocated_bytes: Cell<u64>,
    allocated_blocks: Cell<u64>,
    dead: bool,
}

impl BumpPolicy {
    /// Create a new bump arena with the specified capacity in bytes.
    ///
    /// Returns `None` when the backing buffer cannot be obtained.
    pub fn new(capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return None;
        }

        let layout = Layout::from_size_align(capacity, Self::ALIGN).ok()?;
        let ptr = NonNull::new(unsafe { alloc(layout) })?;

        Some(Self {
            buffer: ptr,
            capacity,
            current: Cell::new(0),
            allocated_bytes: Cell::new(0),
            allocated_blocks: Cell::new(0),
            dead: false,
        })
    }

    const ALIGN: usize = std::mem::align_of::<usize>();

    /// Total capacity of the arena.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes remaining.
    pub fn remaining_bytes(&self) -> usize {
        self.capacity - self.current.get()
    }

    /// Check if the arena can satisfy an allocation with the given layout.
    pub fn can_allocate(&self, layout: Layout) -> bool {
        let current = self.current.get();
        let aligned = (current + layout.align() - 1) & !(layout.align() - 1);
        aligned + layout.size() <= self.capacity
    }

    /// Get allocation statistics.
    pub fn stats(&self) -> BumpStats {
        BumpStats {
            allocated_bytes: self.allocated_bytes.get(),
            allocated_blocks: self.allocated_blocks.get(),
            capacity: self.capacity,
            remaining_bytes: self.remaining_bytes(),
        }
    }

    fn release_buffer(&mut self) {
        if !self.dead {
            self.dead = true;
            let layout = Layout::from_size_align(self.capacity, Self::ALIGN)
                .expect("layout validated at construction");
            unsafe { dealloc(self.buffer.as_ptr(), layout) };
        }
    }
}

impl MemoryPolicy for BumpPolicy {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.dead || layout.size() == 0 || layout.align() > Self::ALIGN {
            return None;
        }

        let current = self.current.get();
        let aligned = (current + layout.align() - 1) & !(layout.align() - 1);
        let end = aligned + layout.size();
        if end > self.capacity {
            return None;
        }

        self.current.set(end);
        self.allocated_bytes
            .set(self.allocated_bytes.get() + layout.size() as u64);
        self.allocated_blocks.set(self.allocated_blocks.get() + 1);

        let ptr = unsafe { self.buffer.as_ptr().add(aligned) };
        Some(unsafe { NonNull::new_unchecked(ptr) })
    }

    // free: inherited no-op; everything is released in kill

    fn kill(&mut self) {
        log::debug!(
            "bump arena kill: {} blocks / {} bytes in {} byte arena",
            self.allocated_blocks.get(),
            self.allocated_bytes.get(),
            self.capacity
        );
        self.release_buffer();
    }
}

// The arena hands out raw blocks but is only ever driven from one thread at
// a time; the owning tree is itself !Sync.
unsafe impl Send for BumpPolicy {}

impl Drop for BumpPolicy {
    fn drop(&mut self) {
        self.release_buffer();
    }
}

/// Statistics for bump arena usage
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BumpStats {
    /// Number of bytes handed out
    pub allocated_bytes: u64,
    /// Number of blocks handed out
    pub allocated_blocks: u64,
    /// Total capacity of the arena
    pub capacity: usize,
    /// Number of bytes remaining
    pub remaining_bytes: usize,
}

impl BumpStats {
    /// Get the utilization ratio (0.0 to 1.0)
    pub fn utilization(&self) -> f64 {
        self.allocated_bytes as f64 / self.capacity as f64
    }
}
