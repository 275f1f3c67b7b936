//! Node allocation policies
//!
//! All node storage goes through a [`MemoryPolicy`]: the only coupling
//! between the tree and its storage strategy. The default policy uses the
//! host heap; an arena-backed policy such as [`BumpPolicy`] is a drop-in
//! replacement for incremental-fill / batch-destroy workloads.

pub mod bump;

pub use bump::{BumpPolicy, BumpStats};

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// Pluggable allocation policy for tree nodes.
///
/// A policy may choose between per-node release and bulk teardown:
///
///  * integration with the system/runtime allocator — implement [`free`],
///    leave [`kill`] empty (the default), as [`HeapPolicy`] does;
///  * arena strategies — leave [`free`] as the provided no-op and release
///    everything at once in [`kill`], as [`BumpPolicy`] does.
///
/// The tree calls `free` for every node it unlinks or tears down, and calls
/// `kill` exactly once when it is dropped.
///
/// [`free`]: MemoryPolicy::free
/// [`kill`]: MemoryPolicy::kill
pub trait MemoryPolicy: Send {
    /// Allocate one block for a node. `None` signals exhaustion; the caller
    /// reports it as an allocation failure and leaves the tree unchanged.
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Release one block previously returned by [`alloc`](MemoryPolicy::alloc).
    ///
    /// The default does nothing: policies that only support bulk destruction
    /// defer all release to [`kill`](MemoryPolicy::kill).
    fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        let _ = (ptr, layout);
    }

    /// Release everything still owned by the policy. Invoked once at tree
    /// teardown, after the last [`free`](MemoryPolicy::free).
    fn kill(&mut self) {}
}

/// Default policy backed by the host heap.
///
/// Every node is allocated and freed individually through `std::alloc`.
#[derive(Debug, Default)]
pub struct HeapPolicy;

impl MemoryPolicy for HeapPolicy {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0);
        NonNull::new(unsafe { alloc(layout) })
    }

    fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { dealloc(ptr.as_ptr(), layout) };
    }
}
