//! # Bitrie: Mutable PATRICIA Tree over Bit Strings
//!
//! This crate provides a mutable, in-memory compressed radix-2 trie
//! (PATRICIA tree) keyed by arbitrary-length bit strings, built around a
//! compact *dual-use node* representation: every node is simultaneously a
//! routing node and a terminal key holder.
//!
//! ## Key Features
//!
//! - **Dual-use nodes**: no separate internal/leaf structure, no parent
//!   pointers; the topology is encoded by one downlink and one threaded
//!   uplink per node
//! - **Bit-granular keys**: keys are bit strings of up to 65 535 bits with
//!   explicit bit length, big-endian within each byte
//! - **Topological deletion**: removal rewires at most three pointers and
//!   never consults key bits
//! - **Six-mode iteration**: {pre, in, post}-order x {forward, reverse},
//!   resumable, driven by a bounded parent FIFO with deterministic recovery
//! - **Pluggable allocation**: nodes are carved out of a [`MemoryPolicy`];
//!   a bump arena with batch teardown is included
//! - **Linear teardown**: bulk destruction flattens the tree through a
//!   funnel in O(n) without recursion
//!
//! ## Quick Start
//!
//! ```rust
//! use bitrie::{IterMode, PatriciaTree};
//!
//! let mut tree = PatriciaTree::new();
//!
//! // keys carry an explicit bit length and a payload word
//! tree.insert(b"even", 32, 4).unwrap();
//! tree.insert(b"evenly", 48, 6).unwrap();
//!
//! assert!(tree.lookup(b"even", 32).is_some());
//! assert!(tree.lookup(b"eve", 24).is_none());
//!
//! // longest-prefix match
//! let best = tree.prefix(b"evenly-dressed", 112).unwrap();
//! assert_eq!(best.key(), b"evenly");
//!
//! // six traversal flavors
//! let keys: Vec<_> = tree.iter(IterMode::Pre).map(|n| n.key().to_vec()).collect();
//! assert_eq!(keys.len(), 2);
//!
//! assert_eq!(tree.remove(b"even", 32), Some(4));
//! ```
//!
//! ## Threading
//!
//! The tree is single-threaded by design: `Send` but not `Sync`. Sharing a
//! tree between threads requires an external reader/writer discipline.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod bits;
pub mod dump;
pub mod error;
pub mod iter;
pub mod memory;
pub mod tree;

// Re-export core types
pub use bits::{bit_diff, get_bit, key_eq};
pub use dump::{write_dot, write_text, DotLabel};
pub use error::{BitrieError, Result};
pub use iter::{IterMode, PatriciaIter};
pub use memory::{BumpPolicy, BumpStats, HeapPolicy, MemoryPolicy};
pub use tree::{NodeRef, PatriciaNode, PatriciaTree};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently no-op, for future use)
pub fn init() {
    log::debug!("Initializing bitrie v{}", VERSION);
}
