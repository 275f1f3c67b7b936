//! Mutable PATRICIA tree with dual-use nodes
//!
//! The tree is a compressed radix-2 trie keyed by arbitrary-length bit
//! strings. Every node is simultaneously a routing node and a terminal key
//! holder; there is no separate internal/leaf representation and no parent
//! pointer. Each node carries two child slots, and the invariant that every
//! node is reachable by exactly two references (one downward link from the
//! parent, one threaded upward link from a descendant, possibly itself) is
//! used to reconstruct the topology.
//!
//! Edges are classified by branch position alone: `p.child[i]` is a
//! structural downlink iff `p.child[i].bpos > p.bpos`, otherwise it is a
//! threaded uplink. Deletion, lookup and iteration are purely topological
//! operations on this encoding; no key comparison is ever needed to tell a
//! structural edge from a threaded one.
//!
//! Nodes live in raw allocations obtained from the tree's
//! [`MemoryPolicy`]; the key bytes are piggy-backed behind the node header
//! in the same block. The tree is the single owning handle for all of them.

use crate::bits::{bit_diff, get_bit, key_eq};
use crate::error::{BitrieError, Result};
use crate::iter::{IterMode, PatriciaIter, RawIter};
use crate::memory::{HeapPolicy, MemoryPolicy};
use std::alloc::Layout;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::ptr::{self, NonNull};

/// Number of key bytes for a bit length.
#[inline]
pub(crate) fn byte_len(bit_len: u16) -> usize {
    (bit_len as usize + 7) / 8
}

/// A node of a [`PatriciaTree`].
///
/// The node header is followed in the same allocation by the packed key
/// bytes plus one trailing NUL byte that is not counted in the bit length
/// (string-processing convenience only; the prefix semantics never rely on
/// it).
///
/// Nodes are created by [`PatriciaTree::insert`] and destroyed by the
/// removal operations or tree teardown; their addresses are stable across
/// all other operations. The exposed surface is read-only except for the
/// payload word.
#[repr(C)]
pub struct PatriciaNode {
    child: [NonNull<PatriciaNode>; 2],
    payload: Cell<usize>,
    bpos: u16,
    nbit: u16,
}

/// Offset of the piggy-backed key bytes behind the node header.
const DATA_OFFSET: usize = std::mem::size_of::<PatriciaNode>();

impl PatriciaNode {
    /// Allocation layout for a node holding `key_bytes` bytes of key data.
    fn layout(key_bytes: usize) -> Layout {
        let size = DATA_OFFSET + key_bytes + 1; // one extra NUL byte
        // never undershoot the header so references stay in bounds
        let size = size.max(std::mem::size_of::<PatriciaNode>());
        Layout::from_size_align(size, std::mem::align_of::<PatriciaNode>())
            .expect("node layout within address space")
    }

    /// Branch bit position (unity-based; 0 only on the sentinel).
    #[inline]
    pub fn bpos(&self) -> u16 {
        self.bpos
    }

    /// Key length in bits.
    #[inline]
    pub fn bit_len(&self) -> u16 {
        self.nbit
    }

    /// The packed key bytes, `ceil(bit_len / 8)` of them.
    #[inline]
    pub fn key(&self) -> &[u8] {
        let len = byte_len(self.nbit);
        unsafe {
            let base = (self as *const Self as *const u8).add(DATA_OFFSET);
            std::slice::from_raw_parts(base, len)
        }
    }

    /// Payload word stored alongside the key.
    #[inline]
    pub fn payload(&self) -> usize {
        self.payload.get()
    }

    /// Replace the payload word.
    #[inline]
    pub fn set_payload(&self, payload: usize) {
        self.payload.set(payload);
    }

    /// Copyable opaque handle to this node, usable with
    /// [`PatriciaTree::evict`].
    #[inline]
    pub fn node_ref(&self) -> NodeRef {
        NodeRef(NonNull::from(self))
    }

    /// Structural child in slot `idx` (0 or 1), or `None` when the slot
    /// holds a threaded uplink instead of a real subtree.
    pub fn down_child(&self, idx: usize) -> Option<&PatriciaNode> {
        let next = self.child[idx];
        unsafe {
            if next.as_ref().bpos > self.bpos {
                Some(next.as_ref())
            } else {
                None
            }
        }
    }

    #[inline]
    pub(crate) fn child_ptr(&self, idx: usize) -> *mut PatriciaNode {
        self.child[idx].as_ptr()
    }
}

impl fmt::Debug for PatriciaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatriciaNode")
            .field("bpos", &self.bpos)
            .field("bit_len", &self.nbit)
            .field("key", &self.key())
            .field("payload", &self.payload.get())
            .finish()
    }
}

/// Copyable handle identifying a node for removal by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(NonNull<PatriciaNode>);

impl NodeRef {
    #[inline]
    fn as_ptr(self) -> *mut PatriciaNode {
        self.0.as_ptr()
    }
}

// ---------------------------------------------------------------------------
// tree topology relation helpers
// ---------------------------------------------------------------------------

#[inline]
pub(crate) unsafe fn is_parent_of(p: *const PatriciaNode, x: *const PatriciaNode) -> bool {
    // bitwise OR is intentional
    unsafe { ptr::eq((*p).child[0].as_ptr(), x) | ptr::eq((*p).child[1].as_ptr(), x) }
}

#[inline]
unsafe fn other_idx(p: *const PatriciaNode, x: *const PatriciaNode) -> usize {
    unsafe { usize::from(ptr::eq((*p).child[0].as_ptr(), x)) }
}

#[inline]
unsafe fn child_idx(p: *const PatriciaNode, x: *const PatriciaNode) -> usize {
    unsafe { usize::from(ptr::eq((*p).child[1].as_ptr(), x)) }
}

/// Context recorded by the deletion walk: the four pointers that fully
/// determine the topological rewiring.
struct WalkLinks {
    /// true downward-link parent of the match, null in the self-link case
    npar: *mut PatriciaNode,
    /// node visited before `last` on the way down ("grandparent")
    over: *mut PatriciaNode,
    /// last node before the match: the predecessor holding the uplink
    last: *mut PatriciaNode,
}

/// A mutable PATRICIA tree keyed by bit strings of up to 65 535 bits.
///
/// The tree owns its nodes and a pluggable [`MemoryPolicy`] that provides
/// their storage. A permanent sentinel node with `bpos == 0` anchors the
/// structure: the first real node always hangs off `sentinel.child[0]`, so
/// the empty tree and root removal need no special cases.
///
/// The structure is strictly single-threaded: it is `Send` but deliberately
/// not `Sync`, and callers sharing a tree across threads must impose their
/// own reader/writer discipline.
///
/// # Examples
///
/// ```rust
/// use bitrie::PatriciaTree;
///
/// let mut tree = PatriciaTree::new();
/// let (_, inserted) = tree.insert(b"even", 32, 7).unwrap();
/// assert!(inserted);
/// tree.insert(b"evenly", 48, 11).unwrap();
///
/// assert!(tree.lookup(b"even", 32).is_some());
/// assert!(tree.lookup(b"eve", 24).is_none());
/// assert_eq!(tree.prefix(b"evenly-x", 64).unwrap().key(), b"evenly");
/// assert_eq!(tree.remove(b"even", 32), Some(7));
/// ```
pub struct PatriciaTree {
    root: NonNull<PatriciaNode>,
    policy: Box<dyn MemoryPolicy>,
    len: usize,
}

// All nodes are owned by the tree and only reachable through it; the policy
// is Send by trait bound. Interior Cells keep the tree !Sync.
unsafe impl Send for PatriciaTree {}

impl PatriciaTree {
    /// Create an empty tree backed by the host heap.
    pub fn new() -> Self {
        Self::with_policy(Box::new(HeapPolicy))
    }

    /// Create an empty tree with a custom node allocation policy.
    pub fn with_policy(policy: Box<dyn MemoryPolicy>) -> Self {
        let sentinel = Box::into_raw(Box::new(PatriciaNode {
            child: [NonNull::dangling(); 2],
            payload: Cell::new(0),
            bpos: 0,
            nbit: 0,
        }));
        let root = unsafe {
            let root = NonNull::new_unchecked(sentinel);
            (*sentinel).child = [root; 2];
            root
        };

        Self {
            root,
            policy,
            len: 0,
        }
    }

    /// Number of keys currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First real node, or null for the empty tree. Iteration root.
    pub(crate) fn first_node_ptr(&self) -> *const PatriciaNode {
        unsafe {
            let root = self.root.as_ptr();
            let first = (*root).child[0].as_ptr();
            if (*first).bpos > (*root).bpos {
                first
            } else {
                ptr::null()
            }
        }
    }

    // -----------------------------------------------------------------------
    // node lifecycle
    // -----------------------------------------------------------------------

    /// Create a node from a bit string through the allocation policy.
    ///
    /// The raw key bits are counted exactly; one NUL byte is appended after
    /// the key without being accounted for in the bit length.
    fn alloc_node(&self, key: &[u8], bit_len: u16) -> Result<*mut PatriciaNode> {
        let bytes = byte_len(bit_len);
        let layout = PatriciaNode::layout(bytes);
        let raw = self
            .policy
            .alloc(layout)
            .ok_or_else(|| BitrieError::out_of_memory(layout.size()))?;

        let node = raw.cast::<PatriciaNode>().as_ptr();
        unsafe {
            let slot = NonNull::new_unchecked(node);
            ptr::addr_of_mut!((*node).child).write([slot; 2]);
            ptr::addr_of_mut!((*node).payload).write(Cell::new(0));
            ptr::addr_of_mut!((*node).bpos).write(0);
            ptr::addr_of_mut!((*node).nbit).write(bit_len);

            let data = (node as *mut u8).add(DATA_OFFSET);
            ptr::copy_nonoverlapping(key.as_ptr(), data, bytes);
            *data.add(bytes) = 0;
        }
        Ok(node)
    }

    unsafe fn free_node(&self, node: *mut PatriciaNode) {
        unsafe {
            let layout = PatriciaNode::layout(byte_len((*node).nbit));
            self.policy.free(NonNull::new_unchecked(node).cast(), layout);
        }
    }

    // -----------------------------------------------------------------------
    // core operations
    // -----------------------------------------------------------------------

    /// Exact-match lookup.
    ///
    /// Descends by the query's bits at each node's branch position and stops
    /// as soon as the next edge is an uplink; the terminal node is the only
    /// candidate and wins iff its stored key equals the query bit-for-bit.
    ///
    /// `key` must provide `ceil(bit_len / 8)` bytes; shorter buffers report
    /// not-found.
    pub fn lookup(&self, key: &[u8], bit_len: u16) -> Option<&PatriciaNode> {
        if key.len() < byte_len(bit_len) {
            return None;
        }
        unsafe {
            let mut node = (*self.root.as_ptr()).child[0].as_ptr();
            let mut opos = 0u16;
            loop {
                let npos = (*node).bpos;
                if npos <= opos {
                    break;
                }
                opos = npos;
                node = (*node).child[usize::from(get_bit(key, bit_len, npos))].as_ptr();
            }
            if key_eq(key, bit_len, (*node).key(), (*node).nbit) {
                Some(&*node)
            } else {
                None
            }
        }
    }

    /// Longest-prefix lookup: the node with the longest key that is a
    /// bit-prefix of the query, or `None` when no key qualifies.
    ///
    /// A zero-length query has no non-empty prefix and always reports
    /// `None`.
    pub fn prefix(&self, key: &[u8], bit_len: u16) -> Option<&PatriciaNode> {
        if bit_len == 0 || key.len() < byte_len(bit_len) {
            return None;
        }
        unsafe {
            let root = self.root.as_ptr() as *const PatriciaNode;
            let mut best: *const PatriciaNode = ptr::null();
            let mut node = (*self.root.as_ptr()).child[0].as_ptr();
            let mut opos = 0u16;
            loop {
                let npos = (*node).bpos;
                if npos <= opos {
                    break;
                }
                // candidates are collected on the way down; the last proper
                // prefix seen is the best so far
                if (*node).nbit <= bit_len && key_eq(key, (*node).nbit, (*node).key(), (*node).nbit)
                {
                    best = node;
                }
                opos = npos;
                node = (*node).child[usize::from(get_bit(key, bit_len, npos))].as_ptr();
            }
            // the terminal node wins iff its key is a prefix of the query;
            // the sentinel holds no user key and never qualifies
            if !ptr::eq(node, root)
                && (*node).nbit <= bit_len
                && key_eq(key, (*node).nbit, (*node).key(), (*node).nbit)
            {
                Some(&*node)
            } else if best.is_null() {
                None
            } else {
                Some(&*best)
            }
        }
    }

    /// Insert a key, creating a node with the given payload word.
    ///
    /// Returns the node holding the key and a flag telling whether it was
    /// newly created. When the key is already present the existing node is
    /// returned unchanged (the payload argument is ignored) and the flag is
    /// `false`. On allocation failure the tree is unchanged and
    /// [`BitrieError::OutOfMemory`] is returned.
    ///
    /// A zero-length key reads as the all-ones tail extension, which is
    /// exactly the sentinel's position in the topology: inserting it
    /// resolves to the sentinel with `inserted == false`, the permanent
    /// stand-in for the one possible empty key.
    pub fn insert(
        &mut self,
        key: &[u8],
        bit_len: u16,
        payload: usize,
    ) -> Result<(&PatriciaNode, bool)> {
        if key.len() < byte_len(bit_len) {
            return Err(BitrieError::invalid_key(format!(
                "key buffer holds {} bytes, bit length {} needs {}",
                key.len(),
                bit_len,
                byte_len(bit_len)
            )));
        }

        unsafe {
            let root = self.root.as_ptr();

            // locate the terminal node for this key
            let mut last = root;
            let mut next = (*root).child[0].as_ptr();
            while (*next).bpos > (*last).bpos {
                last = next;
                next = (*last).child[usize::from(get_bit(key, bit_len, (*last).bpos))].as_ptr();
            }

            // duplicates are cheap to detect with a plain equality test;
            // the expensive difference scan runs only when a node is due
            if key_eq(key, bit_len, (*next).key(), (*next).nbit) {
                return Ok((&*next, false));
            }

            let bpos = bit_diff(key, bit_len, (*next).key(), (*next).nbit);
            debug_assert!(bpos != 0);

            let node = self.alloc_node(key, bit_len)?;
            (*node).bpos = bpos;
            (*node).payload.set(payload);

            // find the insert parent: another walk, depth-limited by the
            // branch position just computed
            let mut pdir = false;
            last = root;
            next = (*root).child[0].as_ptr();
            while (*next).bpos > (*last).bpos && (*next).bpos < bpos {
                last = next;
                pdir = get_bit(key, bit_len, (*last).bpos);
                next = (*last).child[usize::from(pdir)].as_ptr();
            }

            // the key's own bit at the branch position picks the self-link
            // slot; the cut edge goes into the other one
            let ndir = get_bit(key, bit_len, bpos);
            (*node).child[usize::from(ndir)] = NonNull::new_unchecked(node);
            (*node).child[usize::from(!ndir)] = NonNull::new_unchecked(next);
            (*last).child[usize::from(pdir)] = NonNull::new_unchecked(node);

            self.len += 1;
            Ok((&*node, true))
        }
    }

    /// Remove a key, returning the payload of the deleted node.
    pub fn remove(&mut self, key: &[u8], bit_len: u16) -> Option<usize> {
        let node = self.lookup(key, bit_len)? as *const PatriciaNode;
        let links = self.walk_to(node)?;
        unsafe {
            let payload = (*node).payload.get();
            self.unlink_node(&links, node as *mut PatriciaNode);
            Some(payload)
        }
    }

    /// Remove a node by identity.
    ///
    /// The node's membership is verified by a fresh descent along its own
    /// key bits; a node that does not belong to this tree is reported with
    /// `false` and the tree is left unchanged.
    ///
    /// # Safety
    ///
    /// `node` must refer to a node that is still alive (in this tree or
    /// another one); a handle whose node has already been removed or whose
    /// tree has been dropped must not be passed.
    pub unsafe fn evict(&mut self, node: NodeRef) -> bool {
        let ptr = node.as_ptr();
        match self.walk_to(ptr) {
            Some(links) => {
                unsafe { self.unlink_node(&links, ptr) };
                true
            }
            None => false,
        }
    }

    /// Walk from the root to `node`, recording the grandparent, the
    /// predecessor and the true downlink parent on the way.
    ///
    /// Fails when `node` is not reachable from the root along its own key
    /// bits, which is what detects foreign nodes.
    fn walk_to(&self, node: *const PatriciaNode) -> Option<WalkLinks> {
        unsafe {
            let root = self.root.as_ptr();
            if node.is_null() || ptr::eq(node, root) {
                return None;
            }

            let key = (*node).key();
            let nbit = (*node).nbit;

            let mut npar: *mut PatriciaNode = ptr::null_mut();
            let mut over = root;
            let mut last = root;
            let mut next = (*root).child[0].as_ptr();
            while (*next).bpos > (*last).bpos {
                if ptr::eq(node, next) {
                    npar = last;
                }
                over = last;
                last = next;
                next = (*next).child[usize::from(get_bit(key, nbit, (*next).bpos))].as_ptr();
            }

            if !ptr::eq(node, next) {
                return None;
            }
            debug_assert!(is_parent_of(over, last));
            debug_assert!(is_parent_of(last, next));
            Some(WalkLinks { npar, over, last })
        }
    }

    /// Detach and free a matched node given its walk context.
    ///
    /// Purely topological: no key bits are consulted. Step I bypasses the
    /// predecessor on the path grandparent -> predecessor -> node, which in
    /// the self-link case already removes the node. Step II, needed only
    /// when the node is not its own predecessor, splices the predecessor
    /// into the node's structural position, adopting both children and the
    /// branch position.
    unsafe fn unlink_node(&mut self, links: &WalkLinks, x: *mut PatriciaNode) {
        unsafe {
            let p = links.last;
            let g = links.over;
            debug_assert!(is_parent_of(p, x));
            debug_assert!(is_parent_of(g, p));

            (*g).child[child_idx(g, p)] = (*p).child[other_idx(p, x)];

            if !ptr::eq(x, p) {
                let z = links.npar;
                debug_assert!(!z.is_null());
                debug_assert!(is_parent_of(z, x));

                (*z).child[child_idx(z, x)] = NonNull::new_unchecked(p);
                (*p).child[0] = (*x).child[0];
                (*p).child[1] = (*x).child[1];
                (*p).bpos = (*x).bpos;
            }

            self.free_node(x);
        }
        self.len -= 1;
    }

    /// Keep only the nodes the predicate accepts.
    ///
    /// Walks in forward post-order, the one traversal that tolerates
    /// removing the node just visited: its subtree is complete when it is
    /// yielded, so the splice cannot disturb the remaining walk.
    pub fn retain<F: FnMut(&PatriciaNode) -> bool>(&mut self, mut f: F) {
        let mut walk = RawIter::new(self.first_node_ptr(), true, IterMode::Post);
        loop {
            let node = walk.step_forward();
            if node.is_null() {
                break;
            }
            if !f(unsafe { &*node }) {
                if let Some(links) = self.walk_to(node) {
                    unsafe { self.unlink_node(&links, node as *mut PatriciaNode) };
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // bulk teardown
    // -----------------------------------------------------------------------

    /// Remove every node, invoking `deleter` with each payload word.
    ///
    /// A recursive free would need unbounded stack, so the tree is squeezed
    /// through a funnel instead: the right spine of each left subtree
    /// receives the pending right branch, flattening the whole structure
    /// into a single-linked list in O(n). Funnelled nodes must not be freed
    /// immediately (their uplinks are still referenced); they are collected
    /// on a dead list threaded through `child[0]` with `bpos` forced to 0,
    /// and released in a second sweep.
    pub fn clear_with<F: FnMut(usize)>(&mut self, mut deleter: F) {
        unsafe {
            let root = self.root.as_ptr();

            // cut the tree from the sentinel first
            let mut hold = (*root).child[0].as_ptr();
            (*root).child[0] = self.root;
            (*root).child[1] = self.root;

            // Force the rightmost leaf to the sentinel ONCE: the funnel
            // destroys the branch-position relation on right subtrees, so an
            // unambiguous termination marker is needed up front.
            let mut scan = hold;
            while (*(*scan).child[1].as_ptr()).bpos > (*scan).bpos {
                scan = (*scan).child[1].as_ptr();
            }
            (*scan).child[1] = self.root;

            let mut list: *mut PatriciaNode = root; // sentinel-terminated
            while !ptr::eq(hold, root) {
                let mut next = (*hold).child[0].as_ptr(); // never null, subtree intact
                let tail = (*hold).child[1]; // never null, degraded by funnel
                if (*next).bpos <= (*hold).bpos {
                    // left slot is an uplink: continue through the right one
                    next = tail.as_ptr();
                } else {
                    // graft the tail onto the rightmost link of the left
                    // subtree's right spine; every node is re-visited at
                    // most twice across all rounds, keeping the whole
                    // decomposition linear
                    let mut scan = next;
                    while (*(*scan).child[1].as_ptr()).bpos > (*scan).bpos {
                        scan = (*scan).child[1].as_ptr();
                    }
                    (*scan).child[1] = tail;
                }

                // push onto the dead list; zero bpos so any remaining
                // reference reads as an uplink in later rounds
                (*hold).bpos = 0;
                (*hold).child[0] = NonNull::new_unchecked(list);
                list = hold;
                hold = next;
            }

            let mut freed = 0usize;
            while !ptr::eq(list, root) {
                let dead = list;
                list = (*dead).child[0].as_ptr();
                deleter((*dead).payload.get());
                self.free_node(dead);
                freed += 1;
            }
            debug_assert_eq!(freed, self.len);
            log::debug!("patricia teardown: {} nodes released", freed);
            self.len = 0;
        }
    }

    /// Remove every node. The tree stays usable afterwards.
    pub fn clear(&mut self) {
        self.clear_with(|_| {});
    }

    // -----------------------------------------------------------------------
    // iteration entry points
    // -----------------------------------------------------------------------

    /// Forward (left-to-right) iteration over the whole tree.
    pub fn iter(&self, mode: IterMode) -> PatriciaIter<'_> {
        PatriciaIter::new(self, None, true, mode)
    }

    /// Reverse (right-to-left) iteration over the whole tree.
    pub fn iter_rev(&self, mode: IterMode) -> PatriciaIter<'_> {
        PatriciaIter::new(self, None, false, mode)
    }

    /// Iteration over the subtree rooted at `root` (the whole tree when
    /// `None`), with explicit direction.
    pub fn iter_from<'a>(
        &'a self,
        root: Option<&'a PatriciaNode>,
        forward: bool,
        mode: IterMode,
    ) -> PatriciaIter<'a> {
        PatriciaIter::new(self, root, forward, mode)
    }

    // -----------------------------------------------------------------------
    // diagnostics
    // -----------------------------------------------------------------------

    /// Verify the structural invariants.
    ///
    /// Counts incoming references over a downlink walk (the sentinel's
    /// `child[0]` is the single root reference) and checks that every real
    /// node is referenced exactly twice, that self-links sit on the slot
    /// selected by the node's own bit at its branch position, and that the
    /// walk reaches exactly `len` nodes.
    pub fn validate(&self) -> Result<()> {
        unsafe {
            let root = self.root.as_ptr() as *const PatriciaNode;
            let first = self.first_node_ptr();
            if first.is_null() {
                return if self.len == 0 {
                    Ok(())
                } else {
                    Err(BitrieError::corrupted_tree(format!(
                        "empty topology but len is {}",
                        self.len
                    )))
                };
            }

            let mut refs: HashMap<*const PatriciaNode, u32> = HashMap::new();
            *refs.entry(first).or_insert(0) += 1; // root reference

            let mut reached = 0usize;
            let mut stack = vec![first];
            while let Some(node) = stack.pop() {
                reached += 1;
                for idx in 0..2 {
                    let next = (*node).child[idx].as_ptr() as *const PatriciaNode;
                    *refs.entry(next).or_insert(0) += 1;
                    if (*next).bpos > (*node).bpos {
                        stack.push(next);
                    } else if ptr::eq(next, node) {
                        let own = get_bit((*node).key(), (*node).nbit, (*node).bpos);
                        if usize::from(own) != idx {
                            return Err(BitrieError::corrupted_tree(format!(
                                "self-link of node with bpos {} sits on slot {}",
                                (*node).bpos,
                                idx
                            )));
                        }
                    }
                }
            }

            if reached != self.len {
                return Err(BitrieError::corrupted_tree(format!(
                    "downlink walk reached {} nodes, len is {}",
                    reached, self.len
                )));
            }
            for (&node, &count) in &refs {
                if !ptr::eq(node, root) && count != 2 {
                    return Err(BitrieError::corrupted_tree(format!(
                        "node with bpos {} referenced {} times",
                        (*node).bpos,
                        count
                    )));
                }
            }
            Ok(())
        }
    }

    pub(crate) fn sentinel_ptr(&self) -> *const PatriciaNode {
        self.root.as_ptr()
    }
}

impl Default for PatriciaTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PatriciaTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatriciaTree").field("len", &self.len).finish()
    }
}

impl Drop for PatriciaTree {
    fn drop(&mut self) {
        self.clear_with(|_| {});
        self.policy.kill();
        unsafe { drop(Box::from_raw(self.root.as_ptr())) };
    }
}
