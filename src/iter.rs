//! Six-mode tree iteration driven by a finite state machine
//!
//! The tree stores no parent pointers, so going upward needs either an
//! unbounded ancestor stack or a fresh root-to-node walk. The iterator takes
//! a hybrid approach: a bounded FIFO of parents, filled on the way down and
//! consumed on the way up, acting as a cache. When the FIFO runs dry, one
//! recovery descent from the iteration root refills it. With the default
//! capacity of 8 a recovery walk happens at most once every 256 steps, and
//! walking down a PATRICIA tree is cheap since only bits are extracted.
//!
//! One stepping function drives all three enumeration modes in both
//! directions, forward and backward, from two small transition tables. The
//! machine keeps exactly one cursor (`node`) and one state describing how
//! the cursor was entered; no state ever encodes a partially-processed
//! subtree, which is what makes suspension between steps safe.

use crate::bits::get_bit;
use crate::tree::{is_parent_of, PatriciaNode, PatriciaTree};
use std::marker::PhantomData;
use std::ptr;

/// Enumeration modes for tree traversal.
///
/// A node is yielded on first entry in pre-order, between its two in-order
/// subtrees in in-order, and after both subtrees in post-order. Which child
/// counts as "first" is decided by the iteration direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IterMode {
    /// Yield on entry, before either subtree.
    Pre,
    /// Yield between the first and the second subtree.
    In,
    /// Yield after both subtrees are complete.
    Post,
}

/// Bounded parent FIFO capacity. Power of two; 4/8/16 are sensible sizes.
const FIFO_CAPACITY: usize = 8;

/// How the cursor node was entered. The meaning is historical: it encodes
/// how we arrived, not what happens next. The cursor itself is null in
/// `Head`/`Tail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first reachable node.
    Head = 0,
    /// Just descended into the node from its parent.
    Down = 1,
    /// Returned from the first in-order subtree.
    UpC1 = 2,
    /// Returned from the second in-order subtree.
    UpC2 = 3,
    /// After the last reachable node.
    Tail = 4,
}

/// Where a transition leaves the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WayOut {
    /// (Re-)enter the iteration root.
    Root,
    /// Descend into the first in-order child.
    DownC1,
    /// Descend into the second in-order child.
    DownC2,
    /// Ascend to the parent.
    Up,
    /// Drop out of the tree.
    Null,
}

struct Transition {
    out: WayOut,
    /// State to assume when the movement fails; successful movements
    /// overwrite it.
    fallback: State,
    /// Dispatch boundary this transition crosses; the node is yielded when
    /// it matches the iterator mode.
    dispatch: Option<IterMode>,
}

const fn t(out: WayOut, fallback: State, dispatch: Option<IterMode>) -> Transition {
    Transition {
        out,
        fallback,
        dispatch,
    }
}

/// Transition table for stepping forward, indexed by [`State`].
const FWD_TABLE: [Transition; 5] = [
    t(WayOut::Root, State::Tail, None),
    t(WayOut::DownC1, State::UpC1, Some(IterMode::Pre)),
    t(WayOut::DownC2, State::UpC2, Some(IterMode::In)),
    t(WayOut::Up, State::Tail, Some(IterMode::Post)),
    t(WayOut::Null, State::Tail, None),
];

/// Transition table for stepping backward: the forward table mirrored, with
/// the roles of the two up-states and of root/null swapped.
const REV_TABLE: [Transition; 5] = [
    t(WayOut::Null, State::Head, None),
    t(WayOut::DownC2, State::UpC2, Some(IterMode::Post)),
    t(WayOut::Up, State::Head, Some(IterMode::Pre)),
    t(WayOut::DownC1, State::UpC1, Some(IterMode::In)),
    t(WayOut::Root, State::Head, None),
];

/// Structural child of `node` in slot `side`, or null when that slot holds
/// an uplink.
unsafe fn down_child(node: *const PatriciaNode, side: bool) -> *const PatriciaNode {
    if node.is_null() {
        return ptr::null();
    }
    unsafe {
        let next = (*node).child_ptr(usize::from(side));
        if (*node).bpos() < (*next).bpos() {
            next
        } else {
            ptr::null()
        }
    }
}

/// Lifetime-free iteration engine. The caller guarantees the tree outlives
/// the walk and is not mutated except through the post-order contract.
pub(crate) struct RawIter {
    root: *const PatriciaNode,
    node: *const PatriciaNode,
    fifo: [*const PatriciaNode; FIFO_CAPACITY],
    fifo_len: u8,
    fifo_top: u8,
    state: State,
    mode: IterMode,
    forward: bool,
}

impl RawIter {
    pub(crate) fn new(root: *const PatriciaNode, forward: bool, mode: IterMode) -> Self {
        Self {
            root,
            node: ptr::null(),
            fifo: [ptr::null(); FIFO_CAPACITY],
            fifo_len: 0,
            fifo_top: 0,
            state: State::Head,
            mode,
            forward,
        }
    }

    /// Rewind before the first node. Stale FIFO entries are harmless: the
    /// next root entry clears the window.
    pub(crate) fn reset(&mut self) {
        self.state = State::Head;
    }

    fn push_parent(&mut self, node: *const PatriciaNode) {
        self.fifo[self.fifo_top as usize] = node;
        self.fifo_top = (self.fifo_top + 1) & (FIFO_CAPACITY as u8 - 1);
        if usize::from(self.fifo_len) < FIFO_CAPACITY {
            self.fifo_len += 1;
        }
    }

    /// Parent of `node`, from the FIFO when possible, else by a recovery
    /// descent from the iteration root that re-registers the ancestors.
    /// Null when `node` is the iteration root.
    unsafe fn pop_parent(&mut self, node: *const PatriciaNode) -> *const PatriciaNode {
        unsafe {
            while self.fifo_len != 0 {
                self.fifo_len -= 1;
                self.fifo_top = self.fifo_top.wrapping_sub(1) & (FIFO_CAPACITY as u8 - 1);
                let next = self.fifo[self.fifo_top as usize];
                if is_parent_of(next, node) && (*next).bpos() < (*node).bpos() {
                    return next;
                }
            }

            // The iteration root has no parent in our context; the walk below
            // would find out, but the check is cheap compared to a walk.
            if ptr::eq(node, self.root) {
                return ptr::null();
            }

            let key = (*node).key();
            let nbit = (*node).bit_len();
            let mut last = self.root;
            let mut next = (*last).child_ptr(usize::from(get_bit(key, nbit, (*last).bpos())));
            while !ptr::eq(next, node) && (*next).bpos() > (*last).bpos() {
                self.push_parent(last);
                last = next;
                next = (*last).child_ptr(usize::from(get_bit(key, nbit, (*last).bpos())));
            }

            // We really should have ended at `node`; flag failure otherwise.
            if !ptr::eq(next, node) || (*next).bpos() <= (*last).bpos() {
                self.fifo_len = 0;
                return ptr::null();
            }
            last
        }
    }

    fn step(&mut self, table: &[Transition; 5]) -> *const PatriciaNode {
        let mut state = self.state;
        let mut next = self.node;
        let mut last;

        loop {
            last = next;

            let tr = &table[state as usize];
            let yield_now = tr.dispatch == Some(self.mode);
            let out = tr.out;
            state = tr.fallback; // failure default, normally replaced below

            unsafe {
                match out {
                    WayOut::Root => {
                        next = self.root;
                        if !next.is_null() {
                            self.fifo_len = 0;
                            self.fifo_top = 0;
                            state = State::Down;
                        }
                    }
                    WayOut::DownC1 | WayOut::DownC2 => {
                        let side = (out == WayOut::DownC2) == self.forward;
                        next = down_child(last, side);
                        if !next.is_null() {
                            self.push_parent(last);
                            state = State::Down;
                        } else {
                            next = last; // state shifts, the position does not
                        }
                    }
                    WayOut::Up => {
                        next = self.pop_parent(last);
                        if !next.is_null() {
                            state = if ptr::eq(last, (*next).child_ptr(usize::from(self.forward)))
                            {
                                State::UpC2
                            } else {
                                State::UpC1
                            };
                        }
                    }
                    WayOut::Null => next = ptr::null(),
                }
            }

            if yield_now || out == WayOut::Null {
                break;
            }
        }

        self.node = next;
        self.state = state;
        last
    }

    pub(crate) fn step_forward(&mut self) -> *const PatriciaNode {
        self.step(&FWD_TABLE)
    }

    pub(crate) fn step_backward(&mut self) -> *const PatriciaNode {
        self.step(&REV_TABLE)
    }
}

/// Resumable iterator over the nodes of a [`PatriciaTree`].
///
/// Six traversal flavors: {pre, in, post}-order, each forward
/// (left-to-right) or reverse. Only structural downlink children are
/// visited; threaded uplinks are never followed as tree edges.
///
/// The `Iterator` implementation performs logical forward steps; [`prev`]
/// steps backward through the same sequence, and the two may be mixed
/// freely. A walk may be suspended between any two steps — the iterator
/// captures the full continuation — but the borrow keeps the tree immutable
/// until the iterator is gone. For removing nodes mid-walk use
/// [`PatriciaTree::retain`], which expresses the one traversal order where
/// that is sound.
///
/// [`prev`]: PatriciaIter::prev
pub struct PatriciaIter<'a> {
    raw: RawIter,
    _tree: PhantomData<&'a PatriciaTree>,
}

impl<'a> PatriciaIter<'a> {
    pub(crate) fn new(
        tree: &'a PatriciaTree,
        root: Option<&'a PatriciaNode>,
        forward: bool,
        mode: IterMode,
    ) -> Self {
        let root = match root {
            Some(node) => node as *const PatriciaNode,
            None => tree.first_node_ptr(),
        };
        Self {
            raw: RawIter::new(root, forward, mode),
            _tree: PhantomData,
        }
    }

    /// Logical backward step: the mirror image of `next`.
    pub fn prev(&mut self) -> Option<&'a PatriciaNode> {
        let node = self.raw.step_backward();
        if node.is_null() {
            None
        } else {
            Some(unsafe { &*node })
        }
    }

    /// Rewind to the position before the first node.
    pub fn reset(&mut self) {
        self.raw.reset();
    }

    /// The enumeration mode this iterator dispatches on.
    pub fn mode(&self) -> IterMode {
        self.raw.mode
    }

    /// Whether this iterator walks left-to-right.
    pub fn is_forward(&self) -> bool {
        self.raw.forward
    }
}

impl<'a> Iterator for PatriciaIter<'a> {
    type Item = &'a PatriciaNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.raw.step_forward();
        if node.is_null() {
            None
        } else {
            Some(unsafe { &*node })
        }
    }
}

impl<'a> std::iter::FusedIterator for PatriciaIter<'a> {}
