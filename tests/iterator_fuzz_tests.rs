//! Randomized and property-based tests
//!
//! Seeded random key sets drive the six iteration modes against recursive
//! reference traversals, and proptest checks the structural laws that must
//! hold for arbitrary key sets: iteration completeness, order duality,
//! insert/remove round trips and prefix containment.

use bitrie::{IterMode, PatriciaNode, PatriciaTree};
use proptest::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;

const MODES: [IterMode; 3] = [IterMode::Pre, IterMode::In, IterMode::Post];

fn bits(key: &[u8]) -> u16 {
    (key.len() * 8) as u16
}

// =============================================================================
// REFERENCE TRAVERSALS
// =============================================================================

fn ref_walk(
    node: &PatriciaNode,
    mode: IterMode,
    forward: bool,
    out: &mut Vec<*const PatriciaNode>,
) {
    let (c1, c2) = if forward { (0, 1) } else { (1, 0) };
    if mode == IterMode::Pre {
        out.push(node);
    }
    if let Some(child) = node.down_child(c1) {
        ref_walk(child, mode, forward, out);
    }
    if mode == IterMode::In {
        out.push(node);
    }
    if let Some(child) = node.down_child(c2) {
        ref_walk(child, mode, forward, out);
    }
    if mode == IterMode::Post {
        out.push(node);
    }
}

fn reference(tree: &PatriciaTree, mode: IterMode, forward: bool) -> Vec<*const PatriciaNode> {
    let mut out = Vec::new();
    if let Some(root) = tree.iter(IterMode::Pre).next() {
        ref_walk(root, mode, forward, &mut out);
    }
    out
}

fn collected(tree: &PatriciaTree, mode: IterMode, forward: bool) -> Vec<*const PatriciaNode> {
    tree.iter_from(None, forward, mode)
        .map(|n| n as *const PatriciaNode)
        .collect()
}

// =============================================================================
// SEEDED FUZZ RUNS
// =============================================================================

fn build_random_tree(nkeys: usize, seed: u64) -> (PatriciaTree, usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = PatriciaTree::new();
    let mut unique = 0usize;

    for _ in 0..nkeys {
        let len = rng.gen_range(1..=16);
        let key: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let (_, inserted) = tree.insert(&key, bits(&key), unique).unwrap();
        if inserted {
            unique += 1;
        }
    }
    (tree, unique)
}

fn fuzz_one_run(nkeys: usize, seed: u64) {
    let (tree, unique) = build_random_tree(nkeys, seed);
    assert_eq!(tree.len(), unique);
    tree.validate().unwrap();

    for mode in MODES {
        for forward in [true, false] {
            let got = collected(&tree, mode, forward);
            assert_eq!(got.len(), unique);
            assert_eq!(
                got,
                reference(&tree, mode, forward),
                "seed {} mode {:?} forward {}",
                seed,
                mode,
                forward
            );
        }
    }
}

#[test]
fn test_fuzz_random_small() {
    fuzz_one_run(20, 1);
}

#[test]
fn test_fuzz_random_medium() {
    fuzz_one_run(80, 123);
}

#[test]
fn test_fuzz_random_seeded() {
    fuzz_one_run(120, 98765);
}

#[test]
fn test_fuzz_remove_interleaved_with_iteration() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut tree = PatriciaTree::new();
    let mut keys: Vec<Vec<u8>> = Vec::new();

    for _ in 0..150 {
        let len = rng.gen_range(1..=12);
        let key: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let (_, inserted) = tree.insert(&key, bits(&key), 0).unwrap();
        if inserted {
            keys.push(key);
        }
    }

    keys.shuffle(&mut rng);
    while let Some(key) = keys.pop() {
        assert!(tree.remove(&key, bits(&key)).is_some());
        tree.validate().unwrap();
        assert_eq!(collected(&tree, IterMode::In, true).len(), keys.len());
    }
    assert!(tree.is_empty());
}

#[test]
fn test_fuzz_retain_random_subset() {
    let (mut tree, unique) = build_random_tree(200, 7);
    tree.retain(|node| node.payload() % 3 != 0);
    tree.validate().unwrap();
    let survivors = collected(&tree, IterMode::Post, true).len();
    assert_eq!(survivors, tree.len());
    assert!(survivors < unique);
    for node in tree.iter(IterMode::Pre) {
        assert!(node.payload() % 3 != 0);
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

fn key_sets() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..10), 0..60)
}

/// Word-like keys over a tiny alphabet, dense in shared prefixes.
fn word_sets() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-c]{1,8}", 1..40)
}

fn build_tracked(keys: &[Vec<u8>]) -> (PatriciaTree, HashSet<Vec<u8>>) {
    let mut tree = PatriciaTree::new();
    let mut inserted = HashSet::new();
    for key in keys {
        let (_, fresh) = tree.insert(key, bits(key), 0).unwrap();
        if fresh {
            inserted.insert(key.clone());
        }
    }
    (tree, inserted)
}

proptest! {
    #[test]
    fn prop_iteration_complete_no_duplicates(keys in key_sets()) {
        let (tree, inserted) = build_tracked(&keys);
        prop_assert_eq!(tree.len(), inserted.len());
        tree.validate().unwrap();

        for mode in MODES {
            for forward in [true, false] {
                let yielded: Vec<Vec<u8>> = tree
                    .iter_from(None, forward, mode)
                    .map(|n| n.key().to_vec())
                    .collect();
                prop_assert_eq!(yielded.len(), inserted.len());
                let as_set: HashSet<Vec<u8>> = yielded.into_iter().collect();
                prop_assert_eq!(&as_set, &inserted);
            }
        }
    }

    #[test]
    fn prop_order_duality(keys in key_sets()) {
        let (tree, _) = build_tracked(&keys);

        let pre_fwd = collected(&tree, IterMode::Pre, true);
        let mut post_rev = collected(&tree, IterMode::Post, false);
        post_rev.reverse();
        prop_assert_eq!(pre_fwd, post_rev);

        let in_fwd = collected(&tree, IterMode::In, true);
        let mut in_rev = collected(&tree, IterMode::In, false);
        in_rev.reverse();
        prop_assert_eq!(in_fwd, in_rev);
    }

    #[test]
    fn prop_membership_idempotent(keys in key_sets()) {
        let (mut tree, inserted) = build_tracked(&keys);

        for key in &inserted {
            let before = tree.lookup(key, bits(key)).unwrap() as *const PatriciaNode;
            let (node, fresh) = tree.insert(key, bits(key), 1).unwrap();
            prop_assert!(!fresh);
            prop_assert!(std::ptr::eq(node, before));
        }
    }

    #[test]
    fn prop_insert_remove_roundtrip(keys in key_sets(), reverse in any::<bool>()) {
        let (mut tree, inserted) = build_tracked(&keys);

        let mut order: Vec<_> = inserted.iter().cloned().collect();
        order.sort();
        if reverse {
            order.reverse();
        }
        for key in &order {
            prop_assert!(tree.remove(key, bits(key)).is_some());
            tree.validate().unwrap();
        }
        prop_assert_eq!(tree.len(), 0);
        prop_assert!(tree.iter(IterMode::Pre).next().is_none());
    }

    #[test]
    fn prop_prefix_returns_real_prefixes(words in word_sets(), query in "[a-c]{1,10}") {
        let mut tree = PatriciaTree::new();
        for word in &words {
            tree.insert(word.as_bytes(), bits(word.as_bytes()), 0).unwrap();
        }

        let qbits = bits(query.as_bytes());
        match tree.prefix(query.as_bytes(), qbits) {
            Some(node) => {
                // whatever comes back is a true bit-prefix of the query
                prop_assert!(node.bit_len() <= qbits);
                prop_assert!(query.as_bytes().starts_with(node.key()));
            }
            None => {
                // an exactly stored query would have been found
                prop_assert!(!words.contains(&query));
            }
        }

        // a stored key extended by garbage resolves to at least that key
        if let Some(word) = words.first() {
            let extended = format!("{}XX", word);
            let node = tree.prefix(extended.as_bytes(), bits(extended.as_bytes())).unwrap();
            prop_assert!(extended.as_bytes().starts_with(node.key()));
            prop_assert!(node.bit_len() >= bits(word.as_bytes()));
        }
    }

    #[test]
    fn prop_lookup_after_mutations(keys in key_sets()) {
        let (mut tree, inserted) = build_tracked(&keys);

        // remove every other key, then verify both halves
        let mut order: Vec<_> = inserted.iter().cloned().collect();
        order.sort();
        let (removed, kept): (Vec<_>, Vec<_>) = order
            .into_iter()
            .enumerate()
            .partition(|(i, _)| i % 2 == 0);

        for (_, key) in &removed {
            prop_assert!(tree.remove(key, bits(key)).is_some());
        }
        tree.validate().unwrap();
        for (_, key) in &removed {
            prop_assert!(tree.lookup(key, bits(key)).is_none());
        }
        for (_, key) in &kept {
            prop_assert!(tree.lookup(key, bits(key)).is_some());
        }
    }
}
