//! Integration tests for the bit-string primitives
//!
//! Exercises unity-based bit extraction, the tail-extension convention and
//! the streaming first-difference scan against closed-form expectations and
//! a naive reference implementation.

use bitrie::{bit_diff, get_bit, key_eq};

// =============================================================================
// GET_BIT
// =============================================================================

#[test]
fn test_getbit_zero_length() {
    assert!(!get_bit(&[], 0, 0));
    assert!(get_bit(&[], 0, 1));
}

#[test]
fn test_getbit_pattern_55() {
    let pattern = 0x55555555u32.to_be_bytes();
    assert!(!get_bit(&pattern, 0, 0));
    for idx in 1..=32u16 {
        assert_eq!(get_bit(&pattern, idx, idx), idx & 1 == 0);
        assert_eq!(get_bit(&pattern, idx, idx + 1), idx & 1 == 1);
    }
}

#[test]
fn test_getbit_pattern_aa() {
    let pattern = 0xAAAAAAAAu32.to_be_bytes();
    assert!(!get_bit(&pattern, 0, 0));
    for idx in 1..=32u16 {
        assert_eq!(get_bit(&pattern, idx, idx), idx & 1 == 1);
        assert_eq!(get_bit(&pattern, idx, idx + 1), idx & 1 == 0);
    }
}

// =============================================================================
// BIT_DIFF
// =============================================================================

#[test]
fn test_bitdiff_equal_keys() {
    let pattern = 0xAAAAAAAAu32.to_be_bytes();
    for len in 0..=32u16 {
        assert_eq!(bit_diff(&pattern, len, &pattern, len), 0);
    }
}

#[test]
fn test_bitdiff_alternating_extension() {
    // with alternating bits the diff position is ALWAYS the length of the
    // shorter pattern, plus TWO
    let pattern = 0xAAAAAAAAu32.to_be_bytes();
    for len in 1..32u16 {
        assert_eq!(bit_diff(&pattern, len, &pattern, len + 1), len + 2);
    }
}

#[test]
fn test_bitdiff_longer_repeats_last_bit() {
    // when the longer pattern repeats the last bit of the shorter one, the
    // diff position is the length of the shorter pattern, plus ONE
    let pattern = 0xAA000000u32.to_be_bytes();
    for len in 9..32u16 {
        assert_eq!(bit_diff(&pattern, 8, &pattern, len), 9);
    }
}

#[test]
fn test_bitdiff_longer_repeats_complement() {
    // when the longer pattern repeats the complement of the shorter's last
    // bit, the diff position is the length of the longer pattern, plus ONE
    let pattern = 0xAAFFFFFFu32.to_be_bytes();
    for len in 9..32u16 {
        assert_eq!(bit_diff(&pattern, 8, &pattern, len), len + 1);
    }
}

#[test]
fn test_bitdiff_is_symmetric() {
    let a = 0xAAFF0011u32.to_be_bytes();
    let b = 0xAAFF0F11u32.to_be_bytes();
    for la in [4u16, 8, 13, 21, 32] {
        for lb in [4u16, 8, 13, 21, 32] {
            assert_eq!(bit_diff(&a, la, &b, lb), bit_diff(&b, lb, &a, la));
        }
    }
}

// =============================================================================
// BIT_DIFF vs NAIVE SCAN
// =============================================================================

/// The streaming implementation must agree bit-for-bit with a naive
/// get_bit walk over the tail-extended streams.
fn bit_diff_naive(k1: &[u8], l1: u16, k2: &[u8], l2: u16) -> u16 {
    let limit = u32::from(l1.max(l2)) + 72; // cross a limb past both ends
    for idx in 1..=limit {
        let idx = idx as u16;
        if get_bit(k1, l1, idx) != get_bit(k2, l2, idx) {
            return idx;
        }
    }
    0
}

#[test]
fn test_bitdiff_matches_naive_scan() {
    let long_a: Vec<u8> = (0..24).map(|i| (i as u8).wrapping_mul(37)).collect();
    let mut long_b = long_a.clone();
    long_b[17] ^= 0x10;

    let samples: Vec<(Vec<u8>, u16)> = vec![
        (vec![], 0),
        (vec![0x00], 3),
        (vec![0xFF], 8),
        (vec![0xAA], 7),
        (b"even".to_vec(), 32),
        (b"evenly".to_vec(), 48),
        (long_a.clone(), 185),
        (long_a, 192),
        (long_b, 192),
    ];

    for (k1, l1) in &samples {
        for (k2, l2) in &samples {
            assert_eq!(
                bit_diff(k1, *l1, k2, *l2),
                bit_diff_naive(k1, *l1, k2, *l2),
                "mismatch for lengths {} / {}",
                l1,
                l2
            );
        }
    }
}

// =============================================================================
// KEY_EQ
// =============================================================================

#[test]
fn test_key_eq_lengths_and_bytes() {
    assert!(key_eq(b"banquetor", 72, b"banquetor", 72));
    assert!(!key_eq(b"banquetor", 72, b"banquetoR", 72));
    assert!(!key_eq(b"ban", 24, b"banquetor", 72));
    assert!(key_eq(&[], 0, &[], 0));
}

#[test]
fn test_key_eq_masks_trailing_bits() {
    // equal under any mask that hides the differing low bits
    for len in 1..=4u16 {
        assert!(key_eq(&[0xA5], len, &[0xAF], len));
    }
    for len in 5..=8u16 {
        assert!(!key_eq(&[0xA5], len, &[0xAF], len));
    }
}

#[test]
fn test_key_eq_consistent_with_bitdiff() {
    let samples: &[(&[u8], u16)] = &[
        (b"a", 8),
        (b"ab", 16),
        (b"ab", 13),
        (&[0xF0], 4),
        (&[0xFF], 4),
        (&[], 0),
    ];
    for &(k1, l1) in samples {
        for &(k2, l2) in samples {
            assert_eq!(key_eq(k1, l1, k2, l2), bit_diff(k1, l1, k2, l2) == 0);
        }
    }
}
