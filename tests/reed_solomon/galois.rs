//! Galois Field (GF(2^8)) Arithmetic Tests
//!
//! Tests for Galois8 field operations including addition, multiplication,
//! division, powers and the shared lookup tables.

use rsfrag::reed_solomon::galois::{Galois8, GaloisTable, GF8_POLYNOMIAL};

// ============================================================================
// Basic Arithmetic Operations
// ============================================================================

#[test]
fn test_galois8_addition_is_xor() {
    let a = Galois8::new(5);
    let b = Galois8::new(3);

    assert_eq!((a + b).value(), 6);
    // Subtraction is the same as addition in GF(2^n)
    assert_eq!((a - b).value(), 6);
    assert_eq!((a + a).value(), 0);
}

#[test]
fn test_galois8_identities() {
    for v in 0..=255u8 {
        let a = Galois8::new(v);
        assert_eq!(a * Galois8::ONE, a);
        assert_eq!(a * Galois8::ZERO, Galois8::ZERO);
        assert_eq!(a + Galois8::ZERO, a);
    }
}

#[test]
fn test_galois8_known_products() {
    // 2 * 0x80 overflows and reduces by 0x11D
    assert_eq!((Galois8::new(2) * Galois8::new(0x80)).value(), 0x1D);
    assert_eq!((Galois8::new(2) * Galois8::new(3)).value(), 6);
    assert_eq!((Galois8::new(3) * Galois8::new(7)).value(), 9);
}

#[test]
fn test_galois8_multiplication_matches_carryless_reduction() {
    fn slow_mul(mut a: u32, mut b: u32) -> u8 {
        let mut product = 0u32;
        while b != 0 {
            if b & 1 != 0 {
                product ^= a;
            }
            a <<= 1;
            if a & 0x100 != 0 {
                a ^= GF8_POLYNOMIAL;
            }
            b >>= 1;
        }
        product as u8
    }

    for a in 0..=255u32 {
        for b in 0..=255u32 {
            assert_eq!(
                (Galois8::new(a as u8) * Galois8::new(b as u8)).value(),
                slow_mul(a, b),
                "{a} * {b}"
            );
        }
    }
}

// ============================================================================
// Division and Inverses
// ============================================================================

#[test]
fn test_galois8_every_nonzero_element_has_inverse() {
    for v in 1..=255u8 {
        let a = Galois8::new(v);
        let inv = a.inverse().unwrap();
        assert_eq!(a * inv, Galois8::ONE, "inverse of {v}");
    }
    assert_eq!(Galois8::ZERO.inverse(), None);
}

#[test]
fn test_galois8_division() {
    let a = Galois8::new(0x53);
    let b = Galois8::new(0xCA);
    assert_eq!((a / b) * b, a);
    assert_eq!(Galois8::ZERO / b, Galois8::ZERO);
    assert_eq!(a.checked_div(Galois8::ZERO), None);
}

#[test]
#[should_panic]
fn test_galois8_division_by_zero_panics() {
    let _ = Galois8::new(7) / Galois8::ZERO;
}

// ============================================================================
// Power Operations
// ============================================================================

#[test]
fn test_galois8_power_operations() {
    let two = Galois8::new(2);
    assert_eq!(two.pow(0), Galois8::ONE);
    assert_eq!(two.pow(1), two);
    assert_eq!(two.pow(8).value(), 0x1D);
    // The multiplicative group has order 255
    assert_eq!(two.pow(255), Galois8::ONE);
    assert_eq!(Galois8::ZERO.pow(0), Galois8::ONE);
    assert_eq!(Galois8::ZERO.pow(5), Galois8::ZERO);
}

#[test]
fn test_galois8_pow_large_exponents() {
    // Exponents reduce modulo the group order 255
    for v in 1..=255u8 {
        let a = Galois8::new(v);
        assert_eq!(a.pow(usize::MAX), a.pow(usize::MAX % 255), "{v}^MAX");
        assert_eq!(a.pow(255 * 1_000_003), Galois8::ONE);
        assert_eq!(a.pow(usize::MAX / 2 + 1) * a.pow(usize::MAX / 2), a.pow(usize::MAX % 255));
    }
}

#[test]
fn test_galois8_pow_matches_repeated_multiplication() {
    let base = Galois8::new(0x8E);
    let mut acc = Galois8::ONE;
    for e in 0..600 {
        assert_eq!(base.pow(e), acc, "exponent {e}");
        acc *= base;
    }
}

// ============================================================================
// Tables
// ============================================================================

#[test]
fn test_generator_reaches_every_nonzero_element() {
    let mut seen = [false; 256];
    for e in 0..255 {
        let value = Galois8::exp(e).value();
        assert!(!seen[value as usize], "α^{e} repeats");
        seen[value as usize] = true;
    }
    assert!(!seen[0]);
    assert_eq!(seen.iter().filter(|&&s| s).count(), 255);
}

#[test]
fn test_log_and_exp_are_inverse() {
    for v in 1..=255u8 {
        let a = Galois8::new(v);
        let log = a.log().unwrap();
        assert_eq!(Galois8::exp(log as usize), a);
    }
    assert_eq!(Galois8::ZERO.log(), None);
    assert_eq!(Galois8::exp(255), Galois8::ONE);
}

#[test]
fn test_shared_table_matches_fresh_table() {
    let fresh = GaloisTable::new();
    let shared = GaloisTable::get();
    assert_eq!(fresh.log, shared.log);
    assert_eq!(fresh.antilog[..], shared.antilog[..]);
    assert_eq!(fresh.mul[0x1D][0x47], shared.mul[0x1D][0x47]);
}
