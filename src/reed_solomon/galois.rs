//! Galois Field GF(2^8) arithmetic for fragment erasure coding
//!
//! ## Field Polynomial
//!
//! Elements are bytes reduced modulo the primitive polynomial **0x11D**
//! (x⁸ + x⁴ + x³ + x² + 1) with generator α = 2. Addition is XOR; multiplication,
//! division and exponentiation go through precomputed tables.
//!
//! ## Tables
//!
//! - `log` / `antilog`: discrete logarithms to base α (255-cycle)
//! - `mul`: the full 256×256 product table (64 KiB), so the per-byte inner loops of
//!   encode/recover are a single lookup with no branches
//!
//! Tables are built once on first use and shared process-wide.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use std::sync::OnceLock;

/// GF(2^8) primitive polynomial: 0x11D (x⁸ + x⁴ + x³ + x² + 1)
pub const GF8_POLYNOMIAL: u32 = 0x11D;

/// Number of field elements
const COUNT: usize = 1 << 8;

/// Order of the multiplicative group
const LIMIT: usize = COUNT - 1;

/// Galois Field lookup tables for fast arithmetic
pub struct GaloisTable {
    /// `log[x]` for x != 0; `log[0]` is unused and set to `LIMIT`
    pub log: [u8; COUNT],
    /// `antilog[i] = α^i`, doubled so `log[a] + log[b]` needs no modulo
    pub antilog: [u8; 2 * LIMIT],
    /// `mul[a][b] = a * b`
    pub mul: Box<[[u8; COUNT]; COUNT]>,
}

impl Default for GaloisTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GaloisTable {
    pub fn new() -> Self {
        let mut table = GaloisTable {
            log: [0; COUNT],
            antilog: [0; 2 * LIMIT],
            mul: Box::new([[0; COUNT]; COUNT]),
        };
        table.build_tables();
        table
    }

    /// Process-wide shared tables
    pub fn get() -> &'static GaloisTable {
        static TABLE: OnceLock<GaloisTable> = OnceLock::new();
        TABLE.get_or_init(GaloisTable::new)
    }

    fn build_tables(&mut self) {
        let mut b = 1u32;

        for l in 0..LIMIT {
            self.log[b as usize] = l as u8;
            self.antilog[l] = b as u8;
            self.antilog[l + LIMIT] = b as u8;

            b <<= 1;
            if b & COUNT as u32 != 0 {
                b ^= GF8_POLYNOMIAL;
            }
        }

        self.log[0] = LIMIT as u8;

        for a in 1..COUNT {
            let log_a = self.log[a] as usize;
            for b in 1..COUNT {
                self.mul[a][b] = self.antilog[log_a + self.log[b] as usize];
            }
        }
    }
}

/// Galois Field element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Galois8 {
    value: u8,
}

impl Galois8 {
    pub const ZERO: Self = Self { value: 0 };
    pub const ONE: Self = Self { value: 1 };

    #[inline]
    pub const fn new(value: u8) -> Self {
        Self { value }
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.value
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// α^exponent
    #[inline]
    pub fn exp(exponent: usize) -> Self {
        Self::new(GaloisTable::get().antilog[exponent % LIMIT])
    }

    /// Discrete logarithm to base α, `None` for zero
    #[inline]
    pub fn log(&self) -> Option<u8> {
        if self.is_zero() {
            None
        } else {
            Some(GaloisTable::get().log[self.value as usize])
        }
    }

    /// Power operation. `0^0` is 1 by convention.
    pub fn pow(&self, exponent: usize) -> Self {
        if exponent == 0 {
            return Self::ONE;
        }
        if self.value == 0 {
            return Self::ZERO;
        }

        let table = GaloisTable::get();
        let log_val = table.log[self.value as usize] as usize;
        Self::new(table.antilog[(log_val * (exponent % LIMIT)) % LIMIT])
    }

    /// Division that returns `None` instead of panicking on a zero divisor
    #[inline]
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        if self.is_zero() {
            return Some(Self::ZERO);
        }

        let table = GaloisTable::get();
        let log_diff =
            table.log[self.value as usize] as usize + LIMIT - table.log[rhs.value as usize] as usize;
        Some(Self::new(table.antilog[log_diff]))
    }

    /// Multiplicative inverse, `None` for zero
    #[inline]
    pub fn inverse(self) -> Option<Self> {
        Self::ONE.checked_div(self)
    }
}

// Addition (XOR in Galois fields)
impl Add for Galois8 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.value ^ rhs.value)
    }
}

impl AddAssign for Galois8 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.value ^= rhs.value;
    }
}

// Subtraction (same as addition in GF(2^n))
impl Sub for Galois8 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.value ^ rhs.value)
    }
}

impl SubAssign for Galois8 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.value ^= rhs.value;
    }
}

impl Mul for Galois8 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(GaloisTable::get().mul[self.value as usize][rhs.value as usize])
    }
}

impl MulAssign for Galois8 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for Galois8 {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        match self.checked_div(rhs) {
            Some(quotient) => quotient,
            None => panic!("Division by zero in Galois field"),
        }
    }
}

impl DivAssign for Galois8 {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

// Conversion traits
impl From<u8> for Galois8 {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Galois8> for u8 {
    fn from(val: Galois8) -> Self {
        val.value
    }
}

impl std::fmt::Display for Galois8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
