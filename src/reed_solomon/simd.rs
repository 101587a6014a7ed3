//! SIMD-accelerated GF(2^8) slice kernels
//!
//! Implements the nibble-split shuffle technique from James Plank's "Screaming Fast
//! Galois Field Arithmetic Using Intel SIMD Instructions": since multiplication by a
//! constant distributes over XOR,
//!
//! ```text
//! c * x = c * (x & 0x0F) ^ c * (x & 0xF0)
//! ```
//!
//! so two 16-entry tables per coefficient cover every byte and PSHUFB performs 16 (SSSE3)
//! or 32 (AVX2) lookups per instruction.
//!
//! Dispatch:
//! - x86_64: AVX2 → SSSE3 → scalar
//! - other targets: scalar
//!
//! The detected level is cached after the first call.

use super::scalar::{process_slice_multiply_mode, MulTable, WriteOp};
use std::sync::OnceLock;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();

/// SIMD implementation to use for the current platform, ordered by capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SimdLevel {
    /// No SIMD available, use scalar fallback
    None,
    /// x86_64 SSSE3 (128-bit PSHUFB)
    Ssse3,
    /// x86_64 AVX2 (256-bit PSHUFB)
    Avx2,
}

/// Detect best available SIMD implementation for current platform
pub fn detect_simd_support() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("ssse3") {
            return SimdLevel::Avx2;
        }
        if is_x86_feature_detected!("ssse3") {
            return SimdLevel::Ssse3;
        }
        SimdLevel::None
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        SimdLevel::None
    }
}

/// Cached result of [`detect_simd_support`]
pub fn simd_level() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(detect_simd_support)
}

/// Nibble lookup tables for one coefficient
#[derive(Debug, Clone)]
pub struct NibbleTables {
    /// Low nibble (0x0N) → product
    pub lo: [u8; 16],
    /// High nibble (0xN0) → product
    pub hi: [u8; 16],
}

pub fn build_nibble_tables(table: &MulTable) -> NibbleTables {
    let mut lo = [0u8; 16];
    let mut hi = [0u8; 16];

    for nib in 0..16u8 {
        lo[nib as usize] = table.multiply(nib);
        hi[nib as usize] = table.multiply(nib << 4);
    }

    NibbleTables { lo, hi }
}

/// Multiply `input` by the table's coefficient into `output` with the kernel for
/// `level`. Processes `min(input.len(), output.len())` bytes; the result is identical
/// to the scalar kernel.
///
/// `level` is capped at what the running CPU supports, so requesting an unsupported
/// level falls back to the best available kernel.
#[inline]
pub fn process_slice_multiply_simd(
    input: &[u8],
    output: &mut [u8],
    table: &MulTable,
    mode: WriteOp,
    level: SimdLevel,
) {
    let level = level.min(simd_level());
    let len = input.len().min(output.len());
    let coefficient = table.coefficient().value();

    // Coefficients 0 and 1 are memset/memcpy/xor in the scalar kernel
    if len < 16 || coefficient <= 1 {
        process_slice_multiply_mode(input, output, table, mode);
        return;
    }

    #[cfg(target_arch = "x86_64")]
    {
        let done = match level {
            // SAFETY: `level` is capped at the runtime-detected level
            SimdLevel::Avx2 => unsafe { multiply_avx2(input, output, table, mode) },
            // SAFETY: as above
            SimdLevel::Ssse3 => unsafe { multiply_ssse3(input, output, table, mode) },
            SimdLevel::None => 0,
        };
        process_slice_multiply_mode(&input[done..len], &mut output[done..len], table, mode);
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        let _ = level;
        process_slice_multiply_mode(input, output, table, mode);
    }
}

/// Dispatching multiply with the cached platform level
#[inline]
pub fn process_slice_multiply(input: &[u8], output: &mut [u8], table: &MulTable, mode: WriteOp) {
    process_slice_multiply_simd(input, output, table, mode, simd_level());
}

/// PSHUFB GF(2^8) multiply using SSSE3, 16 bytes per iteration.
/// Returns the number of bytes processed (a multiple of 16).
///
/// # Safety
/// The CPU must support SSSE3.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3")]
pub unsafe fn multiply_ssse3(
    input: &[u8],
    output: &mut [u8],
    table: &MulTable,
    mode: WriteOp,
) -> usize {
    let len = input.len().min(output.len());
    let chunks = len / 16;
    let nibbles = build_nibble_tables(table);

    let lo_table = _mm_loadu_si128(nibbles.lo.as_ptr() as *const __m128i);
    let hi_table = _mm_loadu_si128(nibbles.hi.as_ptr() as *const __m128i);
    let mask_0x0f = _mm_set1_epi8(0x0F);

    let in_ptr = input.as_ptr();
    let out_ptr = output.as_mut_ptr();

    for chunk in 0..chunks {
        let offset = chunk * 16;
        let in_vec = _mm_loadu_si128(in_ptr.add(offset) as *const __m128i);

        let lo_nib = _mm_and_si128(in_vec, mask_0x0f);
        let hi_nib = _mm_and_si128(_mm_srli_epi64(in_vec, 4), mask_0x0f);
        let product = _mm_xor_si128(
            _mm_shuffle_epi8(lo_table, lo_nib),
            _mm_shuffle_epi8(hi_table, hi_nib),
        );

        let dst = out_ptr.add(offset) as *mut __m128i;
        let result = match mode {
            WriteOp::Direct => product,
            WriteOp::Add => _mm_xor_si128(_mm_loadu_si128(dst as *const __m128i), product),
        };
        _mm_storeu_si128(dst, result);
    }

    chunks * 16
}

/// PSHUFB GF(2^8) multiply using AVX2, 32 bytes per iteration.
/// Returns the number of bytes processed (a multiple of 32).
///
/// # Safety
/// The CPU must support AVX2 and SSSE3.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,ssse3")]
pub unsafe fn multiply_avx2(
    input: &[u8],
    output: &mut [u8],
    table: &MulTable,
    mode: WriteOp,
) -> usize {
    let len = input.len().min(output.len());
    let chunks = len / 32;
    let nibbles = build_nibble_tables(table);

    // Broadcast 128-bit tables to both lanes
    let lo_table =
        _mm256_broadcastsi128_si256(_mm_loadu_si128(nibbles.lo.as_ptr() as *const __m128i));
    let hi_table =
        _mm256_broadcastsi128_si256(_mm_loadu_si128(nibbles.hi.as_ptr() as *const __m128i));
    let mask_0x0f = _mm256_set1_epi8(0x0F);

    let in_ptr = input.as_ptr();
    let out_ptr = output.as_mut_ptr();

    for chunk in 0..chunks {
        let offset = chunk * 32;
        let in_vec = _mm256_loadu_si256(in_ptr.add(offset) as *const __m256i);

        let lo_nib = _mm256_and_si256(in_vec, mask_0x0f);
        let hi_nib = _mm256_and_si256(_mm256_srli_epi64(in_vec, 4), mask_0x0f);
        let product = _mm256_xor_si256(
            _mm256_shuffle_epi8(lo_table, lo_nib),
            _mm256_shuffle_epi8(hi_table, hi_nib),
        );

        let dst = out_ptr.add(offset) as *mut __m256i;
        let result = match mode {
            WriteOp::Direct => product,
            WriteOp::Add => _mm256_xor_si256(_mm256_loadu_si256(dst as *const __m256i), product),
        };
        _mm256_storeu_si256(dst, result);
    }

    chunks * 32
}
