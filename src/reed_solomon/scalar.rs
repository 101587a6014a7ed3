//! Scalar Galois Field slice kernels
//!
//! Baseline implementations of the GF(2^8) multiply and multiply-add operations that
//! dominate encode/recover throughput. The SIMD kernels in the `simd` module produce
//! identical bytes and fall back to these for short slices and remainder bytes.
//!
//! Each coefficient maps to one row of the shared 256×256 product table, so the inner
//! loop is a single table lookup per byte.

use super::galois::{Galois8, GaloisTable};

/// Specifies how to combine the multiplication result with the output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Direct write: output = coefficient * input (replaces contents)
    Direct,
    /// Accumulate: output = output XOR (coefficient * input)
    Add,
}

/// Multiplication table for a single coefficient
///
/// `row[x] = coefficient * x` for every byte `x`. Borrowed from the process-wide
/// product table, so building one is free.
#[derive(Clone, Copy)]
pub struct MulTable {
    coefficient: Galois8,
    row: &'static [u8; 256],
}

impl MulTable {
    #[inline]
    pub fn coefficient(&self) -> Galois8 {
        self.coefficient
    }

    #[inline]
    pub fn row(&self) -> &'static [u8; 256] {
        self.row
    }

    #[inline]
    pub fn multiply(&self, value: u8) -> u8 {
        self.row[value as usize]
    }
}

impl std::fmt::Debug for MulTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MulTable")
            .field("coefficient", &self.coefficient)
            .finish()
    }
}

#[inline]
pub fn build_mul_table(coefficient: Galois8) -> MulTable {
    MulTable {
        coefficient,
        row: &GaloisTable::get().mul[coefficient.value() as usize],
    }
}

/// Scalar implementation of GF(2^8) multiply with configurable write mode
///
/// Processes `min(input.len(), output.len())` bytes. Coefficients 0 and 1 skip the
/// table entirely.
#[inline]
pub fn process_slice_multiply_mode(
    input: &[u8],
    output: &mut [u8],
    table: &MulTable,
    mode: WriteOp,
) {
    let len = input.len().min(output.len());
    let (input, output) = (&input[..len], &mut output[..len]);

    match (table.coefficient.value(), mode) {
        (0, WriteOp::Direct) => output.fill(0),
        (0, WriteOp::Add) => {}
        (1, WriteOp::Direct) => output.copy_from_slice(input),
        (1, WriteOp::Add) => {
            for (out, &byte) in output.iter_mut().zip(input) {
                *out ^= byte;
            }
        }
        (_, WriteOp::Direct) => {
            let row = table.row;
            for (out, &byte) in output.iter_mut().zip(input) {
                *out = row[byte as usize];
            }
        }
        (_, WriteOp::Add) => {
            let row = table.row;
            for (out, &byte) in output.iter_mut().zip(input) {
                *out ^= row[byte as usize];
            }
        }
    }
}

/// Scalar multiply with direct write: `output = coefficient * input`
#[inline]
pub fn process_slice_multiply_direct(input: &[u8], output: &mut [u8], table: &MulTable) {
    process_slice_multiply_mode(input, output, table, WriteOp::Direct);
}

/// Scalar multiply with XOR accumulate: `output ^= coefficient * input`
///
/// # Example
/// ```
/// use rsfrag::reed_solomon::{build_mul_table, process_slice_multiply_add, Galois8};
///
/// let input = vec![1, 2, 3, 4];
/// let mut output = vec![0; 4];
/// let table = build_mul_table(Galois8::new(1));
///
/// process_slice_multiply_add(&input, &mut output, &table);
/// assert_eq!(output, input);
/// ```
#[inline]
pub fn process_slice_multiply_add(input: &[u8], output: &mut [u8], table: &MulTable) {
    process_slice_multiply_mode(input, output, table, WriteOp::Add);
}
