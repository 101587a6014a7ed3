//! Reed-Solomon Erasure Coding Module
//!
//! Systematic Reed-Solomon coding over GF(2^8) for storage fragments: K data fragments
//! produce M parity fragments, and any K of the K+M fragments rebuild the rest.
//!
//! - `galois`: field arithmetic backed by log/antilog and full product tables
//! - `matrix`: generator construction and Gauss-Jordan inversion
//! - `scalar` / `simd`: per-coefficient slice kernels
//! - `codec`: the `ReedSolomon` engine

pub mod codec;
pub mod galois;
pub mod matrix;
pub mod scalar;
pub mod simd;

pub use codec::{RecoveryPlan, ReedSolomon};
pub use galois::{Galois8, GaloisTable, GF8_POLYNOMIAL};
pub use matrix::{systematic_generator, Matrix};
pub use scalar::{
    build_mul_table, process_slice_multiply_add, process_slice_multiply_direct,
    process_slice_multiply_mode, MulTable, WriteOp,
};
pub use simd::{detect_simd_support, process_slice_multiply, SimdLevel};
