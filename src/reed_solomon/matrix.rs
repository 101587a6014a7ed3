//! Dense GF(2^8) matrices: generator construction and Gauss-Jordan inversion
//!
//! The generator for a (K, M) code is built from a (K+M)×K Vandermonde matrix over
//! distinct nonzero points α^0 .. α^(K+M-1). Any K of its rows form a square
//! Vandermonde matrix on distinct points and are therefore invertible. Multiplying by
//! the inverse of the top K×K block gives systematic form (identity on top) while
//! keeping every K×K row selection invertible.

use super::galois::Galois8;
use crate::error::{CodecError, CodecResult};

/// Row-major matrix of field elements
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Galois8>,
}

impl Matrix {
    /// Create a new zero matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Galois8::ZERO; rows * cols],
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::new(size, size);
        for i in 0..size {
            matrix.set(i, i, Galois8::ONE);
        }
        matrix
    }

    /// `V[r][c] = (α^r)^c`
    pub fn vandermonde(rows: usize, cols: usize) -> Self {
        let mut matrix = Self::new(rows, cols);
        for r in 0..rows {
            let point = Galois8::exp(r);
            for c in 0..cols {
                matrix.set(r, c, point.pow(c));
            }
        }
        matrix
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Galois8 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Galois8) {
        self.data[row * self.cols + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[Galois8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    #[inline]
    fn row_mut(&mut self, row: usize) -> &mut [Galois8] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.cols {
            self.data.swap(a * self.cols + col, b * self.cols + col);
        }
    }

    pub fn is_identity(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows).all(|r| {
                (0..self.cols).all(|c| {
                    let expected = if r == c { Galois8::ONE } else { Galois8::ZERO };
                    self.get(r, c) == expected
                })
            })
    }

    /// New matrix made of the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut selected = Self::new(rows.len(), self.cols);
        for (dst, &src) in rows.iter().enumerate() {
            selected.row_mut(dst).copy_from_slice(self.row(src));
        }
        selected
    }

    /// Matrix product `self × rhs`
    ///
    /// # Panics
    /// If the inner dimensions differ.
    pub fn multiply(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.cols, rhs.rows, "matrix dimension mismatch");

        let mut product = Matrix::new(self.rows, rhs.cols);
        for r in 0..self.rows {
            for c in 0..rhs.cols {
                let mut sum = Galois8::ZERO;
                for i in 0..self.cols {
                    sum += self.get(r, i) * rhs.get(i, c);
                }
                product.set(r, c, sum);
            }
        }
        product
    }

    /// Row vector × matrix: `Σ_j vector[j] · self[j][c]` for each column c
    pub fn left_multiply(&self, vector: &[Galois8]) -> Vec<Galois8> {
        debug_assert_eq!(vector.len(), self.rows);

        let mut result = vec![Galois8::ZERO; self.cols];
        for (j, &factor) in vector.iter().enumerate() {
            if factor.is_zero() {
                continue;
            }
            for (out, &value) in result.iter_mut().zip(self.row(j)) {
                *out += factor * value;
            }
        }
        result
    }

    /// Inverse of a square matrix by Gauss-Jordan elimination.
    ///
    /// The row operations that reduce `self` to the identity are applied to an
    /// identity matrix, which accumulates the inverse.
    pub fn invert(&self) -> CodecResult<Matrix> {
        if self.rows != self.cols {
            return Err(CodecError::SingularMatrix);
        }

        let size = self.rows;
        let mut work = self.clone();
        let mut inverse = Matrix::identity(size);

        for pivot_row in 0..size {
            // Find pivot
            let found = (pivot_row..size).find(|&r| !work.get(r, pivot_row).is_zero());
            let Some(source_row) = found else {
                return Err(CodecError::SingularMatrix);
            };
            work.swap_rows(pivot_row, source_row);
            inverse.swap_rows(pivot_row, source_row);

            // Scale pivot row
            let pivot_inv = work
                .get(pivot_row, pivot_row)
                .inverse()
                .ok_or(CodecError::SingularMatrix)?;
            if pivot_inv != Galois8::ONE {
                for value in work.row_mut(pivot_row) {
                    *value *= pivot_inv;
                }
                for value in inverse.row_mut(pivot_row) {
                    *value *= pivot_inv;
                }
            }

            // Eliminate column
            for row in 0..size {
                if row == pivot_row {
                    continue;
                }
                let factor = work.get(row, pivot_row);
                if factor.is_zero() {
                    continue;
                }
                for col in 0..size {
                    let scaled = factor * work.get(pivot_row, col);
                    work.data[row * size + col] -= scaled;
                    let scaled = factor * inverse.get(pivot_row, col);
                    inverse.data[row * size + col] -= scaled;
                }
            }
        }

        Ok(inverse)
    }
}

/// Build the (K+M)×K systematic generator matrix.
///
/// Rows `0..K` are the identity, rows `K..K+M` the coding block. Every K×K
/// submatrix obtained by selecting K distinct rows is invertible.
pub fn systematic_generator(data: usize, parity: usize) -> CodecResult<Matrix> {
    let total = data + parity;
    let vandermonde = Matrix::vandermonde(total, data);
    let top: Vec<usize> = (0..data).collect();
    let top_inverse = vandermonde.select_rows(&top).invert()?;
    let generator = vandermonde.multiply(&top_inverse);

    if !generator.select_rows(&top).is_identity() {
        return Err(CodecError::SingularMatrix);
    }

    Ok(generator)
}
