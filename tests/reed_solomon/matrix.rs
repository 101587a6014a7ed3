//! Generator Matrix Tests
//!
//! Tests for the systematic generator, Gauss-Jordan inversion and the MDS
//! property that makes any K fragments sufficient.

use rsfrag::reed_solomon::galois::Galois8;
use rsfrag::reed_solomon::matrix::{systematic_generator, Matrix};
use rsfrag::CodecError;

/// All k-element subsets of `0..n` in lexicographic order
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    let mut current: Vec<usize> = (0..k).collect();
    if k > n {
        return result;
    }
    loop {
        result.push(current.clone());
        let Some(i) = (0..k).rev().find(|&i| current[i] < n - k + i) else {
            return result;
        };
        current[i] += 1;
        for j in i + 1..k {
            current[j] = current[j - 1] + 1;
        }
    }
}

// ============================================================================
// Inversion
// ============================================================================

#[test]
fn test_invert_identity() {
    let identity = Matrix::identity(5);
    assert!(identity.invert().unwrap().is_identity());
}

#[test]
fn test_invert_requires_pivot_swap() {
    // Zero in the top-left corner forces a row swap
    let mut matrix = Matrix::new(2, 2);
    matrix.set(0, 1, Galois8::new(3));
    matrix.set(1, 0, Galois8::new(7));
    matrix.set(1, 1, Galois8::new(1));

    let inverse = matrix.invert().unwrap();
    assert!(matrix.multiply(&inverse).is_identity());
    assert!(inverse.multiply(&matrix).is_identity());
}

#[test]
fn test_invert_singular_matrix() {
    let mut matrix = Matrix::new(3, 3);
    for c in 0..3 {
        matrix.set(0, c, Galois8::new(c as u8 + 1));
        matrix.set(1, c, Galois8::new(c as u8 + 1) * Galois8::new(9));
        matrix.set(2, c, Galois8::new(0x40 + c as u8));
    }
    assert_eq!(matrix.invert(), Err(CodecError::SingularMatrix));
}

#[test]
fn test_invert_non_square() {
    assert_eq!(Matrix::new(2, 3).invert(), Err(CodecError::SingularMatrix));
}

#[test]
fn test_left_multiply_matches_matrix_product() {
    let matrix = Matrix::vandermonde(4, 4);
    let vector: Vec<Galois8> = [3u8, 0, 0x91, 1].into_iter().map(Galois8::new).collect();

    let mut as_matrix = Matrix::new(1, 4);
    for (c, &v) in vector.iter().enumerate() {
        as_matrix.set(0, c, v);
    }

    let expected = as_matrix.multiply(&matrix);
    assert_eq!(matrix.left_multiply(&vector), expected.row(0));
}

// ============================================================================
// Systematic Generator
// ============================================================================

#[test]
fn test_generator_shape_and_identity_top() {
    for (k, m) in [(1, 1), (4, 2), (8, 2), (10, 4), (32, 32)] {
        let generator = systematic_generator(k, m).unwrap();
        assert_eq!(generator.rows(), k + m);
        assert_eq!(generator.cols(), k);

        let top: Vec<usize> = (0..k).collect();
        assert!(generator.select_rows(&top).is_identity(), "({k}, {m})");
    }
}

#[test]
fn test_generator_coding_rows_are_nonzero() {
    let generator = systematic_generator(32, 32).unwrap();
    for r in 32..64 {
        assert!(
            generator.row(r).iter().all(|c| !c.is_zero()),
            "row {r} has a zero coefficient"
        );
    }
}

#[test]
fn test_generator_is_deterministic() {
    assert_eq!(
        systematic_generator(6, 3).unwrap(),
        systematic_generator(6, 3).unwrap()
    );
}

#[test]
fn test_single_data_fragment_replicates() {
    // K = 1: every parity fragment is a copy of the data fragment
    let generator = systematic_generator(1, 4).unwrap();
    for r in 0..5 {
        assert_eq!(generator.row(r), &[Galois8::ONE]);
    }
}

#[test]
fn test_every_square_submatrix_is_invertible() {
    for (k, m) in [(2, 2), (3, 3), (4, 3), (5, 4)] {
        let generator = systematic_generator(k, m).unwrap();
        for rows in combinations(k + m, k) {
            let sub = generator.select_rows(&rows);
            let inverse = sub
                .invert()
                .unwrap_or_else(|_| panic!("({k}, {m}) rows {rows:?} singular"));
            assert!(sub.multiply(&inverse).is_identity());
        }
    }
}

#[test]
fn test_large_generator_sampled_submatrices_invertible() {
    let generator = systematic_generator(32, 32).unwrap();

    // Parity-heavy selections of the largest configuration
    for offset in 0..32 {
        let rows: Vec<usize> = (0..32).map(|i| (offset + i * 2) % 64).collect();
        let mut sorted = rows.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() < 32 {
            continue;
        }
        assert!(generator.select_rows(&sorted).invert().is_ok(), "{sorted:?}");
    }

    let all_parity: Vec<usize> = (32..64).collect();
    assert!(generator.select_rows(&all_parity).invert().is_ok());
}
