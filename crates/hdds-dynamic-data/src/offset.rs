// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Row-major offsets into multi-dimensional arrays.

use crate::error::{DynamicDataError, Result};

/// Flat row-major offset of `indices` in an array of shape `dimensions`.
///
/// ```
/// use hdds_dynamic_data::offset;
///
/// assert_eq!(offset(&[3, 4], &[1, 2]), Ok(6));
/// assert!(offset(&[3, 4], &[2, 4]).is_err());
/// ```
pub fn offset(dimensions: &[usize], indices: &[usize]) -> Result<usize> {
    if indices.len() != dimensions.len() {
        return Err(DynamicDataError::DimensionMismatch {
            expected: dimensions.len(),
            got: indices.len(),
        });
    }

    let mut flat = 0usize;
    for (&index, &bound) in indices.iter().zip(dimensions) {
        if index >= bound {
            return Err(DynamicDataError::IndexOutOfRange { index, bound });
        }
        flat = flat
            .checked_mul(bound)
            .and_then(|f| f.checked_add(index))
            .ok_or(DynamicDataError::IndexOutOfRange {
                index: flat,
                bound: usize::MAX,
            })?;
    }
    Ok(flat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_3x4() {
        assert_eq!(offset(&[3, 4], &[1, 2]), Ok(6));
        assert_eq!(offset(&[3, 4], &[0, 0]), Ok(0));
        assert_eq!(offset(&[3, 4], &[2, 3]), Ok(11));
        assert_eq!(
            offset(&[3, 4], &[2, 4]),
            Err(DynamicDataError::IndexOutOfRange { index: 4, bound: 4 })
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(
            offset(&[3, 4], &[1]),
            Err(DynamicDataError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        let dims = [usize::MAX, usize::MAX, 2];
        assert!(offset(&dims, &[usize::MAX - 1, usize::MAX - 1, 1]).is_err());
    }

    #[test]
    fn test_matches_nested_loops() {
        let dims = [2usize, 3, 5];
        let mut expected = 0;
        for i in 0..dims[0] {
            for j in 0..dims[1] {
                for k in 0..dims[2] {
                    assert_eq!(offset(&dims, &[i, j, k]), Ok(expected));
                    expected += 1;
                }
            }
        }
    }

    #[test]
    fn test_random_indices_in_bounds() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..200 {
            let dims: Vec<usize> = (0..rng.usize(1..5)).map(|_| rng.usize(1..7)).collect();
            let indices: Vec<usize> = dims.iter().map(|&d| rng.usize(0..d)).collect();
            let total: usize = dims.iter().product();
            let flat = offset(&dims, &indices).expect("in bounds");
            assert!(flat < total);

            // Unflatten and compare.
            let mut rest = flat;
            let mut back = vec![0; dims.len()];
            for (slot, &d) in back.iter_mut().zip(&dims).rev() {
                *slot = rest % d;
                rest /= d;
            }
            assert_eq!(back, indices);
        }
    }
}
