//! # Matrix Determinant
//!
//! Determinants of 2×2 and 3×3 matrices by cofactor expansion.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::calculations::matrix::{calculate, MatrixInput};
//!
//! let input = MatrixInput { rows: vec![vec![3.0, 8.0], vec![4.0, 6.0]] };
//! assert_eq!(calculate(&input).unwrap().determinant, -14.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};

/// |a b; c d| = ad − bc
#[inline]
pub fn det2(m: &[[f64; 2]; 2]) -> f64 {
    m[0][0] * m[1][1] - m[0][1] * m[1][0]
}

/// Cofactor expansion along the first row.
#[inline]
pub fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// A square matrix given row by row.
///
/// ## JSON Example
///
/// ```json
/// { "rows": [[1, 2, 3], [0, 1, 4], [5, 6, 0]] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixInput {
    pub rows: Vec<Vec<f64>>,
}

impl MatrixInput {
    /// Validate shape (2×2 or 3×3) and entries.
    pub fn validate(&self) -> CalcResult<usize> {
        let size = self.rows.len();
        if size != 2 && size != 3 {
            return Err(CalcError::invalid_input(
                "rows",
                size.to_string(),
                "Only 2x2 and 3x3 matrices are supported",
            ));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != size {
                return Err(CalcError::invalid_input(
                    format!("rows[{}]", i),
                    row.len().to_string(),
                    format!("Row must have {} entries for a square matrix", size),
                ));
            }
            for (j, value) in row.iter().enumerate() {
                require_finite(&format!("rows[{}][{}]", i, j), *value)?;
            }
        }
        Ok(size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixResult {
    pub size: usize,
    pub determinant: f64,
}

pub fn calculate(input: &MatrixInput) -> CalcResult<MatrixResult> {
    let size = input.validate()?;
    let r = &input.rows;

    let determinant = match size {
        2 => det2(&[[r[0][0], r[0][1]], [r[1][0], r[1][1]]]),
        _ => det3(&[
            [r[0][0], r[0][1], r[0][2]],
            [r[1][0], r[1][1], r[1][2]],
            [r[2][0], r[2][1], r[2][2]],
        ]),
    };

    Ok(MatrixResult { size, determinant })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_det3() {
        let input = MatrixInput {
            rows: vec![vec![1.0, 2.0, 3.0], vec![0.0, 1.0, 4.0], vec![5.0, 6.0, 0.0]],
        };
        assert_eq!(calculate(&input).unwrap().determinant, 1.0);
    }

    #[test]
    fn test_identity_and_singular() {
        assert_eq!(det3(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]), 1.0);
        assert_eq!(det2(&[[2.0, 4.0], [1.0, 2.0]]), 0.0);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let ragged = MatrixInput { rows: vec![vec![1.0, 2.0], vec![3.0]] };
        assert_eq!(calculate(&ragged).unwrap_err().error_code(), "INVALID_INPUT");

        let four = MatrixInput { rows: vec![vec![0.0; 4]; 4] };
        assert!(calculate(&four).is_err());

        let empty = MatrixInput { rows: vec![] };
        assert!(calculate(&empty).is_err());
    }

    #[test]
    fn test_rejects_nan() {
        let input = MatrixInput { rows: vec![vec![1.0, f64::NAN], vec![0.0, 1.0]] };
        assert!(calculate(&input).is_err());
    }
}
