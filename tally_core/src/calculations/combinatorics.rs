//! # Permutations and Combinations
//!
//! nPr = n! / (n − r)!   and   nCr = n! / (r! (n − r)!)
//!
//! Factorials come from a fixed table covering `0!..=170!`, built once on
//! first use. 171! overflows an `f64`, so larger `n` is rejected up front.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Largest n whose factorial is a finite `f64`
pub const MAX_FACTORIAL_N: u32 = 170;

static FACTORIALS: Lazy<[f64; MAX_FACTORIAL_N as usize + 1]> = Lazy::new(|| {
    let mut table = [1.0; MAX_FACTORIAL_N as usize + 1];
    for n in 1..table.len() {
        table[n] = table[n - 1] * n as f64;
    }
    table
});

/// n! from the lookup table.
pub fn factorial(n: u32) -> CalcResult<f64> {
    FACTORIALS.get(n as usize).copied().ok_or_else(|| {
        CalcError::invalid_input(
            "n",
            n.to_string(),
            format!("n must not exceed {} (larger factorials overflow)", MAX_FACTORIAL_N),
        )
    })
}

/// Input parameters: choose `r` items from `n`.
///
/// ## JSON Example
///
/// ```json
/// { "n": 10, "r": 3 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinatoricsInput {
    pub n: u32,
    pub r: u32,
}

impl CombinatoricsInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.n > MAX_FACTORIAL_N {
            return Err(CalcError::invalid_input(
                "n",
                self.n.to_string(),
                format!("n must not exceed {}", MAX_FACTORIAL_N),
            ));
        }
        if self.r > self.n {
            return Err(CalcError::invalid_input(
                "r",
                self.r.to_string(),
                "r cannot exceed n",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinatoricsResult {
    /// Ordered selections, nPr
    pub permutations: f64,
    /// Unordered selections, nCr
    pub combinations: f64,
}

/// Calculate nPr and nCr.
///
/// ```rust
/// use tally_core::calculations::combinatorics::{calculate, CombinatoricsInput};
///
/// let result = calculate(&CombinatoricsInput { n: 10, r: 3 }).unwrap();
/// assert_eq!(result.permutations, 720.0);
/// assert_eq!(result.combinations, 120.0);
/// ```
pub fn calculate(input: &CombinatoricsInput) -> CalcResult<CombinatoricsResult> {
    input.validate()?;

    let n = factorial(input.n)?;
    let r = factorial(input.r)?;
    let n_minus_r = factorial(input.n - input.r)?;

    // results are integers; rounding strips the division noise
    Ok(CombinatoricsResult {
        permutations: (n / n_minus_r).round(),
        combinations: (n / (r * n_minus_r)).round(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial_table() {
        assert_eq!(factorial(0).unwrap(), 1.0);
        assert_eq!(factorial(5).unwrap(), 120.0);
        assert_eq!(factorial(20).unwrap(), 2_432_902_008_176_640_000.0);
        assert!(factorial(170).unwrap().is_finite());
        assert!(factorial(171).is_err());
    }

    #[test]
    fn test_small_values() {
        let result = calculate(&CombinatoricsInput { n: 5, r: 2 }).unwrap();
        assert_eq!(result.permutations, 20.0);
        assert_eq!(result.combinations, 10.0);

        let result = calculate(&CombinatoricsInput { n: 10, r: 5 }).unwrap();
        assert_eq!(result.combinations, 252.0);
    }

    #[test]
    fn test_edges() {
        let none = calculate(&CombinatoricsInput { n: 7, r: 0 }).unwrap();
        assert_eq!(none.permutations, 1.0);
        assert_eq!(none.combinations, 1.0);

        let all = calculate(&CombinatoricsInput { n: 7, r: 7 }).unwrap();
        assert_eq!(all.permutations, 5040.0);
        assert_eq!(all.combinations, 1.0);
    }

    #[test]
    fn test_large_n_is_finite() {
        let result = calculate(&CombinatoricsInput { n: 170, r: 85 }).unwrap();
        assert!(result.combinations.is_finite());
        assert!(result.combinations > 1e49);
    }

    #[test]
    fn test_invalid() {
        assert!(calculate(&CombinatoricsInput { n: 3, r: 4 }).is_err());
        assert!(calculate(&CombinatoricsInput { n: 171, r: 1 }).is_err());
    }
}
