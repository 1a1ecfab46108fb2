//! # Quadratic Equation
//!
//! Roots of `a·x² + b·x + c = 0`.
//!
//! Real roots use the cancellation-free form `q = −(b + sign(b)·√D) / 2`,
//! `x₁ = q / a`, `x₂ = c / q`, which keeps the small root accurate when
//! `b² ≫ 4ac`.

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};

/// Coefficients of `a·x² + b·x + c`.
///
/// ## JSON Example
///
/// ```json
/// { "a": 1.0, "b": -3.0, "c": 2.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticInput {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl QuadraticInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("a", self.a)?;
        require_finite("b", self.b)?;
        require_finite("c", self.c)?;
        if self.a == 0.0 {
            return Err(CalcError::domain("a", "cannot be zero for a quadratic equation"));
        }
        Ok(())
    }

    /// b² − 4ac
    pub fn discriminant(&self) -> f64 {
        self.b * self.b - 4.0 * self.a * self.c
    }
}

/// The nature of the roots, decided by the sign of the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Roots {
    /// D > 0; `x1 < x2`
    TwoReal { x1: f64, x2: f64 },
    /// D = 0
    Repeated { x: f64 },
    /// D < 0; roots are `real ± imaginary·i`
    Complex { real: f64, imaginary: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticResult {
    pub discriminant: f64,
    pub roots: Roots,
    /// x-coordinate of the vertex, −b / 2a
    pub vertex_x: f64,
    /// y-coordinate of the vertex
    pub vertex_y: f64,
}

/// Solve for the roots.
///
/// ```rust
/// use tally_core::calculations::quadratic::{calculate, QuadraticInput, Roots};
///
/// let result = calculate(&QuadraticInput { a: 1.0, b: -3.0, c: 2.0 }).unwrap();
/// assert_eq!(result.roots, Roots::TwoReal { x1: 1.0, x2: 2.0 });
/// ```
pub fn calculate(input: &QuadraticInput) -> CalcResult<QuadraticResult> {
    input.validate()?;
    let QuadraticInput { a, b, c } = *input;

    let discriminant = input.discriminant();
    if !discriminant.is_finite() {
        return Err(CalcError::domain("discriminant", "coefficients are too large to square"));
    }

    let roots = if discriminant > 0.0 {
        let sqrt_d = discriminant.sqrt();
        let q = -0.5 * (b + b.signum() * sqrt_d);
        let (r1, r2) = (q / a, c / q);
        Roots::TwoReal {
            x1: r1.min(r2),
            x2: r1.max(r2),
        }
    } else if discriminant == 0.0 {
        Roots::Repeated { x: -b / (2.0 * a) }
    } else {
        Roots::Complex {
            real: -b / (2.0 * a),
            imaginary: (-discriminant).sqrt() / (2.0 * a).abs(),
        }
    };

    let vertex_x = -b / (2.0 * a);
    Ok(QuadraticResult {
        discriminant,
        roots,
        vertex_x,
        vertex_y: a * vertex_x * vertex_x + b * vertex_x + c,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_real_roots() {
        let result = calculate(&QuadraticInput { a: 2.0, b: 4.0, c: -6.0 }).unwrap();
        assert_eq!(result.discriminant, 64.0);
        assert_eq!(result.roots, Roots::TwoReal { x1: -3.0, x2: 1.0 });
    }

    #[test]
    fn test_repeated_root() {
        let result = calculate(&QuadraticInput { a: 1.0, b: -4.0, c: 4.0 }).unwrap();
        assert_eq!(result.roots, Roots::Repeated { x: 2.0 });
        assert_eq!(result.vertex_y, 0.0);
    }

    #[test]
    fn test_complex_roots() {
        let result = calculate(&QuadraticInput { a: 1.0, b: 2.0, c: 5.0 }).unwrap();
        assert_eq!(result.roots, Roots::Complex { real: -1.0, imaginary: 2.0 });
    }

    #[test]
    fn test_b_zero() {
        let result = calculate(&QuadraticInput { a: 1.0, b: 0.0, c: -9.0 }).unwrap();
        assert_eq!(result.roots, Roots::TwoReal { x1: -3.0, x2: 3.0 });
    }

    #[test]
    fn test_small_root_stays_accurate() {
        let result = calculate(&QuadraticInput { a: 1.0, b: -1e8, c: 1.0 }).unwrap();
        match result.roots {
            Roots::TwoReal { x1, .. } => assert!((x1 - 1e-8).abs() < 1e-20),
            other => panic!("unexpected roots {:?}", other),
        }
    }

    #[test]
    fn test_a_zero_is_domain_error() {
        let err = calculate(&QuadraticInput { a: 0.0, b: 2.0, c: 1.0 }).unwrap_err();
        assert_eq!(err, CalcError::domain("a", "cannot be zero for a quadratic equation"));
    }
}
