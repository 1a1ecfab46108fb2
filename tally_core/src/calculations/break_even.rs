//! # Break-Even Analysis
//!
//! Units (and revenue) needed for sales to cover fixed costs.
//!
//! The contribution margin is price minus variable cost per unit; each unit
//! sold contributes that much toward fixed costs.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::calculations::break_even::{calculate, BreakEvenInput};
//!
//! let input = BreakEvenInput {
//!     fixed_costs: 10_000.0,
//!     price_per_unit: 50.0,
//!     variable_cost_per_unit: 30.0,
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.break_even_units, 500);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{require_finite, CalcError, CalcResult};

/// Input parameters for break-even analysis.
///
/// ## JSON Example
///
/// ```json
/// {
///   "fixed_costs": 10000.0,
///   "price_per_unit": 50.0,
///   "variable_cost_per_unit": 30.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenInput {
    /// Costs that do not vary with volume
    pub fixed_costs: f64,

    /// Sales price per unit
    pub price_per_unit: f64,

    /// Cost incurred per unit produced
    pub variable_cost_per_unit: f64,
}

impl BreakEvenInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("fixed_costs", self.fixed_costs)?;
        require_finite("price_per_unit", self.price_per_unit)?;
        require_finite("variable_cost_per_unit", self.variable_cost_per_unit)?;
        if self.fixed_costs < 0.0 {
            return Err(CalcError::invalid_input(
                "fixed_costs",
                self.fixed_costs.to_string(),
                "Fixed costs cannot be negative",
            ));
        }
        if self.price_per_unit <= 0.0 {
            return Err(CalcError::invalid_input(
                "price_per_unit",
                self.price_per_unit.to_string(),
                "Price must be positive",
            ));
        }
        if self.variable_cost_per_unit < 0.0 {
            return Err(CalcError::invalid_input(
                "variable_cost_per_unit",
                self.variable_cost_per_unit.to_string(),
                "Variable cost cannot be negative",
            ));
        }
        Ok(())
    }

    /// Sales price minus variable cost per unit
    pub fn contribution_margin(&self) -> f64 {
        self.price_per_unit - self.variable_cost_per_unit
    }
}

/// Results from break-even analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenResult {
    pub contribution_margin: f64,

    /// Contribution margin as a fraction of price
    pub contribution_margin_ratio: f64,

    /// Whole units to sell (rounded up)
    pub break_even_units: u64,

    /// Revenue at the exact break-even point
    pub break_even_revenue: f64,
}

/// Calculate the break-even point.
///
/// # Errors
///
/// * `InvalidInput` - negative costs or non-positive price
/// * `Domain` - the contribution margin is zero or negative, so no volume breaks even,
///   or the break-even volume is too large to represent
pub fn calculate(input: &BreakEvenInput) -> CalcResult<BreakEvenResult> {
    input.validate()?;

    let margin = input.contribution_margin();
    if margin <= 0.0 {
        warn!(margin, "non-positive contribution margin");
        return Err(CalcError::domain(
            "contribution_margin",
            format!("must be positive to break even (price minus variable cost is {})", margin),
        ));
    }

    let exact_units = input.fixed_costs / margin;
    let ratio = margin / input.price_per_unit;
    let break_even_revenue = exact_units * input.price_per_unit;

    if !break_even_revenue.is_finite() || exact_units.ceil() >= u64::MAX as f64 {
        warn!(exact_units, "break-even volume out of range");
        return Err(CalcError::domain(
            "break_even_units",
            "result is outside the representable range",
        ));
    }

    Ok(BreakEvenResult {
        contribution_margin: margin,
        contribution_margin_ratio: ratio,
        break_even_units: exact_units.ceil() as u64,
        break_even_revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> BreakEvenInput {
        BreakEvenInput {
            fixed_costs: 10_000.0,
            price_per_unit: 50.0,
            variable_cost_per_unit: 30.0,
        }
    }

    #[test]
    fn test_break_even() {
        let result = calculate(&test_input()).unwrap();
        assert_eq!(result.contribution_margin, 20.0);
        assert!((result.contribution_margin_ratio - 0.4).abs() < 1e-12);
        assert_eq!(result.break_even_units, 500);
        assert!((result.break_even_revenue - 25_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_unit_rounds_up() {
        let mut input = test_input();
        input.fixed_costs = 10_001.0;
        assert_eq!(calculate(&input).unwrap().break_even_units, 501);
    }

    #[test]
    fn test_zero_margin_is_domain_error() {
        let mut input = test_input();
        input.variable_cost_per_unit = 50.0;
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_ERROR");
        assert!(err.to_string().contains("contribution_margin"));
    }

    #[test]
    fn test_unrepresentable_volume_is_domain_error() {
        let input = BreakEvenInput {
            fixed_costs: 1e308,
            price_per_unit: 1.0,
            variable_cost_per_unit: 0.9999999999,
        };
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_ERROR");

        // finite, but more units than a u64 can count
        let input = BreakEvenInput {
            fixed_costs: 1e30,
            price_per_unit: 2.0,
            variable_cost_per_unit: 1.0,
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "DOMAIN_ERROR");
    }
}
