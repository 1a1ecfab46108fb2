//! # Calculations
//!
//! Self-contained calculators that sit alongside the formula, subnet and
//! amortization evaluators. Each one follows the same pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! [`CalculationItem`] wraps every evaluator in the crate behind a single
//! tagged enum, so a JSON document can name any of them by `"type"`.
//!
//! ## Available Calculations
//!
//! - [`tip`] - Tip and bill split
//! - [`gst`] - Goods and services tax, inclusive or exclusive
//! - [`break_even`] - Break-even units and revenue
//! - [`calories`] - Energy expenditure from MET values
//! - [`combinatorics`] - Permutations and combinations
//! - [`quadratic`] - Roots of `ax² + bx + c = 0`
//! - [`matrix`] - 2×2 and 3×3 determinants
//! - [`fertilizer`] - N-P-K blend quantities

pub mod break_even;
pub mod calories;
pub mod combinatorics;
pub mod fertilizer;
pub mod gst;
pub mod matrix;
pub mod quadratic;
pub mod tip;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amortization::{self, PaymentInput, PaymentResult, PayoffInput, PayoffResult};
use crate::errors::CalcResult;
use crate::formulas::{self, FormulaInput, FormulaResult};
use crate::settings::Settings;
use crate::subnet::{self, SubnetInput, SubnetResult};

// Re-export commonly used types
pub use break_even::{BreakEvenInput, BreakEvenResult};
pub use calories::{Activity, CaloriesInput, CaloriesResult};
pub use combinatorics::{CombinatoricsInput, CombinatoricsResult};
pub use fertilizer::{FertilizerInput, FertilizerProduct, FertilizerResult, Nutrients};
pub use gst::{GstInput, GstMode, GstResult};
pub use matrix::{MatrixInput, MatrixResult};
pub use quadratic::{QuadraticInput, QuadraticResult, Roots};
pub use tip::{TipInput, TipResult};

/// Enum wrapper for every calculation the crate can evaluate.
///
/// ## JSON Example
///
/// ```json
/// {
///   "type": "Formula",
///   "formula": "ohms_law",
///   "solve_for": "current",
///   "known": { "voltage": 12.0, "resistance": 4.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    /// Solve a three-variable formula for one unknown
    Formula(FormulaInput),
    /// IPv4 subnet breakdown
    Subnet(SubnetInput),
    /// Months to pay off a loan at a fixed payment
    Payoff(PayoffInput),
    /// Fixed payment for a loan term
    Payment(PaymentInput),
    Tip(TipInput),
    Gst(GstInput),
    BreakEven(BreakEvenInput),
    Calories(CaloriesInput),
    Combinatorics(CombinatoricsInput),
    Quadratic(QuadraticInput),
    Matrix(MatrixInput),
    Fertilizer(FertilizerInput),
}

/// Result of evaluating a [`CalculationItem`], tagged the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    Formula(FormulaResult),
    Subnet(SubnetResult),
    Payoff(PayoffResult),
    Payment(PaymentResult),
    Tip(TipResult),
    Gst(GstResult),
    BreakEven(BreakEvenResult),
    Calories(CaloriesResult),
    Combinatorics(CombinatoricsResult),
    Quadratic(QuadraticResult),
    Matrix(MatrixResult),
    Fertilizer(FertilizerResult),
}

impl CalculationItem {
    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::Formula(_) => "Formula",
            CalculationItem::Subnet(_) => "Subnet",
            CalculationItem::Payoff(_) => "Payoff",
            CalculationItem::Payment(_) => "Payment",
            CalculationItem::Tip(_) => "Tip",
            CalculationItem::Gst(_) => "Gst",
            CalculationItem::BreakEven(_) => "BreakEven",
            CalculationItem::Calories(_) => "Calories",
            CalculationItem::Combinatorics(_) => "Combinatorics",
            CalculationItem::Quadratic(_) => "Quadratic",
            CalculationItem::Matrix(_) => "Matrix",
            CalculationItem::Fertilizer(_) => "Fertilizer",
        }
    }

    /// Parse a calculation from JSON.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Run the calculation.
    ///
    /// `settings` supplies limits that are not part of the input itself,
    /// such as the maximum amortization schedule length.
    ///
    /// ```rust
    /// use tally_core::calculations::{CalculationItem, CalculationOutput};
    /// use tally_core::settings::Settings;
    ///
    /// let item = CalculationItem::from_json_str(
    ///     r#"{"type": "Subnet", "address": "192.168.1.10", "prefix_length": 24}"#,
    /// ).unwrap();
    ///
    /// match item.evaluate(&Settings::default()).unwrap() {
    ///     CalculationOutput::Subnet(s) => assert_eq!(s.network_address, "192.168.1.0"),
    ///     other => panic!("unexpected output {:?}", other),
    /// }
    /// ```
    pub fn evaluate(&self, settings: &Settings) -> CalcResult<CalculationOutput> {
        debug!(calc_type = self.calc_type(), "evaluating calculation");
        Ok(match self {
            CalculationItem::Formula(i) => CalculationOutput::Formula(formulas::evaluator::calculate(i)?),
            CalculationItem::Subnet(i) => CalculationOutput::Subnet(subnet::calculate(i)?),
            CalculationItem::Payoff(i) => {
                CalculationOutput::Payoff(amortization::calculate_payoff(i, settings.max_schedule_months)?)
            }
            CalculationItem::Payment(i) => CalculationOutput::Payment(amortization::calculate_payment(i)?),
            CalculationItem::Tip(i) => CalculationOutput::Tip(tip::calculate(i)?),
            CalculationItem::Gst(i) => CalculationOutput::Gst(gst::calculate(i)?),
            CalculationItem::BreakEven(i) => CalculationOutput::BreakEven(break_even::calculate(i)?),
            CalculationItem::Calories(i) => CalculationOutput::Calories(calories::calculate(i)?),
            CalculationItem::Combinatorics(i) => CalculationOutput::Combinatorics(combinatorics::calculate(i)?),
            CalculationItem::Quadratic(i) => CalculationOutput::Quadratic(quadratic::calculate(i)?),
            CalculationItem::Matrix(i) => CalculationOutput::Matrix(matrix::calculate(i)?),
            CalculationItem::Fertilizer(i) => CalculationOutput::Fertilizer(fertilizer::calculate(i)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;

    #[test]
    fn test_formula_item_from_json() {
        let json = r#"{
            "type": "Formula",
            "formula": "ohms_law",
            "solve_for": "current",
            "known": { "voltage": 12.0, "resistance": 4.0 }
        }"#;
        let item = CalculationItem::from_json_str(json).unwrap();
        assert_eq!(item.calc_type(), "Formula");

        match item.evaluate(&Settings::default()).unwrap() {
            CalculationOutput::Formula(r) => assert!((r.value - 3.0).abs() < 1e-12),
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_payoff_schedule_respects_settings() {
        let json = r#"{
            "type": "Payoff",
            "balance": 1200.0,
            "annual_rate_percent": 0.0,
            "monthly_payment": 100.0,
            "include_schedule": true
        }"#;
        let item = CalculationItem::from_json_str(json).unwrap();

        let tight = Settings {
            max_schedule_months: 6,
            ..Settings::default()
        };
        let err = item.evaluate(&tight).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        assert!(item.evaluate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_output_is_tagged() {
        let item = CalculationItem::Tip(TipInput {
            bill_amount: 100.0,
            tip_percent: 15.0,
            party_size: 1,
        });
        let output = item.evaluate(&Settings::default()).unwrap();
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"type\":\"Tip\""));
    }

    #[test]
    fn test_unknown_type_is_serialization_error() {
        let err = CalculationItem::from_json_str(r#"{"type": "Pendulum"}"#).unwrap_err();
        assert!(matches!(err, CalcError::SerializationError { .. }));
    }

    #[test]
    fn test_errors_pass_through() {
        let item = CalculationItem::Quadratic(QuadraticInput { a: 0.0, b: 1.0, c: 1.0 });
        assert_eq!(
            item.evaluate(&Settings::default()).unwrap_err().error_code(),
            "DOMAIN_ERROR"
        );
    }
}
