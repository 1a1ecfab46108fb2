//! # Numeric Guard
//!
//! Rejects input combinations that would make a rearrangement undefined
//! before any arithmetic is attempted: missing or non-finite operands,
//! negative values for non-negative quantities, and zero divisors.

use tracing::warn;

use crate::errors::{require_finite, CalcError, CalcResult};
use crate::formulas::registry::{Rearrangement, VariableSet};

/// Validate `known` against the operands of `rearrangement`.
///
/// Returns `known` unchanged on success. Values for variables that are not
/// operands (including the unknown itself) are ignored.
///
/// # Errors
///
/// * `MissingField` - an operand has no value
/// * `InvalidInput` - an operand is NaN or infinite
/// * `Domain` - an operand is negative but must not be, or the divisor is zero
///
/// # Example
///
/// ```rust
/// use tally_core::formulas::guard;
/// use tally_core::formulas::registry::{Formula, Variable, VariableSet};
///
/// let r = Formula::OhmsLaw.rearrangement(Variable::Current).unwrap();
/// let known = VariableSet::new()
///     .with(Variable::Voltage, 12.0)
///     .with(Variable::Resistance, 0.0);
///
/// let err = guard::check(r, &known).unwrap_err();
/// assert!(err.to_string().contains("resistance"));
/// ```
pub fn check<'a>(rearrangement: &Rearrangement, known: &'a VariableSet) -> CalcResult<&'a VariableSet> {
    for operand in rearrangement.operands {
        let value = require_finite(operand.name(), known.require(operand)?)?;

        if operand.non_negative() && value < 0.0 {
            warn!(variable = operand.name(), value, "negative value rejected");
            return Err(CalcError::domain(
                operand.name(),
                format!("cannot be negative (got {})", value),
            ));
        }
    }

    if let Some(divisor) = rearrangement.divisor() {
        if known.require(divisor)? == 0.0 {
            warn!(
                variable = divisor.name(),
                solve_for = rearrangement.solve_for.name(),
                "zero divisor rejected"
            );
            return Err(CalcError::domain(
                divisor.name(),
                format!("cannot be zero when solving for {}", rearrangement.solve_for.name()),
            ));
        }
    }

    Ok(known)
}
