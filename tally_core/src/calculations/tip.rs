//! # Tip Splitting
//!
//! Tip on a bill, split evenly across a party.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::calculations::tip::{calculate, TipInput};
//!
//! let result = calculate(&TipInput { bill_amount: 120.0, tip_percent: 15.0, party_size: 4 }).unwrap();
//! assert_eq!(result.tip_amount, 18.0);
//! assert_eq!(result.per_person, 34.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};

/// Input parameters for a tip split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipInput {
    /// Bill before tip
    pub bill_amount: f64,

    /// Tip as a percentage of the bill
    pub tip_percent: f64,

    /// Number of people sharing the bill
    #[serde(default = "default_party_size")]
    pub party_size: u32,
}

fn default_party_size() -> u32 {
    1
}

impl TipInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("bill_amount", self.bill_amount)?;
        require_finite("tip_percent", self.tip_percent)?;
        if self.bill_amount < 0.0 {
            return Err(CalcError::invalid_input(
                "bill_amount",
                self.bill_amount.to_string(),
                "Bill cannot be negative",
            ));
        }
        if self.tip_percent < 0.0 {
            return Err(CalcError::invalid_input(
                "tip_percent",
                self.tip_percent.to_string(),
                "Tip percentage cannot be negative",
            ));
        }
        if self.party_size == 0 {
            return Err(CalcError::domain("party_size", "cannot be zero when splitting a bill"));
        }
        Ok(())
    }
}

/// Results from a tip split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipResult {
    pub tip_amount: f64,
    /// Bill plus tip
    pub total: f64,
    /// Each person's share of the total
    pub per_person: f64,
    /// Each person's share of the tip
    pub tip_per_person: f64,
}

pub fn calculate(input: &TipInput) -> CalcResult<TipResult> {
    input.validate()?;

    let tip_amount = input.bill_amount * input.tip_percent / 100.0;
    let total = input.bill_amount + tip_amount;
    let people = f64::from(input.party_size);

    Ok(TipResult {
        tip_amount,
        total,
        per_person: total / people,
        tip_per_person: tip_amount / people,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_diner() {
        let result = calculate(&TipInput { bill_amount: 50.0, tip_percent: 20.0, party_size: 1 }).unwrap();
        assert_eq!(result.tip_amount, 10.0);
        assert_eq!(result.total, 60.0);
        assert_eq!(result.per_person, 60.0);
    }

    #[test]
    fn test_split() {
        let result = calculate(&TipInput { bill_amount: 99.0, tip_percent: 0.0, party_size: 3 }).unwrap();
        assert_eq!(result.per_person, 33.0);
        assert_eq!(result.tip_per_person, 0.0);
    }

    #[test]
    fn test_zero_party_is_domain_error() {
        let err = calculate(&TipInput { bill_amount: 10.0, tip_percent: 10.0, party_size: 0 }).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_ERROR");
    }

    #[test]
    fn test_negative_bill_rejected() {
        assert!(calculate(&TipInput { bill_amount: -1.0, tip_percent: 10.0, party_size: 1 }).is_err());
    }

    #[test]
    fn test_party_size_defaults_to_one() {
        let input: TipInput = serde_json::from_str(r#"{ "bill_amount": 40.0, "tip_percent": 10.0 }"#).unwrap();
        assert_eq!(input.party_size, 1);
    }
}
