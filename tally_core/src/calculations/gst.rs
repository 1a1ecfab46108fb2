//! # Goods and Services Tax
//!
//! Adds GST to a net amount, or extracts it from a tax-inclusive amount.
//!
//! ```text
//! add:    gst = net × r/100           gross = net + gst
//! remove: net = gross / (1 + r/100)   gst = gross − net
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};

/// Whether `amount` excludes or includes the tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GstMode {
    /// `amount` is net; add tax on top
    #[default]
    Add,
    /// `amount` is gross; back the tax out
    Remove,
}

/// Input parameters for a GST calculation.
///
/// ## JSON Example
///
/// ```json
/// { "amount": 1180.0, "rate_percent": 18.0, "mode": "remove" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstInput {
    pub amount: f64,
    pub rate_percent: f64,
    #[serde(default)]
    pub mode: GstMode,
}

impl GstInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("amount", self.amount)?;
        require_finite("rate_percent", self.rate_percent)?;
        if self.amount < 0.0 {
            return Err(CalcError::invalid_input("amount", self.amount.to_string(), "Amount cannot be negative"));
        }
        if self.rate_percent < 0.0 {
            return Err(CalcError::invalid_input(
                "rate_percent",
                self.rate_percent.to_string(),
                "Rate cannot be negative",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstResult {
    pub net_amount: f64,
    pub gst_amount: f64,
    pub gross_amount: f64,
}

pub fn calculate(input: &GstInput) -> CalcResult<GstResult> {
    input.validate()?;
    let rate = input.rate_percent / 100.0;

    let (net_amount, gross_amount) = match input.mode {
        GstMode::Add => (input.amount, input.amount * (1.0 + rate)),
        GstMode::Remove => (input.amount / (1.0 + rate), input.amount),
    };

    Ok(GstResult {
        net_amount,
        gst_amount: gross_amount - net_amount,
        gross_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_gst() {
        let result = calculate(&GstInput { amount: 1000.0, rate_percent: 18.0, mode: GstMode::Add }).unwrap();
        assert!((result.gst_amount - 180.0).abs() < 1e-9);
        assert!((result.gross_amount - 1180.0).abs() < 1e-9);
    }

    #[test]
    fn test_remove_gst() {
        let result = calculate(&GstInput { amount: 1180.0, rate_percent: 18.0, mode: GstMode::Remove }).unwrap();
        assert!((result.net_amount - 1000.0).abs() < 1e-9);
        assert!((result.gst_amount - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_mode_defaults_to_add() {
        let input: GstInput = serde_json::from_str(r#"{ "amount": 100.0, "rate_percent": 5.0 }"#).unwrap();
        assert_eq!(input.mode, GstMode::Add);
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(calculate(&GstInput { amount: 100.0, rate_percent: -5.0, mode: GstMode::Add }).is_err());
    }
}
