//! # Error Types
//!
//! Structured error types for tally_core. Every evaluator validates its own
//! preconditions and fails fast with one of these variants; nothing is retried
//! and nothing is silently downgraded.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::errors::{CalcError, CalcResult};
//!
//! fn validate_balance(balance: f64) -> CalcResult<()> {
//!     if balance <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "balance".to_string(),
//!             value: balance.to_string(),
//!             reason: "Balance must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tally_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for evaluation operations.
///
/// Each variant provides specific context about what went wrong,
/// so callers can display it verbatim or branch on [`CalcError::error_code`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A mathematically undefined operation was requested
    /// (e.g. a rearrangement that divides by a zero-valued variable)
    #[error("Domain error for '{variable}': {reason}")]
    Domain { variable: String, reason: String },

    /// Malformed structured input (e.g. an IPv4 address that is not a dotted quad)
    #[error("Format error in '{input}': {reason}")]
    Format { input: String, reason: String },

    /// The payment never reduces the balance under compounding interest
    #[error("Non-convergent payoff: {reason}")]
    NonConvergentPayoff { reason: String },

    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create a Domain error
    pub fn domain(variable: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Domain {
            variable: variable.into(),
            reason: reason.into(),
        }
    }

    /// Create a Format error
    pub fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Format {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a NonConvergentPayoff error
    pub fn non_convergent(reason: impl Into<String>) -> Self {
        CalcError::NonConvergentPayoff {
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Domain { .. } => "DOMAIN_ERROR",
            CalcError::Format { .. } => "FORMAT_ERROR",
            CalcError::NonConvergentPayoff { .. } => "NON_CONVERGENT_PAYOFF",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

/// Reject NaN and infinities before they reach any arithmetic.
pub(crate) fn require_finite(field: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Value must be a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::domain("resistance", "cannot be zero when solving for current");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Domain\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::format("1.2.3", "bad").error_code(), "FORMAT_ERROR");
        assert_eq!(CalcError::non_convergent("never").error_code(), "NON_CONVERGENT_PAYOFF");
    }

    #[test]
    fn test_display_names_offending_variable() {
        let error = CalcError::domain("resistance", "cannot be zero when solving for current");
        assert_eq!(
            error.to_string(),
            "Domain error for 'resistance': cannot be zero when solving for current"
        );
    }

    #[test]
    fn test_require_finite() {
        assert_eq!(require_finite("x", 2.5).unwrap(), 2.5);
        assert!(require_finite("x", f64::NAN).is_err());
        assert!(require_finite("x", f64::INFINITY).is_err());
    }
}
