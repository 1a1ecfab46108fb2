//! # Settings
//!
//! Front-end configuration. The evaluators themselves take no configuration;
//! these values control how results are rendered and a few resource limits.
//!
//! Settings are read from an optional JSON file. Any field left out falls
//! back to its default.
//!
//! ```rust
//! use tally_core::settings::{OutputFormat, Settings};
//!
//! let settings = Settings::from_json_str(r#"{ "decimal_places": 2 }"#).unwrap();
//! assert_eq!(settings.decimal_places, 2);
//! assert_eq!(settings.output, OutputFormat::Text);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amortization::DEFAULT_MAX_SCHEDULE_MONTHS;
use crate::errors::{CalcError, CalcResult};

/// Upper bound for [`Settings::decimal_places`]
pub const MAX_DECIMAL_PLACES: u8 = 12;

/// Upper bound for [`Settings::max_schedule_months`] (1000 years)
pub const SCHEDULE_MONTHS_LIMIT: u32 = 12_000;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// The serialized result type
    Json,
}

/// Front-end settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output: OutputFormat,

    /// Decimals shown by the text renderer
    pub decimal_places: u8,

    /// Longest amortization schedule that will be generated
    pub max_schedule_months: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output: OutputFormat::Text,
            decimal_places: 4,
            max_schedule_months: DEFAULT_MAX_SCHEDULE_MONTHS,
        }
    }
}

impl Settings {
    /// Validate ranges.
    pub fn validate(&self) -> CalcResult<()> {
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(CalcError::invalid_input(
                "decimal_places",
                self.decimal_places.to_string(),
                format!("At most {} decimal places are supported", MAX_DECIMAL_PLACES),
            ));
        }
        if self.max_schedule_months == 0 || self.max_schedule_months > SCHEDULE_MONTHS_LIMIT {
            return Err(CalcError::invalid_input(
                "max_schedule_months",
                self.max_schedule_months.to_string(),
                format!("Schedule limit must be between 1 and {} months", SCHEDULE_MONTHS_LIMIT),
            ));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON text.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    ///
    /// ```rust,no_run
    /// use tally_core::settings::Settings;
    /// use std::path::Path;
    ///
    /// let settings = Settings::load(Path::new("tally.json"))?;
    /// # Ok::<(), tally_core::errors::CalcError>(())
    /// ```
    pub fn load(path: &Path) -> CalcResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

        let settings: Settings = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;
        settings.validate()?;

        debug!(path = %path.display(), ?settings, "settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.output, OutputFormat::Text);
        assert_eq!(settings.decimal_places, 4);
        assert_eq!(settings.max_schedule_months, 1200);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        assert_eq!(Settings::from_json_str("{}").unwrap(), Settings::default());
    }

    #[test]
    fn test_json_output() {
        let settings = Settings::from_json_str(r#"{ "output": "json" }"#).unwrap();
        assert_eq!(settings.output, OutputFormat::Json);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = Settings::from_json_str(r#"{ "decimal_places": 13 }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = Settings::from_json_str(r#"{ "max_schedule_months": 0 }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = Settings::from_json_str(r#"{ "max_schedule_months": 4294967295 }"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let at_limit = Settings::from_json_str(r#"{ "max_schedule_months": 12000 }"#).unwrap();
        assert_eq!(at_limit.max_schedule_months, SCHEDULE_MONTHS_LIMIT);
    }

    #[test]
    fn test_bad_json() {
        let err = Settings::from_json_str(r#"{ "output": "yaml" }"#).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/tally-settings.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("tally_settings_{}.json", std::process::id()));
        fs::write(&path, r#"{ "decimal_places": 6, "output": "json" }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(settings.decimal_places, 6);
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.max_schedule_months, DEFAULT_MAX_SCHEDULE_MONTHS);
    }
}
