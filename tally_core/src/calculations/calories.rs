//! # Calories Burned (MET)
//!
//! Energy expenditure from a Metabolic Equivalent of Task value:
//!
//! ```text
//! kcal/min = MET × 3.5 × body mass (kg) / 200
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};

/// Common activities with reference MET values (Compendium of Physical Activities).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Sleeping,
    Yoga,
    Walking,
    Cycling,
    Swimming,
    Running,
}

impl Activity {
    pub fn met(&self) -> f64 {
        match self {
            Activity::Sleeping => 0.95,
            Activity::Yoga => 2.5,
            Activity::Walking => 3.5,
            Activity::Swimming => 6.0,
            Activity::Cycling => 7.5,
            Activity::Running => 9.8,
        }
    }
}

/// Input parameters for a calories-burned estimate.
///
/// ## JSON Example
///
/// ```json
/// { "met": 9.8, "weight_kg": 70.0, "duration_minutes": 30.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaloriesInput {
    pub met: f64,
    pub weight_kg: f64,
    pub duration_minutes: f64,
}

impl CaloriesInput {
    pub fn for_activity(activity: Activity, weight_kg: f64, duration_minutes: f64) -> Self {
        Self {
            met: activity.met(),
            weight_kg,
            duration_minutes,
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [
            ("met", self.met),
            ("weight_kg", self.weight_kg),
            ("duration_minutes", self.duration_minutes),
        ] {
            require_finite(field, value)?;
            if value <= 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Value must be positive"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaloriesResult {
    pub kcal_per_minute: f64,
    pub total_kcal: f64,
}

pub fn calculate(input: &CaloriesInput) -> CalcResult<CaloriesResult> {
    input.validate()?;
    let kcal_per_minute = input.met * 3.5 * input.weight_kg / 200.0;
    Ok(CaloriesResult {
        kcal_per_minute,
        total_kcal: kcal_per_minute * input.duration_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_half_hour() {
        let input = CaloriesInput::for_activity(Activity::Running, 70.0, 30.0);
        let result = calculate(&input).unwrap();
        // 9.8 × 3.5 × 70 / 200 = 12.005 kcal/min
        assert!((result.kcal_per_minute - 12.005).abs() < 1e-9);
        assert!((result.total_kcal - 360.15).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let input = CaloriesInput { met: 3.5, weight_kg: 70.0, duration_minutes: 0.0 };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "INVALID_INPUT");
    }
}
