//! # Formula Evaluator
//!
//! Solves a registered formula for one unknown variable.
//!
//! Two entry points share one code path:
//!
//! - [`evaluate_formula`] takes a [`Formula`], the unknown [`Variable`] and a
//!   [`VariableSet`] of knowns. This is what JSON callers and the CLI use.
//! - Typed problem enums ([`OhmsLaw`], [`ElectricPower`], [`NewtonsSecondLaw`],
//!   [`Density`], [`Speed`]) carry exactly the knowns for each unknown, so an
//!   invalid combination cannot be constructed. They lower onto
//!   [`evaluate_formula`] through [`FormulaProblem::solve`].
//!
//! No rounding is applied; values are plain IEEE doubles.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::formulas::{FormulaProblem, OhmsLaw};
//!
//! let result = OhmsLaw::Current { voltage: 12.0, resistance: 4.0 }.solve().unwrap();
//! assert_eq!(result.value, 3.0);
//! assert_eq!(result.unit, "Amperes (A)");
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{CalcError, CalcResult};
use crate::formulas::guard;
use crate::formulas::registry::{Formula, Variable, VariableSet};

/// Dynamic evaluation request.
///
/// ## JSON Example
///
/// ```json
/// {
///   "formula": "ohms_law",
///   "solve_for": "current",
///   "known": { "voltage": 12.0, "resistance": 4.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaInput {
    pub formula: Formula,
    pub solve_for: Variable,
    #[serde(default)]
    pub known: VariableSet,
}

/// A solved unknown with its unit label.
///
/// ## JSON Example
///
/// ```json
/// {
///   "formula": "ohms_law",
///   "solved_for": "current",
///   "value": 3.0,
///   "unit": "Amperes (A)",
///   "expression": "I = V / R"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaResult {
    pub formula: Formula,
    pub solved_for: Variable,
    pub value: f64,
    pub unit: String,
    /// The rearrangement that produced the value
    pub expression: String,
}

/// Solve `formula` for `unknown` given the other variables in `known`.
///
/// Runs [`guard::check`] first; on failure no arithmetic is performed.
///
/// # Errors
///
/// * `InvalidInput` - `unknown` is not a variable of `formula`, or an operand is not finite
/// * `MissingField` - a known variable is absent
/// * `Domain` - a zero divisor, a negative non-negative quantity, or a non-finite result
pub fn evaluate_formula(formula: Formula, unknown: Variable, known: &VariableSet) -> CalcResult<FormulaResult> {
    let rearrangement = formula.rearrangement(unknown).ok_or_else(|| {
        CalcError::invalid_input(
            "solve_for",
            unknown.name(),
            format!("{} is not a variable of {}", unknown.name(), formula),
        )
    })?;

    debug!(formula = ?formula, solve_for = unknown.name(), known = ?known, "evaluating formula");

    let known = guard::check(rearrangement, known)?;
    let [a, b] = rearrangement.operands;
    let value = rearrangement.apply(known.require(a)?, known.require(b)?);

    if !value.is_finite() {
        warn!(formula = ?formula, solve_for = unknown.name(), "non-finite result");
        return Err(CalcError::domain(
            unknown.name(),
            "result is outside the representable range",
        ));
    }
    if unknown.non_negative() && value < 0.0 {
        warn!(formula = ?formula, solve_for = unknown.name(), value, "negative result rejected");
        return Err(CalcError::domain(
            unknown.name(),
            format!("cannot be negative (inputs give {})", value),
        ));
    }

    debug!(formula = ?formula, solve_for = unknown.name(), value, "formula solved");

    Ok(FormulaResult {
        formula,
        solved_for: unknown,
        value,
        unit: unknown.unit().to_string(),
        expression: rearrangement.expression(),
    })
}

/// Evaluate a [`FormulaInput`] request.
pub fn calculate(input: &FormulaInput) -> CalcResult<FormulaResult> {
    evaluate_formula(input.formula, input.solve_for, &input.known)
}

/// A formula with its unknown fixed at the type level.
pub trait FormulaProblem {
    /// The formula being solved
    fn formula(&self) -> Formula;

    /// The variable being solved for
    fn unknown(&self) -> Variable;

    /// The supplied knowns as a [`VariableSet`]
    fn knowns(&self) -> VariableSet;

    /// Solve through the shared evaluator
    fn solve(&self) -> CalcResult<FormulaResult> {
        evaluate_formula(self.formula(), self.unknown(), &self.knowns())
    }
}

macro_rules! formula_problem {
    (
        $(#[$doc:meta])*
        $name:ident => $formula:expr,
        { $( $variant:ident { $a:ident => $va:ident, $b:ident => $vb:ident } ),+ $(,)? }
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "solve_for", rename_all = "snake_case")]
        pub enum $name {
            $( $variant { $a: f64, $b: f64 }, )+
        }

        impl FormulaProblem for $name {
            fn formula(&self) -> Formula {
                $formula
            }

            fn unknown(&self) -> Variable {
                match self {
                    $( $name::$variant { .. } => Variable::$variant, )+
                }
            }

            fn knowns(&self) -> VariableSet {
                match *self {
                    $( $name::$variant { $a, $b } => VariableSet::new()
                        .with(Variable::$va, $a)
                        .with(Variable::$vb, $b), )+
                }
            }
        }
    };
}

formula_problem! {
    /// Ohm's law, V = I·R
    OhmsLaw => Formula::OhmsLaw,
    {
        Voltage { current => Current, resistance => Resistance },
        Current { voltage => Voltage, resistance => Resistance },
        Resistance { voltage => Voltage, current => Current },
    }
}

formula_problem! {
    /// Electric power, P = V·I
    ElectricPower => Formula::ElectricPower,
    {
        Power { voltage => Voltage, current => Current },
        Voltage { power => Power, current => Current },
        Current { power => Power, voltage => Voltage },
    }
}

formula_problem! {
    /// Newton's second law, F = m·a
    NewtonsSecondLaw => Formula::NewtonsSecondLaw,
    {
        Force { mass => Mass, acceleration => Acceleration },
        Mass { force => Force, acceleration => Acceleration },
        Acceleration { force => Force, mass => Mass },
    }
}

formula_problem! {
    /// Density, ρ = m/V
    Density => Formula::Density,
    {
        Density { mass => Mass, volume => Volume },
        Mass { density => Density, volume => Volume },
        Volume { mass => Mass, density => Density },
    }
}

formula_problem! {
    /// Constant speed, d = v·t
    Speed => Formula::Speed,
    {
        Distance { speed => Speed, time => Time },
        Speed { distance => Distance, time => Time },
        Time { distance => Distance, speed => Speed },
    }
}
