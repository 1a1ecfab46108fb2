//! # Formula Registry
//!
//! Central catalog of the closed-form relations the evaluator can solve.
//! Each formula relates exactly three variables and can be rearranged to solve
//! for any one of them.
//!
//! ## Architecture
//!
//! The registry provides:
//! - Type-safe formula identification via the [`Formula`] enum
//! - Per-variable unit labels and domain flags via [`Variable`]
//! - A lookup table of [`Rearrangement`]s keyed by `(formula, unknown)`
//! - Markdown generation for the `FORMULAS.md` audit document
//!
//! ## Usage
//!
//! ```rust
//! use tally_core::formulas::registry::{Formula, Variable};
//!
//! let r = Formula::OhmsLaw.rearrangement(Variable::Current).unwrap();
//! assert_eq!(r.expression(), "I = V / R");
//! assert_eq!(r.divisor(), Some(Variable::Resistance));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Variables
// ============================================================================

/// A named physical quantity that appears in at least one formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Voltage,
    Current,
    Resistance,
    Power,
    Force,
    Mass,
    Acceleration,
    Density,
    Volume,
    Distance,
    Speed,
    Time,
}

impl Variable {
    /// Every variable known to the registry
    pub const ALL: [Variable; 12] = [
        Variable::Voltage,
        Variable::Current,
        Variable::Resistance,
        Variable::Power,
        Variable::Force,
        Variable::Mass,
        Variable::Acceleration,
        Variable::Density,
        Variable::Volume,
        Variable::Distance,
        Variable::Speed,
        Variable::Time,
    ];

    /// Lowercase name, as used in JSON and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Variable::Voltage => "voltage",
            Variable::Current => "current",
            Variable::Resistance => "resistance",
            Variable::Power => "power",
            Variable::Force => "force",
            Variable::Mass => "mass",
            Variable::Acceleration => "acceleration",
            Variable::Density => "density",
            Variable::Volume => "volume",
            Variable::Distance => "distance",
            Variable::Speed => "speed",
            Variable::Time => "time",
        }
    }

    /// Conventional symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Variable::Voltage => "V",
            Variable::Current => "I",
            Variable::Resistance => "R",
            Variable::Power => "P",
            Variable::Force => "F",
            Variable::Mass => "m",
            Variable::Acceleration => "a",
            Variable::Density => "ρ",
            // "V" is taken by voltage; volume never shares a formula with it
            Variable::Volume => "V",
            Variable::Distance => "d",
            Variable::Speed => "v",
            Variable::Time => "t",
        }
    }

    /// SI unit label shown next to a solved value
    pub fn unit(&self) -> &'static str {
        match self {
            Variable::Voltage => "Volts (V)",
            Variable::Current => "Amperes (A)",
            Variable::Resistance => "Ohms (Ω)",
            Variable::Power => "Watts (W)",
            Variable::Force => "Newtons (N)",
            Variable::Mass => "Kilograms (kg)",
            Variable::Acceleration => "Meters per second squared (m/s²)",
            Variable::Density => "Kilograms per cubic meter (kg/m³)",
            Variable::Volume => "Cubic meters (m³)",
            Variable::Distance => "Meters (m)",
            Variable::Speed => "Meters per second (m/s)",
            Variable::Time => "Seconds (s)",
        }
    }

    /// Whether negative values are outside the physical domain
    pub fn non_negative(&self) -> bool {
        matches!(
            self,
            Variable::Resistance | Variable::Mass | Variable::Density | Variable::Volume | Variable::Time
        )
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Variable::ALL
            .iter()
            .copied()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| CalcError::invalid_input("variable", s, "Unknown variable name"))
    }
}

// ============================================================================
// Variable Set
// ============================================================================

/// Values supplied for the known variables of one evaluation.
///
/// The unknown's entry, if present, is ignored by the evaluator.
///
/// ## JSON Example
///
/// ```json
/// { "voltage": 12.0, "resistance": 4.0 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableSet(BTreeMap<Variable, f64>);

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, variable: Variable, value: f64) -> Self {
        self.0.insert(variable, value);
        self
    }

    pub fn get(&self, variable: Variable) -> Option<f64> {
        self.0.get(&variable).copied()
    }

    /// Get a value or fail with `MissingField`
    pub fn require(&self, variable: Variable) -> CalcResult<f64> {
        self.get(variable)
            .ok_or_else(|| CalcError::missing_field(variable.name()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in variable order
    pub fn iter(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.0.iter().map(|(v, x)| (*v, *x))
    }
}

impl FromIterator<(Variable, f64)> for VariableSet {
    fn from_iter<T: IntoIterator<Item = (Variable, f64)>>(iter: T) -> Self {
        VariableSet(iter.into_iter().collect())
    }
}

// ============================================================================
// Formula Categories
// ============================================================================

/// Categories for grouping formulas in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaCategory {
    /// Circuits (Ohm's law, power)
    Electrical,
    /// Forces and motion
    Mechanics,
    /// Bulk material properties
    Matter,
}

impl FormulaCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            FormulaCategory::Electrical => "Electrical",
            FormulaCategory::Mechanics => "Mechanics",
            FormulaCategory::Matter => "Matter",
        }
    }

    /// Sort order for generated documentation (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            FormulaCategory::Electrical => 1,
            FormulaCategory::Mechanics => 2,
            FormulaCategory::Matter => 3,
        }
    }
}

// ============================================================================
// Formula Metadata
// ============================================================================

/// Descriptive metadata for a formula.
#[derive(Debug, Clone, Serialize)]
pub struct FormulaMetadata {
    /// Human-readable name (e.g., "Ohm's Law")
    pub name: &'static str,
    /// Brief description of the relation
    pub description: &'static str,
    /// Forward relation in plain text
    pub relation: &'static str,
    /// The three variables, result side first
    pub variables: [Variable; 3],
    /// Category for grouping
    pub category: FormulaCategory,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
}

// ============================================================================
// Formula Enum
// ============================================================================

/// Every relation the evaluator can solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formula {
    /// V = I·R
    OhmsLaw,
    /// P = V·I
    ElectricPower,
    /// F = m·a
    NewtonsSecondLaw,
    /// ρ = m/V
    Density,
    /// d = v·t
    Speed,
}

impl Formula {
    /// Identifier used in JSON and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Formula::OhmsLaw => "ohms_law",
            Formula::ElectricPower => "electric_power",
            Formula::NewtonsSecondLaw => "newtons_second_law",
            Formula::Density => "density",
            Formula::Speed => "speed",
        }
    }

    /// Get the full metadata for this formula
    pub fn metadata(&self) -> FormulaMetadata {
        match self {
            Formula::OhmsLaw => FormulaMetadata {
                name: "Ohm's Law",
                description: "Voltage across a resistor carrying a current",
                relation: "V = I * R",
                variables: [Variable::Voltage, Variable::Current, Variable::Resistance],
                category: FormulaCategory::Electrical,
                assumptions: vec!["Ohmic (linear) conductor", "DC or RMS quantities"],
            },
            Formula::ElectricPower => FormulaMetadata {
                name: "Electric Power",
                description: "Power dissipated by a load at a given voltage and current",
                relation: "P = V * I",
                variables: [Variable::Power, Variable::Voltage, Variable::Current],
                category: FormulaCategory::Electrical,
                assumptions: vec!["DC or purely resistive AC load"],
            },
            Formula::NewtonsSecondLaw => FormulaMetadata {
                name: "Newton's Second Law",
                description: "Net force required to accelerate a mass",
                relation: "F = m * a",
                variables: [Variable::Force, Variable::Mass, Variable::Acceleration],
                category: FormulaCategory::Mechanics,
                assumptions: vec!["Constant mass", "Non-relativistic speeds"],
            },
            Formula::Density => FormulaMetadata {
                name: "Density",
                description: "Mass per unit volume of a homogeneous material",
                relation: "ρ = m / V",
                variables: [Variable::Density, Variable::Mass, Variable::Volume],
                category: FormulaCategory::Matter,
                assumptions: vec!["Homogeneous material"],
            },
            Formula::Speed => FormulaMetadata {
                name: "Speed",
                description: "Distance covered at constant speed over a time interval",
                relation: "d = v * t",
                variables: [Variable::Distance, Variable::Speed, Variable::Time],
                category: FormulaCategory::Mechanics,
                assumptions: vec!["Constant speed"],
            },
        }
    }

    /// The three variables related by this formula
    pub fn variables(&self) -> [Variable; 3] {
        self.metadata().variables
    }

    /// Whether `variable` takes part in this formula
    pub fn involves(&self, variable: Variable) -> bool {
        self.variables().contains(&variable)
    }

    /// Look up the rearrangement that isolates `unknown`.
    ///
    /// Returns `None` when `unknown` is not one of this formula's variables.
    pub fn rearrangement(&self, unknown: Variable) -> Option<&'static Rearrangement> {
        REARRANGEMENT_TABLE.get(&(*self, unknown)).copied()
    }

    /// All rearrangements declared for this formula
    pub fn rearrangements(&self) -> Vec<&'static Rearrangement> {
        REARRANGEMENTS.iter().filter(|r| r.formula == *self).collect()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metadata().name)
    }
}

impl FromStr for Formula {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match wanted.as_str() {
            "ohms_law" | "ohm" | "ohms" => Ok(Formula::OhmsLaw),
            "electric_power" | "power" => Ok(Formula::ElectricPower),
            "newtons_second_law" | "newton" | "force" => Ok(Formula::NewtonsSecondLaw),
            "density" => Ok(Formula::Density),
            "speed" => Ok(Formula::Speed),
            _ => Err(CalcError::invalid_input("formula", s, "Unknown formula name")),
        }
    }
}

/// All formulas in the registry (for iteration)
pub static ALL_FORMULAS: &[Formula] = &[
    Formula::OhmsLaw,
    Formula::ElectricPower,
    Formula::NewtonsSecondLaw,
    Formula::Density,
    Formula::Speed,
];

// ============================================================================
// Rearrangements
// ============================================================================

/// How the unknown is obtained from the two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// unknown = a · b
    Product,
    /// unknown = a / b
    Quotient,
}

/// One algebraic rearrangement of a formula, isolating a single unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rearrangement {
    pub formula: Formula,
    pub solve_for: Variable,
    /// Operands in evaluation order; for a quotient the second is the divisor
    pub operands: [Variable; 2],
    pub operation: Operation,
}

impl Rearrangement {
    const fn new(formula: Formula, solve_for: Variable, operands: [Variable; 2], operation: Operation) -> Self {
        Self { formula, solve_for, operands, operation }
    }

    /// The variable that must be non-zero, if this rearrangement divides
    pub fn divisor(&self) -> Option<Variable> {
        match self.operation {
            Operation::Product => None,
            Operation::Quotient => Some(self.operands[1]),
        }
    }

    /// Apply the rearrangement to already-validated operand values
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self.operation {
            Operation::Product => a * b,
            Operation::Quotient => a / b,
        }
    }

    /// Plain-text form, e.g. `"I = V / R"`
    pub fn expression(&self) -> String {
        let op = match self.operation {
            Operation::Product => "*",
            Operation::Quotient => "/",
        };
        format!(
            "{} = {} {} {}",
            self.solve_for.symbol(),
            self.operands[0].symbol(),
            op,
            self.operands[1].symbol()
        )
    }
}

use Formula as F;
use Operation::{Product, Quotient};
use Variable as V;

/// Every rearrangement declared by the catalog
pub static REARRANGEMENTS: &[Rearrangement] = &[
    // V = I·R
    Rearrangement::new(F::OhmsLaw, V::Voltage, [V::Current, V::Resistance], Product),
    Rearrangement::new(F::OhmsLaw, V::Current, [V::Voltage, V::Resistance], Quotient),
    Rearrangement::new(F::OhmsLaw, V::Resistance, [V::Voltage, V::Current], Quotient),
    // P = V·I
    Rearrangement::new(F::ElectricPower, V::Power, [V::Voltage, V::Current], Product),
    Rearrangement::new(F::ElectricPower, V::Voltage, [V::Power, V::Current], Quotient),
    Rearrangement::new(F::ElectricPower, V::Current, [V::Power, V::Voltage], Quotient),
    // F = m·a
    Rearrangement::new(F::NewtonsSecondLaw, V::Force, [V::Mass, V::Acceleration], Product),
    Rearrangement::new(F::NewtonsSecondLaw, V::Mass, [V::Force, V::Acceleration], Quotient),
    Rearrangement::new(F::NewtonsSecondLaw, V::Acceleration, [V::Force, V::Mass], Quotient),
    // ρ = m/V
    Rearrangement::new(F::Density, V::Density, [V::Mass, V::Volume], Quotient),
    Rearrangement::new(F::Density, V::Mass, [V::Density, V::Volume], Product),
    Rearrangement::new(F::Density, V::Volume, [V::Mass, V::Density], Quotient),
    // d = v·t
    Rearrangement::new(F::Speed, V::Distance, [V::Speed, V::Time], Product),
    Rearrangement::new(F::Speed, V::Speed, [V::Distance, V::Time], Quotient),
    Rearrangement::new(F::Speed, V::Time, [V::Distance, V::Speed], Quotient),
];

static REARRANGEMENT_TABLE: Lazy<HashMap<(Formula, Variable), &'static Rearrangement>> = Lazy::new(|| {
    REARRANGEMENTS
        .iter()
        .map(|r| ((r.formula, r.solve_for), r))
        .collect()
});

// ============================================================================
// Markdown Generation
// ============================================================================

/// Generate the `FORMULAS.md` reference document from the registry.
///
/// ```rust
/// use tally_core::formulas::registry::generate_formulas_markdown;
///
/// let markdown = generate_formulas_markdown();
/// assert!(markdown.contains("Tally Formulas Reference"));
/// assert!(markdown.contains("I = V / R"));
/// ```
pub fn generate_formulas_markdown() -> String {
    let mut output = String::with_capacity(8_000);

    output.push_str(
        r#"# Tally Formulas Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-formulas`

Every formula below can be solved for any one of its variables.
Rearrangements that divide list the variable that must be non-zero.

---

"#,
    );

    let mut formulas: Vec<Formula> = ALL_FORMULAS.to_vec();
    formulas.sort_by_key(|f| f.metadata().category.sort_order());

    let mut current_category = None;
    for formula in formulas {
        let meta = formula.metadata();
        if current_category != Some(meta.category) {
            output.push_str(&format!("## {}\n\n", meta.category.display_name()));
            current_category = Some(meta.category);
        }

        output.push_str(&format!("### {}\n\n{}\n\n", meta.name, meta.description));
        output.push_str(&format!("**Relation:** `{}`\n\n", meta.relation));

        output.push_str("| Symbol | Variable | Units | Non-negative |\n");
        output.push_str("|--------|----------|-------|--------------|\n");
        for var in &meta.variables {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                var.symbol(),
                var.name(),
                var.unit(),
                if var.non_negative() { "yes" } else { "no" }
            ));
        }
        output.push('\n');

        output.push_str("**Rearrangements:**\n\n");
        for r in formula.rearrangements() {
            match r.divisor() {
                Some(d) => output.push_str(&format!("- `{}` ({} must be non-zero)\n", r.expression(), d.name())),
                None => output.push_str(&format!("- `{}`\n", r.expression())),
            }
        }
        output.push('\n');

        if !meta.assumptions.is_empty() {
            output.push_str("**Assumptions:**\n");
            for assumption in &meta.assumptions {
                output.push_str(&format!("- {}\n", assumption));
            }
            output.push('\n');
        }

        output.push_str("---\n\n");
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Formulas:** {}\n- **Total Rearrangements:** {}\n",
        ALL_FORMULAS.len(),
        REARRANGEMENTS.len()
    ));

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variable_is_solvable() {
        for formula in ALL_FORMULAS {
            for var in formula.variables() {
                let r = formula
                    .rearrangement(var)
                    .unwrap_or_else(|| panic!("{:?} has no rearrangement for {:?}", formula, var));
                assert_eq!(r.solve_for, var);
                assert!(!r.operands.contains(&var));
                assert!(r.operands.iter().all(|op| formula.involves(*op)));
            }
        }
        assert_eq!(REARRANGEMENTS.len(), ALL_FORMULAS.len() * 3);
    }

    #[test]
    fn test_foreign_variable_has_no_rearrangement() {
        assert!(Formula::OhmsLaw.rearrangement(Variable::Mass).is_none());
        assert!(Formula::Density.rearrangement(Variable::Voltage).is_none());
    }

    #[test]
    fn test_divisors() {
        let r = Formula::Density.rearrangement(Variable::Volume).unwrap();
        assert_eq!(r.divisor(), Some(Variable::Density));
        let r = Formula::OhmsLaw.rearrangement(Variable::Voltage).unwrap();
        assert_eq!(r.divisor(), None);
    }

    #[test]
    fn test_expressions() {
        let r = Formula::NewtonsSecondLaw.rearrangement(Variable::Acceleration).unwrap();
        assert_eq!(r.expression(), "a = F / m");
        let r = Formula::Density.rearrangement(Variable::Mass).unwrap();
        assert_eq!(r.expression(), "m = ρ * V");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Resistance".parse::<Variable>().unwrap(), Variable::Resistance);
        assert!("charge".parse::<Variable>().is_err());
        assert_eq!("ohms-law".parse::<Formula>().unwrap(), Formula::OhmsLaw);
        assert_eq!("density".parse::<Formula>().unwrap(), Formula::Density);
        assert!("gravity".parse::<Formula>().is_err());
    }

    #[test]
    fn test_key_matches_serde_name() {
        for formula in ALL_FORMULAS {
            let json = serde_json::to_string(formula).unwrap();
            assert_eq!(json, format!("\"{}\"", formula.key()));
            assert_eq!(formula.key().parse::<Formula>().unwrap(), *formula);
        }
    }

    #[test]
    fn test_variable_set_serialization() {
        let set = VariableSet::new()
            .with(Variable::Voltage, 12.0)
            .with(Variable::Resistance, 4.0);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"voltage":12.0,"resistance":4.0}"#);
        let roundtrip: VariableSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, roundtrip);
    }

    #[test]
    fn test_variable_set_require() {
        let set = VariableSet::new().with(Variable::Mass, 2.0);
        assert_eq!(set.require(Variable::Mass).unwrap(), 2.0);
        assert_eq!(
            set.require(Variable::Volume),
            Err(CalcError::missing_field("volume"))
        );
    }

    #[test]
    fn test_variable_set_iteration_order_and_collect() {
        assert!(VariableSet::new().is_empty());

        let set: VariableSet = [(Variable::Time, 3.0), (Variable::Voltage, 1.0), (Variable::Time, 4.0)]
            .into_iter()
            .collect();
        assert!(!set.is_empty());
        assert_eq!(set.len(), 2);
        // declaration order of Variable; later duplicates win
        let entries: Vec<_> = set.iter().collect();
        assert_eq!(entries, vec![(Variable::Voltage, 1.0), (Variable::Time, 4.0)]);
    }

    #[test]
    fn test_generate_markdown_lists_every_formula() {
        let md = generate_formulas_markdown();
        for formula in ALL_FORMULAS {
            assert!(md.contains(formula.metadata().name), "missing {:?}", formula);
        }
        assert!(md.contains("resistance must be non-zero"));
        assert!(md.contains("**Total Rearrangements:** 15"));
    }
}
