//! # Solve-for-Unknown Formulas
//!
//! Closed-form relations among three named variables, each solvable for any
//! one of them by algebraic rearrangement.
//!
//! ## Modules
//!
//! - [`registry`] - Formula and variable catalog, rearrangement lookup table
//! - [`guard`] - Pre-arithmetic validation (zero divisors, domain checks)
//! - [`evaluator`] - The evaluator and the typed problem enums
//!
//! ## Flow
//!
//! ```text
//! (formula, unknown, VariableSet)
//!        │
//!        ▼  registry: (formula, unknown) → Rearrangement
//!        ▼  guard::check → Domain / MissingField / InvalidInput
//!        ▼  Rearrangement::apply
//!   FormulaResult { value, unit }
//! ```

pub mod evaluator;
pub mod guard;
pub mod registry;

// Re-export commonly used items
pub use evaluator::{
    evaluate_formula,
    Density,
    ElectricPower,
    FormulaInput,
    FormulaProblem,
    FormulaResult,
    NewtonsSecondLaw,
    OhmsLaw,
    Speed,
};

pub use registry::{
    Formula,
    FormulaCategory,
    FormulaMetadata,
    Operation,
    Rearrangement,
    Variable,
    VariableSet,
    ALL_FORMULAS,
    REARRANGEMENTS,
    generate_formulas_markdown,
};
