//! # tally_core - Formula Evaluation Engine
//!
//! `tally_core` evaluates small closed-form relations with a clean, JSON-friendly
//! API: three-variable physics formulas solved for any unknown, IPv4 subnet
//! arithmetic, loan payoff analysis, and a handful of single-page calculators.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Guarded**: Undefined operations are rejected before any arithmetic
//!
//! ## Quick Start
//!
//! ```rust
//! use tally_core::formulas::{evaluate_formula, Formula, Variable, VariableSet};
//!
//! let known = VariableSet::new()
//!     .with(Variable::Voltage, 12.0)
//!     .with(Variable::Resistance, 4.0);
//!
//! let result = evaluate_formula(Formula::OhmsLaw, Variable::Current, &known).unwrap();
//! assert!((result.value - 3.0).abs() < 1e-12);
//!
//! // Serialize to JSON for an API or an assistant
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! assert!(json.contains("\"solved_for\": \"current\""));
//! ```
//!
//! ## Modules
//!
//! - [`formulas`] - Formula catalog, numeric guard, evaluator
//! - [`subnet`] - IPv4 mask, network, broadcast and host arithmetic
//! - [`amortization`] - Loan payoff solver and schedules
//! - [`calculations`] - Supplemental calculators and the `CalculationItem` dispatcher
//! - [`settings`] - Front-end configuration
//! - [`errors`] - Structured error types

pub mod amortization;
pub mod calculations;
pub mod errors;
pub mod formulas;
pub mod settings;
pub mod subnet;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationItem, CalculationOutput};
pub use errors::{CalcError, CalcResult};
pub use settings::{OutputFormat, Settings};
