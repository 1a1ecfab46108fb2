//! # Fertilizer Blend
//!
//! Finds how much of each fertilizer product to apply so the blend delivers
//! a target mass of nitrogen (N), phosphate (P) and potash (K).
//!
//! Each product is described by its N-P-K grade in percent by mass. The
//! quantities solve the linear system
//!
//! ```text
//! Σ_j grade[nutrient][j] / 100 · q_j = target[nutrient]
//! ```
//!
//! over the nutrients with a non-zero target. The number of products must
//! equal the number of targeted nutrients; the square system is solved with
//! Cramer's rule using the determinants from [`super::matrix`].
//!
//! Nutrients with a zero target may still be supplied as a by-product; that
//! amount is reported as surplus.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::matrix::{det2, det3};
use crate::errors::{require_finite, CalcError, CalcResult};

/// Determinants smaller than this are treated as singular
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// A fertilizer product and its N-P-K grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerProduct {
    /// Label, e.g. "Urea 46-0-0"
    pub name: String,
    pub nitrogen_percent: f64,
    pub phosphate_percent: f64,
    pub potash_percent: f64,
}

impl FertilizerProduct {
    pub fn new(name: impl Into<String>, n: f64, p: f64, k: f64) -> Self {
        Self {
            name: name.into(),
            nitrogen_percent: n,
            phosphate_percent: p,
            potash_percent: k,
        }
    }

    fn grades(&self) -> [f64; 3] {
        [self.nitrogen_percent, self.phosphate_percent, self.potash_percent]
    }
}

/// Nutrient masses, in any consistent unit (kg, lb per acre, ...).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrients {
    #[serde(default)]
    pub nitrogen: f64,
    #[serde(default)]
    pub phosphate: f64,
    #[serde(default)]
    pub potash: f64,
}

impl Nutrients {
    fn as_array(&self) -> [f64; 3] {
        [self.nitrogen, self.phosphate, self.potash]
    }

    fn from_array(a: [f64; 3]) -> Self {
        Self {
            nitrogen: a[0],
            phosphate: a[1],
            potash: a[2],
        }
    }
}

const NUTRIENT_NAMES: [&str; 3] = ["nitrogen", "phosphate", "potash"];

/// Input parameters for a fertilizer blend.
///
/// ## JSON Example
///
/// ```json
/// {
///   "products": [
///     { "name": "Urea", "nitrogen_percent": 46, "phosphate_percent": 0, "potash_percent": 0 },
///     { "name": "DAP", "nitrogen_percent": 18, "phosphate_percent": 46, "potash_percent": 0 },
///     { "name": "MOP", "nitrogen_percent": 0, "phosphate_percent": 0, "potash_percent": 60 }
///   ],
///   "target": { "nitrogen": 120, "phosphate": 60, "potash": 40 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerInput {
    pub products: Vec<FertilizerProduct>,
    pub target: Nutrients,
}

impl FertilizerInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.products.is_empty() || self.products.len() > 3 {
            return Err(CalcError::invalid_input(
                "products",
                self.products.len().to_string(),
                "Supply between one and three products",
            ));
        }
        for product in &self.products {
            for (nutrient, grade) in NUTRIENT_NAMES.iter().zip(product.grades()) {
                let field = format!("{}.{}_percent", product.name, nutrient);
                require_finite(&field, grade)?;
                if !(0.0..=100.0).contains(&grade) {
                    return Err(CalcError::invalid_input(field, grade.to_string(), "Grade must be 0-100%"));
                }
            }
        }
        for (nutrient, amount) in NUTRIENT_NAMES.iter().zip(self.target.as_array()) {
            let field = format!("target.{}", nutrient);
            require_finite(&field, amount)?;
            if amount < 0.0 {
                return Err(CalcError::invalid_input(field, amount.to_string(), "Target cannot be negative"));
            }
        }
        Ok(())
    }
}

/// Amount of one product in the blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuantity {
    pub name: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerResult {
    pub quantities: Vec<ProductQuantity>,
    /// Total product mass
    pub total_product: f64,
    /// Nutrients actually supplied by the blend
    pub delivered: Nutrients,
    /// Delivered minus target (non-zero only for untargeted nutrients)
    pub surplus: Nutrients,
}

/// Solve the blend.
///
/// # Errors
///
/// * `InvalidInput` - bad grades or targets, or the product count does not
///   match the number of targeted nutrients
/// * `Domain` - the product grades are linearly dependent over the targeted
///   nutrients, or the target needs a negative amount of some product
///
/// ```rust
/// use tally_core::calculations::fertilizer::{calculate, FertilizerInput, FertilizerProduct, Nutrients};
///
/// let input = FertilizerInput {
///     products: vec![FertilizerProduct::new("Urea", 46.0, 0.0, 0.0)],
///     target: Nutrients { nitrogen: 92.0, ..Default::default() },
/// };
/// let result = calculate(&input).unwrap();
/// assert!((result.quantities[0].quantity - 200.0).abs() < 1e-9);
/// ```
pub fn calculate(input: &FertilizerInput) -> CalcResult<FertilizerResult> {
    input.validate()?;

    let target = input.target.as_array();
    let targeted: Vec<usize> = (0..3).filter(|&n| target[n] > 0.0).collect();
    if targeted.len() != input.products.len() {
        return Err(CalcError::invalid_input(
            "products",
            input.products.len().to_string(),
            format!(
                "Need exactly one product per targeted nutrient ({} targeted)",
                targeted.len()
            ),
        ));
    }

    // coefficient[row = targeted nutrient][col = product], as mass fractions
    let coefficient = |row: usize, col: usize| input.products[col].grades()[targeted[row]] / 100.0;
    let rhs: Vec<f64> = targeted.iter().map(|&n| target[n]).collect();

    let quantities = solve_square(targeted.len(), coefficient, &rhs)?;
    debug!(?quantities, "fertilizer blend solved");

    if let Some(j) = quantities.iter().position(|q| *q < -SINGULAR_TOLERANCE) {
        warn!(product = %input.products[j].name, quantity = quantities[j], "negative quantity");
        return Err(CalcError::domain(
            input.products[j].name.clone(),
            format!(
                "target requires a negative amount ({:.3}); choose products that supply the nutrients independently",
                quantities[j]
            ),
        ));
    }
    let quantities: Vec<f64> = quantities.into_iter().map(|q| q.max(0.0)).collect();

    let mut delivered = [0.0; 3];
    for (product, q) in input.products.iter().zip(&quantities) {
        for (d, grade) in delivered.iter_mut().zip(product.grades()) {
            *d += grade / 100.0 * q;
        }
    }
    let mut surplus = [0.0; 3];
    for n in 0..3 {
        surplus[n] = if target[n] > 0.0 { 0.0 } else { delivered[n] };
    }

    Ok(FertilizerResult {
        total_product: quantities.iter().sum(),
        quantities: input
            .products
            .iter()
            .zip(quantities)
            .map(|(p, quantity)| ProductQuantity { name: p.name.clone(), quantity })
            .collect(),
        delivered: Nutrients::from_array(delivered),
        surplus: Nutrients::from_array(surplus),
    })
}

/// Cramer's rule for a 1×1, 2×2 or 3×3 system.
fn solve_square(size: usize, a: impl Fn(usize, usize) -> f64, rhs: &[f64]) -> CalcResult<Vec<f64>> {
    // column `replace` swapped for the right-hand side
    let entry = |row: usize, col: usize, replace: Option<usize>| {
        if replace == Some(col) { rhs[row] } else { a(row, col) }
    };
    let det = |replace: Option<usize>| -> f64 {
        match size {
            1 => entry(0, 0, replace),
            2 => det2(&[
                [entry(0, 0, replace), entry(0, 1, replace)],
                [entry(1, 0, replace), entry(1, 1, replace)],
            ]),
            _ => det3(&[
                [entry(0, 0, replace), entry(0, 1, replace), entry(0, 2, replace)],
                [entry(1, 0, replace), entry(1, 1, replace), entry(1, 2, replace)],
                [entry(2, 0, replace), entry(2, 1, replace), entry(2, 2, replace)],
            ]),
        }
    };

    let d = det(None);
    if d.abs() < SINGULAR_TOLERANCE {
        return Err(CalcError::domain(
            "products",
            "nutrient grades are linearly dependent; the targets cannot be met uniquely",
        ));
    }
    Ok((0..size).map(|j| det(Some(j)) / d).collect())
}
