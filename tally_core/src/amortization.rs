//! # Loan Amortization
//!
//! Closed-form payoff analysis for a fixed-payment loan. The number of
//! periods is found by inverting the amortization formula with logarithms
//! rather than simulating month by month:
//!
//! ```text
//! i = APR / 100 / 12
//! n = ln(p / (p - B·i)) / ln(1 + i)        (i > 0)
//! n = B / p                                (i = 0)
//! ```
//!
//! The payment must exceed the first month's interest (`p > B·i`), otherwise
//! the balance never shrinks and the solver fails with `NonConvergentPayoff`.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::amortization::{solve_payoff, LoanTerms};
//!
//! let terms = LoanTerms::new(1200.0, 0.0, 100.0);
//! let payoff = solve_payoff(&terms).unwrap();
//!
//! assert_eq!(payoff.months_to_pay_off, 12);
//! assert_eq!(payoff.total_interest, 0.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{require_finite, CalcError, CalcResult};

/// Period counts within this distance of a whole number are treated as whole,
/// so float noise in the logarithms does not add a phantom month.
const WHOLE_MONTH_TOLERANCE: f64 = 1e-9;

/// Default cap on generated schedule length (100 years)
pub const DEFAULT_MAX_SCHEDULE_MONTHS: u32 = 1200;

/// Fixed-payment loan terms.
///
/// ## JSON Example
///
/// ```json
/// {
///   "balance": 50000.0,
///   "annual_rate_percent": 36.0,
///   "monthly_payment": 2500.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Outstanding principal
    pub balance: f64,

    /// Nominal annual rate in percent (e.g. 6.5 for 6.5%)
    pub annual_rate_percent: f64,

    /// Fixed payment made every month
    pub monthly_payment: f64,
}

impl LoanTerms {
    pub fn new(balance: f64, annual_rate_percent: f64, monthly_payment: f64) -> Self {
        Self {
            balance,
            annual_rate_percent,
            monthly_payment,
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("balance", self.balance)?;
        require_finite("annual_rate_percent", self.annual_rate_percent)?;
        require_finite("monthly_payment", self.monthly_payment)?;

        if self.balance <= 0.0 {
            return Err(CalcError::invalid_input(
                "balance",
                self.balance.to_string(),
                "Balance must be positive",
            ));
        }
        if self.annual_rate_percent < 0.0 {
            return Err(CalcError::invalid_input(
                "annual_rate_percent",
                self.annual_rate_percent.to_string(),
                "Rate cannot be negative",
            ));
        }
        if self.monthly_payment <= 0.0 {
            return Err(CalcError::invalid_input(
                "monthly_payment",
                self.monthly_payment.to_string(),
                "Payment must be positive",
            ));
        }
        Ok(())
    }

    /// Periodic rate i = APR / 100 / 12
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }

    /// Interest charged in the first month, B·i
    pub fn first_month_interest(&self) -> f64 {
        self.balance * self.monthly_rate()
    }
}

/// Result of a payoff analysis.
///
/// ## JSON Example
///
/// ```json
/// {
///   "months_to_pay_off": 31,
///   "exact_months": 30.99,
///   "total_interest": 27496.7,
///   "total_payment": 77496.7,
///   "final_payment": 2476.1
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffSchedule {
    /// Whole months until the balance reaches zero (rounded up)
    pub months_to_pay_off: u64,

    /// Unrounded period count from the closed form
    pub exact_months: f64,

    /// exact_months × payment − balance
    pub total_interest: f64,

    /// balance + total_interest
    pub total_payment: f64,

    /// Size of the last, possibly partial, payment
    pub final_payment: f64,
}

/// Solve for months-to-payoff and total interest.
///
/// # Errors
///
/// * `InvalidInput` - non-positive balance or payment, negative or non-finite rate
/// * `NonConvergentPayoff` - payment does not exceed the first month's interest,
///   or the closed form produced a non-finite value
pub fn solve_payoff(terms: &LoanTerms) -> CalcResult<PayoffSchedule> {
    terms.validate()?;
    debug!(
        balance = terms.balance,
        apr = terms.annual_rate_percent,
        payment = terms.monthly_payment,
        "solving payoff"
    );

    let i = terms.monthly_rate();
    let p = terms.monthly_payment;
    let b = terms.balance;

    let exact_months = if i == 0.0 {
        b / p
    } else {
        let interest_only = b * i;
        if p <= interest_only {
            warn!(payment = p, interest_only, "payment does not cover interest");
            return Err(CalcError::non_convergent(format!(
                "a monthly payment of {:.2} does not exceed the first month's interest of {:.2}; \
                 the balance would never be paid off",
                p, interest_only
            )));
        }
        // ln(p / (p - B·i)) = -ln(1 - B·i/p); ln_1p keeps precision when B·i is small next to p
        -(-interest_only / p).ln_1p() / i.ln_1p()
    };

    if !exact_months.is_finite() || exact_months <= 0.0 {
        warn!(exact_months, "closed form did not converge");
        return Err(CalcError::non_convergent(
            "the payoff period could not be represented as a finite number of months",
        ));
    }

    let months_to_pay_off = round_up_months(exact_months)?;
    let total_interest = (exact_months * p - b).max(0.0);
    let total_payment = b + total_interest;
    let final_payment = final_payment(i, p, exact_months, months_to_pay_off);

    if !total_interest.is_finite() || !final_payment.is_finite() {
        return Err(CalcError::non_convergent(
            "the payoff totals could not be represented as finite numbers",
        ));
    }

    debug!(months_to_pay_off, total_interest, "payoff solved");

    Ok(PayoffSchedule {
        months_to_pay_off,
        exact_months,
        total_interest,
        total_payment,
        final_payment,
    })
}

fn round_up_months(exact_months: f64) -> CalcResult<u64> {
    let nearest = exact_months.round();
    let months = if (exact_months - nearest).abs() < WHOLE_MONTH_TOLERANCE {
        nearest
    } else {
        exact_months.ceil()
    };
    if months > u64::MAX as f64 {
        return Err(CalcError::non_convergent(
            "the payoff period exceeds any representable number of months",
        ));
    }
    Ok((months as u64).max(1))
}

/// Last payment: the balance left after `months - 1` full payments plus that
/// month's interest. The leftover balance is the present value of the
/// fractional final period, which stays finite for very long payoffs.
fn final_payment(i: f64, payment: f64, exact_months: f64, months: u64) -> f64 {
    let fraction = (exact_months - months.saturating_sub(1) as f64).clamp(0.0, 1.0);
    let remaining = if i == 0.0 {
        payment * fraction
    } else {
        // p·(1 − (1+i)^−f) / i
        -payment * (-fraction * i.ln_1p()).exp_m1() / i
    };
    (remaining * (1.0 + i)).clamp(0.0, payment)
}

/// Fixed monthly payment that retires `principal` in `months` periods.
///
/// Standard annuity formula `P·i·(1+i)^n / ((1+i)^n − 1)`; with a zero rate
/// it is simply `P / n`.
///
/// ```rust
/// use tally_core::amortization::monthly_payment;
///
/// let emi = monthly_payment(100_000.0, 12.0, 12).unwrap();
/// assert!((emi - 8884.88).abs() < 0.01);
/// ```
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, months: u32) -> CalcResult<f64> {
    require_finite("principal", principal)?;
    require_finite("annual_rate_percent", annual_rate_percent)?;
    if principal <= 0.0 {
        return Err(CalcError::invalid_input(
            "principal",
            principal.to_string(),
            "Principal must be positive",
        ));
    }
    if annual_rate_percent < 0.0 {
        return Err(CalcError::invalid_input(
            "annual_rate_percent",
            annual_rate_percent.to_string(),
            "Rate cannot be negative",
        ));
    }
    if months == 0 {
        return Err(CalcError::invalid_input("months", "0", "Term must be at least one month"));
    }

    let i = annual_rate_percent / 100.0 / 12.0;
    if i == 0.0 {
        return Ok(principal / f64::from(months));
    }

    // P·i / (1 − (1+i)^−n); stays finite for long terms where (1+i)^n overflows
    let payment = principal * i / -(-f64::from(months) * i.ln_1p()).exp_m1();
    if !payment.is_finite() {
        return Err(CalcError::invalid_input(
            "months",
            months.to_string(),
            "Term is too long to compute a finite payment",
        ));
    }
    Ok(payment)
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based month number
    pub month: u64,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub remaining_balance: f64,
}

/// Month-by-month breakdown of a payoff.
///
/// The row count equals [`PayoffSchedule::months_to_pay_off`]; the last row
/// pays off whatever balance remains.
///
/// # Errors
///
/// Everything [`solve_payoff`] returns, plus `InvalidInput` when the payoff
/// takes longer than `max_months`.
pub fn amortization_schedule(terms: &LoanTerms, max_months: u32) -> CalcResult<Vec<ScheduleRow>> {
    let payoff = solve_payoff(terms)?;
    if payoff.months_to_pay_off > u64::from(max_months) {
        return Err(CalcError::invalid_input(
            "max_schedule_months",
            max_months.to_string(),
            format!(
                "Payoff takes {} months, longer than the schedule limit",
                payoff.months_to_pay_off
            ),
        ));
    }

    let i = terms.monthly_rate();
    let mut remaining = terms.balance;
    let mut rows = Vec::new();

    for month in 1..=payoff.months_to_pay_off {
        let interest = remaining * i;
        let (payment, principal) = if month == payoff.months_to_pay_off {
            (remaining + interest, remaining)
        } else {
            (terms.monthly_payment, terms.monthly_payment - interest)
        };
        remaining = (remaining - principal).max(0.0);
        rows.push(ScheduleRow {
            month,
            payment,
            interest,
            principal,
            remaining_balance: remaining,
        });
    }

    Ok(rows)
}

/// Input for a payoff analysis, optionally with the full schedule.
///
/// ## JSON Example
///
/// ```json
/// {
///   "balance": 5000.0,
///   "annual_rate_percent": 18.0,
///   "monthly_payment": 200.0,
///   "include_schedule": true
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffInput {
    #[serde(flatten)]
    pub terms: LoanTerms,

    #[serde(default)]
    pub include_schedule: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffResult {
    #[serde(flatten)]
    pub payoff: PayoffSchedule,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleRow>>,
}

/// Solve a payoff; the schedule is capped at `max_schedule_months` rows.
pub fn calculate_payoff(input: &PayoffInput, max_schedule_months: u32) -> CalcResult<PayoffResult> {
    let payoff = solve_payoff(&input.terms)?;
    let schedule = if input.include_schedule {
        Some(amortization_schedule(&input.terms, max_schedule_months)?)
    } else {
        None
    };
    Ok(PayoffResult { payoff, schedule })
}

/// Input for the fixed-payment calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentInput {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

pub fn calculate_payment(input: &PaymentInput) -> CalcResult<PaymentResult> {
    let payment = monthly_payment(input.principal, input.annual_rate_percent, input.months)?;
    let total_payment = payment * f64::from(input.months);
    Ok(PaymentResult {
        monthly_payment: payment,
        total_payment,
        total_interest: (total_payment - input.principal).max(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundary_converges() {
        let payoff = solve_payoff(&LoanTerms::new(50_000.0, 36.0, 2500.0)).unwrap();
        assert!(payoff.months_to_pay_off > 0);
        assert!(payoff.exact_months.is_finite());
        // ln(2.5) / ln(1.03) = 30.9989...
        assert_eq!(payoff.months_to_pay_off, 31);
        assert!(payoff.total_interest > 0.0);
        assert!((payoff.total_payment - (50_000.0 + payoff.total_interest)).abs() < 1e-6);
    }

    #[test]
    fn test_below_interest_only_is_non_convergent() {
        let err = solve_payoff(&LoanTerms::new(50_000.0, 36.0, 1400.0)).unwrap_err();
        assert_eq!(err.error_code(), "NON_CONVERGENT_PAYOFF");
    }

    #[test]
    fn test_exactly_interest_only_is_non_convergent() {
        let err = solve_payoff(&LoanTerms::new(50_000.0, 36.0, 1500.0)).unwrap_err();
        assert_eq!(err.error_code(), "NON_CONVERGENT_PAYOFF");
    }

    #[test]
    fn test_zero_rate() {
        let payoff = solve_payoff(&LoanTerms::new(1200.0, 0.0, 100.0)).unwrap();
        assert_eq!(payoff.months_to_pay_off, 12);
        assert_eq!(payoff.total_interest, 0.0);
        assert_eq!(payoff.total_payment, 1200.0);
        assert_eq!(payoff.final_payment, 100.0);
    }

    #[test]
    fn test_zero_rate_partial_final_month() {
        let payoff = solve_payoff(&LoanTerms::new(1250.0, 0.0, 100.0)).unwrap();
        assert_eq!(payoff.months_to_pay_off, 13);
        assert!((payoff.final_payment - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_payment_larger_than_balance() {
        let payoff = solve_payoff(&LoanTerms::new(500.0, 12.0, 1000.0)).unwrap();
        assert_eq!(payoff.months_to_pay_off, 1);
        assert!((payoff.final_payment - 505.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_inputs() {
        for terms in [
            LoanTerms::new(0.0, 5.0, 100.0),
            LoanTerms::new(-10.0, 5.0, 100.0),
            LoanTerms::new(1000.0, -1.0, 100.0),
            LoanTerms::new(1000.0, 5.0, 0.0),
            LoanTerms::new(f64::NAN, 5.0, 100.0),
            LoanTerms::new(1000.0, f64::INFINITY, 100.0),
        ] {
            assert_eq!(solve_payoff(&terms).unwrap_err().error_code(), "INVALID_INPUT", "{:?}", terms);
        }
    }

    #[test]
    fn test_monthly_payment_matches_payoff() {
        let emi = monthly_payment(10_000.0, 6.0, 24).unwrap();
        let payoff = solve_payoff(&LoanTerms::new(10_000.0, 6.0, emi)).unwrap();
        assert_eq!(payoff.months_to_pay_off, 24);
        assert!((payoff.final_payment - emi).abs() < 1e-6);
    }

    #[test]
    fn test_monthly_payment_zero_rate_and_errors() {
        assert_eq!(monthly_payment(1200.0, 0.0, 12).unwrap(), 100.0);
        assert!(monthly_payment(1200.0, 5.0, 0).is_err());
        assert!(monthly_payment(0.0, 5.0, 12).is_err());
        assert!(monthly_payment(1200.0, -5.0, 12).is_err());
    }

    #[test]
    fn test_schedule_pays_off_balance() {
        let terms = LoanTerms::new(50_000.0, 36.0, 2500.0);
        let rows = amortization_schedule(&terms, DEFAULT_MAX_SCHEDULE_MONTHS).unwrap();
        assert_eq!(rows.len(), 31);
        assert_eq!(rows[0].month, 1);
        assert!((rows[0].interest - 1500.0).abs() < 1e-9);
        assert!((rows[0].principal - 1000.0).abs() < 1e-9);

        let last = rows.last().unwrap();
        assert_eq!(last.remaining_balance, 0.0);
        assert!(last.payment <= 2500.0 + 1e-6);

        let interest: f64 = rows.iter().map(|r| r.interest).sum();
        let payoff = solve_payoff(&terms).unwrap();
        assert!((interest - payoff.total_interest).abs() < 25.0);
    }

    #[test]
    fn test_schedule_limit() {
        let terms = LoanTerms::new(100_000.0, 12.0, 1001.0);
        let err = amortization_schedule(&terms, 120).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_terms_json() {
        let json = r#"{ "balance": 1200.0, "annual_rate_percent": 0.0, "monthly_payment": 100.0 }"#;
        let terms: LoanTerms = serde_json::from_str(json).unwrap();
        assert_eq!(solve_payoff(&terms).unwrap().months_to_pay_off, 12);
    }

    proptest! {
        /// A larger payment never lengthens the payoff or adds interest.
        #[test]
        fn larger_payment_is_never_worse(
            balance in 1_000.0f64..1_000_000.0,
            apr in 0.0f64..40.0,
            over in 0.001f64..0.5,
            extra in 0.0f64..0.5,
        ) {
            let interest_only = balance * apr / 100.0 / 12.0;
            let p1 = interest_only + balance * over;
            let p2 = p1 + balance * extra;
            let a = solve_payoff(&LoanTerms::new(balance, apr, p1)).unwrap();
            let b = solve_payoff(&LoanTerms::new(balance, apr, p2)).unwrap();
            prop_assert!(b.months_to_pay_off <= a.months_to_pay_off);
            prop_assert!(b.total_interest <= a.total_interest + balance * 1e-9);
        }

        /// Results are always finite and non-negative.
        #[test]
        fn results_are_finite(
            balance in 1.0f64..1e7,
            apr in 0.0f64..100.0,
            payment in 1.0f64..1e6,
        ) {
            match solve_payoff(&LoanTerms::new(balance, apr, payment)) {
                Ok(p) => {
                    prop_assert!(p.exact_months.is_finite() && p.exact_months > 0.0);
                    prop_assert!(p.total_interest.is_finite() && p.total_interest >= 0.0);
                    prop_assert!(p.final_payment >= 0.0 && p.final_payment <= payment);
                }
                Err(e) => prop_assert_eq!(e.error_code(), "NON_CONVERGENT_PAYOFF"),
            }
        }
    }

    #[test]
    fn test_payoff_input_flattens_terms() {
        let json = r#"{"balance": 1200, "annual_rate_percent": 0, "monthly_payment": 100, "include_schedule": true}"#;
        let input: PayoffInput = serde_json::from_str(json).unwrap();
        let result = calculate_payoff(&input, DEFAULT_MAX_SCHEDULE_MONTHS).unwrap();
        assert_eq!(result.payoff.months_to_pay_off, 12);
        assert_eq!(result.schedule.map(|rows| rows.len()), Some(12));
    }

    #[test]
    fn test_payment_totals() {
        let result = calculate_payment(&PaymentInput {
            principal: 1200.0,
            annual_rate_percent: 0.0,
            months: 12,
        })
        .unwrap();
        assert_eq!(result.monthly_payment, 100.0);
        assert_eq!(result.total_interest, 0.0);
    }

    #[test]
    fn test_tiny_rate_matches_zero_rate_months() {
        let zero = solve_payoff(&LoanTerms::new(1000.0, 0.0, 100.0)).unwrap();
        assert_eq!(zero.months_to_pay_off, 10);
        for apr in [1e-10, 1e-12, 1e-14] {
            let payoff = solve_payoff(&LoanTerms::new(1000.0, apr, 100.0)).unwrap();
            assert_eq!(payoff.months_to_pay_off, 10, "apr {}", apr);
            assert!((payoff.exact_months - 10.0).abs() < 1e-9, "apr {}", apr);
        }
    }

    #[test]
    fn test_monthly_payment_long_terms_approach_interest_only() {
        // i = 1% per month, so the payment tends to P·i = 1000
        for months in [100_000, 3_000_000_000] {
            let payment = monthly_payment(100_000.0, 12.0, months).unwrap();
            assert!(payment > 0.0);
            assert!((payment - 1000.0).abs() < 1e-6, "months {} gave {}", months, payment);
        }
    }
}
