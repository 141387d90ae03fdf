//! Present value, IRR and rate annualization over periodic cash flows

use crate::error::EngineResult;
use crate::rates::DAYS_PER_MONTH;
use super::solver::{IrrSolver, NewtonRaphsonSolver};

/// Days in the commercial year used for annualization
pub const DAYS_PER_YEAR: u32 = 360;

/// Calculate NPV at a given periodic rate: sum of flows[t] / (1 + rate)^t.
///
/// flows[0] is undiscounted. Any finite rate above -1 is accepted.
pub fn present_value(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Periodic IRR using the default damped Newton-Raphson solver
pub fn internal_rate_of_return(flows: &[f64]) -> EngineResult<f64> {
    NewtonRaphsonSolver::default().solve(flows)
}

/// Effective annual rate equivalent to `period_rate` over periods of `period_days` days:
/// (1 + r)^(360 / days) - 1.
///
/// Serves both the issuer's TCEA and the investor's TREA; they differ only in
/// which series the periodic rate was solved from.
pub fn annualized_rate(period_rate: f64, period_days: u32) -> f64 {
    (1.0 + period_rate).powf(DAYS_PER_YEAR as f64 / period_days as f64) - 1.0
}

/// Shorthand for monthly periods
pub fn annualized_monthly_rate(monthly_rate: f64) -> f64 {
    annualized_rate(monthly_rate, DAYS_PER_MONTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_npv_basic() {
        let flows = vec![-1000.0, 300.0, 400.0, 500.0];
        let expected = -1000.0 + 300.0 / 1.1 + 400.0 / 1.21 + 500.0 / 1.331;
        assert_abs_diff_eq!(present_value(&flows, 0.10), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let flows = vec![-100.0, 50.0, 50.0, 50.0];
        assert_eq!(present_value(&flows, 0.0), 50.0);
        assert_eq!(present_value(&[], 0.05), 0.0);
    }

    #[test]
    fn test_npv_negative_rate() {
        let flows = vec![0.0, 90.0];
        assert_abs_diff_eq!(present_value(&flows, -0.1), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_example_irr() {
        let flows = vec![-9_750.0, 3_433.33, 3_366.67, 3_300.0];
        let rate = internal_rate_of_return(&flows).unwrap();
        assert!(present_value(&flows, rate).abs() < 1e-6);
        assert!(rate > 0.0 && rate < 0.05);
    }

    #[test]
    fn test_annualized_rate() {
        assert_abs_diff_eq!(annualized_rate(0.01, 30), 1.01_f64.powi(12) - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(annualized_rate(0.02, 90), 1.02_f64.powi(4) - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(annualized_rate(0.05, 360), 0.05, epsilon = 1e-12);
        assert_eq!(annualized_monthly_rate(0.0), 0.0);
    }
}
