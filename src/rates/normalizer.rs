//! Conversion of any supported rate convention to a monthly effective rate

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use super::convention::{RateConvention, RateSpec, DAYS_PER_MONTH};

/// How nominal rates are turned into a monthly effective rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NominalMethod {
    /// Daily capitalization re-based to a 30-day month: (1 + j/d)^30 - 1
    #[default]
    DailyCompounding,
    /// Nominal rate split evenly across its months: j/k
    SimpleDivision,
}

impl FromStr for NominalMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "daily_compounding" => Ok(NominalMethod::DailyCompounding),
            "simple" | "simple_division" => Ok(NominalMethod::SimpleDivision),
            other => Err(EngineError::invalid_input(
                "nominal_method",
                format!("unsupported nominal conversion {:?} (expected daily or simple)", other),
            )),
        }
    }
}

impl fmt::Display for NominalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NominalMethod::DailyCompounding => write!(f, "daily"),
            NominalMethod::SimpleDivision => write!(f, "simple"),
        }
    }
}

/// Convert a rate to its monthly effective equivalent (decimal) using the default nominal method
pub fn normalize(rate: &RateSpec) -> f64 {
    normalize_with(rate, NominalMethod::default())
}

/// Convert a rate to its monthly effective equivalent (decimal)
pub fn normalize_with(rate: &RateSpec, method: NominalMethod) -> f64 {
    let decimal = rate.magnitude_pct() / 100.0;
    let convention = rate.convention();

    if convention.is_effective() {
        return rebase_effective(decimal, convention.months_spanned());
    }

    match method {
        NominalMethod::DailyCompounding => {
            let daily = decimal / convention.days_spanned() as f64;
            (1.0 + daily).powi(DAYS_PER_MONTH as i32) - 1.0
        }
        NominalMethod::SimpleDivision => decimal / convention.months_spanned() as f64,
    }
}

/// Monthly effective rate equivalent to an annual effective rate given in percent
pub fn monthly_from_annual_effective(tea_pct: f64) -> f64 {
    normalize(&RateSpec::new(tea_pct, RateConvention::AnnualEffective))
}

fn rebase_effective(decimal: f64, months: u32) -> f64 {
    if months == 1 {
        return decimal;
    }
    (1.0 + decimal).powf(1.0 / months as f64) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::annualized_rate;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_rate_is_zero_for_every_convention() {
        for convention in RateConvention::ALL {
            let spec = RateSpec::new(0.0, convention);
            assert_eq!(normalize_with(&spec, NominalMethod::DailyCompounding), 0.0);
            assert_eq!(normalize_with(&spec, NominalMethod::SimpleDivision), 0.0);
        }
    }

    #[test]
    fn test_monthly_effective_is_unchanged() {
        let spec = RateSpec::new(1.5, RateConvention::MonthlyEffective);
        assert_abs_diff_eq!(normalize(&spec), 0.015, epsilon = 1e-15);
    }

    #[test]
    fn test_effective_rebasing() {
        let tea = RateSpec::new(12.0, RateConvention::AnnualEffective);
        assert_abs_diff_eq!(normalize(&tea), 1.12_f64.powf(1.0 / 12.0) - 1.0, epsilon = 1e-15);

        let tet = RateSpec::new(3.0, RateConvention::QuarterlyEffective);
        let monthly = normalize(&tet);
        assert_abs_diff_eq!((1.0 + monthly).powi(3) - 1.0, 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_tea_round_trip_through_annualization() {
        for tea_pct in [0.5, 7.0, 10.0, 25.0, 100.0] {
            let monthly = monthly_from_annual_effective(tea_pct);
            let annual = annualized_rate(monthly, DAYS_PER_MONTH);
            assert_abs_diff_eq!(annual, tea_pct / 100.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_nominal_daily_compounding() {
        // 36% TNA: 0.1% per day over 30 days
        let tna = RateSpec::new(36.0, RateConvention::AnnualNominal);
        let expected = 1.001_f64.powi(30) - 1.0;
        assert_abs_diff_eq!(normalize(&tna), expected, epsilon = 1e-15);

        // Every granularity lands on the same daily rate for proportional inputs
        let tns = RateSpec::new(18.0, RateConvention::SemiannualNominal);
        let tnm = RateSpec::new(3.0, RateConvention::MonthlyNominal);
        assert_abs_diff_eq!(normalize(&tns), expected, epsilon = 1e-15);
        assert_abs_diff_eq!(normalize(&tnm), expected, epsilon = 1e-15);
    }

    #[test]
    fn test_nominal_simple_division_alternative() {
        let tna = RateSpec::new(12.0, RateConvention::AnnualNominal);
        let tnb = RateSpec::new(4.0, RateConvention::BimonthlyNominal);
        assert_abs_diff_eq!(normalize_with(&tna, NominalMethod::SimpleDivision), 0.01, epsilon = 1e-15);
        assert_abs_diff_eq!(normalize_with(&tnb, NominalMethod::SimpleDivision), 0.02, epsilon = 1e-15);

        // Compounding daily always yields more than the plain split
        let daily = normalize_with(&tna, NominalMethod::DailyCompounding);
        assert!(daily > 0.01);
        assert_abs_diff_eq!(daily, (1.0 + 0.12 / 360.0_f64).powi(30) - 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_nominal_method_parse() {
        assert_eq!("daily".parse::<NominalMethod>().unwrap(), NominalMethod::DailyCompounding);
        assert_eq!("SIMPLE_DIVISION".parse::<NominalMethod>().unwrap(), NominalMethod::SimpleDivision);
        assert_eq!(NominalMethod::SimpleDivision.to_string(), "simple");
        assert!(matches!("continuous".parse::<NominalMethod>(), Err(EngineError::InvalidInput { .. })));
    }
}
