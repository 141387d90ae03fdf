//! Issuance terms and the values derived from them

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::rates::{normalize_with, RateSpec};

/// Largest period count accepted (in the issuance's own unit)
pub const MAX_PERIOD_COUNT: u32 = 360;

/// Largest rate accepted, in percent
pub const MAX_RATE_PCT: f64 = 100.0;

/// Unit the period count is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Months,
    Years,
}

impl PeriodUnit {
    pub fn months_per_unit(&self) -> u32 {
        match self {
            PeriodUnit::Months => 1,
            PeriodUnit::Years => 12,
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodUnit::Months => f.write_str("months"),
            PeriodUnit::Years => f.write_str("years"),
        }
    }
}

impl FromStr for PeriodUnit {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "months" | "month" | "meses" => Ok(PeriodUnit::Months),
            "years" | "year" | "años" => Ok(PeriodUnit::Years),
            other => Err(EngineError::invalid_input(
                "period_unit",
                format!("unknown unit {:?} (expected months or years)", other),
            )),
        }
    }
}

/// Terms of a bond issuance as entered by the issuer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuanceTerms {
    pub name: String,
    pub issue_date: Option<NaiveDate>,
    /// Face value repaid over the schedule
    pub principal: f64,
    pub period_count: u32,
    pub period_unit: PeriodUnit,
    /// Discount rate (COK), annual effective, percent
    pub discount_rate_tea_pct: f64,
    pub interest_rate: RateSpec,
}

impl IssuanceTerms {
    /// Period count converted to months
    pub fn periods_in_months(&self) -> u32 {
        self.period_count * self.period_unit.months_per_unit()
    }

    /// Range checks applied before anything is derived
    pub fn validate(&self) -> EngineResult<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::invalid_input("name", "must not be empty"));
        }
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(EngineError::invalid_input(
                "principal",
                format!("must be a positive amount, got {}", self.principal),
            ));
        }
        if self.period_count == 0 || self.period_count > MAX_PERIOD_COUNT {
            return Err(EngineError::InvalidPeriodCount(self.period_count as i64));
        }
        check_rate_pct("interest_rate", self.interest_rate.magnitude_pct())?;
        check_rate_pct("discount_rate_tea_pct", self.discount_rate_tea_pct)?;
        Ok(())
    }

    /// Validate, then compute commercial value, costs, months, monthly rate and maturity
    pub fn derive(&self, config: &EngineConfig) -> EngineResult<DerivedTerms> {
        self.validate()?;
        config.validate()?;

        let periods_in_months = self.periods_in_months();
        let maturity_date = match self.issue_date {
            Some(date) => Some(date.checked_add_months(Months::new(periods_in_months)).ok_or_else(|| {
                EngineError::invalid_input("issue_date", "maturity date out of calendar range")
            })?),
            None => None,
        };

        Ok(DerivedTerms {
            commercial_value: self.principal * config.commercial_value_factor,
            transaction_cost: self.principal * config.transaction_cost_rate,
            periods_in_months,
            monthly_rate: normalize_with(&self.interest_rate, config.nominal_method),
            maturity_date,
        })
    }
}

fn check_rate_pct(field: &str, pct: f64) -> EngineResult<()> {
    if !pct.is_finite() || !(0.0..=MAX_RATE_PCT).contains(&pct) {
        return Err(EngineError::invalid_input(
            field,
            format!("must be between 0 and {}%, got {}", MAX_RATE_PCT, pct),
        ));
    }
    Ok(())
}

/// Values computed once from the terms; immutable afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedTerms {
    pub commercial_value: f64,
    pub transaction_cost: f64,
    pub periods_in_months: u32,
    /// Monthly effective rate, decimal
    pub monthly_rate: f64,
    pub maturity_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ALTERNATIVE_TRANSACTION_COST_RATE;
    use crate::rates::{NominalMethod, RateConvention};
    use approx::assert_abs_diff_eq;

    fn sample_terms() -> IssuanceTerms {
        IssuanceTerms {
            name: "Serie A 2025".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2025, 1, 31),
            principal: 10_000.0,
            period_count: 2,
            period_unit: PeriodUnit::Years,
            discount_rate_tea_pct: 9.0,
            interest_rate: RateSpec::new(12.0, RateConvention::AnnualEffective),
        }
    }

    #[test]
    fn test_periods_in_months() {
        let mut terms = sample_terms();
        assert_eq!(terms.periods_in_months(), 24);
        terms.period_unit = PeriodUnit::Months;
        assert_eq!(terms.periods_in_months(), 2);
    }

    #[test]
    fn test_derive_with_default_costs() {
        let derived = sample_terms().derive(&EngineConfig::default()).unwrap();
        assert_abs_diff_eq!(derived.commercial_value, 9_850.0, epsilon = 1e-9);
        assert_abs_diff_eq!(derived.transaction_cost, 500.0, epsilon = 1e-9);
        assert_eq!(derived.periods_in_months, 24);
        assert_abs_diff_eq!(derived.monthly_rate, 1.12_f64.powf(1.0 / 12.0) - 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_derive_with_alternative_transaction_cost() {
        let config = EngineConfig {
            transaction_cost_rate: ALTERNATIVE_TRANSACTION_COST_RATE,
            ..Default::default()
        };
        let derived = sample_terms().derive(&config).unwrap();
        assert_abs_diff_eq!(derived.transaction_cost, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nominal_method_flows_through_config() {
        let mut terms = sample_terms();
        terms.interest_rate = RateSpec::new(12.0, RateConvention::AnnualNominal);

        let daily = terms.derive(&EngineConfig::default()).unwrap();
        let simple = terms
            .derive(&EngineConfig {
                nominal_method: NominalMethod::SimpleDivision,
                ..Default::default()
            })
            .unwrap();

        assert_abs_diff_eq!(simple.monthly_rate, 0.01, epsilon = 1e-15);
        assert!(daily.monthly_rate > simple.monthly_rate);
    }

    #[test]
    fn test_maturity_date_clamps_to_month_end() {
        let mut terms = sample_terms();
        terms.period_unit = PeriodUnit::Months;
        terms.period_count = 1;
        let derived = terms.derive(&EngineConfig::default()).unwrap();
        assert_eq!(derived.maturity_date, NaiveDate::from_ymd_opt(2025, 2, 28));

        terms.issue_date = None;
        assert_eq!(terms.derive(&EngineConfig::default()).unwrap().maturity_date, None);
    }

    #[test]
    fn test_validation_rejects_out_of_range_terms() {
        let config = EngineConfig::default();

        let mut terms = sample_terms();
        terms.principal = 0.0;
        assert!(terms.derive(&config).is_err());

        let mut terms = sample_terms();
        terms.period_count = 0;
        assert!(matches!(terms.derive(&config), Err(EngineError::InvalidPeriodCount(0))));

        let mut terms = sample_terms();
        terms.period_count = MAX_PERIOD_COUNT + 1;
        assert!(matches!(terms.derive(&config), Err(EngineError::InvalidPeriodCount(361))));

        let mut terms = sample_terms();
        terms.interest_rate = RateSpec::new(100.5, RateConvention::AnnualEffective);
        assert!(terms.derive(&config).is_err());

        let mut terms = sample_terms();
        terms.discount_rate_tea_pct = f64::NAN;
        assert!(terms.derive(&config).is_err());

        let mut terms = sample_terms();
        terms.name = "  ".to_string();
        assert!(terms.derive(&config).is_err());
    }

    #[test]
    fn test_period_unit_parse() {
        assert_eq!("Years".parse::<PeriodUnit>().unwrap(), PeriodUnit::Years);
        assert_eq!("meses".parse::<PeriodUnit>().unwrap(), PeriodUnit::Months);
        assert!("weeks".parse::<PeriodUnit>().is_err());
    }
}
