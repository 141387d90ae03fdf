//! Engine configuration
//!
//! Defaults can be overridden from the environment:
//!   BOND_COMMERCIAL_VALUE_FACTOR, BOND_TRANSACTION_COST_RATE,
//!   BOND_NOMINAL_METHOD (daily | simple), BOND_IRR_SOLVER (newton | bisection)

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::rates::NominalMethod;
use crate::returns::{IrrSolver, SolverKind};

/// Commercial value as a fraction of principal
pub const DEFAULT_COMMERCIAL_VALUE_FACTOR: f64 = 0.985;

/// Transaction cost as a fraction of principal
pub const DEFAULT_TRANSACTION_COST_RATE: f64 = 0.05;

/// The 1% transaction cost some ledgers apply instead
pub const ALTERNATIVE_TRANSACTION_COST_RATE: f64 = 0.01;

/// Settings fixed for a run; everything else is per-issuance input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub commercial_value_factor: f64,
    pub transaction_cost_rate: f64,
    pub nominal_method: NominalMethod,
    pub solver: SolverKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            commercial_value_factor: DEFAULT_COMMERCIAL_VALUE_FACTOR,
            transaction_cost_rate: DEFAULT_TRANSACTION_COST_RATE,
            nominal_method: NominalMethod::default(),
            solver: SolverKind::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with any BOND_* environment variables
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// A variable that is present but unparsable or out of range is an error.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(factor) = parse_var(&lookup, "BOND_COMMERCIAL_VALUE_FACTOR")? {
            config.commercial_value_factor = factor;
        }
        if let Some(rate) = parse_var(&lookup, "BOND_TRANSACTION_COST_RATE")? {
            config.transaction_cost_rate = rate;
        }
        if let Some(method) = parse_var(&lookup, "BOND_NOMINAL_METHOD")? {
            config.nominal_method = method;
        }
        if let Some(solver) = parse_var(&lookup, "BOND_IRR_SOLVER")? {
            config.solver = solver;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the factors applied to every principal
    pub fn validate(&self) -> EngineResult<()> {
        let factor = self.commercial_value_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(EngineError::invalid_input(
                "commercial_value_factor",
                format!("must be positive, got {}", factor),
            ));
        }

        let cost = self.transaction_cost_rate;
        if !cost.is_finite() || !(0.0..1.0).contains(&cost) {
            return Err(EngineError::invalid_input(
                "transaction_cost_rate",
                format!("must be in [0, 1), got {}", cost),
            ));
        }

        Ok(())
    }

    /// Instantiate the configured IRR solver
    pub fn build_solver(&self) -> Box<dyn IrrSolver> {
        self.solver.build()
    }
}

fn parse_var<T, L>(lookup: &L, key: &str) -> EngineResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
    L: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| EngineError::invalid_input(key, format!("{:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.commercial_value_factor, 0.985);
        assert_eq!(config.transaction_cost_rate, 0.05);
        assert_eq!(config.nominal_method, NominalMethod::DailyCompounding);
        assert_eq!(config.solver, SolverKind::NewtonRaphson);
        assert_eq!(EngineConfig::from_lookup(|_| None).unwrap(), config);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("BOND_TRANSACTION_COST_RATE", "0.01"),
            ("BOND_NOMINAL_METHOD", "simple"),
            ("BOND_IRR_SOLVER", "bisection"),
        ]))
        .unwrap();
        assert_eq!(config.transaction_cost_rate, ALTERNATIVE_TRANSACTION_COST_RATE);
        assert_eq!(config.nominal_method, NominalMethod::SimpleDivision);
        assert_eq!(config.solver, SolverKind::Bisection);
        assert_eq!(config.commercial_value_factor, DEFAULT_COMMERCIAL_VALUE_FACTOR);
        assert_eq!(config.build_solver().name(), "bisection");
    }

    #[test]
    fn test_unparsable_values_are_rejected() {
        for (key, value) in [
            ("BOND_COMMERCIAL_VALUE_FACTOR", "ninety"),
            ("BOND_TRANSACTION_COST_RATE", "5%"),
            ("BOND_NOMINAL_METHOD", "continuous"),
            ("BOND_IRR_SOLVER", "secant"),
        ] {
            let err = EngineConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, EngineError::InvalidInput { ref field, .. } if field == key),
                "{}={} gave {:?}",
                key,
                value,
                err
            );
        }
    }

    #[test]
    fn test_out_of_range_factors_are_rejected() {
        for (key, value) in [
            ("BOND_TRANSACTION_COST_RATE", "-0.01"),
            ("BOND_TRANSACTION_COST_RATE", "1.5"),
            ("BOND_COMMERCIAL_VALUE_FACTOR", "0"),
            ("BOND_COMMERCIAL_VALUE_FACTOR", "NaN"),
        ] {
            assert!(EngineConfig::from_lookup(lookup_from(&[(key, value)])).is_err(), "{}={}", key, value);
        }

        let config = EngineConfig {
            transaction_cost_rate: -0.05,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig {
            transaction_cost_rate: ALTERNATIVE_TRANSACTION_COST_RATE,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
