//! Rate conventions accepted for an issuance's interest rate

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Days in the canonical (30-day) month all rates are re-based to
pub const DAYS_PER_MONTH: u32 = 30;

/// Nominal/effective rate conventions at monthly through annual granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateConvention {
    /// Tasa efectiva mensual
    #[serde(rename = "TEM")]
    MonthlyEffective,
    /// Tasa nominal mensual
    #[serde(rename = "TNM")]
    MonthlyNominal,
    #[serde(rename = "TEB")]
    BimonthlyEffective,
    #[serde(rename = "TNB")]
    BimonthlyNominal,
    #[serde(rename = "TET")]
    QuarterlyEffective,
    #[serde(rename = "TNT")]
    QuarterlyNominal,
    #[serde(rename = "TES")]
    SemiannualEffective,
    #[serde(rename = "TNS")]
    SemiannualNominal,
    /// Tasa efectiva anual
    #[serde(rename = "TEA")]
    AnnualEffective,
    /// Tasa nominal anual
    #[serde(rename = "TNA")]
    AnnualNominal,
}

impl RateConvention {
    /// Every supported convention, effective before nominal at each granularity
    pub const ALL: [RateConvention; 10] = [
        RateConvention::MonthlyEffective,
        RateConvention::MonthlyNominal,
        RateConvention::BimonthlyEffective,
        RateConvention::BimonthlyNominal,
        RateConvention::QuarterlyEffective,
        RateConvention::QuarterlyNominal,
        RateConvention::SemiannualEffective,
        RateConvention::SemiannualNominal,
        RateConvention::AnnualEffective,
        RateConvention::AnnualNominal,
    ];

    /// Short code used on the wire and in CSV books
    pub fn code(&self) -> &'static str {
        match self {
            RateConvention::MonthlyEffective => "TEM",
            RateConvention::MonthlyNominal => "TNM",
            RateConvention::BimonthlyEffective => "TEB",
            RateConvention::BimonthlyNominal => "TNB",
            RateConvention::QuarterlyEffective => "TET",
            RateConvention::QuarterlyNominal => "TNT",
            RateConvention::SemiannualEffective => "TES",
            RateConvention::SemiannualNominal => "TNS",
            RateConvention::AnnualEffective => "TEA",
            RateConvention::AnnualNominal => "TNA",
        }
    }

    pub fn is_effective(&self) -> bool {
        matches!(
            self,
            RateConvention::MonthlyEffective
                | RateConvention::BimonthlyEffective
                | RateConvention::QuarterlyEffective
                | RateConvention::SemiannualEffective
                | RateConvention::AnnualEffective
        )
    }

    /// Number of months contained in the convention's period (k)
    pub fn months_spanned(&self) -> u32 {
        match self {
            RateConvention::MonthlyEffective | RateConvention::MonthlyNominal => 1,
            RateConvention::BimonthlyEffective | RateConvention::BimonthlyNominal => 2,
            RateConvention::QuarterlyEffective | RateConvention::QuarterlyNominal => 3,
            RateConvention::SemiannualEffective | RateConvention::SemiannualNominal => 6,
            RateConvention::AnnualEffective | RateConvention::AnnualNominal => 12,
        }
    }

    /// Days nominally spanned by the convention's period (d)
    pub fn days_spanned(&self) -> u32 {
        self.months_spanned() * DAYS_PER_MONTH
    }
}

impl fmt::Display for RateConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RateConvention {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        let convention = match normalized.as_str() {
            "TEM" | "MONTHLY_EFFECTIVE" => RateConvention::MonthlyEffective,
            "TNM" | "MONTHLY_NOMINAL" => RateConvention::MonthlyNominal,
            "TEB" | "BIMONTHLY_EFFECTIVE" => RateConvention::BimonthlyEffective,
            "TNB" | "BIMONTHLY_NOMINAL" => RateConvention::BimonthlyNominal,
            "TET" | "QUARTERLY_EFFECTIVE" => RateConvention::QuarterlyEffective,
            "TNT" | "QUARTERLY_NOMINAL" => RateConvention::QuarterlyNominal,
            "TES" | "SEMIANNUAL_EFFECTIVE" => RateConvention::SemiannualEffective,
            "TNS" | "SEMIANNUAL_NOMINAL" => RateConvention::SemiannualNominal,
            "TEA" | "ANNUAL_EFFECTIVE" => RateConvention::AnnualEffective,
            "TNA" | "ANNUAL_NOMINAL" => RateConvention::AnnualNominal,
            _ => return Err(EngineError::InvalidConvention(s.to_string())),
        };
        Ok(convention)
    }
}

/// A rate magnitude (percent) paired with its convention. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSpec {
    magnitude_pct: f64,
    convention: RateConvention,
}

impl RateSpec {
    pub fn new(magnitude_pct: f64, convention: RateConvention) -> Self {
        Self {
            magnitude_pct,
            convention,
        }
    }

    /// Build from a convention code such as "TEA"
    pub fn parse(magnitude_pct: f64, code: &str) -> EngineResult<Self> {
        Ok(Self::new(magnitude_pct, code.parse()?))
    }

    /// Rate as entered, in percent
    pub fn magnitude_pct(&self) -> f64 {
        self.magnitude_pct
    }

    pub fn convention(&self) -> RateConvention {
        self.convention
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_str() {
        for convention in RateConvention::ALL {
            let parsed: RateConvention = convention.code().parse().unwrap();
            assert_eq!(parsed, convention);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("tea".parse::<RateConvention>().unwrap(), RateConvention::AnnualEffective);
        assert_eq!(" tnS ".parse::<RateConvention>().unwrap(), RateConvention::SemiannualNominal);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = "TEX".parse::<RateConvention>().unwrap_err();
        assert!(matches!(err, EngineError::InvalidConvention(ref code) if code == "TEX"));
        assert!(RateSpec::parse(10.0, "").is_err());
    }

    #[test]
    fn test_days_spanned() {
        assert_eq!(RateConvention::MonthlyNominal.days_spanned(), 30);
        assert_eq!(RateConvention::BimonthlyNominal.days_spanned(), 60);
        assert_eq!(RateConvention::QuarterlyNominal.days_spanned(), 90);
        assert_eq!(RateConvention::SemiannualNominal.days_spanned(), 180);
        assert_eq!(RateConvention::AnnualNominal.days_spanned(), 360);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&RateConvention::AnnualEffective).unwrap();
        assert_eq!(json, "\"TEA\"");
        let back: RateConvention = serde_json::from_str("\"TNB\"").unwrap();
        assert_eq!(back, RateConvention::BimonthlyNominal);
    }
}
