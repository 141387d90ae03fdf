//! Bond Ledger - financial computation engine for bond issuances
//!
//! This library provides:
//! - Rate normalization from ten nominal/effective conventions to a monthly effective rate
//! - Constant-amortization schedule generation with issuer and investor cash flows
//! - Present value, IRR (damped multi-seed Newton-Raphson) and annualized TCEA/TREA
//! - Batch origination of issuance books loaded from CSV

pub mod error;
pub mod config;
pub mod rates;
pub mod schedule;
pub mod returns;
pub mod issuance;

// Re-export commonly used types
pub use error::{EngineError, EngineResult};
pub use config::EngineConfig;
pub use rates::{RateConvention, RateSpec, normalize};
pub use schedule::{Schedule, ScheduleRow, generate};
pub use returns::{present_value, internal_rate_of_return, annualized_rate, IrrSolver, Perspective, ProfitabilityIndicators};
pub use issuance::{IssuanceEngine, IssuanceTerms, PeriodUnit};
