//! Error types shared by the rate normalizer, schedule generator and return solver

use thiserror::Error;

/// Result alias used throughout the engine
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures raised by the financial computation engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rate convention code outside the supported enumeration
    #[error("Invalid rate convention: {0}")]
    InvalidConvention(String),

    /// Non-positive period count
    #[error("Invalid period count: {0} (must be a positive number of periods)")]
    InvalidPeriodCount(i64),

    /// Input rejected by range/finiteness checks
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// IRR solver exhausted every seed without meeting the tolerance
    #[error("IRR did not converge after {seeds} seeds / {iterations} iterations (residual: {residual:.3e})")]
    NoConvergence {
        seeds: usize,
        iterations: u32,
        residual: f64,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the failure came from the IRR solver
    pub fn is_no_convergence(&self) -> bool {
        matches!(self, EngineError::NoConvergence { .. })
    }
}
