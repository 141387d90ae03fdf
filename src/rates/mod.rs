//! Rate conventions and normalization to a monthly effective rate

mod convention;
mod normalizer;

pub use convention::{RateConvention, RateSpec, DAYS_PER_MONTH};
pub use normalizer::{normalize, normalize_with, monthly_from_annual_effective, NominalMethod};
