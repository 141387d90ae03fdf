//! Issuance terms, derivation and the engine tying normalizer, generator and solver together

mod engine;
mod terms;
pub mod loader;

pub use engine::{Issuance, IssuanceEngine, IssuanceReport};
pub use terms::{DerivedTerms, IssuanceTerms, PeriodUnit, MAX_PERIOD_COUNT, MAX_RATE_PCT};
pub use loader::{load_book, load_book_from_reader};
