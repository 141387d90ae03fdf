//! Amortization schedule generation and export

mod generator;
mod rows;

pub use generator::generate;
pub use rows::{GracePeriod, Schedule, ScheduleRow, ScheduleSummary};
