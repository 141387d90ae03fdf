//! Return solver: present value, internal rate of return and annualized rates
//!
//! Used to report the issuer's cost (TCEA) and the investor's yield (TREA)
//! from a generated schedule's cash flows.

mod indicators;
mod solver;
mod valuation;

pub use indicators::{CashFlowSeries, Perspective, ProfitabilityIndicators};
pub use solver::{
    BisectionSolver, IrrSolver, NewtonRaphsonSolver, SolverKind,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_STEP, DEFAULT_SEEDS, DEFAULT_TOLERANCE, RATE_FLOOR,
};
pub use valuation::{
    annualized_monthly_rate, annualized_rate, internal_rate_of_return, present_value, DAYS_PER_YEAR,
};
