//! Internal Rate of Return (IRR) solvers
//!
//! The engine only talks to [`IrrSolver`]; which implementation runs is picked
//! once from configuration ([`SolverKind`]) and injected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use super::valuation::present_value;

/// Seeds tried in order until one converges
pub const DEFAULT_SEEDS: [f64; 5] = [0.10, 0.05, 0.15, 0.01, 0.50];

/// |PV(r)| below which r is accepted as the IRR
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Iteration cap per seed
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Largest move allowed in a single Newton step
pub const DEFAULT_MAX_STEP: f64 = 0.5;

/// Lowest periodic rate ever evaluated; keeps 1 + r positive
pub const RATE_FLOOR: f64 = -0.99;

/// Strategy for finding the rate at which a cash-flow series has zero present value
pub trait IrrSolver: Send + Sync {
    /// Periodic IRR of `flows` (flows[0] at t = 0)
    fn solve(&self, flows: &[f64]) -> EngineResult<f64>;

    fn name(&self) -> &'static str;
}

/// Solver selection made at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SolverKind {
    #[default]
    NewtonRaphson,
    Bisection,
}

impl FromStr for SolverKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newton" | "newton_raphson" | "newton-raphson" => Ok(SolverKind::NewtonRaphson),
            "bisection" => Ok(SolverKind::Bisection),
            other => Err(EngineError::invalid_input(
                "solver",
                format!("unsupported IRR solver {:?} (expected newton or bisection)", other),
            )),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverKind::NewtonRaphson => write!(f, "newton"),
            SolverKind::Bisection => write!(f, "bisection"),
        }
    }
}

impl SolverKind {
    pub fn build(&self) -> Box<dyn IrrSolver> {
        match self {
            SolverKind::NewtonRaphson => Box::new(NewtonRaphsonSolver::default()),
            SolverKind::Bisection => Box::new(BisectionSolver::default()),
        }
    }
}

/// Damped Newton-Raphson with multiple seeds
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver {
    pub seeds: Vec<f64>,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub max_step: f64,
}

impl Default for NewtonRaphsonSolver {
    fn default() -> Self {
        Self {
            seeds: DEFAULT_SEEDS.to_vec(),
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_step: DEFAULT_MAX_STEP,
        }
    }
}

/// Result of iterating from one seed
enum SeedOutcome {
    Converged { rate: f64, iterations: u32 },
    Failed { iterations: u32, residual: f64 },
}

impl NewtonRaphsonSolver {
    fn run_seed(&self, flows: &[f64], seed: f64, gross: f64) -> SeedOutcome {
        let mut rate = seed.max(RATE_FLOOR);
        let mut residual = f64::INFINITY;

        for iteration in 0..self.max_iterations {
            let (npv, dnpv) = npv_and_derivative(flows, rate);

            if !npv.is_finite() || !dnpv.is_finite() {
                log::warn!("IRR seed {} left the finite range at r={}", seed, rate);
                return SeedOutcome::Failed { iterations: iteration, residual };
            }
            residual = npv;

            if npv.abs() < self.tolerance {
                return SeedOutcome::Converged { rate, iterations: iteration };
            }

            if dnpv == 0.0 {
                log::warn!("IRR seed {} hit a flat derivative at r={}", seed, rate);
                return SeedOutcome::Failed { iterations: iteration, residual };
            }

            let step = npv / dnpv;
            let step = if step.abs() > self.max_step {
                self.max_step.copysign(step)
            } else {
                step
            };
            let next = (rate - step).max(RATE_FLOOR);

            // Machine-precision fixed point: r can no longer move, accept if
            // the residual is at rounding-noise level for these flow sizes
            if (next - rate).abs() <= f64::EPSILON * (1.0 + rate.abs())
                && npv.abs() < self.tolerance * gross.max(1.0)
            {
                return SeedOutcome::Converged { rate, iterations: iteration + 1 };
            }

            rate = next;
        }

        SeedOutcome::Failed { iterations: self.max_iterations, residual }
    }
}

impl IrrSolver for NewtonRaphsonSolver {
    fn solve(&self, flows: &[f64]) -> EngineResult<f64> {
        check_flows(flows)?;
        let gross: f64 = flows.iter().map(|cf| cf.abs()).sum();

        let mut total_iterations = 0;
        let mut best_residual = f64::INFINITY;

        for &seed in &self.seeds {
            match self.run_seed(flows, seed, gross) {
                SeedOutcome::Converged { rate, iterations } => {
                    log::debug!("IRR converged from seed {} in {} iterations: {}", seed, iterations, rate);
                    return Ok(rate);
                }
                SeedOutcome::Failed { iterations, residual } => {
                    log::debug!("IRR seed {} failed after {} iterations (residual {:e})", seed, iterations, residual);
                    total_iterations += iterations;
                    if residual.abs() < best_residual.abs() {
                        best_residual = residual;
                    }
                }
            }
        }

        Err(EngineError::NoConvergence {
            seeds: self.seeds.len(),
            iterations: total_iterations,
            residual: best_residual,
        })
    }

    fn name(&self) -> &'static str {
        "newton-raphson"
    }
}

/// Bracketing solver over [RATE_FLOOR, 10.0] per period.
///
/// On long schedules (1 + r)^t underflows near the floor, so the lower end
/// is raised in `BRACKET_STEP` increments until the present value is finite.
#[derive(Debug, Clone)]
pub struct BisectionSolver {
    pub low: f64,
    pub high: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for BisectionSolver {
    fn default() -> Self {
        Self {
            low: RATE_FLOOR,
            high: 10.0,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Increment used to lift the bracket's lower end out of underflow
const BRACKET_STEP: f64 = 0.01;

impl BisectionSolver {
    /// Lowest rate in the bracket with a finite present value
    fn finite_low(&self, flows: &[f64]) -> (f64, f64) {
        let mut low = self.low;
        let mut npv_low = present_value(flows, low);
        while !npv_low.is_finite() && low + BRACKET_STEP < self.high {
            low += BRACKET_STEP;
            npv_low = present_value(flows, low);
        }
        if low > self.low {
            log::debug!("IRR bisection lower bound raised from {} to {}", self.low, low);
        }
        (low, npv_low)
    }
}

impl IrrSolver for BisectionSolver {
    fn solve(&self, flows: &[f64]) -> EngineResult<f64> {
        check_flows(flows)?;

        let (mut low, mut npv_low) = self.finite_low(flows);
        let mut high = self.high;
        let npv_high = present_value(flows, high);

        if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
            return Err(EngineError::NoConvergence {
                seeds: 1,
                iterations: 0,
                residual: npv_high,
            });
        }

        let mut residual = npv_high;
        for iteration in 0..self.max_iterations {
            let mid = (low + high) / 2.0;
            let npv_mid = present_value(flows, mid);
            residual = npv_mid;

            if npv_mid.abs() < self.tolerance || (high - low) / 2.0 < f64::EPSILON * (1.0 + mid.abs()) {
                log::debug!("IRR bisection converged in {} iterations: {}", iteration, mid);
                return Ok(mid);
            }

            if npv_mid * npv_low < 0.0 {
                high = mid;
            } else {
                low = mid;
                npv_low = npv_mid;
            }
        }

        Err(EngineError::NoConvergence {
            seeds: 1,
            iterations: self.max_iterations,
            residual,
        })
    }

    fn name(&self) -> &'static str {
        "bisection"
    }
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(flows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in flows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / ((1.0 + rate).powi(t as i32 + 1));
        }
    }

    (npv, dnpv)
}

/// Reject series that cannot have an IRR before iterating
fn check_flows(flows: &[f64]) -> EngineResult<()> {
    if flows.len() < 2 {
        return Err(EngineError::invalid_input("flows", "IRR requires at least 2 cash flows"));
    }
    if let Some(t) = flows.iter().position(|cf| !cf.is_finite()) {
        return Err(EngineError::invalid_input("flows", format!("non-finite cash flow at period {}", t)));
    }

    // A root needs at least one sign change
    let has_positive = flows.iter().any(|&cf| cf > 0.0);
    let has_negative = flows.iter().any(|&cf| cf < 0.0);
    if !has_positive || !has_negative {
        return Err(EngineError::NoConvergence {
            seeds: 0,
            iterations: 0,
            residual: flows.iter().sum(),
        });
    }

    Ok(())
}
