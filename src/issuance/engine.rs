//! Issuance engine: terms -> derived values -> schedule -> indicators

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::returns::{IrrSolver, Perspective, ProfitabilityIndicators};
use crate::schedule::{generate, Schedule, ScheduleRow, ScheduleSummary};
use super::terms::{DerivedTerms, IssuanceTerms};

/// An originated issuance: terms, derived values and its amortization table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issuance {
    pub terms: IssuanceTerms,
    pub derived: DerivedTerms,
    pub schedule: Schedule,
}

/// Both sides' indicators for one issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceReport {
    pub name: String,
    pub summary: ScheduleSummary,
    pub issuer: ProfitabilityIndicators,
    pub investor: ProfitabilityIndicators,
}

/// Main issuance engine
///
/// Holds the run configuration and the IRR solver chosen for it. Stateless
/// between calls, so one engine can be shared across threads.
pub struct IssuanceEngine {
    config: EngineConfig,
    solver: Box<dyn IrrSolver>,
}

impl IssuanceEngine {
    /// Create an engine using the solver named in `config`
    pub fn new(config: EngineConfig) -> Self {
        let solver = config.build_solver();
        Self { config, solver }
    }

    /// Create an engine with an explicitly injected solver
    pub fn with_solver(config: EngineConfig, solver: Box<dyn IrrSolver>) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    /// Validate terms and build the schedule
    pub fn originate(&self, terms: &IssuanceTerms) -> EngineResult<Issuance> {
        let derived = terms.derive(&self.config)?;

        let schedule = generate(
            terms.principal,
            derived.commercial_value,
            derived.transaction_cost,
            derived.periods_in_months,
            derived.monthly_rate,
            terms.interest_rate.magnitude_pct(),
        )?;

        log::debug!(
            "originated {:?}: {} months at {:.6}% monthly",
            terms.name,
            derived.periods_in_months,
            derived.monthly_rate * 100.0
        );

        Ok(Issuance {
            terms: terms.clone(),
            derived,
            schedule,
        })
    }

    /// Indicators for one side from persisted rows (any storage order)
    pub fn indicators(
        &self,
        rows: &[ScheduleRow],
        discount_tea_pct: f64,
        perspective: Perspective,
    ) -> EngineResult<ProfitabilityIndicators> {
        ProfitabilityIndicators::evaluate(rows, discount_tea_pct, perspective, self.solver.as_ref())
    }

    /// Issuer and investor indicators for an originated issuance
    pub fn evaluate(&self, issuance: &Issuance) -> EngineResult<IssuanceReport> {
        let rows = &issuance.schedule.rows;
        let discount = issuance.terms.discount_rate_tea_pct;

        Ok(IssuanceReport {
            name: issuance.terms.name.clone(),
            summary: issuance.schedule.summary(),
            issuer: self.indicators(rows, discount, Perspective::Issuer)?,
            investor: self.indicators(rows, discount, Perspective::Investor)?,
        })
    }

    /// Originate and evaluate in one step
    pub fn run(&self, terms: &IssuanceTerms) -> EngineResult<(Issuance, IssuanceReport)> {
        let issuance = self.originate(terms)?;
        let report = self.evaluate(&issuance)?;
        Ok((issuance, report))
    }
}

impl Default for IssuanceEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
