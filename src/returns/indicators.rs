//! Profitability indicators for the issuer and the investor

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::rates::{monthly_from_annual_effective, DAYS_PER_MONTH};
use crate::schedule::ScheduleRow;
use super::solver::IrrSolver;
use super::valuation::{annualized_rate, present_value};

/// Whose cash flows are being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    Issuer,
    Investor,
}

impl Perspective {
    pub fn flow(&self, row: &ScheduleRow) -> f64 {
        match self {
            Perspective::Issuer => row.issuer_flow,
            Perspective::Investor => row.investor_flow,
        }
    }

    /// Name of the annualized rate: cost for the issuer, yield for the investor
    pub fn annualized_label(&self) -> &'static str {
        match self {
            Perspective::Issuer => "TCEA",
            Perspective::Investor => "TREA",
        }
    }
}

/// Signed flows indexed by period 0..N
#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowSeries {
    flows: Vec<f64>,
}

impl CashFlowSeries {
    pub fn new(flows: Vec<f64>) -> Self {
        Self { flows }
    }

    /// Extract one side's flows from rows in any stored order.
    ///
    /// Rows are re-sorted by period; the periods must then read 0, 1, ..., N.
    pub fn from_rows(rows: &[ScheduleRow], perspective: Perspective) -> EngineResult<Self> {
        if rows.is_empty() {
            return Err(EngineError::invalid_input("rows", "schedule has no rows"));
        }

        let mut ordered: Vec<&ScheduleRow> = rows.iter().collect();
        ordered.sort_by_key(|r| r.period);

        if let Some((index, row)) = ordered
            .iter()
            .enumerate()
            .find(|(index, row)| row.period as usize != *index)
        {
            return Err(EngineError::invalid_input(
                "rows",
                format!("expected period {} but found period {} (gap or duplicate)", index, row.period),
            ));
        }

        Ok(Self::new(ordered.iter().map(|r| perspective.flow(r)).collect()))
    }

    pub fn flows(&self) -> &[f64] {
        &self.flows
    }

    pub fn present_value(&self, rate: f64) -> f64 {
        present_value(&self.flows, rate)
    }
}

/// Indicator set returned to the caller. Rates are percentages, NPV is in currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitabilityIndicators {
    pub perspective: Perspective,
    /// Discount rate (COK) per monthly period, %
    pub discount_rate_period_pct: f64,
    /// IRR per monthly period, %
    pub irr_period_pct: f64,
    /// TCEA (issuer) or TREA (investor), %
    pub annual_effective_rate_pct: f64,
    /// Net present value at the monthly discount rate
    pub npv: f64,
}

impl ProfitabilityIndicators {
    /// Evaluate one side of a persisted schedule against an annual effective discount rate.
    ///
    /// Fails as a whole: either every indicator is computed or an error is returned.
    pub fn evaluate(
        rows: &[ScheduleRow],
        discount_tea_pct: f64,
        perspective: Perspective,
        solver: &dyn IrrSolver,
    ) -> EngineResult<Self> {
        if !discount_tea_pct.is_finite() {
            return Err(EngineError::invalid_input("discount_tea_pct", "must be finite"));
        }

        let series = CashFlowSeries::from_rows(rows, perspective)?;
        let discount_rate = monthly_from_annual_effective(discount_tea_pct);
        let irr = solver.solve(series.flows())?;
        let annual = annualized_rate(irr, DAYS_PER_MONTH);
        let npv = series.present_value(discount_rate);

        if !irr.is_finite() || !annual.is_finite() || !npv.is_finite() {
            return Err(EngineError::NoConvergence {
                seeds: 0,
                iterations: 0,
                residual: npv,
            });
        }

        log::debug!(
            "{:?} indicators: IRR {:.6}%/month, {} {:.6}%, NPV {:.2}",
            perspective,
            irr * 100.0,
            perspective.annualized_label(),
            annual * 100.0,
            npv
        );

        Ok(Self {
            perspective,
            discount_rate_period_pct: discount_rate * 100.0,
            irr_period_pct: irr * 100.0,
            annual_effective_rate_pct: annual * 100.0,
            npv,
        })
    }
}
