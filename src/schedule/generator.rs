//! Constant-amortization schedule generation

use crate::error::{EngineError, EngineResult};
use super::rows::{GracePeriod, Schedule, ScheduleRow};

/// Relative drift (vs. principal) below which the final balance is snapped to zero
const FINAL_BALANCE_DRIFT: f64 = 1e-9;

/// Build the full amortization table.
///
/// Principal is repaid in equal slices (`principal / periods`), interest is
/// charged on the opening balance at `monthly_rate`. Row 0 carries the
/// disbursement flows: the investor pays `commercial_value - transaction_cost`
/// and the issuer receives `commercial_value + transaction_cost`.
pub fn generate(
    principal: f64,
    commercial_value: f64,
    transaction_cost: f64,
    periods_in_months: u32,
    monthly_rate: f64,
    original_rate_pct: f64,
) -> EngineResult<Schedule> {
    if periods_in_months == 0 {
        return Err(EngineError::InvalidPeriodCount(0));
    }
    require_finite("principal", principal)?;
    require_finite("commercial_value", commercial_value)?;
    require_finite("transaction_cost", transaction_cost)?;
    require_finite("monthly_rate", monthly_rate)?;
    require_finite("original_rate_pct", original_rate_pct)?;
    if principal <= 0.0 {
        return Err(EngineError::invalid_input("principal", "must be positive"));
    }
    if monthly_rate <= -1.0 {
        return Err(EngineError::invalid_input("monthly_rate", "must be greater than -100%"));
    }

    let amortization = principal / periods_in_months as f64;
    let period_rate_pct = monthly_rate * 100.0;
    let snap_below = FINAL_BALANCE_DRIFT * principal.max(1.0);

    let disbursement = ScheduleRow::disbursement(commercial_value, transaction_cost);

    // Running balance is the fold state; each step emits one immutable row
    let payments = (1..=periods_in_months).scan(principal, |balance, period| {
        let opening = *balance;
        let interest = opening * monthly_rate;
        let installment = interest + amortization;
        let mut closing = opening - amortization;
        if period == periods_in_months && closing.abs() < snap_below {
            closing = 0.0;
        }
        *balance = closing;

        Some(ScheduleRow {
            period,
            rate_magnitude_pct: Some(original_rate_pct),
            period_rate_pct: Some(period_rate_pct),
            grace: Some(GracePeriod::NoGrace),
            opening_balance: Some(opening),
            interest: Some(interest),
            amortization: Some(amortization),
            installment: Some(installment),
            closing_balance: Some(closing),
            investor_flow: installment,
            issuer_flow: -installment,
        })
    });

    let rows: Vec<ScheduleRow> = std::iter::once(disbursement).chain(payments).collect();

    // Finite inputs can still overflow once multiplied out
    if let Some(row) = rows
        .iter()
        .find(|r| !r.investor_flow.is_finite() || !r.issuer_flow.is_finite())
    {
        return Err(EngineError::invalid_input(
            "schedule",
            format!("cash flow overflows at period {}", row.period),
        ));
    }

    log::debug!(
        "generated schedule: {} periods, amortization {:.2}/period",
        periods_in_months,
        amortization
    );

    Ok(Schedule::new(rows))
}

fn require_finite(field: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::invalid_input(field, format!("must be finite, got {}", value)))
    }
}
