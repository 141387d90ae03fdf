//! Amortization schedule output structures

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Grace-period marker carried on every payment row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GracePeriod {
    /// Regular payment, no grace: interest and amortization both due
    #[serde(rename = "S")]
    NoGrace,
}

/// One row of the amortization table.
///
/// Row 0 is the disbursement and carries only the two cash flows; the
/// balance, interest and rate fields are `None` there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 0 = disbursement, 1..N = payment periods
    pub period: u32,

    // Audit fields
    /// Interest rate as entered, in percent (unconverted)
    pub rate_magnitude_pct: Option<f64>,
    /// Monthly effective rate, in percent
    pub period_rate_pct: Option<f64>,
    /// Payment-type flag; `None` on the disbursement row
    pub grace: Option<GracePeriod>,

    // Balances and payment split
    pub opening_balance: Option<f64>,
    pub interest: Option<f64>,
    pub amortization: Option<f64>,
    pub installment: Option<f64>,
    pub closing_balance: Option<f64>,

    // Cash flows
    pub investor_flow: f64,
    pub issuer_flow: f64,
}

impl ScheduleRow {
    /// Period 0: investor pays out, issuer receives
    pub fn disbursement(commercial_value: f64, transaction_cost: f64) -> Self {
        Self {
            period: 0,
            rate_magnitude_pct: None,
            period_rate_pct: None,
            grace: None,
            opening_balance: None,
            interest: None,
            amortization: None,
            installment: None,
            closing_balance: None,
            investor_flow: -(commercial_value - transaction_cost),
            issuer_flow: commercial_value + transaction_cost,
        }
    }

    pub fn is_disbursement(&self) -> bool {
        self.period == 0
    }
}

/// Ordered amortization table, period 0 first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn new(rows: Vec<ScheduleRow>) -> Self {
        Self { rows }
    }

    /// Number of payment periods (excludes the disbursement row)
    pub fn payment_periods(&self) -> u32 {
        self.rows.iter().filter(|r| !r.is_disbursement()).count() as u32
    }

    pub fn investor_flows(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.investor_flow).collect()
    }

    pub fn issuer_flows(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.issuer_flow).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let payments = || self.rows.iter().filter(|r| !r.is_disbursement());

        let total_interest: f64 = payments().filter_map(|r| r.interest).sum();
        let total_amortization: f64 = payments().filter_map(|r| r.amortization).sum();
        let total_installments: f64 = payments().filter_map(|r| r.installment).sum();
        let final_balance = self
            .rows
            .last()
            .and_then(|r| r.closing_balance)
            .unwrap_or(0.0);

        ScheduleSummary {
            payment_periods: self.payment_periods(),
            total_interest,
            total_amortization,
            total_installments,
            final_balance,
        }
    }

    /// Write every row as CSV with a header line
    pub fn write_csv<W: Write>(&self, writer: W) -> EngineResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Read rows previously written by [`Schedule::write_csv`], in stored order
    pub fn read_csv<R: Read>(reader: R) -> EngineResult<Vec<ScheduleRow>> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();

        for result in csv_reader.deserialize() {
            let row: ScheduleRow = result?;
            rows.push(row);
        }

        Ok(rows)
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub payment_periods: u32,
    pub total_interest: f64,
    pub total_amortization: f64,
    pub total_installments: f64,
    pub final_balance: f64,
}
