//! Originate and evaluate every issuance in a CSV book
//!
//! Usage: run_book [BOOK_CSV] [--json]
//! BOOK_CSV defaults to $BOND_BOOK_PATH, then issuance_book.csv.
//! Engine settings come from BOND_* environment variables (see `EngineConfig::from_env`).
//! Without --json, results are written to book_indicators.csv.

use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use bond_ledger::issuance::{load_book, IssuanceReport};
use bond_ledger::{EngineConfig, IssuanceEngine, IssuanceTerms};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

const DEFAULT_BOOK_PATH: &str = "issuance_book.csv";
const OUTPUT_PATH: &str = "book_indicators.csv";

/// One output line per issuance; failed issuances carry `error` and no indicators
#[derive(Debug, Serialize, Default)]
struct BookRow {
    name: String,
    capital: f64,
    periods_in_months: Option<u32>,
    monthly_rate_pct: Option<f64>,
    maturity_date: Option<NaiveDate>,
    cok_period_pct: Option<f64>,
    issuer_irr_period_pct: Option<f64>,
    tcea_pct: Option<f64>,
    issuer_npv: Option<f64>,
    investor_irr_period_pct: Option<f64>,
    trea_pct: Option<f64>,
    investor_npv: Option<f64>,
    error: Option<String>,
}

#[derive(Serialize)]
struct BookResponse {
    issuance_count: usize,
    failed_count: usize,
    config: EngineConfig,
    results: Vec<BookRow>,
    execution_time_ms: u64,
}

fn evaluate(engine: &IssuanceEngine, terms: &IssuanceTerms) -> BookRow {
    let mut row = BookRow {
        name: terms.name.clone(),
        capital: terms.principal,
        ..Default::default()
    };

    let issuance = match engine.originate(terms) {
        Ok(issuance) => issuance,
        Err(e) => {
            log::warn!("{}: {}", terms.name, e);
            row.error = Some(e.to_string());
            return row;
        }
    };
    row.periods_in_months = Some(issuance.derived.periods_in_months);
    row.monthly_rate_pct = Some(issuance.derived.monthly_rate * 100.0);
    row.maturity_date = issuance.derived.maturity_date;

    match engine.evaluate(&issuance) {
        Ok(IssuanceReport { issuer, investor, .. }) => {
            row.cok_period_pct = Some(issuer.discount_rate_period_pct);
            row.issuer_irr_period_pct = Some(issuer.irr_period_pct);
            row.tcea_pct = Some(issuer.annual_effective_rate_pct);
            row.issuer_npv = Some(issuer.npv);
            row.investor_irr_period_pct = Some(investor.irr_period_pct);
            row.trea_pct = Some(investor.annual_effective_rate_pct);
            row.investor_npv = Some(investor.npv);
        }
        Err(e) => {
            log::warn!("{}: {}", terms.name, e);
            row.error = Some(e.to_string());
        }
    }

    row
}

fn main() -> Result<()> {
    env_logger::init();

    let json_output = env::args().any(|arg| arg == "--json");
    let book_path = env::args()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .or_else(|| env::var("BOND_BOOK_PATH").ok())
        .unwrap_or_else(|| DEFAULT_BOOK_PATH.to_string());

    let start = Instant::now();

    let book = load_book(&book_path).with_context(|| format!("Failed to load book {}", book_path))?;
    log::info!("Loaded {} issuances from {} in {:?}", book.len(), book_path, start.elapsed());

    let config = EngineConfig::from_env().context("Invalid BOND_* engine settings")?;
    let engine = IssuanceEngine::new(config.clone());

    // Issuances are independent; evaluate in parallel
    let results: Vec<BookRow> = book.par_iter().map(|terms| evaluate(&engine, terms)).collect();
    let failed_count = results.iter().filter(|r| r.error.is_some()).count();

    if json_output {
        let response = BookResponse {
            issuance_count: results.len(),
            failed_count,
            config,
            results,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let mut writer = csv::Writer::from_path(OUTPUT_PATH)
        .with_context(|| format!("Failed to create {}", OUTPUT_PATH))?;
    for row in &results {
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!("Evaluated {} issuances ({} failed) in {:?}", results.len(), failed_count, start.elapsed());
    println!("Output written to {}", OUTPUT_PATH);
    Ok(())
}
