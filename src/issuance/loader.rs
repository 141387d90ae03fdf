//! Load a book of issuances from CSV

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;

use crate::error::EngineResult;
use crate::rates::RateSpec;
use super::terms::{IssuanceTerms, PeriodUnit};

/// Raw CSV row matching the issuance book columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "IssueDate")]
    issue_date: Option<NaiveDate>,
    #[serde(rename = "Capital")]
    capital: f64,
    #[serde(rename = "Periods")]
    periods: u32,
    #[serde(rename = "PeriodUnit")]
    period_unit: String,
    #[serde(rename = "Cok")]
    cok: f64,
    #[serde(rename = "Rate")]
    rate: f64,
    #[serde(rename = "RateType")]
    rate_type: String,
}

impl CsvRow {
    fn into_terms(self) -> EngineResult<IssuanceTerms> {
        Ok(IssuanceTerms {
            name: self.name,
            issue_date: self.issue_date,
            principal: self.capital,
            period_count: self.periods,
            period_unit: self.period_unit.parse::<PeriodUnit>()?,
            discount_rate_tea_pct: self.cok,
            interest_rate: RateSpec::parse(self.rate, &self.rate_type)?,
        })
    }
}

/// Load all issuances from a CSV file
pub fn load_book<P: AsRef<Path>>(path: P) -> EngineResult<Vec<IssuanceTerms>> {
    let reader = Reader::from_path(path)?;
    collect_terms(reader)
}

/// Load issuances from any reader (e.g., string buffer, network stream)
pub fn load_book_from_reader<R: Read>(reader: R) -> EngineResult<Vec<IssuanceTerms>> {
    collect_terms(Reader::from_reader(reader))
}

fn collect_terms<R: Read>(mut reader: Reader<R>) -> EngineResult<Vec<IssuanceTerms>> {
    let mut book = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        book.push(row.into_terms()?);
    }

    Ok(book)
}
