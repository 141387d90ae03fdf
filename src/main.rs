//! Bond Ledger CLI
//!
//! Originates a single issuance and prints its amortization schedule and
//! profitability indicators, or evaluates a previously exported schedule.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bond_ledger::{
    EngineConfig, IssuanceEngine, IssuanceTerms, PeriodUnit, Perspective, ProfitabilityIndicators, RateSpec, Schedule,
};
use bond_ledger::rates::NominalMethod;
use bond_ledger::returns::SolverKind;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bond-ledger", version, about = "Bond issuance schedules and profitability indicators")]
struct Cli {
    /// Transaction cost as a fraction of principal (default 0.05)
    #[arg(long, global = true)]
    transaction_cost_rate: Option<f64>,

    /// Nominal rate conversion: daily | simple
    #[arg(long, global = true)]
    nominal_method: Option<NominalMethod>,

    /// IRR solver: newton | bisection
    #[arg(long, global = true)]
    solver: Option<SolverKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the amortization schedule, optionally writing it to CSV
    Schedule {
        #[command(flatten)]
        terms: TermsArgs,

        /// Write the full schedule to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Rows to print to the console
        #[arg(long, default_value_t = 24)]
        show: usize,
    },
    /// Print issuer and investor indicators
    Indicators {
        #[command(flatten)]
        terms: TermsArgs,
    },
    /// Evaluate a schedule CSV written by `schedule --csv`
    Evaluate {
        rows: PathBuf,

        /// Discount rate (COK), annual effective percent
        #[arg(long)]
        cok: f64,
    },
}

#[derive(Args)]
struct TermsArgs {
    #[arg(long, default_value = "Issuance")]
    name: String,

    /// Issue date (YYYY-MM-DD), used for the maturity date
    #[arg(long)]
    issue_date: Option<NaiveDate>,

    /// Principal (face value)
    #[arg(long)]
    capital: f64,

    #[arg(long)]
    periods: u32,

    /// months | years
    #[arg(long, default_value = "months")]
    unit: String,

    /// Discount rate (COK), annual effective percent
    #[arg(long)]
    cok: f64,

    /// Interest rate, percent
    #[arg(long)]
    rate: f64,

    /// Rate convention code: TEM TNM TEB TNB TET TNT TES TNS TEA TNA
    #[arg(long, default_value = "TEA")]
    rate_type: String,
}

impl TermsArgs {
    fn to_terms(&self) -> Result<IssuanceTerms> {
        Ok(IssuanceTerms {
            name: self.name.clone(),
            issue_date: self.issue_date,
            principal: self.capital,
            period_count: self.periods,
            period_unit: self.unit.parse::<PeriodUnit>()?,
            discount_rate_tea_pct: self.cok,
            interest_rate: RateSpec::parse(self.rate, &self.rate_type)?,
        })
    }
}

fn build_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = EngineConfig::from_env().context("Invalid BOND_* engine settings")?;

    if let Some(rate) = cli.transaction_cost_rate {
        config.transaction_cost_rate = rate;
    }
    if let Some(method) = cli.nominal_method {
        config.nominal_method = method;
    }
    if let Some(solver) = cli.solver {
        config.solver = solver;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let engine = IssuanceEngine::new(build_config(&cli)?);

    match &cli.command {
        Command::Schedule { terms, csv, show } => run_schedule(&engine, terms, csv.as_deref(), *show),
        Command::Indicators { terms } => run_indicators(&engine, terms),
        Command::Evaluate { rows, cok } => run_evaluate(&engine, rows, *cok),
    }
}

fn run_schedule(engine: &IssuanceEngine, args: &TermsArgs, csv: Option<&Path>, show: usize) -> Result<()> {
    let terms = args.to_terms()?;
    let issuance = engine.originate(&terms)?;
    let derived = &issuance.derived;

    println!("Issuance: {}", terms.name);
    println!("  Capital:            {:.2}", terms.principal);
    println!("  Commercial value:   {:.2}", derived.commercial_value);
    println!("  Transaction cost:   {:.2}", derived.transaction_cost);
    println!("  Periods (months):   {}", derived.periods_in_months);
    println!("  Monthly rate (TEM): {:.7}%", derived.monthly_rate * 100.0);
    if let Some(maturity) = derived.maturity_date {
        println!("  Maturity:           {}", maturity);
    }
    println!();

    print_schedule(&issuance.schedule, show);

    let summary = issuance.schedule.summary();
    println!("\nSummary:");
    println!("  Total interest:     {:.2}", summary.total_interest);
    println!("  Total amortization: {:.2}", summary.total_amortization);
    println!("  Total installments: {:.2}", summary.total_installments);

    if let Some(path) = csv {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        issuance.schedule.write_csv(file)?;
        println!("\nFull schedule written to: {}", path.display());
    }

    Ok(())
}

fn run_indicators(engine: &IssuanceEngine, args: &TermsArgs) -> Result<()> {
    let terms = args.to_terms()?;
    let (_, report) = engine.run(&terms)?;

    println!("Issuance: {} (solver: {})", report.name, engine.solver_name());
    print_indicators(&report.issuer);
    print_indicators(&report.investor);
    Ok(())
}

fn run_evaluate(engine: &IssuanceEngine, path: &Path, cok: f64) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
    let rows = Schedule::read_csv(file)?;

    for perspective in [Perspective::Issuer, Perspective::Investor] {
        let indicators = engine
            .indicators(&rows, cok, perspective)
            .with_context(|| format!("{:?} indicators for {}", perspective, path.display()))?;
        print_indicators(&indicators);
    }
    Ok(())
}

fn print_schedule(schedule: &Schedule, show: usize) {
    println!("{:>6} {:>14} {:>12} {:>12} {:>12} {:>14} {:>14} {:>14}",
        "Period", "Opening", "Interest", "Amort", "Installment", "Closing", "Investor", "Issuer");
    println!("{}", "-".repeat(106));

    let blank = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_default();
    for row in schedule.rows.iter().take(show) {
        println!("{:>6} {:>14} {:>12} {:>12} {:>12} {:>14} {:>14.2} {:>14.2}",
            row.period,
            blank(row.opening_balance),
            blank(row.interest),
            blank(row.amortization),
            blank(row.installment),
            blank(row.closing_balance),
            row.investor_flow,
            row.issuer_flow,
        );
    }

    if schedule.rows.len() > show {
        println!("... ({} more periods)", schedule.rows.len() - show);
    }
}

fn print_indicators(indicators: &ProfitabilityIndicators) {
    println!("\n{:?}:", indicators.perspective);
    println!("  Discount rate (COK) per period: {:.7}%", indicators.discount_rate_period_pct);
    println!("  IRR per period:                 {:.7}%", indicators.irr_period_pct);
    println!("  {}:                           {:.7}%",
        indicators.perspective.annualized_label(), indicators.annual_effective_rate_pct);
    println!("  NPV:                            {:.2}", indicators.npv);
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERMS: [&str; 10] = ["--capital", "10000", "--periods", "12", "--cok", "10", "--rate", "12", "--rate-type", "TNA"];

    fn parse(flags: &[&str]) -> Result<Cli, clap::Error> {
        let mut args = vec!["bond-ledger"];
        args.extend_from_slice(flags);
        args.push("indicators");
        args.extend_from_slice(&TERMS);
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_known_choices_parse() {
        let cli = parse(&["--solver", "bisection", "--nominal-method", "simple"]).unwrap();
        assert_eq!(cli.solver, Some(SolverKind::Bisection));
        assert_eq!(cli.nominal_method, Some(NominalMethod::SimpleDivision));
    }

    #[test]
    fn test_unknown_choices_rejected_at_parse_time() {
        assert!(parse(&["--solver", "secant"]).is_err());
        assert!(parse(&["--nominal-method", "continuous"]).is_err());
    }

    #[test]
    fn test_negative_transaction_cost_rejected() {
        let cli = parse(&["--transaction-cost-rate=-0.05"]).unwrap();
        assert!(build_config(&cli).is_err());
    }
}
