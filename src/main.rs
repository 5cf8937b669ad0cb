//! Commission Engine CLI
//!
//! Computes the payment schedule for a single investment, e.g. for simulating
//! an offer before anything is persisted.

use anyhow::{Context, Result};
use clap::Parser;
use commission_engine::schedule::{
    compute_commission_with, write_schedule_csv, CommissionRequest, EntryKind, PaymentScheduleBuilder,
    ScheduleConfig, DEFAULT_CUTOFF_DAY, DEFAULT_ELIGIBILITY_DAYS,
};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "commission_engine", version, about = "Compute the payment schedule for one investment")]
struct Args {
    /// Identifier carried into the output
    #[arg(long, default_value = "simulation")]
    investment_id: String,

    /// Amount deposited
    #[arg(long)]
    principal: Decimal,

    /// Deposit date (YYYY-MM-DD)
    #[arg(long)]
    deposit_date: String,

    /// Commitment period in months
    #[arg(long, default_value_t = 12)]
    months: u32,

    /// Liquidity cycle (Monthly, Semiannual, Annual, Biennial, Triennial)
    #[arg(long, default_value = "Monthly")]
    liquidity: String,

    /// Monthly investor rate, e.g. 0.02
    #[arg(long)]
    investor_rate: Option<Decimal>,

    /// Monthly advisor rate
    #[arg(long)]
    advisor_rate: Option<Decimal>,

    /// Monthly office rate
    #[arg(long)]
    office_rate: Option<Decimal>,

    /// Day of the month payouts are batched on
    #[arg(long, default_value_t = DEFAULT_CUTOFF_DAY)]
    cutoff_day: u32,

    /// Minimum days between deposit and first payout
    #[arg(long, default_value_t = DEFAULT_ELIGIBILITY_DAYS)]
    eligibility_days: i64,

    /// Print the month-by-month accrual under each entry
    #[arg(long)]
    breakdown: bool,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write the schedule to a CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let builder = PaymentScheduleBuilder::new(ScheduleConfig {
        cutoff_day: args.cutoff_day,
        eligibility_days: args.eligibility_days,
        include_breakdown: args.breakdown || args.json,
        ..Default::default()
    })?;

    let request = CommissionRequest {
        investment_id: args.investment_id.clone(),
        principal: args.principal,
        deposit_date: args.deposit_date.clone(),
        commitment_months: args.months,
        liquidity: args.liquidity.clone(),
        investor_rate: args.investor_rate,
        advisor_rate: args.advisor_rate,
        office_rate: args.office_rate,
    };

    let calc = compute_commission_with(&builder, &request)
        .with_context(|| format!("cannot compute schedule for {}", request.investment_id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&calc.envelope())?);
    } else {
        println!("Investment: {}", calc.investment_id);
        println!("  Principal: {:.2}", args.principal);
        println!("  Liquidity: {}", calc.liquidity);
        println!(
            "  Rates: investor {} / advisor {} / office {}",
            calc.rates.investor, calc.rates.advisor, calc.rates.office
        );
        println!("  Cutoff: {}", calc.cutoff_period.cutoff_date);
        println!("  First eligible cutoff: {}", calc.cutoff_period.first_eligible_cutoff);
        println!("  Commitment ends: {}", calc.commission_period.commitment_end_date);
        println!();

        println!(
            "{:>10} {:>5} {:>12} {:>14} {:>14} {:>14}",
            "Kind", "Month", "Due", "Investor", "Advisor", "Office"
        );
        println!("{}", "-".repeat(74));

        for entry in &calc.entries {
            let kind = match entry.kind {
                EntryKind::FirstStub => "stub",
                EntryKind::Cycle => "cycle",
                EntryKind::FinalStub => "final",
            };
            println!(
                "{:>10} {:>5} {:>12} {:>14.2} {:>14.2} {:>14.2}",
                kind,
                entry.month_index,
                entry.due_date,
                entry.investor_amount,
                entry.advisor_amount,
                entry.office_amount,
            );

            if args.breakdown {
                for month in &entry.breakdown {
                    println!(
                        "{:>10} {:>5} {:>12} {:>14.4} {:>14.4} {:>14.4}",
                        "", month.month_index, "", month.investor, month.advisor, month.office,
                    );
                }
            }
        }

        let summary = calc.summary();
        println!("\nSummary:");
        println!("  Payments: {}", summary.entry_count);
        println!("  Total investor: {:.2}", summary.total_investor);
        println!("  Total advisor: {:.2}", summary.total_advisor);
        println!("  Total office: {:.2}", summary.total_office);
    }

    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
        write_schedule_csv(file, [&calc])?;
        eprintln!("Schedule written to: {}", path.display());
    }

    Ok(())
}
