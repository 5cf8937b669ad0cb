//! Run payment schedules for a whole portfolio of investments
//!
//! Reads investments and a rate table from CSV, evaluates them in batches and
//! writes both the per-entry schedule and the totals owed per due date.

use anyhow::{Context, Result};
use clap::Parser;
use commission_engine::batch::{aggregate_by_due_date, BatchConfig, BatchOutcome, BatchRunner, DEFAULT_BATCH_SIZE};
use commission_engine::investment::load_investments;
use commission_engine::rates::{load_rate_table, RateCache};
use commission_engine::schedule::{write_schedule_csv, PaymentScheduleBuilder};
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "run_portfolio", version, about = "Compute schedules for every investment in a CSV file")]
struct Args {
    /// Investments CSV
    #[arg(long)]
    investments: PathBuf,

    /// Rate table CSV
    #[arg(long)]
    rates: PathBuf,

    /// Investments evaluated per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Worker threads (defaults to the number of cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Per-entry schedule output
    #[arg(long, default_value = "portfolio_schedule.csv")]
    schedule_output: PathBuf,

    /// Totals per due date output
    #[arg(long, default_value = "portfolio_due_dates.csv")]
    totals_output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading investments from {}...", args.investments.display());
    let records = load_investments(&args.investments)
        .with_context(|| format!("cannot load {}", args.investments.display()))?;
    let table =
        load_rate_table(&args.rates).with_context(|| format!("cannot load {}", args.rates.display()))?;
    println!(
        "Loaded {} investments and {} rates in {:?}",
        records.len(),
        table.len(),
        start.elapsed()
    );

    let runner = BatchRunner::new(
        PaymentScheduleBuilder::default(),
        BatchConfig {
            batch_size: args.batch_size,
            max_threads: args.threads,
        },
    )?;
    let mut cache = RateCache::new(table);

    let run_start = Instant::now();
    let outcomes = runner.run(&records, &mut cache);
    println!("Schedules complete in {:?}", run_start.elapsed());

    for outcome in &outcomes {
        if let Some(err) = outcome.error() {
            log::error!("{}: {}", outcome.investment_id, err);
        }
    }

    let calculations: Vec<_> = outcomes.iter().filter_map(BatchOutcome::calculation).collect();
    let failed = outcomes.len() - calculations.len();

    let file = File::create(&args.schedule_output)
        .with_context(|| format!("cannot create {}", args.schedule_output.display()))?;
    write_schedule_csv(file, calculations.iter().copied())?;
    println!("Schedule written to {}", args.schedule_output.display());

    let totals = aggregate_by_due_date(calculations.iter().copied());
    let mut writer = csv::Writer::from_path(&args.totals_output)
        .with_context(|| format!("cannot create {}", args.totals_output.display()))?;
    for total in &totals {
        writer.serialize(total)?;
    }
    writer.flush()?;
    println!("Due date totals written to {}", args.totals_output.display());

    let stats = cache.stats();
    println!("\nSummary:");
    println!("  Investments: {} ({} failed)", outcomes.len(), failed);
    println!("  Due dates: {}", totals.len());
    println!("  Rate lookups: {} hits, {} misses", stats.hits, stats.misses);
    println!("  Total time: {:?}", start.elapsed());

    Ok(())
}
