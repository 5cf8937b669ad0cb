//! Batched evaluation of many investments
//!
//! Dashboards and exports need dozens of schedules at once. Investments are
//! processed in fixed-size batches: rates for a batch are resolved through
//! the caller's [`RateCache`], the batch is computed in parallel on a bounded
//! thread pool, and it completes before the next batch starts.
//!
//! # Example
//! ```ignore
//! let runner = BatchRunner::new(PaymentScheduleBuilder::default(), BatchConfig::default())?;
//! let mut rates = RateCache::new(&table);
//! let outcomes = runner.run(&records, &mut rates);
//! let by_date = aggregate_by_due_date(outcomes.iter().filter_map(BatchOutcome::calculation));
//! ```

use crate::error::{EngineError, EngineResult};
use crate::investment::{InvestmentInput, InvestmentRecord, Money};
use crate::rates::{RateCache, RateTable, RoleRates};
use crate::schedule::{CommissionCalculation, PaymentScheduleBuilder};
use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Investments evaluated per batch
pub const DEFAULT_BATCH_SIZE: usize = 15;

/// Configuration for batched runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Investments per batch
    pub batch_size: usize,

    /// Worker threads; `None` lets rayon pick from the available cores
    pub max_threads: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_threads: None,
        }
    }
}

/// Result for one investment of a batch run
#[derive(Debug)]
pub struct BatchOutcome {
    pub investment_id: String,
    pub result: EngineResult<CommissionCalculation>,
}

impl BatchOutcome {
    pub fn calculation(&self) -> Option<&CommissionCalculation> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&EngineError> {
        self.result.as_ref().err()
    }
}

/// Totals falling due on one date across a portfolio
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueDateTotal {
    #[serde(rename = "DueDate")]
    pub due_date: NaiveDate,
    #[serde(rename = "Payments")]
    pub payments: usize,
    #[serde(rename = "Investor")]
    pub investor: Money,
    #[serde(rename = "Advisor")]
    pub advisor: Money,
    #[serde(rename = "Office")]
    pub office: Money,
}

/// Runs schedules in bounded-parallel batches
pub struct BatchRunner {
    builder: PaymentScheduleBuilder,
    config: BatchConfig,
    pool: rayon::ThreadPool,
}

impl BatchRunner {
    pub fn new(builder: PaymentScheduleBuilder, config: BatchConfig) -> EngineResult<Self> {
        if config.batch_size == 0 {
            return Err(EngineError::InvalidConfig("batch size must be positive".into()));
        }

        let mut pool_builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = config.max_threads {
            pool_builder = pool_builder.num_threads(threads);
        }
        let pool = pool_builder
            .build()
            .map_err(|e| EngineError::InvalidConfig(format!("cannot start worker pool: {}", e)))?;

        Ok(Self { builder, config, pool })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Evaluate records, resolving rates through the caller's cache
    ///
    /// Outcomes come back in input order, one per record; a failing record
    /// does not stop the others.
    pub fn run<T: RateTable>(&self, records: &[InvestmentRecord], rates: &mut RateCache<T>) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(records.len());
        let batch_count = records.len().div_ceil(self.config.batch_size);

        for (batch_no, chunk) in records.chunks(self.config.batch_size).enumerate() {
            let jobs: Vec<(&InvestmentRecord, EngineResult<RoleRates>)> = chunk
                .iter()
                .map(|record| (record, rates.rates_for(record)))
                .collect();

            let batch: Vec<BatchOutcome> = self.pool.install(|| {
                jobs.into_par_iter()
                    .map(|(record, resolved)| BatchOutcome {
                        investment_id: record.input.investment_id().to_string(),
                        result: resolved.and_then(|r| self.builder.build_schedule(&record.input, &r)),
                    })
                    .collect()
            });

            let failed = batch.iter().filter(|o| o.result.is_err()).count();
            log::info!(
                "batch {}/{}: {} investments, {} failed",
                batch_no + 1,
                batch_count,
                batch.len(),
                failed
            );
            outcomes.extend(batch);
        }

        outcomes
    }

    /// Evaluate investments whose rates are already resolved
    pub fn run_resolved(&self, jobs: &[(InvestmentInput, RoleRates)]) -> Vec<EngineResult<CommissionCalculation>> {
        let mut results = Vec::with_capacity(jobs.len());

        for chunk in jobs.chunks(self.config.batch_size) {
            let batch: Vec<_> = self.pool.install(|| {
                chunk
                    .par_iter()
                    .map(|(input, rates)| self.builder.build_schedule(input, rates))
                    .collect()
            });
            results.extend(batch);
        }

        results
    }
}

/// Sum every entry by due date, in date order
pub fn aggregate_by_due_date<'a, I>(calculations: I) -> Vec<DueDateTotal>
where
    I: IntoIterator<Item = &'a CommissionCalculation>,
{
    let mut totals: BTreeMap<NaiveDate, DueDateTotal> = BTreeMap::new();

    for calc in calculations {
        for entry in &calc.entries {
            let total = totals.entry(entry.due_date).or_insert_with(|| DueDateTotal {
                due_date: entry.due_date,
                payments: 0,
                investor: Decimal::ZERO,
                advisor: Decimal::ZERO,
                office: Decimal::ZERO,
            });
            total.payments += 1;
            total.investor += entry.investor_amount;
            total.advisor += entry.advisor_amount;
            total.office += entry.office_amount;
        }
    }

    totals.into_values().collect()
}
