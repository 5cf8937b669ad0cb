//! Payment schedule engine
//!
//! `builder` orchestrates the steps: `cutoff` finds the payout dates,
//! `prorata` accrues partial periods, `cycle` accrues complete liquidity
//! cycles and `splitter` runs each of them once per role.

mod cutoff;
mod prorata;
mod cycle;
mod splitter;
mod builder;
mod output;
mod request;

pub use cutoff::{commitment_end_date, CutoffPeriod, CutoffScheduler, DEFAULT_CUTOFF_DAY, DEFAULT_ELIGIBILITY_DAYS};
pub use prorata::{ProRataCalculator, DEFAULT_DAY_COUNT_BASIS};
pub use cycle::{CycleAccrual, CycleAccumulator};
pub use splitter::{CommissionSplitter, RoleAmounts, RoleCycle};
pub use builder::{BuildStage, PaymentScheduleBuilder, ScheduleConfig, DEFAULT_ROUNDING_DP};
pub use output::{
    write_schedule_csv, CommissionCalculation, CommissionEnvelope, CommissionPeriod, CutoffView,
    EntryKind, MonthBreakdown, PeriodEndView, ScheduleEntry, ScheduleSummary,
};
pub use request::{compute_commission, compute_commission_with, CommissionRequest};
