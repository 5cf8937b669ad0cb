//! Cutoff-day scheduling
//!
//! Payouts are batched on a fixed day of the month. A deposit becomes
//! eligible for payout on the first cutoff at least `eligibility_days` after
//! it was made. Cutoffs are always built from a year/month pair and the
//! cutoff day, never by adding a day count to a date.

use crate::error::{EngineError, EngineResult};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Day of the month on which payouts are batched
pub const DEFAULT_CUTOFF_DAY: u32 = 20;

/// Minimum days between deposit and first payout
pub const DEFAULT_ELIGIBILITY_DAYS: i64 = 60;

/// Last cutoff day that exists in every month
const MAX_CUTOFF_DAY: u32 = 28;

/// Cutoff dates derived from a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoffPeriod {
    /// Cutoff on or immediately after the deposit
    pub cutoff_date: NaiveDate,

    /// First cutoff at which the deposit has matured
    pub first_eligible_cutoff: NaiveDate,
}

/// Computes cutoff dates relative to a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffScheduler {
    cutoff_day: u32,
    eligibility_days: i64,
}

impl Default for CutoffScheduler {
    fn default() -> Self {
        Self {
            cutoff_day: DEFAULT_CUTOFF_DAY,
            eligibility_days: DEFAULT_ELIGIBILITY_DAYS,
        }
    }
}

impl CutoffScheduler {
    pub fn new(cutoff_day: u32, eligibility_days: i64) -> EngineResult<Self> {
        if cutoff_day == 0 || cutoff_day > MAX_CUTOFF_DAY {
            return Err(EngineError::InvalidConfig(format!(
                "cutoff day must be between 1 and {}, got {}",
                MAX_CUTOFF_DAY, cutoff_day
            )));
        }
        if eligibility_days < 0 {
            return Err(EngineError::InvalidConfig(format!(
                "eligibility window cannot be negative, got {} days",
                eligibility_days
            )));
        }
        Ok(Self {
            cutoff_day,
            eligibility_days,
        })
    }

    pub fn cutoff_day(&self) -> u32 {
        self.cutoff_day
    }

    pub fn eligibility_days(&self) -> i64 {
        self.eligibility_days
    }

    /// Cutoff `offset` months after the month of `date`
    fn cutoff_in_month(&self, date: NaiveDate, offset: u32) -> EngineResult<NaiveDate> {
        let month_index = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(offset);
        let year = i32::try_from(month_index.div_euclid(12))
            .map_err(|_| EngineError::DateOutOfRange(format!("{} + {} months", date, offset)))?;
        let month = month_index.rem_euclid(12) as u32 + 1;

        NaiveDate::from_ymd_opt(year, month, self.cutoff_day)
            .ok_or_else(|| EngineError::DateOutOfRange(format!("{} + {} months", date, offset)))
    }

    /// Cutoff on or after the deposit
    ///
    /// A deposit on the cutoff day itself belongs to that month's cutoff.
    pub fn current_cutoff(&self, deposit_date: NaiveDate) -> EngineResult<NaiveDate> {
        let offset = if deposit_date.day() <= self.cutoff_day { 0 } else { 1 };
        self.cutoff_in_month(deposit_date, offset)
    }

    /// Current cutoff and first eligible cutoff for a deposit
    pub fn compute_cutoff_period(&self, deposit_date: NaiveDate) -> EngineResult<CutoffPeriod> {
        let cutoff_date = self.current_cutoff(deposit_date)?;

        let mut first_eligible_cutoff = cutoff_date;
        let mut advanced = 0;
        while (first_eligible_cutoff - deposit_date).num_days() < self.eligibility_days {
            advanced += 1;
            first_eligible_cutoff = self.cutoff_in_month(cutoff_date, advanced)?;
        }

        Ok(CutoffPeriod {
            cutoff_date,
            first_eligible_cutoff,
        })
    }

    /// Cutoff `months` after an existing cutoff
    pub fn cutoff_after(&self, cutoff: NaiveDate, months: u32) -> EngineResult<NaiveDate> {
        self.cutoff_in_month(cutoff, months)
    }
}

/// Theoretical end of a commitment: deposit plus the commitment in calendar
/// months, minus one day
///
/// Month addition clamps to the last day of shorter months (Jan 31 + 1 month
/// is the last day of February).
pub fn commitment_end_date(deposit_date: NaiveDate, commitment_months: u32) -> EngineResult<NaiveDate> {
    deposit_date
        .checked_add_months(Months::new(commitment_months))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or_else(|| {
            EngineError::DateOutOfRange(format!("{} + {} months", deposit_date, commitment_months))
        })
}
