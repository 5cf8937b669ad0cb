//! Pro-rata interest for partial periods
//!
//! Uses a fixed 30-day month regardless of the calendar month length. The
//! deposit day itself does not accrue.

use crate::error::{EngineError, EngineResult};
use crate::investment::{Money, Rate};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Days per month in the day-count convention
pub const DEFAULT_DAY_COUNT_BASIS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProRataCalculator {
    day_count_basis: u32,
}

impl Default for ProRataCalculator {
    fn default() -> Self {
        Self {
            day_count_basis: DEFAULT_DAY_COUNT_BASIS,
        }
    }
}

impl ProRataCalculator {
    pub fn new(day_count_basis: u32) -> EngineResult<Self> {
        if day_count_basis == 0 {
            return Err(EngineError::InvalidConfig("day count basis must be positive".into()));
        }
        Ok(Self { day_count_basis })
    }

    pub fn day_count_basis(&self) -> u32 {
        self.day_count_basis
    }

    /// Days strictly after `start_exclusive` up to and including `end_inclusive`
    ///
    /// Zero when the end does not fall after the start.
    pub fn day_count(start_exclusive: NaiveDate, end_inclusive: NaiveDate) -> u32 {
        let days = (end_inclusive - start_exclusive).num_days().max(0);
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    /// Daily rate under the fixed-month convention
    pub fn daily_rate(&self, monthly_rate: Rate) -> Rate {
        monthly_rate / Decimal::from(self.day_count_basis)
    }

    /// Interest for `days` days at a monthly rate
    pub fn interest_for_days(&self, principal: Money, monthly_rate: Rate, days: u32) -> EngineResult<Money> {
        principal
            .checked_mul(monthly_rate)
            .and_then(|v| v.checked_mul(Decimal::from(days)))
            .and_then(|v| v.checked_div(Decimal::from(self.day_count_basis)))
            .ok_or_else(|| EngineError::Overflow(format!("{} days of interest on {}", days, principal)))
    }

    /// Interest accrued between two dates (start exclusive, end inclusive)
    pub fn compute_stub_interest(
        &self,
        principal: Money,
        monthly_rate: Rate,
        start_exclusive: NaiveDate,
        end_inclusive: NaiveDate,
    ) -> EngineResult<Money> {
        let days = Self::day_count(start_exclusive, end_inclusive);
        self.interest_for_days(principal, monthly_rate, days)
    }

    /// Interest for a whole number of month-equivalents, each worth one
    /// basis of days
    pub fn compute_month_stub_interest(&self, principal: Money, monthly_rate: Rate, months: u32) -> EngineResult<Money> {
        let days = months.saturating_mul(self.day_count_basis);
        self.interest_for_days(principal, monthly_rate, days)
    }
}
