//! Schedule output structures

use super::cutoff::CutoffPeriod;
use super::splitter::RoleAmounts;
use crate::error::EngineResult;
use crate::investment::{LiquidityCycle, Money, Role};
use crate::rates::RoleRates;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// What a schedule entry pays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Day-counted accrual from deposit to the first eligible cutoff
    FirstStub,
    /// A complete liquidity cycle
    Cycle,
    /// Months left over after the last complete cycle
    FinalStub,
}

/// Accrual of a single commitment month, for breakdown views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBreakdown {
    /// Commitment month (1-indexed)
    pub month_index: u32,
    pub investor: Money,
    pub advisor: Money,
    pub office: Money,
}

/// A single payout occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub kind: EntryKind,

    /// Commitment months elapsed at the due date (0 for the first stub)
    pub month_index: u32,

    /// Calendar year of the due date
    pub year: i32,

    pub due_date: NaiveDate,

    /// Accrual window, start exclusive
    pub period_start: NaiveDate,

    pub investor_amount: Money,
    pub advisor_amount: Money,
    pub office_amount: Money,

    /// Unrounded month-by-month accrual behind the amounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<MonthBreakdown>,
}

impl ScheduleEntry {
    pub fn new(
        kind: EntryKind,
        month_index: u32,
        period_start: NaiveDate,
        due_date: NaiveDate,
        amounts: RoleAmounts,
    ) -> Self {
        Self {
            kind,
            month_index,
            year: due_date.year(),
            due_date,
            period_start,
            investor_amount: amounts.investor,
            advisor_amount: amounts.advisor,
            office_amount: amounts.office,
            breakdown: Vec::new(),
        }
    }

    pub fn with_breakdown(mut self, breakdown: Vec<MonthBreakdown>) -> Self {
        self.breakdown = breakdown;
        self
    }

    pub fn amounts(&self) -> RoleAmounts {
        RoleAmounts {
            investor: self.investor_amount,
            advisor: self.advisor_amount,
            office: self.office_amount,
        }
    }

    pub fn amount(&self, role: Role) -> Money {
        self.amounts().get(role)
    }
}

/// Span over which payouts fall due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionPeriod {
    /// First due date (the first eligible cutoff)
    pub start_date: NaiveDate,

    /// Last due date
    pub end_date: NaiveDate,

    /// Deposit date plus the commitment in calendar months, minus one day
    pub commitment_end_date: NaiveDate,
}

/// Engine output for one investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionCalculation {
    pub investment_id: String,

    /// Liquidity actually used, after any degradation
    pub liquidity: LiquidityCycle,

    pub rates: RoleRates,

    pub cutoff_period: CutoffPeriod,

    pub commission_period: CommissionPeriod,

    /// Entries ordered by strictly increasing due date
    pub entries: Vec<ScheduleEntry>,

    /// Amounts of the first entry, per role
    pub first_period: RoleAmounts,
}

impl CommissionCalculation {
    pub fn payment_due_dates(&self) -> Vec<NaiveDate> {
        self.entries.iter().map(|e| e.due_date).collect()
    }

    /// First entry due on or after `date`
    pub fn next_payment(&self, date: NaiveDate) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.due_date >= date)
    }

    /// Sum of all entries for a role
    pub fn total(&self, role: Role) -> Money {
        self.entries.iter().map(|e| e.amount(role)).sum()
    }

    /// Every month's accrual across the commitment, in order
    pub fn month_breakdown(&self) -> Vec<MonthBreakdown> {
        self.entries
            .iter()
            .flat_map(|e| e.breakdown.iter().copied())
            .collect()
    }

    pub fn summary(&self) -> ScheduleSummary {
        let totals = self
            .entries
            .iter()
            .fold(RoleAmounts::default(), |acc, e| acc + e.amounts());

        ScheduleSummary {
            entry_count: self.entries.len(),
            first_due_date: self.entries.first().map(|e| e.due_date),
            last_due_date: self.entries.last().map(|e| e.due_date),
            total_investor: totals.investor,
            total_advisor: totals.advisor,
            total_office: totals.office,
        }
    }

    /// Shape served to dashboards and simulators
    pub fn envelope(&self) -> CommissionEnvelope {
        CommissionEnvelope {
            investment_id: self.investment_id.clone(),
            payment_due_dates: self.payment_due_dates(),
            monthly_breakdown: self.entries.clone(),
            cutoff_period: CutoffView {
                cutoff_date: self.cutoff_period.cutoff_date,
                first_eligible_cutoff: self.cutoff_period.first_eligible_cutoff,
            },
            commission_period: PeriodEndView {
                end_date: self.commission_period.end_date,
            },
            summary: self.summary(),
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub entry_count: usize,
    pub first_due_date: Option<NaiveDate>,
    pub last_due_date: Option<NaiveDate>,
    pub total_investor: Money,
    pub total_advisor: Money,
    pub total_office: Money,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CutoffView {
    pub cutoff_date: NaiveDate,
    pub first_eligible_cutoff: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodEndView {
    pub end_date: NaiveDate,
}

/// Public result shape of `compute_commission`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionEnvelope {
    pub investment_id: String,
    pub payment_due_dates: Vec<NaiveDate>,
    /// Parallel to `payment_due_dates`
    pub monthly_breakdown: Vec<ScheduleEntry>,
    pub cutoff_period: CutoffView,
    pub commission_period: PeriodEndView,
    pub summary: ScheduleSummary,
}

/// Flat CSV row for schedule export
#[derive(Debug, Serialize)]
struct ScheduleCsvRow<'a> {
    #[serde(rename = "InvestmentId")]
    investment_id: &'a str,
    #[serde(rename = "Kind")]
    kind: EntryKind,
    #[serde(rename = "MonthIndex")]
    month_index: u32,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "DueDate")]
    due_date: NaiveDate,
    #[serde(rename = "Investor")]
    investor: Money,
    #[serde(rename = "Advisor")]
    advisor: Money,
    #[serde(rename = "Office")]
    office: Money,
}

/// Write every entry of the given schedules as CSV rows
pub fn write_schedule_csv<'a, W, I>(writer: W, calculations: I) -> EngineResult<()>
where
    W: std::io::Write,
    I: IntoIterator<Item = &'a CommissionCalculation>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);

    for calc in calculations {
        for entry in &calc.entries {
            csv_writer.serialize(ScheduleCsvRow {
                investment_id: &calc.investment_id,
                kind: entry.kind,
                month_index: entry.month_index,
                year: entry.year,
                due_date: entry.due_date,
                investor: entry.investor_amount,
                advisor: entry.advisor_amount,
                office: entry.office_amount,
            })?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
