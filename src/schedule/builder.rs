//! Payment schedule builder
//!
//! Runs one investment through the cutoff, pro-rata, cycle and split steps
//! and assembles the ordered schedule. The builder holds configuration only;
//! every call starts from scratch.

use super::cutoff::{commitment_end_date, CutoffScheduler, DEFAULT_CUTOFF_DAY, DEFAULT_ELIGIBILITY_DAYS};
use super::output::{CommissionCalculation, CommissionPeriod, EntryKind, MonthBreakdown, ScheduleEntry};
use super::prorata::{ProRataCalculator, DEFAULT_DAY_COUNT_BASIS};
use super::splitter::{CommissionSplitter, RoleAmounts, RoleCycle};
use crate::error::{EngineError, EngineResult};
use crate::investment::InvestmentInput;
use crate::rates::RoleRates;
use serde::{Deserialize, Serialize};

/// Decimal places of a payable amount (currency minor units)
pub const DEFAULT_ROUNDING_DP: u32 = 2;

/// Configuration for schedule construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Day of the month payouts are batched on
    pub cutoff_day: u32,

    /// Minimum days from deposit to first payout
    pub eligibility_days: i64,

    /// Days per month in the pro-rata convention
    pub day_count_basis: u32,

    /// Decimal places payable amounts are rounded to
    pub rounding_dp: u32,

    /// Whether to attach month-by-month breakdowns to entries
    pub include_breakdown: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cutoff_day: DEFAULT_CUTOFF_DAY,
            eligibility_days: DEFAULT_ELIGIBILITY_DAYS,
            day_count_basis: DEFAULT_DAY_COUNT_BASIS,
            rounding_dp: DEFAULT_ROUNDING_DP,
            include_breakdown: true,
        }
    }
}

/// Progress of a single build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    NotStarted,
    StubPeriodComputed,
    CyclesComputed,
    Assembled,
}

impl BuildStage {
    fn next(self) -> Option<BuildStage> {
        match self {
            BuildStage::NotStarted => Some(BuildStage::StubPeriodComputed),
            BuildStage::StubPeriodComputed => Some(BuildStage::CyclesComputed),
            BuildStage::CyclesComputed => Some(BuildStage::Assembled),
            BuildStage::Assembled => None,
        }
    }
}

/// Entries collected so far for one investment
struct Draft<'a> {
    investment_id: &'a str,
    stage: BuildStage,
    entries: Vec<ScheduleEntry>,
}

impl<'a> Draft<'a> {
    fn new(investment_id: &'a str, capacity: usize) -> Self {
        Self {
            investment_id,
            stage: BuildStage::NotStarted,
            entries: Vec::with_capacity(capacity),
        }
    }

    fn advance(&mut self, to: BuildStage) {
        debug_assert_eq!(self.stage.next(), Some(to), "out of order build stage");
        log::trace!("{}: {:?} -> {:?}", self.investment_id, self.stage, to);
        self.stage = to;
    }
}

/// Builds payment schedules
#[derive(Debug, Clone)]
pub struct PaymentScheduleBuilder {
    config: ScheduleConfig,
    cutoffs: CutoffScheduler,
    splitter: CommissionSplitter,
}

impl Default for PaymentScheduleBuilder {
    fn default() -> Self {
        Self {
            config: ScheduleConfig::default(),
            cutoffs: CutoffScheduler::default(),
            splitter: CommissionSplitter::default(),
        }
    }
}

impl PaymentScheduleBuilder {
    /// Create a builder, validating the configuration
    pub fn new(config: ScheduleConfig) -> EngineResult<Self> {
        let cutoffs = CutoffScheduler::new(config.cutoff_day, config.eligibility_days)?;
        let prorata = ProRataCalculator::new(config.day_count_basis)?;
        if config.rounding_dp > 10 {
            return Err(EngineError::InvalidConfig(format!(
                "rounding to {} decimal places is not supported",
                config.rounding_dp
            )));
        }

        Ok(Self {
            config,
            cutoffs,
            splitter: CommissionSplitter::new(prorata),
        })
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Build the full schedule for an investment
    pub fn build_schedule(&self, input: &InvestmentInput, rates: &RoleRates) -> EngineResult<CommissionCalculation> {
        rates.validate()?;

        let id = input.investment_id();
        let principal = input.principal();
        let deposit_date = input.deposit_date();
        let commitment_months = input.commitment_months();
        let liquidity = input.liquidity();
        let cycle_months = liquidity.cycle_months();
        let dp = self.config.rounding_dp;

        if !input.has_standard_commitment() {
            log::debug!("{}: non-standard commitment of {} months", id, commitment_months);
        }

        let mut draft = Draft::new(id, (commitment_months / cycle_months) as usize + 2);

        // First stub: deposit through first eligible cutoff, day counted
        let cutoff_period = self.cutoffs.compute_cutoff_period(deposit_date)?;
        let first_eligible = cutoff_period.first_eligible_cutoff;
        let stub = self
            .splitter
            .split_stub(principal, rates, deposit_date, first_eligible)?;
        draft.entries.push(ScheduleEntry::new(
            EntryKind::FirstStub,
            0,
            deposit_date,
            first_eligible,
            stub.rounded(dp),
        ));
        draft.advance(BuildStage::StubPeriodComputed);

        // Complete cycles, due on the cutoff closing each cycle
        let cycles = CommissionSplitter::split_cycles(principal, rates, commitment_months, cycle_months)?;
        let mut period_start = first_eligible;
        for cycle in cycles.iter().filter(|c| !c.partial) {
            let elapsed = cycle.start_month - 1 + cycle.months;
            let due_date = self.cutoffs.cutoff_after(first_eligible, elapsed)?;
            let entry = ScheduleEntry::new(
                EntryKind::Cycle,
                elapsed,
                period_start,
                due_date,
                cycle.amounts.rounded(dp),
            );
            draft.entries.push(self.attach_breakdown(entry, cycle));
            period_start = due_date;
        }
        draft.advance(BuildStage::CyclesComputed);

        // Leftover months are paid as a simple month-equivalent stub
        if let Some(partial) = cycles.iter().find(|c| c.partial) {
            let due_date = self.cutoffs.cutoff_after(first_eligible, commitment_months)?;
            let amounts = self.splitter.split_month_stub(principal, rates, partial.months)?;
            let entry = ScheduleEntry::new(
                EntryKind::FinalStub,
                commitment_months,
                period_start,
                due_date,
                amounts.rounded(dp),
            );
            let entry = if self.config.include_breakdown {
                let month = self.splitter.split_month_stub(principal, rates, 1)?;
                entry.with_breakdown(
                    (partial.start_month..partial.start_month + partial.months)
                        .map(|m| breakdown_row(m, month))
                        .collect(),
                )
            } else {
                entry
            };
            draft.entries.push(entry);
        }
        draft.advance(BuildStage::Assembled);

        let entries = draft.entries;
        let first_period = entries.first().map(ScheduleEntry::amounts).unwrap_or_default();
        let end_date = entries.last().map(|e| e.due_date).unwrap_or(first_eligible);

        log::debug!(
            "{}: {} entries from {} to {}",
            id,
            entries.len(),
            first_eligible,
            end_date
        );

        Ok(CommissionCalculation {
            investment_id: id.to_string(),
            liquidity,
            rates: *rates,
            cutoff_period,
            commission_period: CommissionPeriod {
                start_date: first_eligible,
                end_date,
                commitment_end_date: commitment_end_date(deposit_date, commitment_months)?,
            },
            entries,
            first_period,
        })
    }

    fn attach_breakdown(&self, entry: ScheduleEntry, cycle: &RoleCycle) -> ScheduleEntry {
        if !self.config.include_breakdown {
            return entry;
        }
        let rows = cycle
            .monthly
            .iter()
            .zip(cycle.start_month..)
            .map(|(amounts, month)| breakdown_row(month, *amounts))
            .collect();
        entry.with_breakdown(rows)
    }
}

fn breakdown_row(month_index: u32, amounts: RoleAmounts) -> MonthBreakdown {
    MonthBreakdown {
        month_index,
        investor: amounts.investor,
        advisor: amounts.advisor,
        office: amounts.office,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investment::{LiquidityCycle, Role};
    use crate::schedule::output::write_schedule_csv;
    use approx::assert_relative_eq;
    use chrono::{Datelike, NaiveDate};
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn investment(months: u32, liquidity: LiquidityCycle) -> InvestmentInput {
        InvestmentInput::new("inv-1", dec!(100000), date(2024, 1, 6), months, liquidity).unwrap()
    }

    fn investor_only() -> RoleRates {
        RoleRates::new(dec!(0.02), Decimal::ZERO, Decimal::ZERO).unwrap()
    }

    fn all_roles() -> RoleRates {
        RoleRates::new(dec!(0.02), dec!(0.004), dec!(0.0015)).unwrap()
    }

    #[test]
    fn test_monthly_schedule() {
        let builder = PaymentScheduleBuilder::default();
        let calc = builder
            .build_schedule(&investment(12, LiquidityCycle::Monthly), &investor_only())
            .unwrap();

        assert_eq!(calc.cutoff_period.first_eligible_cutoff, date(2024, 3, 20));
        assert_eq!(calc.entries.len(), 13);

        let stub = &calc.entries[0];
        assert_eq!(stub.kind, EntryKind::FirstStub);
        assert_eq!(stub.due_date, date(2024, 3, 20));
        assert_eq!(stub.investor_amount, dec!(4933.33));
        assert_eq!(calc.first_period.investor, dec!(4933.33));

        let monthly = &calc.entries[1..];
        assert!(monthly.iter().all(|e| e.kind == EntryKind::Cycle));
        assert!(monthly.iter().all(|e| e.investor_amount == dec!(2000)));
        assert_eq!(monthly[0].due_date, date(2024, 4, 20));
        assert_eq!(monthly[11].due_date, date(2025, 3, 20));
        assert_eq!(monthly[11].month_index, 12);
        assert_eq!(monthly[11].year, 2025);

        let cycle_total: Decimal = monthly.iter().map(|e| e.investor_amount).sum();
        assert_eq!(cycle_total, dec!(24000));
    }

    #[test]
    fn test_annual_single_cycle() {
        let calc = PaymentScheduleBuilder::default()
            .build_schedule(&investment(12, LiquidityCycle::Annual), &investor_only())
            .unwrap();

        assert_eq!(calc.entries.len(), 2);
        let cycle = &calc.entries[1];
        assert_eq!(cycle.kind, EntryKind::Cycle);
        assert_eq!(cycle.due_date, date(2025, 3, 20));
        assert_eq!(cycle.investor_amount, dec!(26824.18));
        assert_relative_eq!(cycle.investor_amount.to_f64().unwrap(), 26824.18, epsilon = 1e-9);
        assert_eq!(cycle.breakdown.len(), 12);
    }

    #[test]
    fn test_biennial_cycles_are_equal() {
        let calc = PaymentScheduleBuilder::default()
            .build_schedule(&investment(24, LiquidityCycle::Annual), &investor_only())
            .unwrap();

        let cycles: Vec<_> = calc.entries.iter().filter(|e| e.kind == EntryKind::Cycle).collect();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].investor_amount, cycles[1].investor_amount);
        assert_eq!(cycles[1].due_date, date(2026, 3, 20));
    }

    #[test]
    fn test_semiannual_with_final_stub() {
        let calc = PaymentScheduleBuilder::default()
            .build_schedule(&investment(32, LiquidityCycle::Semiannual), &investor_only())
            .unwrap();

        let full: Vec<_> = calc.entries.iter().filter(|e| e.kind == EntryKind::Cycle).collect();
        let stubs: Vec<_> = calc.entries.iter().filter(|e| e.kind == EntryKind::FinalStub).collect();
        assert_eq!(full.len(), 5);
        assert_eq!(stubs.len(), 1);

        // Two months of simple pro-rata, not compounded
        let final_stub = stubs[0];
        assert_eq!(final_stub.investor_amount, dec!(4000));
        assert_eq!(final_stub.due_date, date(2026, 11, 20));
        assert_eq!(final_stub.period_start, full[4].due_date);
        assert_eq!(final_stub.breakdown.len(), 2);
        assert_eq!(final_stub.breakdown[0].month_index, 31);
    }

    #[test]
    fn test_exact_multiple_has_no_final_stub() {
        let calc = PaymentScheduleBuilder::default()
            .build_schedule(&investment(30, LiquidityCycle::Semiannual), &investor_only())
            .unwrap();
        assert!(calc.entries.iter().all(|e| e.kind != EntryKind::FinalStub));
        assert_eq!(calc.entries.len(), 6);
    }

    #[test]
    fn test_commitment_shorter_than_cycle() {
        let calc = PaymentScheduleBuilder::default()
            .build_schedule(&investment(3, LiquidityCycle::Annual), &investor_only())
            .unwrap();

        assert_eq!(calc.entries.len(), 2);
        let final_stub = &calc.entries[1];
        assert_eq!(final_stub.kind, EntryKind::FinalStub);
        assert_eq!(final_stub.period_start, date(2024, 3, 20));
        assert_eq!(final_stub.due_date, date(2024, 6, 20));
        assert_eq!(final_stub.investor_amount, dec!(6000));
    }

    #[test]
    fn test_due_dates_strictly_increase_and_follow_first_eligible() {
        let builder = PaymentScheduleBuilder::default();
        for liquidity in LiquidityCycle::ALL {
            for months in [3, 6, 12, 24, 32, 36] {
                let input = InvestmentInput::new("inv", dec!(12345.67), date(2023, 12, 29), months, liquidity)
                    .unwrap();
                let calc = builder.build_schedule(&input, &all_roles()).unwrap();

                let dates = calc.payment_due_dates();
                assert!(dates.windows(2).all(|w| w[0] < w[1]), "{:?} {}", liquidity, months);
                assert!(dates.iter().all(|d| *d >= calc.cutoff_period.first_eligible_cutoff));
                assert!(dates.iter().all(|d| d.day() == 20));
                assert!(calc.entries.iter().all(|e| e.amounts().is_non_negative()));
            }
        }
    }

    #[test]
    fn test_advisor_rate_does_not_change_other_roles() {
        let builder = PaymentScheduleBuilder::default();
        let input = investment(24, LiquidityCycle::Semiannual);
        let with_advisor = builder.build_schedule(&input, &all_roles()).unwrap();
        let without = builder
            .build_schedule(&input, &all_roles().with_rate(Role::Advisor, Decimal::ZERO))
            .unwrap();

        assert_eq!(with_advisor.entries.len(), without.entries.len());
        for (a, b) in with_advisor.entries.iter().zip(&without.entries) {
            assert_eq!(a.due_date, b.due_date);
            assert_eq!(a.investor_amount, b.investor_amount);
            assert_eq!(a.office_amount, b.office_amount);
            assert_eq!(b.advisor_amount, Decimal::ZERO);
        }
    }

    #[test]
    fn test_roles_share_due_dates() {
        let calc = PaymentScheduleBuilder::default()
            .build_schedule(&investment(12, LiquidityCycle::Monthly), &all_roles())
            .unwrap();
        let cycle = &calc.entries[1];
        assert_eq!(cycle.investor_amount, dec!(2000));
        assert_eq!(cycle.advisor_amount, dec!(400));
        assert_eq!(cycle.office_amount, dec!(150));
    }

    #[test]
    fn test_summary_and_next_payment() {
        let calc = PaymentScheduleBuilder::default()
            .build_schedule(&investment(12, LiquidityCycle::Monthly), &investor_only())
            .unwrap();

        let summary = calc.summary();
        assert_eq!(summary.entry_count, 13);
        assert_eq!(summary.first_due_date, Some(date(2024, 3, 20)));
        assert_eq!(summary.last_due_date, Some(date(2025, 3, 20)));
        assert_eq!(summary.total_investor, dec!(28933.33));
        assert_eq!(calc.total(Role::Investor), summary.total_investor);

        let next = calc.next_payment(date(2024, 6, 21)).unwrap();
        assert_eq!(next.due_date, date(2024, 7, 20));
        assert!(calc.next_payment(date(2025, 3, 21)).is_none());

        assert_eq!(calc.commission_period.commitment_end_date, date(2025, 1, 5));
        assert_eq!(calc.commission_period.end_date, date(2025, 3, 20));
        assert_eq!(calc.month_breakdown().len(), 12);
    }

    #[test]
    fn test_breakdown_can_be_disabled() {
        let config = ScheduleConfig {
            include_breakdown: false,
            ..Default::default()
        };
        let calc = PaymentScheduleBuilder::new(config)
            .unwrap()
            .build_schedule(&investment(32, LiquidityCycle::Semiannual), &investor_only())
            .unwrap();
        assert!(calc.month_breakdown().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ScheduleConfig {
            cutoff_day: 30,
            ..Default::default()
        };
        assert!(matches!(
            PaymentScheduleBuilder::new(config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_envelope_is_parallel() {
        let calc = PaymentScheduleBuilder::default()
            .build_schedule(&investment(24, LiquidityCycle::Annual), &all_roles())
            .unwrap();
        let envelope = calc.envelope();
        assert_eq!(envelope.payment_due_dates.len(), envelope.monthly_breakdown.len());
        for (d, e) in envelope.payment_due_dates.iter().zip(&envelope.monthly_breakdown) {
            assert_eq!(*d, e.due_date);
        }

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["cutoffPeriod"]["cutoffDate"], "2024-01-20");
        assert_eq!(json["commissionPeriod"]["endDate"], "2026-03-20");
    }

    #[test]
    fn test_schedule_csv_export() {
        let calc = PaymentScheduleBuilder::default()
            .build_schedule(&investment(12, LiquidityCycle::Annual), &investor_only())
            .unwrap();

        let mut buffer = Vec::new();
        write_schedule_csv(&mut buffer, [&calc]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "InvestmentId,Kind,MonthIndex,Year,DueDate,Investor,Advisor,Office");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("inv-1,Cycle,12,2025,2025-03-20,26824.18,"));
    }
}
