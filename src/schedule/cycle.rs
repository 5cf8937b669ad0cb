//! Per-cycle accrual of returns
//!
//! Monthly liquidity pays simple interest on the original principal every
//! month. Longer cycles compound monthly inside the cycle and restart from
//! the original principal at every cycle boundary, so cycles are
//! independent of each other.

use crate::error::{EngineError, EngineResult};
use crate::investment::{Money, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Accrual for one payout cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleAccrual {
    /// Cycle number (1-indexed)
    pub cycle_index: u32,

    /// First commitment month covered by this cycle (1-indexed)
    pub start_month: u32,

    /// Months covered
    pub months: u32,

    /// True for a trailing cycle shorter than the cycle length
    pub partial: bool,

    /// Interest accrued in each month of the cycle
    pub monthly_interest: Vec<Money>,

    /// Payable amount for the cycle (sum of monthly interest)
    pub amount: Money,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleAccumulator;

impl CycleAccumulator {
    /// Simple interest for one month on the original principal
    pub fn simple_month(principal: Money, monthly_rate: Rate) -> EngineResult<Money> {
        principal
            .checked_mul(monthly_rate)
            .ok_or_else(|| EngineError::Overflow(format!("monthly interest on {}", principal)))
    }

    /// Compound `months` months starting from `principal`
    ///
    /// Returns the interest credited in each month. Their sum equals the
    /// closing balance minus the principal.
    pub fn compound_months(principal: Money, monthly_rate: Rate, months: u32) -> EngineResult<Vec<Money>> {
        let mut balance = principal;
        let mut monthly = Vec::with_capacity(months as usize);

        for month in 1..=months {
            let interest = Self::simple_month(balance, monthly_rate)?;
            balance = balance.checked_add(interest).ok_or_else(|| {
                EngineError::Overflow(format!("balance on {} after {} compounded months", principal, month))
            })?;
            monthly.push(interest);
        }

        Ok(monthly)
    }

    /// Accruals for every cycle of a commitment
    ///
    /// The commitment is split into `ceil(commitment_months / cycle_months)`
    /// cycles; a trailing cycle covers only the remaining months. A cycle
    /// length of 0 is treated as monthly.
    pub fn compute_cycle_schedule(
        principal: Money,
        monthly_rate: Rate,
        commitment_months: u32,
        cycle_months: u32,
    ) -> EngineResult<Vec<CycleAccrual>> {
        let cycle_months = cycle_months.max(1);
        let cycle_count = commitment_months.div_ceil(cycle_months);
        let mut cycles = Vec::with_capacity(cycle_count as usize);

        for index in 0..cycle_count {
            let start = index * cycle_months;
            let months = cycle_months.min(commitment_months - start);

            let monthly_interest = if cycle_months == 1 {
                vec![Self::simple_month(principal, monthly_rate)?]
            } else {
                Self::compound_months(principal, monthly_rate, months)?
            };
            let amount = monthly_interest
                .iter()
                .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
                .ok_or_else(|| EngineError::Overflow(format!("cycle {} total on {}", index + 1, principal)))?;

            cycles.push(CycleAccrual {
                cycle_index: index + 1,
                start_month: start + 1,
                months,
                partial: months < cycle_months,
                monthly_interest,
                amount,
            });
        }

        Ok(cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::MathematicalOps;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_is_simple_interest() {
        let cycles = CycleAccumulator::compute_cycle_schedule(dec!(100000), dec!(0.02), 12, 1).unwrap();
        assert_eq!(cycles.len(), 12);
        for cycle in &cycles {
            assert_eq!(cycle.amount, dec!(2000));
            assert_eq!(cycle.months, 1);
            assert!(!cycle.partial);
        }

        let total: Decimal = cycles.iter().map(|c| c.amount).sum();
        assert_eq!(total, dec!(100000) * dec!(0.02) * dec!(12));
    }

    #[test]
    fn test_annual_cycle_compounds() {
        let cycles = CycleAccumulator::compute_cycle_schedule(dec!(100000), dec!(0.02), 12, 12).unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].monthly_interest.len(), 12);

        let expected = dec!(100000) * (dec!(1.02).powu(12) - Decimal::ONE);
        assert_eq!(cycles[0].amount.round_dp(2), expected.round_dp(2));
        assert_relative_eq!(cycles[0].amount.to_f64().unwrap(), 26824.1795, epsilon = 1e-3);

        // Interest grows month over month within the cycle
        let monthly = &cycles[0].monthly_interest;
        assert_eq!(monthly[0], dec!(2000));
        assert!(monthly.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_cycles_restart_from_principal() {
        let cycles = CycleAccumulator::compute_cycle_schedule(dec!(100000), dec!(0.02), 24, 12).unwrap();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].amount, cycles[1].amount);
        assert_eq!(cycles[1].start_month, 13);
        assert_eq!(cycles[1].monthly_interest[0], dec!(2000));
    }

    #[test]
    fn test_trailing_cycle_compounds_remaining_months() {
        let cycles = CycleAccumulator::compute_cycle_schedule(dec!(100000), dec!(0.02), 32, 6).unwrap();
        assert_eq!(cycles.len(), 6);
        assert!(cycles[..5].iter().all(|c| !c.partial && c.months == 6));

        let last = &cycles[5];
        assert!(last.partial);
        assert_eq!(last.months, 2);
        assert_eq!(last.start_month, 31);
        // 2000 + 2040
        assert_eq!(last.amount, dec!(4040));
    }

    #[test]
    fn test_commitment_shorter_than_cycle() {
        let cycles = CycleAccumulator::compute_cycle_schedule(dec!(50000), dec!(0.01), 3, 12).unwrap();
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].partial);
        assert_eq!(cycles[0].months, 3);
    }

    #[test]
    fn test_zero_rate_and_zero_cycle_length() {
        let cycles = CycleAccumulator::compute_cycle_schedule(dec!(50000), Decimal::ZERO, 6, 0).unwrap();
        assert_eq!(cycles.len(), 6);
        assert!(cycles.iter().all(|c| c.amount.is_zero()));
    }

    #[test]
    fn test_compound_sum_matches_closing_balance() {
        let monthly = CycleAccumulator::compound_months(dec!(25000), dec!(0.015), 36).unwrap();
        let total: Decimal = monthly.iter().copied().sum();
        let closed_form = dec!(25000) * (dec!(1.015).powu(36) - Decimal::ONE);
        assert_eq!(total.round_dp(6), closed_form.round_dp(6));
    }

    #[test]
    fn test_compounding_overflow_is_an_error() {
        let result = CycleAccumulator::compute_cycle_schedule(dec!(1000000000000000000000000000), dec!(0.9), 36, 36);
        assert!(matches!(result, Err(EngineError::Overflow(_))));
    }
}
