//! Per-role commission split
//!
//! Roles are not shares of a pooled amount. Each role runs the same accrual
//! over the same principal and date boundaries with its own monthly rate.

use super::cycle::{CycleAccrual, CycleAccumulator};
use super::prorata::ProRataCalculator;
use crate::error::EngineResult;
use crate::investment::{Money, Rate, Role};
use crate::rates::RoleRates;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Amount owed to each role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAmounts {
    pub investor: Money,
    pub advisor: Money,
    pub office: Money,
}

impl RoleAmounts {
    pub fn get(&self, role: Role) -> Money {
        match role {
            Role::Investor => self.investor,
            Role::Advisor => self.advisor,
            Role::Office => self.office,
        }
    }

    /// Sum across all roles
    pub fn total(&self) -> Money {
        self.investor + self.advisor + self.office
    }

    /// Round every amount to `dp` decimal places, half away from zero
    pub fn rounded(&self, dp: u32) -> Self {
        let round = |v: Money| v.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        Self {
            investor: round(self.investor),
            advisor: round(self.advisor),
            office: round(self.office),
        }
    }

    pub fn is_non_negative(&self) -> bool {
        Role::ALL.iter().all(|r| self.get(*r) >= Decimal::ZERO)
    }
}

impl Add for RoleAmounts {
    type Output = RoleAmounts;

    fn add(self, rhs: RoleAmounts) -> RoleAmounts {
        RoleAmounts {
            investor: self.investor + rhs.investor,
            advisor: self.advisor + rhs.advisor,
            office: self.office + rhs.office,
        }
    }
}

impl AddAssign for RoleAmounts {
    fn add_assign(&mut self, rhs: RoleAmounts) {
        *self = *self + rhs;
    }
}

/// One payout cycle with every role's accrual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCycle {
    pub cycle_index: u32,
    pub start_month: u32,
    pub months: u32,
    pub partial: bool,
    pub amounts: RoleAmounts,
    /// Month-by-month accrual inside the cycle
    pub monthly: Vec<RoleAmounts>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommissionSplitter {
    prorata: ProRataCalculator,
}

impl CommissionSplitter {
    pub fn new(prorata: ProRataCalculator) -> Self {
        Self { prorata }
    }

    /// Run `accrue` once per role with that role's rate
    ///
    /// A zero rate yields zero without running the accrual.
    pub fn split<F>(rates: &RoleRates, accrue: F) -> EngineResult<RoleAmounts>
    where
        F: Fn(Rate) -> EngineResult<Money>,
    {
        let run = |rate: Rate| if rate.is_zero() { Ok(Decimal::ZERO) } else { accrue(rate) };
        Ok(RoleAmounts {
            investor: run(rates.investor)?,
            advisor: run(rates.advisor)?,
            office: run(rates.office)?,
        })
    }

    /// Day-counted stub interest for every role
    pub fn split_stub(
        &self,
        principal: Money,
        rates: &RoleRates,
        start_exclusive: NaiveDate,
        end_inclusive: NaiveDate,
    ) -> EngineResult<RoleAmounts> {
        Self::split(rates, |rate| {
            self.prorata
                .compute_stub_interest(principal, rate, start_exclusive, end_inclusive)
        })
    }

    /// Month-equivalent stub interest for every role
    pub fn split_month_stub(&self, principal: Money, rates: &RoleRates, months: u32) -> EngineResult<RoleAmounts> {
        Self::split(rates, |rate| {
            self.prorata.compute_month_stub_interest(principal, rate, months)
        })
    }

    /// Cycle accruals for every role, aligned on the shared cycle boundaries
    pub fn split_cycles(
        principal: Money,
        rates: &RoleRates,
        commitment_months: u32,
        cycle_months: u32,
    ) -> EngineResult<Vec<RoleCycle>> {
        let schedule = |rate: Rate| {
            CycleAccumulator::compute_cycle_schedule(principal, rate, commitment_months, cycle_months)
        };
        let investor = schedule(rates.investor)?;
        let advisor = schedule(rates.advisor)?;
        let office = schedule(rates.office)?;

        Ok(investor
            .into_iter()
            .zip(advisor)
            .zip(office)
            .map(|((inv, adv), off)| Self::merge_cycle(inv, adv, off))
            .collect())
    }

    fn merge_cycle(investor: CycleAccrual, advisor: CycleAccrual, office: CycleAccrual) -> RoleCycle {
        let monthly = investor
            .monthly_interest
            .iter()
            .zip(&advisor.monthly_interest)
            .zip(&office.monthly_interest)
            .map(|((i, a), o)| RoleAmounts {
                investor: *i,
                advisor: *a,
                office: *o,
            })
            .collect();

        RoleCycle {
            cycle_index: investor.cycle_index,
            start_month: investor.start_month,
            months: investor.months,
            partial: investor.partial,
            amounts: RoleAmounts {
                investor: investor.amount,
                advisor: advisor.amount,
                office: office.amount,
            },
            monthly,
        }
    }
}
