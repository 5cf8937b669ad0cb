//! In-memory rate table

use super::RateTable;
use crate::investment::{LiquidityCycle, Rate, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of a rate table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateKey {
    pub role: Role,
    pub commitment_months: u32,
    pub liquidity: LiquidityCycle,
}

impl RateKey {
    pub fn new(role: Role, commitment_months: u32, liquidity: LiquidityCycle) -> Self {
        Self {
            role,
            commitment_months,
            liquidity,
        }
    }
}

/// Rate table held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateTable {
    rates: HashMap<RateKey, Rate>,
}

impl InMemoryRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a rate, returning the previous one
    pub fn insert(
        &mut self,
        role: Role,
        commitment_months: u32,
        liquidity: LiquidityCycle,
        rate: Rate,
    ) -> Option<Rate> {
        self.rates.insert(RateKey::new(role, commitment_months, liquidity), rate)
    }

    /// Builder-style insert
    pub fn with_rate(
        mut self,
        role: Role,
        commitment_months: u32,
        liquidity: LiquidityCycle,
        rate: Rate,
    ) -> Self {
        self.insert(role, commitment_months, liquidity, rate);
        self
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateTable for InMemoryRateTable {
    fn lookup(&self, role: Role, commitment_months: u32, liquidity: LiquidityCycle) -> Option<Rate> {
        self.rates
            .get(&RateKey::new(role, commitment_months, liquidity))
            .copied()
    }
}
