//! Request-scoped memoisation of rate lookups
//!
//! A dashboard page or export touches the same (role, period, liquidity)
//! combinations many times. The cache is owned by the caller for the lifetime
//! of one request and dropped or [`invalidate`](RateCache::invalidate)d with
//! it; there is no process-wide rate state.

use super::{RateKey, RateTable, RoleRates, DEFAULT_MISSING_RATE};
use crate::error::EngineResult;
use crate::investment::{InvestmentRecord, LiquidityCycle, Rate, Role};
use serde::Serialize;
use std::collections::HashMap;

/// Hit/miss counters for a cache scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoising wrapper around a [`RateTable`]
#[derive(Debug)]
pub struct RateCache<T: RateTable> {
    table: T,
    entries: HashMap<RateKey, Option<Rate>>,
    hits: u64,
    misses: u64,
}

impl<T: RateTable> RateCache<T> {
    pub fn new(table: T) -> Self {
        Self {
            table,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a rate, consulting the table only on first use of a key
    ///
    /// Not-found results are memoised too.
    pub fn lookup(&mut self, role: Role, commitment_months: u32, liquidity: LiquidityCycle) -> Option<Rate> {
        let key = RateKey::new(role, commitment_months, liquidity);
        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            return *cached;
        }

        self.misses += 1;
        let rate = self.table.lookup(role, commitment_months, liquidity);
        self.entries.insert(key, rate);
        rate
    }

    /// Resolve all three role rates for a period/liquidity combination
    pub fn role_rates(&mut self, commitment_months: u32, liquidity: LiquidityCycle) -> EngineResult<RoleRates> {
        let mut resolved = [DEFAULT_MISSING_RATE; 3];
        for (slot, role) in resolved.iter_mut().zip(Role::ALL) {
            *slot = match self.lookup(role, commitment_months, liquidity) {
                Some(rate) => rate,
                None => {
                    log::warn!(
                        "no {} rate for {} months / {}, using {}",
                        role, commitment_months, liquidity, DEFAULT_MISSING_RATE
                    );
                    DEFAULT_MISSING_RATE
                }
            };
        }
        RoleRates::new(resolved[0], resolved[1], resolved[2])
    }

    /// Rates for an investment record, with per-record overrides taking precedence
    pub fn rates_for(&mut self, record: &InvestmentRecord) -> EngineResult<RoleRates> {
        let input = &record.input;
        let overrides = [record.investor_rate, record.advisor_rate, record.office_rate];
        if overrides.iter().all(Option::is_some) {
            return RoleRates::from_optional(overrides[0], overrides[1], overrides[2]);
        }

        let table_rates = self.role_rates(input.commitment_months(), input.liquidity())?;
        RoleRates::new(
            record.investor_rate.unwrap_or(table_rates.investor),
            record.advisor_rate.unwrap_or(table_rates.advisor),
            record.office_rate.unwrap_or(table_rates.office),
        )
    }

    /// Drop every memoised entry, e.g. when the enclosing request ends
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn into_inner(self) -> T {
        self.table
    }
}
