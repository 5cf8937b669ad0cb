//! Role rates and the rate lookup collaborators
//!
//! The engine never fetches rates itself. Callers resolve a [`RoleRates`]
//! before invoking it, either directly or through a [`RateTable`] wrapped in
//! a request-scoped [`RateCache`].

mod table;
mod cache;
pub mod loader;

pub use table::{InMemoryRateTable, RateKey};
pub use cache::RateCache;
pub use loader::{load_rate_table, load_rate_table_from_reader};

use crate::error::{EngineError, EngineResult};
use crate::investment::{LiquidityCycle, Rate, Role};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rate applied when a role has no rate configured
pub const DEFAULT_MISSING_RATE: Rate = Decimal::ZERO;

/// Lookup of monthly rates by (role, commitment period, liquidity cycle)
pub trait RateTable {
    /// Monthly rate for the combination, or `None` when the table has no entry
    fn lookup(&self, role: Role, commitment_months: u32, liquidity: LiquidityCycle) -> Option<Rate>;
}

impl<T: RateTable + ?Sized> RateTable for &T {
    fn lookup(&self, role: Role, commitment_months: u32, liquidity: LiquidityCycle) -> Option<Rate> {
        (**self).lookup(role, commitment_months, liquidity)
    }
}

/// Monthly rates for each role on one investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleRates {
    pub investor: Rate,
    pub advisor: Rate,
    pub office: Rate,
}

impl RoleRates {
    /// Create validated role rates
    pub fn new(investor: Rate, advisor: Rate, office: Rate) -> EngineResult<Self> {
        let rates = Self { investor, advisor, office };
        rates.validate()?;
        Ok(rates)
    }

    /// Build rates where absent roles fall back to [`DEFAULT_MISSING_RATE`]
    pub fn from_optional(
        investor: Option<Rate>,
        advisor: Option<Rate>,
        office: Option<Rate>,
    ) -> EngineResult<Self> {
        let resolve = |role: Role, rate: Option<Rate>| {
            rate.unwrap_or_else(|| {
                log::debug!("no {} rate supplied, using {}", role, DEFAULT_MISSING_RATE);
                DEFAULT_MISSING_RATE
            })
        };
        Self::new(
            resolve(Role::Investor, investor),
            resolve(Role::Advisor, advisor),
            resolve(Role::Office, office),
        )
    }

    /// Every rate must lie in [0, 1)
    pub fn validate(&self) -> EngineResult<()> {
        for role in Role::ALL {
            let rate = self.rate(role);
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(EngineError::invalid_input(
                    "rate",
                    format!("{} rate must be in [0, 1), got {}", role, rate),
                ));
            }
        }
        Ok(())
    }

    pub fn rate(&self, role: Role) -> Rate {
        match role {
            Role::Investor => self.investor,
            Role::Advisor => self.advisor,
            Role::Office => self.office,
        }
    }

    /// Copy with one role's rate replaced
    pub fn with_rate(mut self, role: Role, rate: Rate) -> Self {
        match role {
            Role::Investor => self.investor = rate,
            Role::Advisor => self.advisor = rate,
            Role::Office => self.office = rate,
        }
        self
    }
}
