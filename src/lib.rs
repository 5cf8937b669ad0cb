//! Commission Engine - payment schedules and per-role returns for fixed-term investments
//!
//! This library provides:
//! - Cutoff-day payout scheduling with a minimum maturation window
//! - Pro-rata accrual for partial first and last periods
//! - Simple (monthly liquidity) and per-cycle compound (longer liquidity) returns
//! - Independent investor, advisor and office schedules over one investment
//! - Rate tables, request-scoped rate caching and batched portfolio runs

pub mod error;
pub mod investment;
pub mod rates;
pub mod schedule;
pub mod batch;

// Re-export commonly used types
pub use error::{EngineError, EngineResult};
pub use investment::{InvestmentInput, InvestmentRecord, LiquidityCycle, Money, Rate, Role};
pub use rates::{InMemoryRateTable, RateCache, RateTable, RoleRates};
pub use schedule::{
    compute_commission, CommissionCalculation, CommissionRequest, PaymentScheduleBuilder, ScheduleConfig,
    ScheduleEntry,
};
pub use batch::{BatchConfig, BatchRunner};
