//! Investment data structures and portfolio loading

mod data;
pub mod loader;

pub use data::{
    parse_date, InvestmentInput, LiquidityCycle, Money, Rate, Role, DATE_FORMAT,
    MAX_COMMITMENT_MONTHS, MAX_PRINCIPAL, STANDARD_COMMITMENT_MONTHS,
};
pub use loader::{load_investments, load_investments_from_reader, InvestmentRecord};
