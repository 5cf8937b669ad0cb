//! CSV-based rate table loader
//!
//! Expected columns: `Role,CommitmentMonths,Liquidity,MonthlyRate`

use super::InMemoryRateTable;
use crate::error::{EngineError, EngineResult};
use crate::investment::{LiquidityCycle, Role};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Role")]
    role: String,
    #[serde(rename = "CommitmentMonths")]
    commitment_months: u32,
    #[serde(rename = "Liquidity")]
    liquidity: String,
    #[serde(rename = "MonthlyRate")]
    monthly_rate: String,
}

/// Load a rate table from a CSV file
pub fn load_rate_table<P: AsRef<Path>>(path: P) -> EngineResult<InMemoryRateTable> {
    let reader = csv::Reader::from_path(path)?;
    read_table(reader)
}

/// Load a rate table from any reader
pub fn load_rate_table_from_reader<R: std::io::Read>(reader: R) -> EngineResult<InMemoryRateTable> {
    read_table(csv::Reader::from_reader(reader))
}

fn read_table<R: std::io::Read>(mut reader: csv::Reader<R>) -> EngineResult<InMemoryRateTable> {
    let mut table = InMemoryRateTable::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let role = Role::from_str(&row.role)?;
        // Rate tables are reference data, so an unknown cycle here is an error
        let liquidity = LiquidityCycle::from_str(&row.liquidity)?;
        let rate = Decimal::from_str(row.monthly_rate.trim())
            .map_err(|e| EngineError::parse("MonthlyRate", format!("{:?}: {}", row.monthly_rate, e)))?;

        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(EngineError::invalid_input(
                "MonthlyRate",
                format!("rate must be in [0, 1), got {}", rate),
            ));
        }

        if let Some(previous) = table.insert(role, row.commitment_months, liquidity, rate) {
            log::warn!(
                "duplicate rate for {} / {} months / {}: {} replaced by {}",
                role, row.commitment_months, liquidity, previous, rate
            );
        }
    }

    log::debug!("loaded {} rate table entries", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateTable;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_rate_table() {
        let data = "\
Role,CommitmentMonths,Liquidity,MonthlyRate
Investor,12,Monthly,0.0200
Advisor,12,Monthly,0.0040
Office,12,Monthly,0.0010
Investor,24,Annual,0.0225
";
        let table = load_rate_table_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.lookup(Role::Investor, 12, LiquidityCycle::Monthly), Some(dec!(0.02)));
        assert_eq!(table.lookup(Role::Investor, 24, LiquidityCycle::Annual), Some(dec!(0.0225)));
    }

    #[test]
    fn test_unknown_liquidity_is_an_error() {
        let data = "\
Role,CommitmentMonths,Liquidity,MonthlyRate
Investor,12,Weekly,0.02
";
        assert!(load_rate_table_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_out_of_range_rate_is_an_error() {
        let data = "\
Role,CommitmentMonths,Liquidity,MonthlyRate
Investor,12,Monthly,1.5
";
        assert!(matches!(
            load_rate_table_from_reader(data.as_bytes()),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}
