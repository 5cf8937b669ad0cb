//! Load investments from a portfolio CSV

use super::{parse_date, InvestmentInput, LiquidityCycle, Money, Rate};
use crate::error::{EngineError, EngineResult};
use csv::Reader;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

/// Raw CSV row matching the portfolio export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "InvestmentId")]
    investment_id: String,
    #[serde(rename = "OwnerId", default)]
    owner_id: Option<String>,
    #[serde(rename = "AdvisorId", default)]
    advisor_id: Option<String>,
    #[serde(rename = "OfficeId", default)]
    office_id: Option<String>,
    #[serde(rename = "Principal")]
    principal: String,
    #[serde(rename = "DepositDate")]
    deposit_date: String,
    #[serde(rename = "CommitmentMonths")]
    commitment_months: u32,
    #[serde(rename = "Liquidity")]
    liquidity: String,
    #[serde(rename = "InvestorRate", default)]
    investor_rate: Option<String>,
    #[serde(rename = "AdvisorRate", default)]
    advisor_rate: Option<String>,
    #[serde(rename = "OfficeRate", default)]
    office_rate: Option<String>,
}

/// An investment plus any per-investment rate overrides
#[derive(Debug, Clone, Serialize)]
pub struct InvestmentRecord {
    pub input: InvestmentInput,
    pub investor_rate: Option<Rate>,
    pub advisor_rate: Option<Rate>,
    pub office_rate: Option<Rate>,
}

impl InvestmentRecord {
    pub fn new(input: InvestmentInput) -> Self {
        Self {
            input,
            investor_rate: None,
            advisor_rate: None,
            office_rate: None,
        }
    }
}

fn parse_decimal(field: &str, value: &str) -> EngineResult<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| EngineError::parse(field, format!("{:?}: {}", value, e)))
}

fn parse_optional_decimal(field: &str, value: Option<String>) -> EngineResult<Option<Decimal>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_decimal(field, raw).map(Some),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CsvRow {
    fn into_record(self) -> EngineResult<InvestmentRecord> {
        let principal: Money = parse_decimal("Principal", &self.principal)?;
        let deposit_date = parse_date("DepositDate", &self.deposit_date)?;
        let liquidity = LiquidityCycle::parse_or_monthly(&self.liquidity);

        let input = InvestmentInput::new(
            self.investment_id,
            principal,
            deposit_date,
            self.commitment_months,
            liquidity,
        )?
        .with_attribution(
            non_empty(self.owner_id),
            non_empty(self.advisor_id),
            non_empty(self.office_id),
        );

        Ok(InvestmentRecord {
            input,
            investor_rate: parse_optional_decimal("InvestorRate", self.investor_rate)?,
            advisor_rate: parse_optional_decimal("AdvisorRate", self.advisor_rate)?,
            office_rate: parse_optional_decimal("OfficeRate", self.office_rate)?,
        })
    }
}

/// Load all investments from a CSV file
pub fn load_investments<P: AsRef<Path>>(path: P) -> EngineResult<Vec<InvestmentRecord>> {
    let reader = Reader::from_path(path)?;
    read_records(reader)
}

/// Load investments from any reader (e.g., string buffer, request body)
pub fn load_investments_from_reader<R: std::io::Read>(reader: R) -> EngineResult<Vec<InvestmentRecord>> {
    read_records(Reader::from_reader(reader))
}

fn read_records<R: std::io::Read>(mut reader: Reader<R>) -> EngineResult<Vec<InvestmentRecord>> {
    let mut records = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.into_record()?);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const PORTFOLIO: &str = "\
InvestmentId,OwnerId,AdvisorId,OfficeId,Principal,DepositDate,CommitmentMonths,Liquidity,InvestorRate,AdvisorRate,OfficeRate
inv-1,own-1,adv-1,off-1,100000.00,2024-01-06,12,Monthly,0.02,,
inv-2,own-2,,off-1,50000,2024-02-25,24,Annual,,0.003,0.001
inv-3,own-3,,,2500.50,2023-12-20,6,Quarterly,,,
";

    #[test]
    fn test_load_investments_from_reader() {
        let records = load_investments_from_reader(PORTFOLIO.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.input.investment_id(), "inv-1");
        assert_eq!(first.input.principal(), dec!(100000.00));
        assert_eq!(first.input.deposit_date(), NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(first.input.advisor_id(), Some("adv-1"));
        assert_eq!(first.investor_rate, Some(dec!(0.02)));
        assert_eq!(first.advisor_rate, None);

        let second = &records[1];
        assert_eq!(second.input.liquidity(), LiquidityCycle::Annual);
        assert_eq!(second.input.advisor_id(), None);
        assert_eq!(second.office_rate, Some(dec!(0.001)));

        // Unknown liquidity degrades instead of failing the load
        assert_eq!(records[2].input.liquidity(), LiquidityCycle::Monthly);
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let data = "\
InvestmentId,Principal,DepositDate,CommitmentMonths,Liquidity
inv-1,1000,2024-13-01,12,Monthly
";
        let result = load_investments_from_reader(data.as_bytes());
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_non_positive_principal_is_rejected() {
        let data = "\
InvestmentId,Principal,DepositDate,CommitmentMonths,Liquidity
inv-1,0,2024-01-01,12,Monthly
";
        assert!(load_investments_from_reader(data.as_bytes()).is_err());
    }
}
