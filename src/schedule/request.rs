//! Primary entry point taking loosely-typed caller input
//!
//! Simulators and dashboards hand over strings straight from forms or
//! payloads. Validation happens here, before anything is computed.

use super::builder::PaymentScheduleBuilder;
use super::output::CommissionCalculation;
use crate::error::EngineResult;
use crate::investment::{parse_date, InvestmentInput, LiquidityCycle, Money, Rate};
use crate::rates::RoleRates;
use serde::{Deserialize, Serialize};

/// Inputs of a single commission calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRequest {
    pub investment_id: String,
    pub principal: Money,
    /// `YYYY-MM-DD`
    pub deposit_date: String,
    pub commitment_months: u32,
    /// Liquidity label; unrecognised values fall back to Monthly
    pub liquidity: String,
    #[serde(default)]
    pub investor_rate: Option<Rate>,
    #[serde(default)]
    pub advisor_rate: Option<Rate>,
    #[serde(default)]
    pub office_rate: Option<Rate>,
}

impl CommissionRequest {
    /// Validated investment and rates for this request
    pub fn resolve(&self) -> EngineResult<(InvestmentInput, RoleRates)> {
        let deposit_date = parse_date("deposit_date", &self.deposit_date)?;
        let liquidity = LiquidityCycle::parse_or_monthly(&self.liquidity);
        let input = InvestmentInput::new(
            self.investment_id.clone(),
            self.principal,
            deposit_date,
            self.commitment_months,
            liquidity,
        )?;
        let rates = RoleRates::from_optional(self.investor_rate, self.advisor_rate, self.office_rate)?;
        Ok((input, rates))
    }
}

/// Compute the schedule for one request with the default configuration
pub fn compute_commission(request: &CommissionRequest) -> EngineResult<CommissionCalculation> {
    compute_commission_with(&PaymentScheduleBuilder::default(), request)
}

/// Compute the schedule for one request with a configured builder
pub fn compute_commission_with(
    builder: &PaymentScheduleBuilder,
    request: &CommissionRequest,
) -> EngineResult<CommissionCalculation> {
    let (input, rates) = request.resolve()?;
    builder.build_schedule(&input, &rates)
}
