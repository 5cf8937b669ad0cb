//! Investment data structures

use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Monetary amounts, carried at full decimal precision
pub type Money = Decimal;

/// Monthly rates as decimals (0.02 = 2% per month)
pub type Rate = Decimal;

/// Commitment periods offered by the rate tables
pub const STANDARD_COMMITMENT_MONTHS: [u32; 5] = [3, 6, 12, 24, 36];

/// Upper bound on commitment length accepted by the engine
pub const MAX_COMMITMENT_MONTHS: u32 = 120;

/// Largest principal accepted, keeping every accrual within decimal range
// 1_000_000_000_000 (0xE8_D4A5_1000) built via const-capable `from_parts`
pub const MAX_PRINCIPAL: Money = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Date format used by loaders and request payloads
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cadence at which accrued returns are paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LiquidityCycle {
    /// Paid every month, simple interest
    Monthly,
    /// Paid every 6 months, compounded monthly within the cycle
    Semiannual,
    /// Paid every 12 months
    Annual,
    /// Paid every 24 months
    Biennial,
    /// Paid every 36 months
    Triennial,
}

impl LiquidityCycle {
    pub const ALL: [LiquidityCycle; 5] = [
        LiquidityCycle::Monthly,
        LiquidityCycle::Semiannual,
        LiquidityCycle::Annual,
        LiquidityCycle::Biennial,
        LiquidityCycle::Triennial,
    ];

    /// Length of one payout cycle in months
    pub fn cycle_months(&self) -> u32 {
        match self {
            LiquidityCycle::Monthly => 1,
            LiquidityCycle::Semiannual => 6,
            LiquidityCycle::Annual => 12,
            LiquidityCycle::Biennial => 24,
            LiquidityCycle::Triennial => 36,
        }
    }

    /// Whether returns compound within a cycle
    pub fn is_compound(&self) -> bool {
        self.cycle_months() > 1
    }

    pub fn from_cycle_months(months: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.cycle_months() == months)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LiquidityCycle::Monthly => "Monthly",
            LiquidityCycle::Semiannual => "Semiannual",
            LiquidityCycle::Annual => "Annual",
            LiquidityCycle::Biennial => "Biennial",
            LiquidityCycle::Triennial => "Triennial",
        }
    }

    /// Parse a liquidity label, degrading to Monthly when it is not recognised
    pub fn parse_or_monthly(value: &str) -> Self {
        match value.parse() {
            Ok(cycle) => cycle,
            Err(_) => {
                log::warn!(
                    "unrecognised liquidity cycle {:?}, falling back to Monthly",
                    value
                );
                LiquidityCycle::Monthly
            }
        }
    }
}

impl FromStr for LiquidityCycle {
    type Err = EngineError;

    /// Accepts the variant name in any case, or the cycle length in months
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(months) = trimmed.parse::<u32>() {
            return Self::from_cycle_months(months).ok_or_else(|| {
                EngineError::invalid_input("liquidity", format!("no cycle of {} months", months))
            });
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "monthly" => Ok(LiquidityCycle::Monthly),
            "semiannual" | "semi-annual" | "semiannually" => Ok(LiquidityCycle::Semiannual),
            "annual" | "annually" | "yearly" => Ok(LiquidityCycle::Annual),
            "biennial" | "biennially" => Ok(LiquidityCycle::Biennial),
            "triennial" | "triennially" => Ok(LiquidityCycle::Triennial),
            other => Err(EngineError::invalid_input(
                "liquidity",
                format!("unknown liquidity cycle: {}", other),
            )),
        }
    }
}

impl fmt::Display for LiquidityCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Party receiving a share of an investment's returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Investor,
    Advisor,
    Office,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Investor, Role::Advisor, Role::Office];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Investor => "Investor",
            Role::Advisor => "Advisor",
            Role::Office => "Office",
        }
    }
}

impl FromStr for Role {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "investor" => Ok(Role::Investor),
            "advisor" => Ok(Role::Advisor),
            "office" => Ok(Role::Office),
            other => Err(EngineError::invalid_input("role", format!("unknown role: {}", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(field: &str, value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        EngineError::invalid_input(field, format!("malformed date {:?}: {}", value, e))
    })
}

/// A single investment to be scheduled
///
/// Fields are private so that every instance has passed validation; the
/// attribution ids are carried through to outputs and never used in the math.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentInput {
    investment_id: String,
    owner_id: Option<String>,
    advisor_id: Option<String>,
    office_id: Option<String>,
    principal: Money,
    deposit_date: NaiveDate,
    commitment_months: u32,
    liquidity: LiquidityCycle,
}

impl InvestmentInput {
    /// Create a validated investment
    pub fn new(
        investment_id: impl Into<String>,
        principal: Money,
        deposit_date: NaiveDate,
        commitment_months: u32,
        liquidity: LiquidityCycle,
    ) -> EngineResult<Self> {
        if principal <= Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "principal",
                format!("principal must be positive, got {}", principal),
            ));
        }
        if principal > MAX_PRINCIPAL {
            return Err(EngineError::invalid_input(
                "principal",
                format!("principal must not exceed {}, got {}", MAX_PRINCIPAL, principal),
            ));
        }
        if commitment_months == 0 || commitment_months > MAX_COMMITMENT_MONTHS {
            return Err(EngineError::invalid_input(
                "commitment_months",
                format!(
                    "commitment must be between 1 and {} months, got {}",
                    MAX_COMMITMENT_MONTHS, commitment_months
                ),
            ));
        }

        Ok(Self {
            investment_id: investment_id.into(),
            owner_id: None,
            advisor_id: None,
            office_id: None,
            principal,
            deposit_date,
            commitment_months,
            liquidity,
        })
    }

    /// Attach attribution ids
    pub fn with_attribution(
        mut self,
        owner_id: Option<String>,
        advisor_id: Option<String>,
        office_id: Option<String>,
    ) -> Self {
        self.owner_id = owner_id;
        self.advisor_id = advisor_id;
        self.office_id = office_id;
        self
    }

    pub fn investment_id(&self) -> &str {
        &self.investment_id
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn advisor_id(&self) -> Option<&str> {
        self.advisor_id.as_deref()
    }

    pub fn office_id(&self) -> Option<&str> {
        self.office_id.as_deref()
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn deposit_date(&self) -> NaiveDate {
        self.deposit_date
    }

    pub fn commitment_months(&self) -> u32 {
        self.commitment_months
    }

    pub fn liquidity(&self) -> LiquidityCycle {
        self.liquidity
    }

    /// Whether the commitment is one of the periods the rate tables price
    pub fn has_standard_commitment(&self) -> bool {
        STANDARD_COMMITMENT_MONTHS.contains(&self.commitment_months)
    }

    /// Number of complete liquidity cycles within the commitment
    pub fn full_cycles(&self) -> u32 {
        self.commitment_months / self.liquidity.cycle_months()
    }

    /// Months left over after the last complete cycle
    pub fn remainder_months(&self) -> u32 {
        self.commitment_months % self.liquidity.cycle_months()
    }
}
