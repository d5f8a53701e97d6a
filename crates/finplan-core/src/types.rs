use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.085 = 8.5%).
pub type Rate = Decimal;

/// Rates expressed in percentage points (8.5 = 8.5%), as users enter them.
pub type Percent = Decimal;

/// Round a monetary amount to the nearest whole currency unit for reporting.
///
/// Intermediate values are never rounded; call this only when building an
/// output struct.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to two decimal places for reporting.
pub fn round_percent(value: Percent) -> Percent {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One row of a loan schedule (a year, or the truncated final year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub period: u32,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

/// One row of a growth projection. Same shape as [`ScheduleEntry`] but the
/// balance grows instead of amortising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionEntry {
    pub period: u32,
    /// Money paid in during this period.
    pub principal_portion: Money,
    /// Growth credited during this period.
    pub interest_portion: Money,
    /// Cumulative money paid in up to and including this period.
    pub total_invested: Money,
    pub balance: Money,
}

/// Headline figures shared by every calculator.
///
/// `maturity_value == total_principal + total_interest` up to rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_principal: Money,
    pub total_interest: Money,
    pub maturity_value: Money,
}

impl ProjectionSummary {
    /// Build a rounded summary from full-precision principal and interest.
    pub fn from_parts(total_principal: Money, total_interest: Money) -> Self {
        let total_principal = round_money(total_principal);
        let total_interest = round_money(total_interest);
        ProjectionSummary {
            total_principal,
            total_interest,
            maturity_value: total_principal + total_interest,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    result: T,
) -> ComputationOutput<T> {
    for w in &warnings {
        log::warn!("{methodology}: {w}");
    }
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
