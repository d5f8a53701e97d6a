use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::growth::projection::{check_horizon, check_non_negative};
use crate::time_value::{checked_mul, growth_factor, monthly_rate, MONTHS_PER_YEAR};
use crate::types::{
    round_money, with_metadata, ComputationOutput, Money, Percent, ProjectionEntry,
    ProjectionSummary, Rate,
};
use crate::FinPlanResult;

/// Input for a monthly systematic investment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipInput {
    pub monthly_investment: Money,
    pub annual_return_percent: Percent,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipOutput {
    pub future_value: Money,
    pub total_investment: Money,
    pub total_returns: Money,
    pub summary: ProjectionSummary,
    pub schedule: Vec<ProjectionEntry>,
}

/// Project a monthly SIP with the annuity-due closed form
/// FV = M · ((1+i)^n − 1)/i · (1+i).
pub fn project_sip(input: &SipInput) -> FinPlanResult<ComputationOutput<SipOutput>> {
    check_non_negative("monthly_investment", input.monthly_investment)?;
    check_horizon("years", input.years)?;

    log::debug!(
        "sip: monthly={} rate={}% years={}",
        input.monthly_investment,
        input.annual_return_percent,
        input.years
    );

    let i = monthly_rate(input.annual_return_percent)?;
    let months = input.years * MONTHS_PER_YEAR;
    let future_value = annuity_due_value(input.monthly_investment, i, months)?;
    let total_investment =
        checked_mul(input.monthly_investment, Decimal::from(months), "SIP investment")?;

    let yearly_contribution = checked_mul(
        input.monthly_investment,
        Decimal::from(MONTHS_PER_YEAR),
        "SIP investment",
    )?;
    let mut schedule = Vec::with_capacity(input.years as usize);
    let mut previous_value = Decimal::ZERO;
    for year in 1..=input.years {
        let value = annuity_due_value(input.monthly_investment, i, year * MONTHS_PER_YEAR)?;
        let invested = checked_mul(yearly_contribution, Decimal::from(year), "SIP investment")?;
        schedule.push(ProjectionEntry {
            period: year,
            principal_portion: round_money(yearly_contribution),
            interest_portion: round_money(value - previous_value - yearly_contribution),
            total_invested: round_money(invested),
            balance: round_money(value),
        });
        previous_value = value;
    }

    let total_returns = future_value - total_investment;
    log::debug!("sip: future_value={future_value}");

    let output = SipOutput {
        future_value: round_money(future_value),
        total_investment: round_money(total_investment),
        total_returns: round_money(total_returns),
        summary: ProjectionSummary::from_parts(total_investment, total_returns),
        schedule,
    };

    Ok(with_metadata(
        "SIP future value (annuity due, monthly compounding)",
        &serde_json::json!({
            "monthly_investment": input.monthly_investment.to_string(),
            "annual_return_percent": input.annual_return_percent.to_string(),
            "months": months,
        }),
        Vec::new(),
        output,
    ))
}

/// Value of `months` payments made at the start of each month.
fn annuity_due_value(payment: Money, i: Rate, months: u32) -> FinPlanResult<Money> {
    if i.is_zero() {
        return checked_mul(payment, Decimal::from(months), "SIP value");
    }
    let factor = growth_factor(i, months)?;
    let annuity = checked_mul(payment, (factor - Decimal::ONE) / i, "SIP value")?;
    checked_mul(annuity, Decimal::ONE + i, "SIP value")
}
