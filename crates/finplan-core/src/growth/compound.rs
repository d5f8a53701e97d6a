use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::growth::projection::{
    check_horizon, check_non_negative, run_projection, Contribution, ProjectionInput,
};
use crate::time_value::{
    cagr_percent, checked_add, checked_mul, growth_factor, percent_to_rate, RateSpec,
};
use crate::types::{
    round_money, round_percent, with_metadata, ComputationOutput, Money, Percent,
    ProjectionEntry, ProjectionSummary,
};
use crate::FinPlanResult;

/// Input for the generic compound-interest calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundInterestInput {
    pub principal: Money,
    pub rate: RateSpec,
    pub years: u32,
    #[serde(default)]
    pub top_up: Contribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestOutput {
    /// P(1 + r/m)^(m·t), ignoring top-ups.
    pub basic_amount: Money,
    pub basic_interest: Money,
    /// Year-by-year result including top-ups.
    pub total_amount: Money,
    pub total_invested: Money,
    pub total_interest: Money,
    pub effective_annual_rate_percent: Percent,
    pub simple_amount: Money,
    pub simple_interest: Money,
    pub compound_advantage: Money,
    pub summary: ProjectionSummary,
    pub schedule: Vec<ProjectionEntry>,
}

/// Compound a principal with optional top-ups and compare against simple
/// interest on the same principal.
pub fn project_compound_interest(
    input: &CompoundInterestInput,
) -> FinPlanResult<ComputationOutput<CompoundInterestOutput>> {
    check_non_negative("principal", input.principal)?;
    check_horizon("years", input.years)?;

    let periods = input.rate.compounding.periods_per_year() * input.years;
    let basic_amount = checked_mul(
        input.principal,
        growth_factor(input.rate.periodic_rate()?, periods)?,
        "compound amount",
    )?;
    let basic_interest = basic_amount - input.principal;

    let run = run_projection(&ProjectionInput {
        seed: input.principal,
        rate: input.rate.clone(),
        horizon_years: input.years,
        contribution: input.top_up.clone(),
    })?;

    let simple_rate = checked_mul(
        percent_to_rate(input.rate.annual_rate_percent),
        Decimal::from(input.years),
        "simple interest rate",
    )?;
    let simple_interest = checked_mul(input.principal, simple_rate, "simple interest")?;
    let simple_amount = checked_add(input.principal, simple_interest, "simple amount")?;
    let effective = cagr_percent(run.total_invested, run.final_balance, input.years)?;

    let mut warnings = Vec::new();
    if run.total_invested.is_zero() {
        warnings.push("Nothing invested: principal and top-ups are both zero".to_string());
    }

    log::debug!(
        "compound: basic={basic_amount} with_top_ups={} simple_interest={simple_interest}",
        run.final_balance
    );

    let output = CompoundInterestOutput {
        basic_amount: round_money(basic_amount),
        basic_interest: round_money(basic_interest),
        total_amount: round_money(run.final_balance),
        total_invested: round_money(run.total_invested),
        total_interest: round_money(run.total_interest()),
        effective_annual_rate_percent: round_percent(effective),
        simple_amount: round_money(simple_amount),
        simple_interest: round_money(simple_interest),
        compound_advantage: round_money(basic_interest - simple_interest),
        summary: run.summary(),
        schedule: run.entries(),
    };

    Ok(with_metadata(
        "Compound interest with periodic top-ups and simple-interest comparison",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_percent": input.rate.annual_rate_percent.to_string(),
            "compounding": input.rate.compounding.to_string(),
            "years": input.years,
            "top_up_per_year": input.top_up.per_year()?.to_string(),
        }),
        warnings,
        output,
    ))
}
