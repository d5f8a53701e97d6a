use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FinPlanError;
use crate::time_value::{
    checked_add, checked_mul, RateSpec, MAX_PROJECTION_YEARS, MONTHS_PER_YEAR,
};
use crate::types::{
    round_money, with_metadata, ComputationOutput, Money, ProjectionEntry, ProjectionSummary,
};
use crate::FinPlanResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How often a periodic contribution is paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionFrequency {
    #[default]
    Annual,
    Monthly,
}

impl ContributionFrequency {
    pub fn payments_per_year(self) -> u32 {
        match self {
            ContributionFrequency::Annual => 1,
            ContributionFrequency::Monthly => MONTHS_PER_YEAR,
        }
    }
}

impl FromStr for ContributionFrequency {
    type Err = FinPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "annually" | "yearly" => Ok(ContributionFrequency::Annual),
            "monthly" => Ok(ContributionFrequency::Monthly),
            other => Err(FinPlanError::invalid(
                "contribution_frequency",
                format!("unknown contribution frequency '{other}'"),
            )),
        }
    }
}

/// A periodic top-up paid into the balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub amount: Money,
    #[serde(default)]
    pub frequency: ContributionFrequency,
}

impl Contribution {
    pub fn annual(amount: Money) -> Self {
        Contribution {
            amount,
            frequency: ContributionFrequency::Annual,
        }
    }

    pub fn monthly(amount: Money) -> Self {
        Contribution {
            amount,
            frequency: ContributionFrequency::Monthly,
        }
    }

    /// Total paid in over one year.
    pub fn per_year(&self) -> FinPlanResult<Money> {
        checked_mul(
            self.amount,
            Decimal::from(self.frequency.payments_per_year()),
            "yearly contribution",
        )
    }
}

/// Input for the generic growth recurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub seed: Money,
    pub rate: RateSpec,
    pub horizon_years: u32,
    #[serde(default)]
    pub contribution: Contribution,
}

/// Year-by-year balance and headline totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub summary: ProjectionSummary,
    pub schedule: Vec<ProjectionEntry>,
}

/// Unrounded state of a projection, shared by the calculator variants.
#[derive(Debug, Clone)]
pub(crate) struct ProjectionRun {
    pub final_balance: Money,
    pub total_invested: Money,
    pub years: Vec<RawYear>,
}

#[derive(Debug, Clone)]
pub(crate) struct RawYear {
    pub contribution: Money,
    pub interest: Money,
    pub invested: Money,
    pub balance: Money,
}

impl ProjectionRun {
    pub fn total_interest(&self) -> Money {
        self.final_balance - self.total_invested
    }

    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary::from_parts(self.total_invested, self.total_interest())
    }

    pub fn entries(&self) -> Vec<ProjectionEntry> {
        self.years
            .iter()
            .zip(1u32..)
            .map(|(y, period)| ProjectionEntry {
                period,
                principal_portion: round_money(y.contribution),
                interest_portion: round_money(y.interest),
                total_invested: round_money(y.invested),
                balance: round_money(y.balance),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub(crate) fn check_horizon(field: &str, years: u32) -> FinPlanResult<()> {
    if years == 0 {
        return Err(FinPlanError::invalid(field, "Horizon must be at least 1 year"));
    }
    if years > MAX_PROJECTION_YEARS {
        return Err(FinPlanError::invalid(
            field,
            format!("Horizon cannot exceed {MAX_PROJECTION_YEARS} years"),
        ));
    }
    Ok(())
}

pub(crate) fn check_non_negative(field: &str, value: Money) -> FinPlanResult<()> {
    if value < Decimal::ZERO {
        return Err(FinPlanError::invalid(field, "Value cannot be negative"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Project a seed balance with optional periodic top-ups.
///
/// Each year the balance compounds `m` times at `r/m`, then the year's
/// contributions are added in one step.
pub fn project(input: &ProjectionInput) -> FinPlanResult<ComputationOutput<ProjectionOutput>> {
    let run = run_projection(input)?;
    let per_year = input.contribution.per_year()?;

    let output = ProjectionOutput {
        summary: run.summary(),
        schedule: run.entries(),
    };

    Ok(with_metadata(
        "Iterative compound growth with end-of-year contributions",
        &serde_json::json!({
            "seed": input.seed.to_string(),
            "annual_rate_percent": input.rate.annual_rate_percent.to_string(),
            "compounding": input.rate.compounding.to_string(),
            "horizon_years": input.horizon_years,
            "contribution_per_year": per_year.to_string(),
        }),
        Vec::new(),
        output,
    ))
}

pub(crate) fn run_projection(input: &ProjectionInput) -> FinPlanResult<ProjectionRun> {
    check_non_negative("seed", input.seed)?;
    check_non_negative("contribution", input.contribution.amount)?;
    check_horizon("horizon_years", input.horizon_years)?;
    let per_year = input.contribution.per_year()?;

    log::debug!(
        "project: seed={} rate={}% ({}) horizon={}y contribution/yr={}",
        input.seed,
        input.rate.annual_rate_percent,
        input.rate.compounding,
        input.horizon_years,
        per_year
    );

    let factor = input.rate.annual_growth_factor()?;

    let mut balance = input.seed;
    let mut invested = input.seed;
    let mut years = Vec::with_capacity(input.horizon_years as usize);

    for _ in 0..input.horizon_years {
        let grown = checked_mul(balance, factor, "projection balance")?;
        let interest = grown - balance;
        balance = checked_add(grown, per_year, "projection balance")?;
        invested = checked_add(invested, per_year, "projection invested")?;
        years.push(RawYear {
            contribution: per_year,
            interest,
            invested,
            balance,
        });
    }

    Ok(ProjectionRun {
        final_balance: balance,
        total_invested: invested,
        years,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
