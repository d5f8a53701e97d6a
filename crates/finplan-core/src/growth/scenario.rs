use serde::{Deserialize, Serialize};

use crate::growth::compound::{
    project_compound_interest, CompoundInterestInput, CompoundInterestOutput,
};
use crate::growth::fixed_deposit::{project_fixed_deposit, FdInput, FdOutput};
use crate::growth::ppf::{project_ppf, PpfInput, PpfOutput};
use crate::growth::retirement::{plan_retirement, RetirementInput, RetirementOutput};
use crate::growth::sip::{project_sip, SipInput, SipOutput};
use crate::types::{ComputationOutput, ProjectionSummary};
use crate::FinPlanResult;

/// One growth calculation, tagged by calculator.
///
/// JSON form: `{"variant": "sip", "monthly_investment": "5000", ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum GrowthScenario {
    Sip(SipInput),
    CompoundInterest(CompoundInterestInput),
    FixedDeposit(FdInput),
    Ppf(PpfInput),
    Retirement(RetirementInput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum GrowthScenarioOutput {
    Sip(ComputationOutput<SipOutput>),
    CompoundInterest(ComputationOutput<CompoundInterestOutput>),
    FixedDeposit(ComputationOutput<FdOutput>),
    Ppf(ComputationOutput<PpfOutput>),
    Retirement(ComputationOutput<RetirementOutput>),
}

impl GrowthScenarioOutput {
    pub fn summary(&self) -> &ProjectionSummary {
        match self {
            GrowthScenarioOutput::Sip(o) => &o.result.summary,
            GrowthScenarioOutput::CompoundInterest(o) => &o.result.summary,
            GrowthScenarioOutput::FixedDeposit(o) => &o.result.summary,
            GrowthScenarioOutput::Ppf(o) => &o.result.summary,
            GrowthScenarioOutput::Retirement(o) => &o.result.summary,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            GrowthScenarioOutput::Sip(o) => &o.warnings,
            GrowthScenarioOutput::CompoundInterest(o) => &o.warnings,
            GrowthScenarioOutput::FixedDeposit(o) => &o.warnings,
            GrowthScenarioOutput::Ppf(o) => &o.warnings,
            GrowthScenarioOutput::Retirement(o) => &o.warnings,
        }
    }
}

/// Run whichever growth calculator the scenario names.
pub fn project_scenario(scenario: &GrowthScenario) -> FinPlanResult<GrowthScenarioOutput> {
    Ok(match scenario {
        GrowthScenario::Sip(input) => GrowthScenarioOutput::Sip(project_sip(input)?),
        GrowthScenario::CompoundInterest(input) => {
            GrowthScenarioOutput::CompoundInterest(project_compound_interest(input)?)
        }
        GrowthScenario::FixedDeposit(input) => {
            GrowthScenarioOutput::FixedDeposit(project_fixed_deposit(input)?)
        }
        GrowthScenario::Ppf(input) => GrowthScenarioOutput::Ppf(project_ppf(input)?),
        GrowthScenario::Retirement(input) => {
            GrowthScenarioOutput::Retirement(plan_retirement(input)?)
        }
    })
}
