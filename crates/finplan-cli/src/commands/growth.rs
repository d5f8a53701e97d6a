use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finplan_core::growth::compound::{self, CompoundInterestInput};
use finplan_core::growth::fixed_deposit::{self, FdInput};
use finplan_core::growth::ppf::{self, PpfInput};
use finplan_core::growth::projection::{Contribution, ContributionFrequency};
use finplan_core::growth::retirement::{self, RetirementInput};
use finplan_core::growth::scenario::{self, GrowthScenario};
use finplan_core::growth::sip::{self, SipInput};
use finplan_core::time_value::{CompoundingFrequency, RateSpec};
use finplan_core::PlannerConfig;

use crate::commands::{fill_missing, read_input, read_input_with_defaults, read_raw_input};

/// Arguments for a monthly SIP projection
#[derive(Args)]
pub struct SipArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount invested every month
    #[arg(long)]
    pub monthly: Option<Decimal>,

    /// Expected annual return in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Investment period in years
    #[arg(long)]
    pub years: Option<u32>,
}

pub fn run_sip(args: SipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sip_input: SipInput = match read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => SipInput {
            monthly_investment: args
                .monthly
                .ok_or("--monthly is required (or provide --input)")?,
            annual_return_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
        },
    };
    let result = sip::project_sip(&sip_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for compound interest with optional top-ups
#[derive(Args)]
pub struct CompoundArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of years
    #[arg(long)]
    pub years: Option<u32>,

    /// Compounding frequency: annually, semi-annually, quarterly, monthly, daily
    #[arg(long, default_value = "annually")]
    pub compounding: String,

    /// Periodic top-up amount
    #[arg(long)]
    pub top_up: Option<Decimal>,

    /// Top-up frequency: annual or monthly
    #[arg(long, default_value = "monthly")]
    pub top_up_frequency: String,
}

pub fn run_compound(args: CompoundArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ci_input: CompoundInterestInput = match read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let compounding: CompoundingFrequency = args.compounding.parse()?;
            let frequency: ContributionFrequency = args.top_up_frequency.parse()?;
            CompoundInterestInput {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                rate: RateSpec::new(
                    args.rate.ok_or("--rate is required (or provide --input)")?,
                    compounding,
                ),
                years: args.years.ok_or("--years is required (or provide --input)")?,
                top_up: Contribution {
                    amount: args.top_up.unwrap_or(Decimal::ZERO),
                    frequency,
                },
            }
        }
    };
    let result = compound::project_compound_interest(&ci_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a fixed deposit
#[derive(Args)]
pub struct FdArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Deposit amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (or use --bank)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Bank code whose card rate to use, e.g. sbi, hdfc
    #[arg(long)]
    pub bank: Option<String>,

    /// Tenure in years
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Compounding frequency
    #[arg(long, default_value = "quarterly")]
    pub compounding: String,
}

pub fn run_fd(args: FdArgs, config: &PlannerConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let defaults = vec![("tax", serde_json::to_value(&config.fixed_deposit)?)];
    let parsed = read_input_with_defaults(args.input.as_deref(), defaults)?;
    let fd_input: FdInput = match parsed {
        Some(parsed) => parsed,
        None => {
            let rate = match (args.rate, args.bank.as_deref()) {
                (Some(rate), _) => rate,
                (None, Some(code)) => {
                    let bank = config.bank_rates.lookup(code)?;
                    log::debug!("using {} rate {}%", bank.name, bank.annual_rate_percent);
                    bank.annual_rate_percent
                }
                (None, None) => return Err("--rate or --bank is required".into()),
            };
            FdInput {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                rate: RateSpec::new(rate, args.compounding.parse()?),
                tenure_years: args.tenure.ok_or("--tenure is required (or provide --input)")?,
                tax: config.fixed_deposit.clone(),
            }
        }
    };
    let result = fixed_deposit::project_fixed_deposit(&fd_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a PPF account
#[derive(Args)]
pub struct PpfArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Yearly contribution (capped at the scheme maximum)
    #[arg(long)]
    pub contribution: Option<Decimal>,

    /// Age when the account is opened
    #[arg(long)]
    pub age: Option<u32>,
}

pub fn run_ppf(args: PpfArgs, config: &PlannerConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let defaults = vec![("config", serde_json::to_value(&config.ppf)?)];
    let parsed = read_input_with_defaults(args.input.as_deref(), defaults)?;
    let ppf_input: PpfInput = match parsed {
        Some(parsed) => parsed,
        None => PpfInput {
            annual_contribution: args
                .contribution
                .ok_or("--contribution is required (or provide --input)")?,
            current_age: args.age.ok_or("--age is required (or provide --input)")?,
            config: config.ppf.clone(),
        },
    };
    let result = ppf::project_ppf(&ppf_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for retirement planning
#[derive(Args)]
pub struct RetirementArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current age
    #[arg(long)]
    pub current_age: Option<u32>,

    /// Planned retirement age
    #[arg(long)]
    pub retirement_age: Option<u32>,

    /// Current monthly expenses
    #[arg(long)]
    pub expenses: Option<Decimal>,

    /// Expected inflation in percent
    #[arg(long, default_value = "6")]
    pub inflation: Decimal,

    /// Expected annual return in percent
    #[arg(long, default_value = "12")]
    pub expected_return: Decimal,

    /// Savings already invested
    #[arg(long, default_value = "0")]
    pub savings: Decimal,
}

pub fn run_retirement(
    args: RetirementArgs,
    config: &PlannerConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let defaults = vec![("config", serde_json::to_value(&config.retirement)?)];
    let parsed = read_input_with_defaults(args.input.as_deref(), defaults)?;
    let ret_input: RetirementInput = match parsed {
        Some(parsed) => parsed,
        None => RetirementInput {
            current_age: args
                .current_age
                .ok_or("--current-age is required (or provide --input)")?,
            retirement_age: args
                .retirement_age
                .ok_or("--retirement-age is required (or provide --input)")?,
            current_monthly_expenses: args
                .expenses
                .ok_or("--expenses is required (or provide --input)")?,
            inflation_rate_percent: args.inflation,
            expected_return_percent: args.expected_return,
            current_savings: args.savings,
            config: config.retirement.clone(),
        },
    };
    let result = retirement::plan_retirement(&ret_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a tagged growth scenario
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to JSON input file with a `variant` field
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_project(
    args: ProjectArgs,
    config: &PlannerConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut raw = read_raw_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for a growth scenario")?;
    let defaults = scenario_defaults(&raw, config)?;
    fill_missing(&mut raw, defaults);
    let scenario: GrowthScenario = serde_json::from_value(raw)?;
    let result = scenario::project_scenario(&scenario)?;
    Ok(serde_json::to_value(result)?)
}

/// Config sections a tagged scenario falls back to, keyed by its variant.
fn scenario_defaults(
    raw: &Value,
    config: &PlannerConfig,
) -> Result<Vec<(&'static str, Value)>, Box<dyn std::error::Error>> {
    Ok(match raw.get("variant").and_then(Value::as_str) {
        Some("fixed_deposit") => vec![("tax", serde_json::to_value(&config.fixed_deposit)?)],
        Some("ppf") => vec![("config", serde_json::to_value(&config.ppf)?)],
        Some("retirement") => vec![("config", serde_json::to_value(&config.retirement)?)],
        _ => Vec::new(),
    })
}
