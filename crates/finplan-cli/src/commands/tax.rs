use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finplan_core::tax::income_tax::{self, Deductions, RegimeComparisonInput, TaxInput};
use finplan_core::tax::regime::RegimeKind;
use finplan_core::PlannerConfig;

use crate::commands::read_input_with_defaults;

/// Deduction flags shared by `tax` and `tax-compare`
#[derive(Args)]
pub struct DeductionArgs {
    /// Section 80C investments claimed
    #[arg(long, default_value = "0")]
    pub section_80c: Decimal,

    /// House rent allowance exemption claimed
    #[arg(long, default_value = "0")]
    pub hra: Decimal,

    /// Home loan interest claimed
    #[arg(long, default_value = "0")]
    pub home_loan_interest: Decimal,
}

impl DeductionArgs {
    fn to_deductions(&self) -> Deductions {
        Deductions {
            section_80c: self.section_80c,
            hra: self.hra,
            home_loan_interest: self.home_loan_interest,
        }
    }
}

/// Arguments for income tax under one regime
#[derive(Args)]
pub struct TaxArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross annual income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Regime: old or new
    #[arg(long, default_value = "new")]
    pub regime: String,

    #[command(flatten)]
    pub deductions: DeductionArgs,
}

pub fn run_tax(args: TaxArgs, config: &PlannerConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let defaults = vec![
        ("limits", serde_json::to_value(&config.tax.limits)?),
        ("cess_rate_percent", serde_json::to_value(config.tax.cess_rate_percent)?),
    ];
    let parsed = read_input_with_defaults(args.input.as_deref(), defaults)?;
    let tax_input: TaxInput = match parsed {
        Some(parsed) => parsed,
        None => {
            let kind: RegimeKind = args.regime.parse()?;
            TaxInput::from_config(
                args.income.ok_or("--income is required (or provide --input)")?,
                kind,
                args.deductions.to_deductions(),
                &config.tax,
            )
        }
    };
    let result = income_tax::compute_tax(&tax_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for an old vs new regime comparison
#[derive(Args)]
pub struct TaxCompareArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross annual income
    #[arg(long)]
    pub income: Option<Decimal>,

    #[command(flatten)]
    pub deductions: DeductionArgs,
}

pub fn run_tax_compare(
    args: TaxCompareArgs,
    config: &PlannerConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let defaults = vec![("config", serde_json::to_value(&config.tax)?)];
    let parsed = read_input_with_defaults(args.input.as_deref(), defaults)?;
    let compare_input: RegimeComparisonInput = match parsed {
        Some(parsed) => parsed,
        None => RegimeComparisonInput {
            gross_income: args.income.ok_or("--income is required (or provide --input)")?,
            deductions: args.deductions.to_deductions(),
            config: config.tax.clone(),
        },
    };
    let result = income_tax::compare_regimes(&compare_input)?;
    Ok(serde_json::to_value(result)?)
}
