use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use finplan_core::loans::amortization::{self, LoanInput, LoanType};
use finplan_core::loans::portfolio::{self, LoanRecord};
use finplan_core::PlannerConfig;

use crate::commands::read_input;

/// Arguments for a single-loan EMI schedule
#[derive(Args)]
pub struct EmiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (defaults to the loan type's rate)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in years
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Loan type used to look up a default rate: home, car, personal, education
    #[arg(long)]
    pub loan_type: Option<String>,
}

pub fn run_emi(args: EmiArgs, config: &PlannerConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = match read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let principal = args
                .principal
                .ok_or("--principal is required (or provide --input)")?;
            let tenure = args.tenure.ok_or("--tenure is required (or provide --input)")?;
            let rate = match (args.rate, args.loan_type.as_deref()) {
                (Some(rate), _) => rate,
                (None, Some(kind)) => {
                    let loan_type: LoanType = kind.parse()?;
                    config
                        .loan_rates
                        .rate_for(loan_type)
                        .ok_or_else(|| format!("no default rate configured for {loan_type}"))?
                }
                (None, None) => return Err("--rate or --loan-type is required".into()),
            };
            LoanInput {
                principal,
                annual_rate_percent: rate,
                tenure_years: tenure,
            }
        }
    };

    let result = amortization::amortize(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a multi-loan comparison
#[derive(Args)]
pub struct LoansArgs {
    /// Path to JSON input file: `{"loans": [...]}` or a bare array
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LoanList {
    Wrapped { loans: Vec<LoanRecord> },
    Bare(Vec<LoanRecord>),
}

pub fn run_loans(args: LoansArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loans = match read_input::<LoanList>(args.input.as_deref())? {
        Some(LoanList::Wrapped { loans }) | Some(LoanList::Bare(loans)) => loans,
        None => return Err("--input <file.json> or stdin required for loan comparison".into()),
    };
    let result = portfolio::aggregate(&loans)?;
    Ok(serde_json::to_value(result)?)
}
