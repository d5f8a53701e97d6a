use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FinPlanError;
use crate::time_value::{
    checked_mul, monthly_rate, pmt, HUNDRED, MAX_TENURE_YEARS, MONTHS_PER_YEAR,
};
use crate::types::{
    round_money, round_percent, with_metadata, ComputationOutput, Money, Percent,
    ProjectionSummary, Rate, ScheduleEntry,
};
use crate::FinPlanResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Loan categories with their own default rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Home,
    Car,
    Personal,
    Education,
}

impl LoanType {
    pub fn label(self) -> &'static str {
        match self {
            LoanType::Home => "Home Loan",
            LoanType::Car => "Car Loan",
            LoanType::Personal => "Personal Loan",
            LoanType::Education => "Education Loan",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoanType {
    type Err = FinPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(LoanType::Home),
            "car" => Ok(LoanType::Car),
            "personal" => Ok(LoanType::Personal),
            "education" => Ok(LoanType::Education),
            other => Err(FinPlanError::invalid(
                "loan_type",
                format!("unknown loan type '{other}'"),
            )),
        }
    }
}

/// Default annual rates (percent) per loan type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRateTable {
    pub rates: BTreeMap<LoanType, Percent>,
}

impl Default for LoanRateTable {
    fn default() -> Self {
        let rates = [
            (LoanType::Home, Decimal::new(85, 1)),
            (LoanType::Car, Decimal::new(95, 1)),
            (LoanType::Personal, Decimal::new(120, 1)),
            (LoanType::Education, Decimal::new(100, 1)),
        ]
        .into_iter()
        .collect();
        LoanRateTable { rates }
    }
}

impl LoanRateTable {
    pub fn rate_for(&self, loan_type: LoanType) -> Option<Percent> {
        self.rates.get(&loan_type).copied()
    }
}

/// Input for a single equated-installment loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_years: u32,
}

/// Schedule and headline figures for one loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub emi: Money,
    pub months: u32,
    pub total_payable: Money,
    pub total_interest: Money,
    pub principal_share_percent: Percent,
    pub interest_share_percent: Percent,
    pub summary: ProjectionSummary,
    pub schedule: Vec<ScheduleEntry>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Build a year-by-year equated-installment schedule for a single loan.
pub fn amortize(input: &LoanInput) -> FinPlanResult<ComputationOutput<AmortizationOutput>> {
    let mut warnings: Vec<String> = Vec::new();
    let output = build_amortization(input, &mut warnings)?;

    Ok(with_metadata(
        "Equated monthly installment with reducing-balance amortisation",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_percent": input.annual_rate_percent.to_string(),
            "tenure_years": input.tenure_years,
            "compounding": "monthly",
        }),
        warnings,
        output,
    ))
}

/// Validate a loan and compute its schedule without the output envelope.
pub(crate) fn build_amortization(
    input: &LoanInput,
    warnings: &mut Vec<String>,
) -> FinPlanResult<AmortizationOutput> {
    if input.principal <= Decimal::ZERO {
        return Err(FinPlanError::invalid(
            "principal",
            "Loan principal must be positive",
        ));
    }
    if input.tenure_years == 0 {
        return Err(FinPlanError::invalid(
            "tenure_years",
            "Tenure must be at least 1 year",
        ));
    }
    if input.tenure_years > MAX_TENURE_YEARS {
        return Err(FinPlanError::invalid(
            "tenure_years",
            format!("Tenure cannot exceed {MAX_TENURE_YEARS} years"),
        ));
    }

    log::debug!(
        "amortize: principal={} rate={}% tenure={}y",
        input.principal,
        input.annual_rate_percent,
        input.tenure_years
    );

    let r = monthly_rate(input.annual_rate_percent)?;
    let months = input.tenure_years * MONTHS_PER_YEAR;
    let emi = level_installment(input.principal, r, months)?;

    let mut schedule = Vec::with_capacity(input.tenure_years as usize);
    let mut balance = input.principal;

    for year in 1..=input.tenure_years {
        let mut yearly_interest = Decimal::ZERO;
        let mut yearly_principal = Decimal::ZERO;

        for _ in 0..MONTHS_PER_YEAR {
            let interest = balance * r;
            let principal_part = emi - interest;
            yearly_interest += interest;
            yearly_principal += principal_part;
            balance -= principal_part;
            if balance <= Decimal::ZERO {
                break;
            }
        }

        schedule.push(ScheduleEntry {
            period: year,
            principal_portion: round_money(yearly_principal),
            interest_portion: round_money(yearly_interest),
            remaining_balance: round_money(balance.max(Decimal::ZERO)),
        });

        if balance <= Decimal::ZERO {
            if year < input.tenure_years {
                warnings.push(format!(
                    "Loan fully repaid in year {year}, before the {}-year tenure",
                    input.tenure_years
                ));
            }
            break;
        }
    }

    let total_payable = checked_mul(emi, Decimal::from(months), "total payable")?;
    let total_interest = total_payable - input.principal;

    let principal_share = if total_payable.is_zero() {
        Decimal::ZERO
    } else {
        input.principal / total_payable * HUNDRED
    };

    log::debug!("amortize: emi={emi} total_interest={total_interest}");

    Ok(AmortizationOutput {
        emi: round_money(emi),
        months,
        total_payable: round_money(total_payable),
        total_interest: round_money(total_interest),
        principal_share_percent: round_percent(principal_share),
        interest_share_percent: round_percent(HUNDRED - principal_share),
        summary: ProjectionSummary::from_parts(input.principal, total_interest),
        schedule,
    })
}

/// Level installment: P·r·(1+r)^n / ((1+r)^n − 1), or P/n when r = 0.
fn level_installment(principal: Money, r: Rate, months: u32) -> FinPlanResult<Money> {
    if r.is_zero() {
        return Ok(principal / Decimal::from(months));
    }
    pmt(r, months, -principal, Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn home_loan() -> LoanInput {
        LoanInput {
            principal: dec!(2_500_000),
            annual_rate_percent: dec!(8.5),
            tenure_years: 20,
        }
    }

    #[test]
    fn test_home_loan_emi() {
        let result = amortize(&home_loan()).unwrap();
        assert_eq!(result.result.emi, dec!(21696));
        assert_eq!(result.result.months, 240);
    }

    #[test]
    fn test_home_loan_total_interest() {
        let out = amortize(&home_loan()).unwrap().result;
        // I·n − P with the unrounded installment
        assert!(
            (out.total_interest - dec!(2_706_939)).abs() <= dec!(1),
            "total_interest={}",
            out.total_interest
        );
        assert_eq!(
            out.summary.maturity_value,
            out.summary.total_principal + out.summary.total_interest
        );
    }

    #[test]
    fn test_zero_rate_installment_is_exact() {
        let input = LoanInput {
            principal: dec!(1_200_000),
            annual_rate_percent: Decimal::ZERO,
            tenure_years: 10,
        };
        let out = amortize(&input).unwrap().result;
        assert_eq!(out.emi, dec!(10000));
        assert_eq!(out.total_interest, Decimal::ZERO);
        assert!(out.schedule.iter().all(|e| e.interest_portion.is_zero()));
        assert_eq!(out.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_level_installment_zero_rate_unrounded() {
        let emi = level_installment(dec!(1000), Decimal::ZERO, 12).unwrap();
        assert_eq!(emi, dec!(1000) / dec!(12));
    }

    #[test]
    fn test_balance_monotonically_decreasing() {
        let out = amortize(&home_loan()).unwrap().result;
        let mut prev = dec!(2_500_000);
        for row in &out.schedule {
            assert!(row.remaining_balance <= prev);
            prev = row.remaining_balance;
        }
        assert_eq!(prev, Decimal::ZERO);
    }

    #[test]
    fn test_principal_portions_sum_to_principal() {
        let out = amortize(&home_loan()).unwrap().result;
        let total: Decimal = out.schedule.iter().map(|e| e.principal_portion).sum();
        assert!((total - dec!(2_500_000)).abs() <= Decimal::from(out.schedule.len()));
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let out = amortize(&home_loan()).unwrap().result;
        let total = out.principal_share_percent + out.interest_share_percent;
        assert!((total - dec!(100)).abs() <= dec!(0.01));
        assert!(out.interest_share_percent > dec!(50));
    }

    #[test]
    fn test_validation_rejects_bad_inputs() {
        let mut input = home_loan();
        input.principal = Decimal::ZERO;
        assert!(amortize(&input).is_err());

        let mut input = home_loan();
        input.tenure_years = 0;
        assert!(amortize(&input).is_err());

        let mut input = home_loan();
        input.annual_rate_percent = dec!(-1);
        assert!(amortize(&input).is_err());

        let mut input = home_loan();
        input.tenure_years = MAX_TENURE_YEARS + 1;
        assert!(amortize(&input).is_err());
    }

    #[test]
    fn test_overflow_is_precision_limit() {
        let input = LoanInput {
            principal: dec!(100_000_000_000_000_000_000),
            annual_rate_percent: dec!(100),
            tenure_years: MAX_TENURE_YEARS,
        };
        assert!(matches!(
            amortize(&input),
            Err(FinPlanError::PrecisionLimit { .. })
        ));
    }

    #[test]
    fn test_loan_type_defaults() {
        let table = LoanRateTable::default();
        assert_eq!(table.rate_for(LoanType::Home), Some(dec!(8.5)));
        assert_eq!(table.rate_for(LoanType::Personal), Some(dec!(12.0)));
        assert_eq!("car".parse::<LoanType>().unwrap(), LoanType::Car);
        assert!("boat".parse::<LoanType>().is_err());
    }
}
