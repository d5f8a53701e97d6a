use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::FinPlanError;
use crate::growth::projection::check_horizon;
use crate::time_value::{cagr_percent, checked_mul, growth_factor, percent_to_rate, RateSpec};
use crate::types::{
    round_money, round_percent, with_metadata, ComputationOutput, Money, Percent,
    ProjectionEntry, ProjectionSummary,
};
use crate::FinPlanResult;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tax treatment of FD interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdTaxConfig {
    /// Interest up to this amount is not taxed.
    pub exemption_limit: Money,
    /// Withholding deducted at source on taxable interest.
    pub tds_rate_percent: Percent,
    /// Marginal slab rate applied to taxable interest.
    pub marginal_rate_percent: Percent,
}

impl Default for FdTaxConfig {
    fn default() -> Self {
        FdTaxConfig {
            exemption_limit: dec!(10_000),
            tds_rate_percent: dec!(10),
            marginal_rate_percent: dec!(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRate {
    pub name: String,
    pub annual_rate_percent: Percent,
}

/// Published FD card rates, keyed by a short lowercase bank code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRateTable {
    pub banks: BTreeMap<String, BankRate>,
}

impl Default for BankRateTable {
    fn default() -> Self {
        let banks = [
            ("sbi", "State Bank of India", dec!(6.5)),
            ("hdfc", "HDFC Bank", dec!(7.0)),
            ("icici", "ICICI Bank", dec!(6.8)),
            ("axis", "Axis Bank", dec!(6.9)),
            ("pnb", "Punjab National Bank", dec!(6.3)),
            ("postoffice", "Post Office", dec!(6.7)),
        ]
        .into_iter()
        .map(|(code, name, rate)| {
            (
                code.to_string(),
                BankRate {
                    name: name.to_string(),
                    annual_rate_percent: rate,
                },
            )
        })
        .collect();
        BankRateTable { banks }
    }
}

impl BankRateTable {
    pub fn lookup(&self, code: &str) -> FinPlanResult<&BankRate> {
        let key = code.trim().to_ascii_lowercase();
        self.banks.get(&key).ok_or_else(|| {
            FinPlanError::invalid("bank", format!("no rate configured for bank '{code}'"))
        })
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FdInput {
    pub principal: Money,
    pub rate: RateSpec,
    pub tenure_years: u32,
    #[serde(default)]
    pub tax: FdTaxConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdOutput {
    pub maturity_amount: Money,
    pub total_interest: Money,
    pub taxable_interest: Money,
    pub tds: Money,
    pub tax_on_interest: Money,
    pub post_tax_returns: Money,
    pub post_tax_maturity: Money,
    pub post_tax_effective_rate_percent: Percent,
    pub summary: ProjectionSummary,
    pub schedule: Vec<ProjectionEntry>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Lump-sum deposit, A = P(1 + r/m)^(m·t), with tax on interest above the
/// exemption limit.
pub fn project_fixed_deposit(input: &FdInput) -> FinPlanResult<ComputationOutput<FdOutput>> {
    if input.principal <= Decimal::ZERO {
        return Err(FinPlanError::invalid(
            "principal",
            "Deposit amount must be positive",
        ));
    }
    check_horizon("tenure_years", input.tenure_years)?;
    for (field, value) in [
        ("tax.exemption_limit", input.tax.exemption_limit),
        ("tax.tds_rate_percent", input.tax.tds_rate_percent),
        ("tax.marginal_rate_percent", input.tax.marginal_rate_percent),
    ] {
        if value < Decimal::ZERO {
            return Err(FinPlanError::invalid(field, "Value cannot be negative"));
        }
    }

    log::debug!(
        "fd: principal={} rate={}% ({}) tenure={}y",
        input.principal,
        input.rate.annual_rate_percent,
        input.rate.compounding,
        input.tenure_years
    );

    let m = input.rate.compounding.periods_per_year();
    let periodic = input.rate.periodic_rate()?;
    let maturity = checked_mul(
        input.principal,
        growth_factor(periodic, m * input.tenure_years)?,
        "FD maturity",
    )?;
    let total_interest = maturity - input.principal;

    let taxable_interest = (total_interest - input.tax.exemption_limit).max(Decimal::ZERO);
    let tds = checked_mul(
        taxable_interest,
        percent_to_rate(input.tax.tds_rate_percent),
        "FD TDS",
    )?;
    let tax_on_interest = checked_mul(
        taxable_interest,
        percent_to_rate(input.tax.marginal_rate_percent),
        "FD tax on interest",
    )?;
    let post_tax_returns = total_interest - tax_on_interest;
    let post_tax_maturity = input.principal + post_tax_returns;
    let post_tax_rate = cagr_percent(input.principal, post_tax_maturity, input.tenure_years)?;

    let mut schedule = Vec::with_capacity(input.tenure_years as usize);
    let mut previous = input.principal;
    for year in 1..=input.tenure_years {
        let amount = checked_mul(
            input.principal,
            growth_factor(periodic, m * year)?,
            "FD balance",
        )?;
        schedule.push(ProjectionEntry {
            period: year,
            principal_portion: if year == 1 {
                input.principal
            } else {
                Decimal::ZERO
            },
            interest_portion: round_money(amount - previous),
            total_invested: input.principal,
            balance: round_money(amount),
        });
        previous = amount;
    }

    let mut warnings = Vec::new();
    if tax_on_interest > Decimal::ZERO {
        warnings.push(format!(
            "Interest above {} is taxed at {}%",
            input.tax.exemption_limit, input.tax.marginal_rate_percent
        ));
    }

    log::debug!("fd: maturity={maturity} post_tax_maturity={post_tax_maturity}");

    let output = FdOutput {
        maturity_amount: round_money(maturity),
        total_interest: round_money(total_interest),
        taxable_interest: round_money(taxable_interest),
        tds: round_money(tds),
        tax_on_interest: round_money(tax_on_interest),
        post_tax_returns: round_money(post_tax_returns),
        post_tax_maturity: round_money(post_tax_maturity),
        post_tax_effective_rate_percent: round_percent(post_tax_rate),
        summary: ProjectionSummary::from_parts(input.principal, total_interest),
        schedule,
    };

    Ok(with_metadata(
        "Fixed deposit maturity (periodic compounding) with post-tax returns",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_percent": input.rate.annual_rate_percent.to_string(),
            "compounding": input.rate.compounding.to_string(),
            "tenure_years": input.tenure_years,
            "exemption_limit": input.tax.exemption_limit.to_string(),
            "tds_rate_percent": input.tax.tds_rate_percent.to_string(),
            "marginal_rate_percent": input.tax.marginal_rate_percent.to_string(),
        }),
        warnings,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::CompoundingFrequency;

    fn default_input() -> FdInput {
        FdInput {
            principal: dec!(100_000),
            rate: RateSpec::new(dec!(6.5), CompoundingFrequency::Quarterly),
            tenure_years: 5,
            tax: FdTaxConfig::default(),
        }
    }

    #[test]
    fn test_quarterly_maturity() {
        let out = project_fixed_deposit(&default_input()).unwrap().result;
        // 100,000 * (1.01625)^20 = 138,042.41
        assert!(
            (out.maturity_amount - dec!(138_042)).abs() <= dec!(1),
            "maturity={}",
            out.maturity_amount
        );
        assert_eq!(out.schedule.last().unwrap().balance, out.maturity_amount);
    }

    #[test]
    fn test_tax_only_above_exemption() {
        let out = project_fixed_deposit(&default_input()).unwrap().result;
        let expected_taxable = out.total_interest - dec!(10_000);
        assert!((out.taxable_interest - expected_taxable).abs() <= dec!(1));
        assert!((out.tds - out.taxable_interest * dec!(0.1)).abs() <= dec!(1));
        assert!((out.tax_on_interest - out.taxable_interest * dec!(0.3)).abs() <= dec!(1));
        assert!(out.post_tax_maturity < out.maturity_amount);
    }

    #[test]
    fn test_small_interest_is_untaxed() {
        let mut input = default_input();
        input.principal = dec!(10_000);
        let out = project_fixed_deposit(&input).unwrap();
        assert_eq!(out.result.tax_on_interest, Decimal::ZERO);
        assert_eq!(out.result.post_tax_maturity, out.result.maturity_amount);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_tax_rates_are_configurable() {
        let mut input = default_input();
        input.tax.marginal_rate_percent = Decimal::ZERO;
        let out = project_fixed_deposit(&input).unwrap().result;
        assert_eq!(out.post_tax_maturity, out.maturity_amount);
    }

    #[test]
    fn test_post_tax_rate_below_pre_tax() {
        let out = project_fixed_deposit(&default_input()).unwrap().result;
        assert!(out.post_tax_effective_rate_percent < dec!(6.66));
        assert!(out.post_tax_effective_rate_percent > Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_deposit() {
        let mut input = default_input();
        input.rate.annual_rate_percent = Decimal::ZERO;
        let out = project_fixed_deposit(&input).unwrap().result;
        assert_eq!(out.maturity_amount, dec!(100_000));
        assert_eq!(out.total_interest, Decimal::ZERO);
        assert_eq!(out.post_tax_effective_rate_percent, Decimal::ZERO);
    }

    #[test]
    fn test_bank_lookup() {
        let banks = BankRateTable::default();
        assert_eq!(banks.lookup("HDFC").unwrap().annual_rate_percent, dec!(7.0));
        assert!(banks.lookup("nobank").is_err());
    }

    #[test]
    fn test_overflow_is_precision_limit() {
        let mut input = default_input();
        input.principal = dec!(100_000_000_000_000_000_000);
        input.rate = RateSpec::new(dec!(100), CompoundingFrequency::Annually);
        input.tenure_years = 30;
        assert!(matches!(
            project_fixed_deposit(&input),
            Err(FinPlanError::PrecisionLimit { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_principal() {
        let mut input = default_input();
        input.principal = Decimal::ZERO;
        assert!(project_fixed_deposit(&input).is_err());
    }
}
