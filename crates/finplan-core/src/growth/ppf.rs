use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinPlanError;
use crate::growth::projection::{
    check_horizon, check_non_negative, run_projection, Contribution, ProjectionInput,
};
use crate::time_value::{
    checked_mul, growth_factor, percent_to_rate, CompoundingFrequency, RateSpec,
    MAX_PROJECTION_YEARS,
};
use crate::types::{
    round_money, with_metadata, ComputationOutput, Money, Percent, ProjectionEntry,
    ProjectionSummary,
};
use crate::FinPlanResult;

/// Scheme parameters. Government-notified, so supplied rather than hardcoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfConfig {
    pub annual_rate_percent: Percent,
    pub tenure_years: u32,
    pub max_annual_contribution: Money,
    pub extension_block_years: u32,
    pub extension_blocks: u32,
    /// Slab rate used to estimate the deduction's tax saving.
    pub assumed_tax_bracket_percent: Percent,
}

impl Default for PpfConfig {
    fn default() -> Self {
        PpfConfig {
            annual_rate_percent: dec!(7.1),
            tenure_years: 15,
            max_annual_contribution: dec!(150_000),
            extension_block_years: 5,
            extension_blocks: 3,
            assumed_tax_bracket_percent: dec!(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PpfInput {
    pub annual_contribution: Money,
    pub current_age: u32,
    #[serde(default)]
    pub config: PpfConfig,
}

/// Balance after leaving the matured account to compound without deposits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfExtension {
    pub years: u32,
    pub age: u32,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfOutput {
    /// Contribution actually credited each year, after the cap.
    pub annual_contribution: Money,
    pub maturity_amount: Money,
    pub total_investment: Money,
    pub total_interest: Money,
    pub maturity_age: u32,
    pub tax_saved: Money,
    pub extension_scenarios: Vec<PpfExtension>,
    pub summary: ProjectionSummary,
    pub schedule: Vec<ProjectionEntry>,
}

/// Project a PPF account over its lock-in, plus the optional extension blocks.
pub fn project_ppf(input: &PpfInput) -> FinPlanResult<ComputationOutput<PpfOutput>> {
    let cfg = &input.config;
    check_non_negative("annual_contribution", input.annual_contribution)?;
    check_non_negative("config.max_annual_contribution", cfg.max_annual_contribution)?;
    check_horizon("config.tenure_years", cfg.tenure_years)?;
    if cfg.extension_block_years == 0 && cfg.extension_blocks > 0 {
        return Err(FinPlanError::invalid(
            "config.extension_block_years",
            "Extension blocks must be at least 1 year long",
        ));
    }
    let extension_years = cfg
        .extension_blocks
        .checked_mul(cfg.extension_block_years)
        .filter(|years| *years <= MAX_PROJECTION_YEARS)
        .ok_or_else(|| {
            FinPlanError::invalid(
                "config.extension_blocks",
                format!("Extensions cannot exceed {MAX_PROJECTION_YEARS} years in total"),
            )
        })?;
    let age_out_of_range =
        || FinPlanError::invalid("current_age", "Age at maturity is out of range");
    let maturity_age = input
        .current_age
        .checked_add(cfg.tenure_years)
        .ok_or_else(age_out_of_range)?;
    maturity_age
        .checked_add(extension_years)
        .ok_or_else(age_out_of_range)?;

    let mut warnings = Vec::new();
    let contribution = if input.annual_contribution > cfg.max_annual_contribution {
        warnings.push(format!(
            "Annual contribution capped at {} (requested {})",
            cfg.max_annual_contribution, input.annual_contribution
        ));
        cfg.max_annual_contribution
    } else {
        input.annual_contribution
    };

    log::debug!(
        "ppf: contribution={contribution} rate={}% tenure={}y",
        cfg.annual_rate_percent,
        cfg.tenure_years
    );

    let run = run_projection(&ProjectionInput {
        seed: Decimal::ZERO,
        rate: RateSpec::new(cfg.annual_rate_percent, CompoundingFrequency::Annually),
        horizon_years: cfg.tenure_years,
        contribution: Contribution::annual(contribution),
    })?;

    let rate = percent_to_rate(cfg.annual_rate_percent);
    let mut extension_scenarios = Vec::with_capacity(cfg.extension_blocks as usize);
    for block in 1..=cfg.extension_blocks {
        let years = block * cfg.extension_block_years;
        let amount = checked_mul(
            run.final_balance,
            growth_factor(rate, years)?,
            "PPF extension balance",
        )?;
        extension_scenarios.push(PpfExtension {
            years,
            age: maturity_age + years,
            amount: round_money(amount),
        });
    }

    let tax_saved = checked_mul(
        contribution,
        percent_to_rate(cfg.assumed_tax_bracket_percent),
        "PPF tax saved",
    )?;

    log::debug!("ppf: maturity={}", run.final_balance);

    let output = PpfOutput {
        annual_contribution: contribution,
        maturity_amount: round_money(run.final_balance),
        total_investment: round_money(run.total_invested),
        total_interest: round_money(run.total_interest()),
        maturity_age,
        tax_saved: round_money(tax_saved),
        extension_scenarios,
        summary: run.summary(),
        schedule: run.entries(),
    };

    Ok(with_metadata(
        "PPF accumulation (annual compounding, capped contributions) with extensions",
        &serde_json::json!({
            "annual_rate_percent": cfg.annual_rate_percent.to_string(),
            "tenure_years": cfg.tenure_years,
            "max_annual_contribution": cfg.max_annual_contribution.to_string(),
            "extension_block_years": cfg.extension_block_years,
        }),
        warnings,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_input() -> PpfInput {
        PpfInput {
            annual_contribution: dec!(150_000),
            current_age: 30,
            config: PpfConfig::default(),
        }
    }

    #[test]
    fn test_full_contribution_maturity() {
        let out = project_ppf(&default_input()).unwrap().result;
        assert_eq!(out.total_investment, dec!(2_250_000));
        // 150,000 * (1.071^15 - 1) / 0.071 = 3,798,514.68
        assert!(
            (out.maturity_amount - dec!(3_798_515)).abs() <= dec!(1),
            "maturity={}",
            out.maturity_amount
        );
        assert_eq!(out.maturity_age, 45);
        assert_eq!(out.tax_saved, dec!(45000));
    }

    #[test]
    fn test_contribution_capped() {
        let mut input = default_input();
        input.annual_contribution = dec!(200_000);
        let out = project_ppf(&input).unwrap();
        assert_eq!(out.result.annual_contribution, dec!(150_000));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_extensions_strictly_increase() {
        let out = project_ppf(&default_input()).unwrap().result;
        let years: Vec<u32> = out.extension_scenarios.iter().map(|e| e.years).collect();
        assert_eq!(years, vec![5, 10, 15]);
        assert!(out.extension_scenarios[0].amount > out.maturity_amount);
        for pair in out.extension_scenarios.windows(2) {
            assert!(pair[1].amount > pair[0].amount);
        }
        assert_eq!(out.extension_scenarios[2].age, 60);
    }

    #[test]
    fn test_schedule_first_year_has_no_interest() {
        let out = project_ppf(&default_input()).unwrap().result;
        assert_eq!(out.schedule.len(), 15);
        assert_eq!(out.schedule[0].interest_portion, Decimal::ZERO);
        assert_eq!(out.schedule[0].balance, dec!(150_000));
    }

    #[test]
    fn test_age_overflow_is_rejected() {
        let mut input = default_input();
        input.current_age = u32::MAX;
        assert!(matches!(
            project_ppf(&input),
            Err(FinPlanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_oversized_extensions_rejected() {
        let mut input = default_input();
        input.config.extension_blocks = u32::MAX;
        assert!(project_ppf(&input).is_err());
    }

    #[test]
    fn test_extension_overflow_is_precision_limit() {
        let mut input = default_input();
        input.config.max_annual_contribution = dec!(100_000_000_000_000_000_000);
        input.annual_contribution = dec!(100_000_000_000_000_000_000);
        input.config.annual_rate_percent = dec!(100);
        input.config.tenure_years = 20;
        input.config.extension_block_years = 20;
        assert!(matches!(
            project_ppf(&input),
            Err(FinPlanError::PrecisionLimit { .. })
        ));
    }

    #[test]
    fn test_custom_scheme_rate() {
        let mut input = default_input();
        input.config.annual_rate_percent = dec!(8);
        let higher = project_ppf(&input).unwrap().result;
        let base = project_ppf(&default_input()).unwrap().result;
        assert!(higher.maturity_amount > base.maturity_amount);
    }
}
