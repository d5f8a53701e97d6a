use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinPlanError;
use crate::tax::regime::{DeductionLimits, RegimeKind, TaxConfig, TaxRegime};
use crate::time_value::{checked_add, checked_mul, percent_to_rate, HUNDRED, MONTHS_PER_YEAR};
use crate::types::{round_money, round_percent, with_metadata, ComputationOutput, Money, Percent};
use crate::FinPlanResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Deductions claimed by the taxpayer, before caps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deductions {
    #[serde(default)]
    pub section_80c: Money,
    #[serde(default)]
    pub hra: Money,
    #[serde(default)]
    pub home_loan_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxInput {
    pub gross_income: Money,
    pub regime: TaxRegime,
    #[serde(default)]
    pub deductions: Deductions,
    #[serde(default)]
    pub limits: DeductionLimits,
    pub cess_rate_percent: Percent,
}

impl TaxInput {
    /// Build an input from one of the configured regimes.
    pub fn from_config(
        gross_income: Money,
        kind: RegimeKind,
        deductions: Deductions,
        config: &TaxConfig,
    ) -> Self {
        TaxInput {
            gross_income,
            regime: config.regime(kind).clone(),
            deductions,
            limits: config.limits.clone(),
            cess_rate_percent: config.cess_rate_percent,
        }
    }
}

/// Tax attributable to one slab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabRow {
    pub lower_bound: Money,
    pub upper_bound: Option<Money>,
    pub rate_percent: Percent,
    pub taxable_amount: Money,
    pub tax: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub regime: String,
    pub gross_income: Money,
    pub total_deductions: Money,
    pub taxable_income: Money,
    /// Sum of the slab rows, before cess.
    pub slab_tax: Money,
    pub cess: Money,
    pub total_tax: Money,
    pub monthly_tax: Money,
    pub effective_rate_percent: Percent,
    pub marginal_rate_percent: Percent,
    pub take_home: Money,
    pub rows: Vec<SlabRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeComparisonInput {
    pub gross_income: Money,
    #[serde(default)]
    pub deductions: Deductions,
    #[serde(default)]
    pub config: TaxConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeComparison {
    pub old_regime: TaxBreakdown,
    pub new_regime: TaxBreakdown,
    pub recommended: RegimeKind,
    pub savings: Money,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Progressive slab tax plus cess.
///
/// Each row's tax is rounded to a whole unit and the totals are built from
/// the rounded rows, so `sum(rows.tax) + cess == total_tax` exactly.
pub fn compute_tax(input: &TaxInput) -> FinPlanResult<ComputationOutput<TaxBreakdown>> {
    let breakdown = build_breakdown(input)?;

    Ok(with_metadata(
        "Progressive slab tax with flat cess",
        &serde_json::json!({
            "regime": input.regime.name,
            "allows_deductions": input.regime.allows_deductions,
            "section_80c_cap": input.limits.section_80c_cap.to_string(),
            "home_loan_interest_cap": input.limits.home_loan_interest_cap.to_string(),
            "cess_rate_percent": input.cess_rate_percent.to_string(),
        }),
        Vec::new(),
        breakdown,
    ))
}

/// Run both configured regimes and recommend the cheaper one.
pub fn compare_regimes(
    input: &RegimeComparisonInput,
) -> FinPlanResult<ComputationOutput<RegimeComparison>> {
    let old = build_breakdown(&TaxInput::from_config(
        input.gross_income,
        RegimeKind::Old,
        input.deductions.clone(),
        &input.config,
    ))?;
    let new = build_breakdown(&TaxInput::from_config(
        input.gross_income,
        RegimeKind::New,
        input.deductions.clone(),
        &input.config,
    ))?;

    let (recommended, savings) = if old.total_tax < new.total_tax {
        (RegimeKind::Old, new.total_tax - old.total_tax)
    } else {
        (RegimeKind::New, old.total_tax - new.total_tax)
    };

    let mut warnings = Vec::new();
    let claimed = [input.deductions.hra, input.deductions.home_loan_interest]
        .into_iter()
        .try_fold(input.deductions.section_80c, |acc, d| {
            checked_add(acc, d, "claimed deductions")
        })?;
    if recommended == RegimeKind::New && !claimed.is_zero() {
        warnings.push("Deductions claimed are forfeited under the new regime".to_string());
    }

    log::debug!(
        "tax compare: old={} new={} -> {recommended}",
        old.total_tax,
        new.total_tax
    );

    Ok(with_metadata(
        "Old vs new regime comparison (lower total tax wins, ties go to new)",
        &serde_json::json!({
            "gross_income": input.gross_income.to_string(),
            "cess_rate_percent": input.config.cess_rate_percent.to_string(),
        }),
        warnings,
        RegimeComparison {
            old_regime: old,
            new_regime: new,
            recommended,
            savings,
        },
    ))
}

fn build_breakdown(input: &TaxInput) -> FinPlanResult<TaxBreakdown> {
    for (field, value) in [
        ("gross_income", input.gross_income),
        ("deductions.section_80c", input.deductions.section_80c),
        ("deductions.hra", input.deductions.hra),
        ("deductions.home_loan_interest", input.deductions.home_loan_interest),
        ("limits.section_80c_cap", input.limits.section_80c_cap),
        ("limits.home_loan_interest_cap", input.limits.home_loan_interest_cap),
        ("cess_rate_percent", input.cess_rate_percent),
    ] {
        if value < Decimal::ZERO {
            return Err(FinPlanError::invalid(field, "Value cannot be negative"));
        }
    }
    input.regime.validate()?;

    log::debug!(
        "tax: gross={} regime={}",
        input.gross_income,
        input.regime.name
    );

    let total_deductions = if input.regime.allows_deductions {
        let capped = checked_add(
            input.deductions.section_80c.min(input.limits.section_80c_cap),
            input
                .deductions
                .home_loan_interest
                .min(input.limits.home_loan_interest_cap),
            "deductions",
        )?;
        checked_add(capped, input.deductions.hra, "deductions")?
    } else {
        Decimal::ZERO
    };
    let taxable_income = (input.gross_income - total_deductions).max(Decimal::ZERO);

    let rows = input
        .regime
        .slabs
        .iter()
        .filter_map(|slab| {
            let amount = slab.taxable_portion(taxable_income);
            (amount > Decimal::ZERO).then_some((slab, amount))
        })
        .map(|(slab, amount)| {
            let tax = checked_mul(amount, percent_to_rate(slab.rate_percent), "slab tax")?;
            Ok(SlabRow {
                lower_bound: slab.lower_bound,
                upper_bound: slab.upper_bound,
                rate_percent: slab.rate_percent,
                taxable_amount: amount,
                tax: round_money(tax),
            })
        })
        .collect::<FinPlanResult<Vec<SlabRow>>>()?;

    // Rates are capped at 100%, so the rows never sum past taxable income.
    let slab_tax: Money = rows.iter().map(|r| r.tax).sum();
    let cess = round_money(checked_mul(
        slab_tax,
        percent_to_rate(input.cess_rate_percent),
        "cess",
    )?);
    let total_tax = checked_add(slab_tax, cess, "total tax")?;

    let effective_rate = if input.gross_income.is_zero() {
        Decimal::ZERO
    } else {
        checked_mul(total_tax / input.gross_income, HUNDRED, "effective rate")?
    };

    log::debug!("tax: taxable={taxable_income} total_tax={total_tax}");

    Ok(TaxBreakdown {
        regime: input.regime.name.clone(),
        gross_income: input.gross_income,
        total_deductions,
        taxable_income,
        slab_tax,
        cess,
        total_tax,
        monthly_tax: round_money(total_tax / Decimal::from(MONTHS_PER_YEAR)),
        effective_rate_percent: round_percent(effective_rate),
        marginal_rate_percent: input.regime.marginal_rate(taxable_income),
        take_home: input.gross_income - total_tax,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(gross: Decimal, kind: RegimeKind, deductions: Deductions) -> TaxInput {
        TaxInput::from_config(gross, kind, deductions, &TaxConfig::default())
    }

    fn full_80c() -> Deductions {
        Deductions {
            section_80c: dec!(150_000),
            ..Deductions::default()
        }
    }

    #[test]
    fn test_new_regime_twelve_lakh() {
        let out = compute_tax(&input(dec!(1_200_000), RegimeKind::New, full_80c()))
            .unwrap()
            .result;
        // Deductions ignored: 15,000 + 30,000 + 45,000
        assert_eq!(out.total_deductions, Decimal::ZERO);
        assert_eq!(out.slab_tax, dec!(90_000));
        assert_eq!(out.cess, dec!(3_600));
        assert_eq!(out.total_tax, dec!(93_600));
        assert_eq!(out.take_home, dec!(1_106_400));
        assert_eq!(out.monthly_tax, dec!(7_800));
        assert_eq!(out.effective_rate_percent, dec!(7.80));
    }

    #[test]
    fn test_old_regime_applies_deductions() {
        let out = compute_tax(&input(dec!(1_200_000), RegimeKind::Old, full_80c()))
            .unwrap()
            .result;
        assert_eq!(out.taxable_income, dec!(1_050_000));
        // 12,500 + 100,000 + 15,000
        assert_eq!(out.slab_tax, dec!(127_500));
        assert_eq!(out.total_tax, dec!(132_600));
        assert_eq!(out.marginal_rate_percent, dec!(30));
    }

    #[test]
    fn test_deduction_caps() {
        let claims = Deductions {
            section_80c: dec!(500_000),
            hra: dec!(50_000),
            home_loan_interest: dec!(400_000),
        };
        let out = compute_tax(&input(dec!(2_000_000), RegimeKind::Old, claims))
            .unwrap()
            .result;
        assert_eq!(out.total_deductions, dec!(400_000));
        assert_eq!(out.taxable_income, dec!(1_600_000));
    }

    #[test]
    fn test_taxable_income_floored_at_zero() {
        let claims = Deductions {
            hra: dec!(500_000),
            ..Deductions::default()
        };
        let out = compute_tax(&input(dec!(300_000), RegimeKind::Old, claims))
            .unwrap()
            .result;
        assert_eq!(out.taxable_income, Decimal::ZERO);
        assert!(out.rows.is_empty());
        assert_eq!(out.total_tax, Decimal::ZERO);
    }

    #[test]
    fn test_rows_cover_taxable_income_and_sum_to_total() {
        let out = compute_tax(&input(dec!(1_734_567), RegimeKind::New, Deductions::default()))
            .unwrap()
            .result;
        let covered: Decimal = out.rows.iter().map(|r| r.taxable_amount).sum();
        assert_eq!(covered, out.taxable_income);
        let row_tax: Decimal = out.rows.iter().map(|r| r.tax).sum();
        assert_eq!(row_tax + out.cess, out.total_tax);
        assert!(out.rows.windows(2).all(|w| w[1].rate_percent >= w[0].rate_percent));
        assert!(out
            .rows
            .windows(2)
            .all(|w| w[0].upper_bound == Some(w[1].lower_bound)));
    }

    #[test]
    fn test_zero_income() {
        let out = compute_tax(&input(Decimal::ZERO, RegimeKind::New, Deductions::default()))
            .unwrap()
            .result;
        assert_eq!(out.total_tax, Decimal::ZERO);
        assert_eq!(out.effective_rate_percent, Decimal::ZERO);
    }

    #[test]
    fn test_custom_cess_rate() {
        let mut tax_input = input(dec!(1_200_000), RegimeKind::New, Deductions::default());
        tax_input.cess_rate_percent = Decimal::ZERO;
        let out = compute_tax(&tax_input).unwrap().result;
        assert_eq!(out.total_tax, out.slab_tax);
    }

    #[test]
    fn test_invalid_regime_fails_fast() {
        let mut tax_input = input(dec!(1_200_000), RegimeKind::New, Deductions::default());
        tax_input.regime.slabs.remove(2);
        assert!(matches!(
            compute_tax(&tax_input),
            Err(FinPlanError::InvalidRegime { .. })
        ));
    }

    #[test]
    fn test_overflow_is_precision_limit() {
        let mut tax_input = input(dec!(1_200_000), RegimeKind::New, Deductions::default());
        tax_input.cess_rate_percent = Decimal::MAX;
        assert!(matches!(
            compute_tax(&tax_input),
            Err(FinPlanError::PrecisionLimit { .. })
        ));

        let deductions = Deductions {
            hra: Decimal::MAX,
            home_loan_interest: Decimal::MAX,
            ..Deductions::default()
        };
        let tax_input = input(dec!(1_200_000), RegimeKind::Old, deductions);
        assert!(matches!(
            compute_tax(&tax_input),
            Err(FinPlanError::PrecisionLimit { .. })
        ));
    }

    #[test]
    fn test_negative_income_rejected() {
        let tax_input = input(dec!(-1), RegimeKind::New, Deductions::default());
        assert!(compute_tax(&tax_input).is_err());
    }

    #[test]
    fn test_compare_prefers_new_without_deductions() {
        let out = compare_regimes(&RegimeComparisonInput {
            gross_income: dec!(1_200_000),
            deductions: full_80c(),
            config: TaxConfig::default(),
        })
        .unwrap();
        assert_eq!(out.result.recommended, RegimeKind::New);
        assert_eq!(out.result.savings, dec!(39_000));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_compare_prefers_old_with_heavy_deductions() {
        let claims = Deductions {
            section_80c: dec!(150_000),
            hra: dec!(300_000),
            home_loan_interest: dec!(200_000),
        };
        let out = compare_regimes(&RegimeComparisonInput {
            gross_income: dec!(1_500_000),
            deductions: claims,
            config: TaxConfig::default(),
        })
        .unwrap();
        assert_eq!(out.result.recommended, RegimeKind::Old);
        assert!(out.result.savings > Decimal::ZERO);
    }
}
