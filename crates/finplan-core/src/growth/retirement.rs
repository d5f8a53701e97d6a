use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinPlanError;
use crate::growth::projection::{check_horizon, check_non_negative};
use crate::time_value::{
    checked_add, checked_mul, fv, growth_factor, monthly_rate, percent_to_rate, pmt, pv,
    MONTHS_PER_YEAR,
};
use crate::types::{
    round_money, with_metadata, ComputationOutput, Money, Percent, ProjectionSummary,
};
use crate::FinPlanResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementConfig {
    /// Years the corpus has to fund expenses after retiring.
    pub post_retirement_years: u32,
}

impl Default for RetirementConfig {
    fn default() -> Self {
        RetirementConfig {
            post_retirement_years: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_monthly_expenses: Money,
    pub inflation_rate_percent: Percent,
    pub expected_return_percent: Percent,
    pub current_savings: Money,
    #[serde(default)]
    pub config: RetirementConfig,
}

/// One year of the accumulation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementYear {
    pub year: u32,
    pub age: u32,
    pub corpus: Money,
    pub annual_expenses: Money,
    pub sip_invested: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementOutput {
    pub years_to_retirement: u32,
    pub future_monthly_expenses: Money,
    pub required_corpus: Money,
    pub corpus_in_todays_terms: Money,
    pub future_value_current_savings: Money,
    pub additional_corpus_needed: Money,
    pub required_monthly_sip: Money,
    pub total_sip_investment: Money,
    pub corpus_multiple: Decimal,
    pub summary: ProjectionSummary,
    pub projection: Vec<RetirementYear>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Size the retirement corpus and back-solve the monthly SIP that funds it.
///
/// The corpus covers `post_retirement_years` of expenses growing with
/// inflation. The yearly projection adds each year's SIP in one lump before
/// applying the annual return.
pub fn plan_retirement(
    input: &RetirementInput,
) -> FinPlanResult<ComputationOutput<RetirementOutput>> {
    if input.retirement_age <= input.current_age {
        return Err(FinPlanError::invalid(
            "retirement_age",
            "retirement_age must be greater than current_age",
        ));
    }
    let years = input.retirement_age - input.current_age;
    check_horizon("retirement_age", years)?;
    check_horizon(
        "config.post_retirement_years",
        input.config.post_retirement_years,
    )?;
    check_non_negative("current_monthly_expenses", input.current_monthly_expenses)?;
    check_non_negative("current_savings", input.current_savings)?;
    check_non_negative("inflation_rate_percent", input.inflation_rate_percent)?;
    check_non_negative("expected_return_percent", input.expected_return_percent)?;

    log::debug!(
        "retirement: age {}->{} expenses={} inflation={}% return={}%",
        input.current_age,
        input.retirement_age,
        input.current_monthly_expenses,
        input.inflation_rate_percent,
        input.expected_return_percent
    );

    let inflation = percent_to_rate(input.inflation_rate_percent);
    let annual_return = percent_to_rate(input.expected_return_percent);
    let mut warnings: Vec<String> = Vec::new();

    // ===================================================================
    // Corpus sizing
    // ===================================================================
    let future_monthly_expenses = checked_mul(
        input.current_monthly_expenses,
        growth_factor(inflation, years)?,
        "future monthly expenses",
    )?;
    let first_year_expenses = checked_mul(
        future_monthly_expenses,
        Decimal::from(MONTHS_PER_YEAR),
        "first-year expenses",
    )?;
    let required_corpus = fv(
        inflation,
        input.config.post_retirement_years,
        -first_year_expenses,
        Decimal::ZERO,
    )?;
    let corpus_in_todays_terms = pv(inflation, years, Decimal::ZERO, -required_corpus)?;

    // ===================================================================
    // Funding gap and SIP
    // ===================================================================
    let future_value_savings = checked_mul(
        input.current_savings,
        growth_factor(annual_return, years)?,
        "future value of savings",
    )?;
    let additional_corpus = (required_corpus - future_value_savings).max(Decimal::ZERO);
    if additional_corpus.is_zero() {
        warnings.push("Current savings already cover the required corpus".into());
    }

    let months = years * MONTHS_PER_YEAR;
    let required_sip = pmt(
        monthly_rate(input.expected_return_percent)?,
        months,
        Decimal::ZERO,
        -additional_corpus,
    )?;

    // ===================================================================
    // Year-by-year projection
    // ===================================================================
    let annual_sip = checked_mul(required_sip, Decimal::from(MONTHS_PER_YEAR), "annual SIP")?;
    let mut corpus = input.current_savings;
    let mut projection = Vec::with_capacity(years as usize);
    for year in 1..=years {
        corpus = checked_mul(
            checked_add(corpus, annual_sip, "retirement corpus")?,
            Decimal::ONE + annual_return,
            "retirement corpus",
        )?;
        let expenses = checked_mul(
            input.current_monthly_expenses,
            growth_factor(inflation, year)?,
            "projected expenses",
        )?;
        projection.push(RetirementYear {
            year,
            age: input.current_age + year,
            corpus: round_money(corpus),
            annual_expenses: round_money(checked_mul(
                expenses,
                Decimal::from(MONTHS_PER_YEAR),
                "projected expenses",
            )?),
            sip_invested: round_money(checked_mul(
                annual_sip,
                Decimal::from(year),
                "SIP invested",
            )?),
        });
    }

    let total_sip = checked_mul(required_sip, Decimal::from(months), "total SIP")?;
    let annual_expenses_today = checked_mul(
        input.current_monthly_expenses,
        Decimal::from(MONTHS_PER_YEAR),
        "annual expenses",
    )?;
    let corpus_multiple = if annual_expenses_today.is_zero() {
        Decimal::ZERO
    } else {
        round_money(required_corpus.checked_div(annual_expenses_today).ok_or_else(|| {
            FinPlanError::PrecisionLimit {
                context: "corpus multiple".into(),
            }
        })?)
    };

    let total_principal = checked_add(input.current_savings, total_sip, "total principal")?;
    let summary =
        ProjectionSummary::from_parts(total_principal, (corpus - total_principal).max(Decimal::ZERO));

    log::debug!("retirement: corpus={required_corpus} sip={required_sip}");

    let output = RetirementOutput {
        years_to_retirement: years,
        future_monthly_expenses: round_money(future_monthly_expenses),
        required_corpus: round_money(required_corpus),
        corpus_in_todays_terms: round_money(corpus_in_todays_terms),
        future_value_current_savings: round_money(future_value_savings),
        additional_corpus_needed: round_money(additional_corpus),
        required_monthly_sip: round_money(required_sip),
        total_sip_investment: round_money(total_sip),
        corpus_multiple,
        summary,
        projection,
    };

    Ok(with_metadata(
        "Retirement corpus (inflation-grown expenses) with back-solved monthly SIP",
        &serde_json::json!({
            "current_age": input.current_age,
            "retirement_age": input.retirement_age,
            "post_retirement_years": input.config.post_retirement_years,
            "inflation_rate_percent": input.inflation_rate_percent.to_string(),
            "expected_return_percent": input.expected_return_percent.to_string(),
            "sip_timing": "end of month, projection credits SIP once per year",
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
    use rust_decimal_macros::dec;

    fn default_input() -> RetirementInput {
        RetirementInput {
            current_age: 30,
            retirement_age: 60,
            current_monthly_expenses: dec!(50_000),
            inflation_rate_percent: dec!(6),
            expected_return_percent: dec!(12),
            current_savings: dec!(500_000),
            config: RetirementConfig::default(),
        }
    }

    fn close(actual: Decimal, expected: Decimal, tol: Decimal) -> bool {
        (actual - expected).abs() <= tol
    }

    #[test]
    fn test_future_expenses_inflated() {
        let out = plan_retirement(&default_input()).unwrap().result;
        assert_eq!(out.years_to_retirement, 30);
        // 50,000 * 1.06^30 = 287,174.56
        assert!(close(out.future_monthly_expenses, dec!(287_175), dec!(1)));
    }

    #[test]
    fn test_required_corpus() {
        let out = plan_retirement(&default_input()).unwrap().result;
        // 287,174.56 * 12 * (1.06^25 - 1) / 0.06 = 189,068,304
        assert!(
            close(out.required_corpus, dec!(189_068_304), dec!(2)),
            "corpus={}",
            out.required_corpus
        );
        assert_eq!(out.corpus_multiple, dec!(315));
    }

    #[test]
    fn test_required_monthly_sip() {
        let out = plan_retirement(&default_input()).unwrap().result;
        // 174,088,343 * 0.01 / (1.01^360 - 1) = 49,811.20
        assert!(
            close(out.required_monthly_sip, dec!(49_811), dec!(1)),
            "sip={}",
            out.required_monthly_sip
        );
        assert!(close(out.future_value_current_savings, dec!(14_979_961), dec!(1)));
    }

    #[test]
    fn test_corpus_in_todays_terms() {
        let out = plan_retirement(&default_input()).unwrap().result;
        assert!(close(out.corpus_in_todays_terms, dec!(32_918_707), dec!(2)));
    }

    #[test]
    fn test_already_funded_needs_no_sip() {
        let mut input = default_input();
        input.current_savings = dec!(100_000_000);
        let out = plan_retirement(&input).unwrap();
        assert_eq!(out.result.additional_corpus_needed, Decimal::ZERO);
        assert_eq!(out.result.required_monthly_sip, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_zero_inflation_corpus_is_linear() {
        let mut input = default_input();
        input.inflation_rate_percent = Decimal::ZERO;
        let out = plan_retirement(&input).unwrap().result;
        assert_eq!(out.future_monthly_expenses, dec!(50_000));
        assert_eq!(out.required_corpus, dec!(15_000_000));
    }

    #[test]
    fn test_zero_return_sip_is_even_split() {
        let mut input = default_input();
        input.expected_return_percent = Decimal::ZERO;
        input.inflation_rate_percent = Decimal::ZERO;
        input.current_savings = Decimal::ZERO;
        let out = plan_retirement(&input).unwrap().result;
        // 15,000,000 over 360 months
        assert!(close(out.required_monthly_sip, dec!(41_667), dec!(0)));
    }

    #[test]
    fn test_projection_length_and_ages() {
        let out = plan_retirement(&default_input()).unwrap().result;
        assert_eq!(out.projection.len(), 30);
        assert_eq!(out.projection.first().unwrap().age, 31);
        assert_eq!(out.projection.last().unwrap().age, 60);
        assert!(out
            .projection
            .windows(2)
            .all(|w| w[1].corpus > w[0].corpus));
    }

    #[test]
    fn test_overflow_is_precision_limit() {
        let mut input = default_input();
        input.current_monthly_expenses = dec!(100_000_000_000_000_000_000);
        input.inflation_rate_percent = dec!(100);
        assert!(matches!(
            plan_retirement(&input),
            Err(FinPlanError::PrecisionLimit { .. })
        ));

        let mut input = default_input();
        input.current_savings = dec!(100_000_000_000_000_000_000);
        input.expected_return_percent = dec!(100);
        assert!(matches!(
            plan_retirement(&input),
            Err(FinPlanError::PrecisionLimit { .. })
        ));
    }

    #[test]
    fn test_retirement_age_must_exceed_current() {
        let mut input = default_input();
        input.retirement_age = 30;
        assert!(plan_retirement(&input).is_err());
        input.retirement_age = 25;
        assert!(plan_retirement(&input).is_err());
    }
}
