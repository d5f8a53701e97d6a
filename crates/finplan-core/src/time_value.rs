use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinPlanError;
use crate::types::{Money, Percent, Rate};
use crate::FinPlanResult;

/// Longest horizon any growth projection may run for.
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Longest loan tenure accepted by the amortisation schedule.
pub const MAX_TENURE_YEARS: u32 = 50;

pub(crate) const HUNDRED: Decimal = dec!(100);
pub(crate) const MONTHS_PER_YEAR: u32 = 12;

/// How many times per year interest is credited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingFrequency {
    #[default]
    Annually,
    SemiAnnually,
    Quarterly,
    Monthly,
    Daily,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Annually => 1,
            CompoundingFrequency::SemiAnnually => 2,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Daily => 365,
        }
    }
}

impl fmt::Display for CompoundingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompoundingFrequency::Annually => "annually",
            CompoundingFrequency::SemiAnnually => "semi_annually",
            CompoundingFrequency::Quarterly => "quarterly",
            CompoundingFrequency::Monthly => "monthly",
            CompoundingFrequency::Daily => "daily",
        };
        f.write_str(s)
    }
}

impl FromStr for CompoundingFrequency {
    type Err = FinPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annually" | "annual" | "yearly" => Ok(CompoundingFrequency::Annually),
            "semiannually" | "semi_annually" | "semi-annually" => {
                Ok(CompoundingFrequency::SemiAnnually)
            }
            "quarterly" => Ok(CompoundingFrequency::Quarterly),
            "monthly" => Ok(CompoundingFrequency::Monthly),
            "daily" => Ok(CompoundingFrequency::Daily),
            other => Err(FinPlanError::invalid(
                "compounding",
                format!("unknown compounding frequency '{other}'"),
            )),
        }
    }
}

/// An annual nominal rate together with its compounding convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSpec {
    pub annual_rate_percent: Percent,
    #[serde(default)]
    pub compounding: CompoundingFrequency,
}

impl RateSpec {
    pub fn new(annual_rate_percent: Percent, compounding: CompoundingFrequency) -> Self {
        RateSpec {
            annual_rate_percent,
            compounding,
        }
    }

    /// Rate credited each compounding period.
    pub fn periodic_rate(&self) -> FinPlanResult<Rate> {
        periodic_rate(self.annual_rate_percent, self.compounding.periods_per_year())
    }

    /// Growth of one unit over a full year: (1 + r/m)^m.
    pub fn annual_growth_factor(&self) -> FinPlanResult<Decimal> {
        growth_factor(self.periodic_rate()?, self.compounding.periods_per_year())
    }
}

/// Convert percentage points to a decimal rate (8.5 -> 0.085).
pub fn percent_to_rate(percent: Percent) -> Rate {
    percent / HUNDRED
}

/// Annual percentage rate split evenly over `periods_per_year` periods.
pub fn periodic_rate(annual_rate_percent: Percent, periods_per_year: u32) -> FinPlanResult<Rate> {
    if annual_rate_percent < Decimal::ZERO {
        return Err(FinPlanError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    if periods_per_year == 0 {
        return Err(FinPlanError::DivisionByZero {
            context: "periodic rate with zero periods per year".into(),
        });
    }
    Ok(percent_to_rate(annual_rate_percent) / Decimal::from(periods_per_year))
}

/// Monthly rate used by loans, SIPs and retirement contributions.
pub fn monthly_rate(annual_rate_percent: Percent) -> FinPlanResult<Rate> {
    periodic_rate(annual_rate_percent, MONTHS_PER_YEAR)
}

/// (1 + rate)^n with an overflow check instead of a panic.
pub fn growth_factor(rate: Rate, n: u32) -> FinPlanResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(u64::from(n))
        .ok_or_else(|| FinPlanError::PrecisionLimit {
            context: format!("(1 + {rate})^{n}"),
        })
}

/// `a * b`, reporting overflow as `PrecisionLimit`.
pub fn checked_mul(a: Decimal, b: Decimal, context: &str) -> FinPlanResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| FinPlanError::PrecisionLimit {
        context: context.into(),
    })
}

/// `a + b`, reporting overflow as `PrecisionLimit`.
pub fn checked_add(a: Decimal, b: Decimal, context: &str) -> FinPlanResult<Decimal> {
    a.checked_add(b).ok_or_else(|| FinPlanError::PrecisionLimit {
        context: context.into(),
    })
}

/// Present Value
pub fn pv(rate: Rate, nper: u32, pmt: Money, fv: Money) -> FinPlanResult<Money> {
    if rate.is_zero() {
        let paid = checked_mul(pmt, Decimal::from(nper), "PV payments")?;
        return Ok(-checked_add(paid, fv, "PV")?);
    }

    let factor = growth_factor(rate, nper)?;

    if factor.is_zero() {
        return Err(FinPlanError::DivisionByZero {
            context: "PV factor".into(),
        });
    }

    let annuity_factor = (Decimal::ONE - Decimal::ONE / factor) / rate;
    let paid = checked_mul(pmt, annuity_factor, "PV annuity")?;
    Ok(-checked_add(paid, fv / factor, "PV")?)
}

/// Future Value
pub fn fv(rate: Rate, nper: u32, pmt: Money, present_value: Money) -> FinPlanResult<Money> {
    if rate.is_zero() {
        let paid = checked_mul(pmt, Decimal::from(nper), "FV payments")?;
        return Ok(-checked_add(present_value, paid, "FV")?);
    }

    let factor = growth_factor(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    let grown = checked_mul(present_value, factor, "FV present value")?;
    let paid = checked_mul(pmt, annuity_factor, "FV annuity")?;
    Ok(-checked_add(grown, paid, "FV")?)
}

/// Payment (PMT)
///
/// Loans solve with a present value (`pmt(r, n, -principal, 0)`); savings
/// targets solve with a future value (`pmt(r, n, 0, -target)`).
pub fn pmt(
    rate: Rate,
    nper: u32,
    present_value: Money,
    future_value: Money,
) -> FinPlanResult<Money> {
    if nper == 0 {
        return Err(FinPlanError::invalid(
            "nper",
            "Number of periods must be > 0",
        ));
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = growth_factor(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(FinPlanError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    let grown = checked_mul(present_value, factor, "PMT present value")?;
    Ok(-checked_add(grown, future_value, "PMT")? / annuity_factor)
}

/// Compound annual growth rate, in percent, turning `start` into `end` over
/// `years` years.
pub fn cagr_percent(start: Money, end: Money, years: u32) -> FinPlanResult<Percent> {
    if start <= Decimal::ZERO || end <= Decimal::ZERO || years == 0 {
        return Ok(Decimal::ZERO);
    }
    let exponent = Decimal::ONE / Decimal::from(years);
    let ratio = end.checked_div(start).ok_or_else(|| FinPlanError::PrecisionLimit {
        context: format!("{end} / {start}"),
    })?;
    let growth = ratio
        .checked_powd(exponent)
        .ok_or_else(|| FinPlanError::PrecisionLimit {
            context: format!("({ratio})^(1/{years})"),
        })?;
    checked_mul(growth - Decimal::ONE, HUNDRED, "CAGR percent")
}
