use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinPlanError;
use crate::time_value::HUNDRED;
use crate::types::{Money, Percent};
use crate::FinPlanResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Income band taxed at a single marginal rate. `upper_bound: None` is
/// unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub lower_bound: Money,
    pub upper_bound: Option<Money>,
    pub rate_percent: Percent,
}

impl TaxSlab {
    pub fn new(lower_bound: Money, upper_bound: Option<Money>, rate_percent: Percent) -> Self {
        TaxSlab {
            lower_bound,
            upper_bound,
            rate_percent,
        }
    }

    /// Portion of `income` that falls inside this slab.
    pub fn taxable_portion(&self, income: Money) -> Money {
        let top = match self.upper_bound {
            Some(upper) => income.min(upper),
            None => income,
        };
        (top - self.lower_bound).max(Decimal::ZERO)
    }
}

/// A complete partition of [0, ∞) into slabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRegime {
    pub name: String,
    /// Whether 80C / HRA / home-loan deductions reduce taxable income.
    pub allows_deductions: bool,
    pub slabs: Vec<TaxSlab>,
}

/// Which of the configured regimes to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeKind {
    Old,
    #[default]
    New,
}

impl fmt::Display for RegimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegimeKind::Old => f.write_str("old"),
            RegimeKind::New => f.write_str("new"),
        }
    }
}

impl FromStr for RegimeKind {
    type Err = FinPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Ok(RegimeKind::Old),
            "new" => Ok(RegimeKind::New),
            other => Err(FinPlanError::invalid(
                "regime",
                format!("unknown regime '{other}', expected 'old' or 'new'"),
            )),
        }
    }
}

/// Statutory ceilings on deductions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionLimits {
    pub section_80c_cap: Money,
    pub home_loan_interest_cap: Money,
}

impl Default for DeductionLimits {
    fn default() -> Self {
        DeductionLimits {
            section_80c_cap: dec!(150_000),
            home_loan_interest_cap: dec!(200_000),
        }
    }
}

/// Slab tables, deduction caps and cess for one assessment year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub old_regime: TaxRegime,
    pub new_regime: TaxRegime,
    #[serde(default)]
    pub limits: DeductionLimits,
    pub cess_rate_percent: Percent,
}

impl Default for TaxConfig {
    fn default() -> Self {
        TaxConfig {
            old_regime: TaxRegime::india_old_fy2024_25(),
            new_regime: TaxRegime::india_new_fy2024_25(),
            limits: DeductionLimits::default(),
            cess_rate_percent: dec!(4),
        }
    }
}

impl TaxConfig {
    pub fn regime(&self, kind: RegimeKind) -> &TaxRegime {
        match kind {
            RegimeKind::Old => &self.old_regime,
            RegimeKind::New => &self.new_regime,
        }
    }
}

// ---------------------------------------------------------------------------
// Regime tables and validation
// ---------------------------------------------------------------------------

impl TaxRegime {
    /// Old regime, FY 2024-25: deductions allowed.
    pub fn india_old_fy2024_25() -> Self {
        TaxRegime {
            name: "old".into(),
            allows_deductions: true,
            slabs: vec![
                TaxSlab::new(dec!(0), Some(dec!(250_000)), dec!(0)),
                TaxSlab::new(dec!(250_000), Some(dec!(500_000)), dec!(5)),
                TaxSlab::new(dec!(500_000), Some(dec!(1_000_000)), dec!(20)),
                TaxSlab::new(dec!(1_000_000), None, dec!(30)),
            ],
        }
    }

    /// New regime, FY 2024-25: no deductions.
    pub fn india_new_fy2024_25() -> Self {
        TaxRegime {
            name: "new".into(),
            allows_deductions: false,
            slabs: vec![
                TaxSlab::new(dec!(0), Some(dec!(300_000)), dec!(0)),
                TaxSlab::new(dec!(300_000), Some(dec!(600_000)), dec!(5)),
                TaxSlab::new(dec!(600_000), Some(dec!(900_000)), dec!(10)),
                TaxSlab::new(dec!(900_000), Some(dec!(1_200_000)), dec!(15)),
                TaxSlab::new(dec!(1_200_000), Some(dec!(1_500_000)), dec!(20)),
                TaxSlab::new(dec!(1_500_000), None, dec!(30)),
            ],
        }
    }

    /// Check the slabs start at zero, are contiguous, end unbounded, and have
    /// non-decreasing rates within [0, 100].
    pub fn validate(&self) -> FinPlanResult<()> {
        let fail = |reason: String| FinPlanError::InvalidRegime {
            regime: self.name.clone(),
            reason,
        };

        let first = self
            .slabs
            .first()
            .ok_or_else(|| fail("regime has no slabs".into()))?;
        if !first.lower_bound.is_zero() {
            return Err(fail(format!(
                "first slab starts at {} instead of 0",
                first.lower_bound
            )));
        }

        let last_index = self.slabs.len() - 1;
        let mut previous: Option<&TaxSlab> = None;
        for (i, slab) in self.slabs.iter().enumerate() {
            if slab.rate_percent < Decimal::ZERO || slab.rate_percent > HUNDRED {
                return Err(fail(format!(
                    "slab {i} rate {}% outside [0, 100]",
                    slab.rate_percent
                )));
            }
            match slab.upper_bound {
                Some(upper) if upper <= slab.lower_bound => {
                    return Err(fail(format!(
                        "slab {i} upper bound {upper} not above lower bound {}",
                        slab.lower_bound
                    )));
                }
                Some(_) if i == last_index => {
                    return Err(fail("last slab must be unbounded".into()));
                }
                None if i != last_index => {
                    return Err(fail(format!("slab {i} is unbounded but not last")));
                }
                _ => {}
            }
            if let Some(prev) = previous {
                // prev.upper_bound is Some: only the last slab may be unbounded
                let prev_upper = prev.upper_bound.unwrap_or(Decimal::MAX);
                if slab.lower_bound > prev_upper {
                    return Err(fail(format!(
                        "gap between {prev_upper} and {}",
                        slab.lower_bound
                    )));
                }
                if slab.lower_bound < prev_upper {
                    return Err(fail(format!(
                        "slab {i} starting at {} overlaps previous slab ending at {prev_upper}",
                        slab.lower_bound
                    )));
                }
                if slab.rate_percent < prev.rate_percent {
                    return Err(fail(format!(
                        "slab {i} rate {}% is below the previous {}%",
                        slab.rate_percent, prev.rate_percent
                    )));
                }
            }
            previous = Some(slab);
        }
        Ok(())
    }

    /// Marginal rate applying to the last unit of `income`.
    pub fn marginal_rate(&self, income: Money) -> Percent {
        self.slabs
            .iter()
            .rev()
            .find(|s| income > s.lower_bound)
            .map(|s| s.rate_percent)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
