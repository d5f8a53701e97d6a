use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::FinPlanError;
use crate::loans::amortization::{build_amortization, AmortizationOutput, LoanInput};
use crate::time_value::checked_add;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::FinPlanResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Identifier handed out by [`LoanBook::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named loan in a comparison session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub name: String,
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_years: u32,
}

impl LoanRecord {
    fn to_input(&self) -> LoanInput {
        LoanInput {
            principal: self.principal,
            annual_rate_percent: self.annual_rate_percent,
            tenure_years: self.tenure_years,
        }
    }
}

/// A loan together with its computed schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub id: LoanId,
    pub loan: LoanRecord,
    pub amortization: AmortizationOutput,
    /// Notes raised while amortising this loan.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Portfolio totals across every loan in the comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOutput {
    pub loans: Vec<LoanResult>,
    pub total_principal: Money,
    pub total_emi: Money,
    pub total_interest: Money,
    pub total_payable: Money,
    /// Loan names, most expensive first.
    pub prepayment_priority: Vec<String>,
}

/// Session collection of loans. Each loan is computed once when added and
/// never touched by later additions or removals.
#[derive(Debug, Clone, Default)]
pub struct LoanBook {
    entries: BTreeMap<LoanId, LoanResult>,
    next_id: u64,
}

// ---------------------------------------------------------------------------
// Loan book
// ---------------------------------------------------------------------------

impl LoanBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and amortise a loan, then store it under a fresh id.
    pub fn add(&mut self, loan: LoanRecord) -> FinPlanResult<LoanId> {
        if loan.name.trim().is_empty() {
            return Err(FinPlanError::invalid("name", "Loan name must not be empty"));
        }
        let mut warnings = Vec::new();
        let amortization = build_amortization(&loan.to_input(), &mut warnings)?;

        self.next_id += 1;
        let id = LoanId(self.next_id);
        log::debug!("loan book: added {id} '{}'", loan.name);
        self.entries.insert(
            id,
            LoanResult {
                id,
                loan,
                amortization,
                warnings,
            },
        );
        Ok(id)
    }

    /// Remove one loan. Unknown ids are rejected rather than ignored.
    pub fn remove(&mut self, id: LoanId) -> FinPlanResult<LoanRecord> {
        let removed = self.entries.remove(&id).ok_or_else(|| {
            FinPlanError::invalid("id", format!("no loan with id {id} in the comparison"))
        })?;
        log::debug!("loan book: removed {id} '{}'", removed.loan.name);
        Ok(removed.loan)
    }

    pub fn get(&self, id: LoanId) -> Option<&LoanResult> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loans in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &LoanResult> {
        self.entries.values()
    }

    /// Fold the stored per-loan results into portfolio totals.
    pub fn summary(&self) -> FinPlanResult<ComputationOutput<PortfolioOutput>> {
        let mut warnings = Vec::new();
        if self.entries.is_empty() {
            warnings.push("No loans in the comparison".to_string());
        }

        let loans: Vec<LoanResult> = self.entries.values().cloned().collect();

        let mut total_principal = Decimal::ZERO;
        let mut total_emi = Decimal::ZERO;
        let mut total_interest = Decimal::ZERO;
        let mut total_payable = Decimal::ZERO;
        for l in &loans {
            total_principal = checked_add(total_principal, l.loan.principal, "total principal")?;
            total_emi = checked_add(total_emi, l.amortization.emi, "total EMI")?;
            total_interest =
                checked_add(total_interest, l.amortization.total_interest, "total interest")?;
            total_payable =
                checked_add(total_payable, l.amortization.total_payable, "total payable")?;
            warnings.extend(l.warnings.iter().map(|w| format!("{}: {w}", l.loan.name)));
        }

        let mut ranked: Vec<&LoanResult> = loans.iter().collect();
        ranked.sort_by(|a, b| {
            b.loan
                .annual_rate_percent
                .cmp(&a.loan.annual_rate_percent)
                .then(b.loan.principal.cmp(&a.loan.principal))
        });
        let prepayment_priority = ranked.iter().map(|l| l.loan.name.clone()).collect();

        log::debug!(
            "loan book: {} loans, total_emi={total_emi} total_interest={total_interest}",
            loans.len()
        );

        let output = PortfolioOutput {
            loans,
            total_principal,
            total_emi,
            total_interest,
            total_payable,
            prepayment_priority,
        };

        Ok(with_metadata(
            "Multi-loan comparison (independent EMI schedules, summed totals)",
            &serde_json::json!({
                "loan_count": self.entries.len(),
                "totals": "sum of per-loan rounded figures",
            }),
            warnings,
            output,
        ))
    }
}

/// Compare a fixed list of loans. Ids are assigned in list order from 1.
pub fn aggregate(loans: &[LoanRecord]) -> FinPlanResult<ComputationOutput<PortfolioOutput>> {
    let mut book = LoanBook::new();
    for loan in loans {
        book.add(loan.clone())?;
    }
    book.summary()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(name: &str, principal: Decimal, rate: Decimal, tenure: u32) -> LoanRecord {
        LoanRecord {
            name: name.into(),
            principal,
            annual_rate_percent: rate,
            tenure_years: tenure,
        }
    }

    fn sample_loans() -> Vec<LoanRecord> {
        vec![
            record("Home Loan", dec!(2_500_000), dec!(8.5), 20),
            record("Car Loan", dec!(800_000), dec!(9.5), 7),
            record("Personal Loan", dec!(300_000), dec!(12.0), 5),
        ]
    }

    #[test]
    fn test_totals_are_sums_of_loans() {
        let out = aggregate(&sample_loans()).unwrap().result;
        let emi_sum: Decimal = out.loans.iter().map(|l| l.amortization.emi).sum();
        assert_eq!(out.total_emi, emi_sum);
        assert_eq!(out.total_principal, dec!(3_600_000));
        assert_eq!(out.total_payable, out.total_principal + out.total_interest);
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let out = aggregate(&sample_loans()).unwrap().result;
        let ids: Vec<u64> = out.loans.iter().map(|l| l.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_prepayment_priority_by_rate() {
        let out = aggregate(&sample_loans()).unwrap().result;
        assert_eq!(
            out.prepayment_priority,
            vec!["Personal Loan", "Car Loan", "Home Loan"]
        );
    }

    #[test]
    fn test_remove_leaves_other_loans_untouched() {
        let mut book = LoanBook::new();
        let home = book.add(sample_loans()[0].clone()).unwrap();
        let car = book.add(sample_loans()[1].clone()).unwrap();
        let before = book.get(home).unwrap().clone();

        book.remove(car).unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.get(home).unwrap(), &before);
        assert!(book.remove(car).is_err());
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut book = LoanBook::new();
        let first = book.add(sample_loans()[0].clone()).unwrap();
        book.remove(first).unwrap();
        let second = book.add(sample_loans()[1].clone()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_loan_is_not_added() {
        let mut book = LoanBook::new();
        assert!(book.add(record("", dec!(1000), dec!(5), 1)).is_err());
        assert!(book.add(record("Bad", dec!(-1000), dec!(5), 1)).is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn test_per_loan_warnings_reach_summary() {
        let mut book = LoanBook::new();
        let id = book.add(sample_loans()[1].clone()).unwrap();
        book.add(sample_loans()[2].clone()).unwrap();
        assert!(book.summary().unwrap().warnings.is_empty());

        book.entries
            .get_mut(&id)
            .unwrap()
            .warnings
            .push("Loan fully repaid in year 6, before the 7-year tenure".into());
        let out = book.summary().unwrap();
        assert_eq!(
            out.warnings,
            vec!["Car Loan: Loan fully repaid in year 6, before the 7-year tenure"]
        );
    }

    #[test]
    fn test_empty_book_warns() {
        let out = LoanBook::new().summary().unwrap();
        assert_eq!(out.result.total_emi, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }
}
