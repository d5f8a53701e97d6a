use finplan_core::loans::amortization::{amortize, LoanInput};
use finplan_core::loans::portfolio::{aggregate, LoanBook, LoanId, LoanRecord};
use finplan_core::FinPlanError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Single-loan amortisation
// ===========================================================================

fn loan(principal: Decimal, rate: Decimal, years: u32) -> LoanInput {
    LoanInput {
        principal,
        annual_rate_percent: rate,
        tenure_years: years,
    }
}

#[test]
fn test_home_loan_worked_example() {
    let out = amortize(&loan(dec!(2_500_000), dec!(8.5), 20)).unwrap();
    let r = &out.result;

    assert_eq!(r.emi, dec!(21_696));
    assert_eq!(r.months, 240);
    assert_eq!(r.schedule.len(), 20);
    assert!((r.total_interest - dec!(2_706_939)).abs() <= dec!(1));
    assert_eq!(r.total_payable, dec!(2_500_000) + r.total_interest);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_principal_portions_sum_to_principal_across_loans() {
    let cases = [
        loan(dec!(2_500_000), dec!(8.5), 20),
        loan(dec!(800_000), dec!(9.5), 7),
        loan(dec!(300_000), dec!(12), 5),
        loan(dec!(50_000), dec!(24), 1),
        loan(dec!(10_000_000), dec!(7.25), 30),
    ];
    for input in &cases {
        let out = amortize(input).unwrap().result;
        let repaid: Decimal = out.schedule.iter().map(|e| e.principal_portion).sum();
        // Each yearly row is rounded independently
        let tolerance = Decimal::from(out.schedule.len());
        assert!(
            (repaid - input.principal).abs() <= tolerance,
            "principal {} repaid {}",
            input.principal,
            repaid
        );
        assert_eq!(out.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }
}

#[test]
fn test_zero_rate_emi_is_straight_line() {
    let out = amortize(&loan(dec!(600_000), Decimal::ZERO, 5)).unwrap().result;
    assert_eq!(out.emi, dec!(10_000));
    assert_eq!(out.total_interest, Decimal::ZERO);
    assert_eq!(out.interest_share_percent, Decimal::ZERO);
    let balances: Vec<Decimal> = out.schedule.iter().map(|e| e.remaining_balance).collect();
    assert_eq!(
        balances,
        vec![
            dec!(480_000),
            dec!(360_000),
            dec!(240_000),
            dec!(120_000),
            Decimal::ZERO
        ]
    );
}

#[test]
fn test_yearly_interest_declines() {
    let out = amortize(&loan(dec!(2_500_000), dec!(8.5), 20)).unwrap().result;
    for pair in out.schedule.windows(2) {
        assert!(pair[1].interest_portion < pair[0].interest_portion);
        assert!(pair[1].principal_portion > pair[0].principal_portion);
    }
}

#[test]
fn test_invalid_loan_reports_field() {
    let err = amortize(&loan(dec!(-5), dec!(8.5), 20)).unwrap_err();
    match err {
        FinPlanError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
        other => panic!("unexpected error {other:?}"),
    }
}

// ===========================================================================
// Multi-loan comparison
// ===========================================================================

fn record(name: &str, principal: Decimal, rate: Decimal, years: u32) -> LoanRecord {
    LoanRecord {
        name: name.into(),
        principal,
        annual_rate_percent: rate,
        tenure_years: years,
    }
}

#[test]
fn test_aggregate_matches_individual_loans() {
    let records = vec![
        record("Home", dec!(2_500_000), dec!(8.5), 20),
        record("Car", dec!(800_000), dec!(9.5), 7),
    ];
    let out = aggregate(&records).unwrap().result;

    for (result, rec) in out.loans.iter().zip(&records) {
        let single = amortize(&loan(rec.principal, rec.annual_rate_percent, rec.tenure_years))
            .unwrap()
            .result;
        assert_eq!(result.amortization, single);
    }
    assert_eq!(
        out.total_emi,
        out.loans.iter().map(|l| l.amortization.emi).sum::<Decimal>()
    );
    assert_eq!(
        out.total_interest,
        out.loans
            .iter()
            .map(|l| l.amortization.total_interest)
            .sum::<Decimal>()
    );
}

#[test]
fn test_add_then_remove_restores_totals() {
    let mut book = LoanBook::new();
    book.add(record("Home", dec!(2_500_000), dec!(8.5), 20)).unwrap();
    book.add(record("Car", dec!(800_000), dec!(9.5), 7)).unwrap();
    let before = book.summary().unwrap().result;

    let extra = book
        .add(record("Personal", dec!(300_000), dec!(12), 5))
        .unwrap();
    assert_eq!(book.len(), 3);
    let removed = book.remove(extra).unwrap();
    assert_eq!(removed.name, "Personal");

    let after = book.summary().unwrap().result;
    assert_eq!(after.total_emi, before.total_emi);
    assert_eq!(after.total_interest, before.total_interest);
    assert_eq!(after.total_payable, before.total_payable);
    assert_eq!(after.loans, before.loans);
}

#[test]
fn test_remove_unknown_id_fails() {
    let mut book = LoanBook::new();
    assert!(book.remove(LoanId(42)).is_err());
    assert!(book.is_empty());
}

#[test]
fn test_empty_comparison_warns() {
    let out = aggregate(&[]).unwrap();
    assert_eq!(out.result.total_emi, Decimal::ZERO);
    assert!(out.result.prepayment_priority.is_empty());
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_invalid_loan_leaves_book_unchanged() {
    let mut book = LoanBook::new();
    book.add(record("Home", dec!(2_500_000), dec!(8.5), 20)).unwrap();
    assert!(book.add(record("Broken", dec!(100_000), dec!(9), 0)).is_err());
    assert!(book.add(record("  ", dec!(100_000), dec!(9), 3)).is_err());
    assert_eq!(book.len(), 1);
}

#[test]
fn test_loan_records_from_json() {
    let records: Vec<LoanRecord> = serde_json::from_str(
        r#"[
            {"name": "Home", "principal": "2500000", "annual_rate_percent": "8.5", "tenure_years": 20},
            {"name": "Car", "principal": "800000", "annual_rate_percent": "9.5", "tenure_years": 7}
        ]"#,
    )
    .unwrap();
    let out = aggregate(&records).unwrap().result;
    assert_eq!(out.prepayment_priority, vec!["Car", "Home"]);
}
