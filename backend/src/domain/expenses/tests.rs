//! Regression coverage for the expense aggregate.

use chrono::{NaiveDate, Utc};
use rstest::rstest;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ActorId;

use super::*;

fn sample_draft() -> ExpenseDraft {
    ExpenseDraft {
        id: Uuid::new_v4(),
        assignment_id: Uuid::new_v4(),
        expense_type: ExpenseType::Travel,
        date: NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
        amount: Decimal::new(15000, 2),
        description: "minibus to Chileka".to_owned(),
        receipt_ref: None,
        approval: None,
        created_at: Utc::now(),
    }
}

#[test]
fn accepts_positive_amount() {
    let expense = Expense::new(sample_draft()).expect("valid expense");
    assert!(!expense.is_approved());
    assert_eq!(expense.amount(), Decimal::new(15000, 2));
}

#[rstest]
#[case(Decimal::ZERO)]
#[case(Decimal::new(-500, 2))]
fn rejects_non_positive_amount(#[case] amount: Decimal) {
    let mut draft = sample_draft();
    draft.amount = amount;
    let err = Expense::new(draft).expect_err("non-positive amount");
    assert!(matches!(
        err,
        ExpenseValidationError::NonPositiveAmount { .. }
    ));
}

#[test]
fn approval_stamp_marks_expense_approved() {
    let mut draft = sample_draft();
    draft.approval = Some(Approval {
        approved_by: ActorId::random(),
        approved_at: Utc::now(),
    });
    let expense = Expense::new(draft).expect("valid expense");
    assert!(expense.is_approved());
}

#[test]
fn expense_type_round_trips_through_strings() {
    for kind in [
        ExpenseType::Travel,
        ExpenseType::Food,
        ExpenseType::Communication,
        ExpenseType::Accommodation,
        ExpenseType::Materials,
        ExpenseType::Other,
    ] {
        let parsed: ExpenseType = kind.as_str().parse().expect("parse expense type");
        assert_eq!(parsed, kind);
    }
    assert!("fuel".parse::<ExpenseType>().is_err());
}
