//! Expense approval workflow over the real services.
//!
//! Covers filing, editing and deleting pending claims, the edit lock on
//! approved claims, idempotent approval and the summary aggregates.

use backend::domain::ports::{
    ApproveExpenseRequest, CreateExpenseRequest, DeleteExpenseRequest, ExpenseCommand,
    ExpenseQuery, ExpenseSummaryRequest, GetExpenseRequest, ListExpensesRequest,
    UpdateExpenseRequest,
};
use backend::domain::{AssignmentStatus, ErrorCode, ExpenseType};
use rust_decimal::Decimal;
use uuid::Uuid;

mod support;

use support::{actor, booked_assignment, day, field_ops};

fn claim(assignment_id: Uuid, expense_type: ExpenseType, cents: i64) -> CreateExpenseRequest {
    CreateExpenseRequest {
        actor: actor(),
        assignment_id,
        expense_type,
        date: day(3, 5),
        amount: Decimal::new(cents, 2),
        description: "minibus fare to the survey cluster".to_owned(),
        receipt_ref: None,
    }
}

#[tokio::test]
async fn filing_a_claim_records_it_as_pending() {
    let ops = field_ops();
    let assignment_id = booked_assignment(&ops, Uuid::new_v4(), AssignmentStatus::Active)
        .await
        .expect("activate");

    let response = ops
        .expenses
        .create(claim(assignment_id, ExpenseType::Travel, 12050))
        .await
        .expect("create succeeds");
    assert!(response.expense.approval.is_none());
    assert_eq!(response.expense.amount, Decimal::new(12050, 2));

    let fetched = ops
        .expenses
        .get(GetExpenseRequest {
            expense_id: response.expense.id,
        })
        .await
        .expect("get succeeds");
    assert_eq!(fetched, response.expense);
}

#[tokio::test]
async fn claims_against_unknown_assignments_are_refused() {
    let ops = field_ops();
    let error = ops
        .expenses
        .create(claim(Uuid::new_v4(), ExpenseType::Food, 3000))
        .await
        .expect_err("missing assignment");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn non_positive_amounts_are_refused() {
    let ops = field_ops();
    let assignment_id = booked_assignment(&ops, Uuid::new_v4(), AssignmentStatus::Active)
        .await
        .expect("activate");

    let error = ops
        .expenses
        .create(claim(assignment_id, ExpenseType::Travel, 0))
        .await
        .expect_err("zero amount refused");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn pending_claims_can_be_edited_and_deleted() {
    let ops = field_ops();
    let assignment_id = booked_assignment(&ops, Uuid::new_v4(), AssignmentStatus::Active)
        .await
        .expect("activate");

    let filed = ops
        .expenses
        .create(claim(assignment_id, ExpenseType::Travel, 12050))
        .await
        .expect("create");

    let updated = ops
        .expenses
        .update(UpdateExpenseRequest {
            actor: actor(),
            expense_id: filed.expense.id,
            expense_type: Some(ExpenseType::Food),
            date: None,
            amount: Some(Decimal::new(8000, 2)),
            description: None,
            receipt_ref: Some(Some("receipt-0042".to_owned())),
        })
        .await
        .expect("update succeeds");
    assert_eq!(updated.expense.expense_type, ExpenseType::Food);
    assert_eq!(updated.expense.amount, Decimal::new(8000, 2));
    assert_eq!(updated.expense.receipt_ref.as_deref(), Some("receipt-0042"));

    ops.expenses
        .delete(DeleteExpenseRequest {
            actor: actor(),
            expense_id: filed.expense.id,
        })
        .await
        .expect("delete succeeds");

    let error = ops
        .expenses
        .get(GetExpenseRequest {
            expense_id: filed.expense.id,
        })
        .await
        .expect_err("claim gone");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn approval_stamps_the_claim_once() {
    let ops = field_ops();
    let assignment_id = booked_assignment(&ops, Uuid::new_v4(), AssignmentStatus::Active)
        .await
        .expect("activate");

    let filed = ops
        .expenses
        .create(claim(assignment_id, ExpenseType::Travel, 12050))
        .await
        .expect("create");

    let first = ops
        .expenses
        .approve(ApproveExpenseRequest {
            actor: actor(),
            expense_id: filed.expense.id,
        })
        .await
        .expect("first approval");
    let stamp = first.expense.approval.expect("stamp present");

    // A second approval by a different operator returns the stored
    // stamp untouched.
    let second = ops
        .expenses
        .approve(ApproveExpenseRequest {
            actor: actor(),
            expense_id: filed.expense.id,
        })
        .await
        .expect("second approval");
    assert_eq!(second.expense.approval, Some(stamp));
}

#[tokio::test]
async fn approved_claims_are_locked_against_edits_and_deletion() {
    let ops = field_ops();
    let assignment_id = booked_assignment(&ops, Uuid::new_v4(), AssignmentStatus::Active)
        .await
        .expect("activate");

    let filed = ops
        .expenses
        .create(claim(assignment_id, ExpenseType::Travel, 12050))
        .await
        .expect("create");
    ops.expenses
        .approve(ApproveExpenseRequest {
            actor: actor(),
            expense_id: filed.expense.id,
        })
        .await
        .expect("approve");

    let update_error = ops
        .expenses
        .update(UpdateExpenseRequest {
            actor: actor(),
            expense_id: filed.expense.id,
            expense_type: None,
            date: None,
            amount: Some(Decimal::new(9000, 2)),
            description: None,
            receipt_ref: None,
        })
        .await
        .expect_err("edit locked");
    assert_eq!(update_error.code(), ErrorCode::ImmutableState);

    let delete_error = ops
        .expenses
        .delete(DeleteExpenseRequest {
            actor: actor(),
            expense_id: filed.expense.id,
        })
        .await
        .expect_err("delete locked");
    assert_eq!(delete_error.code(), ErrorCode::ImmutableState);
}

#[tokio::test]
async fn listing_filters_by_approval_state() {
    let ops = field_ops();
    let assignment_id = booked_assignment(&ops, Uuid::new_v4(), AssignmentStatus::Active)
        .await
        .expect("activate");

    let approved = ops
        .expenses
        .create(claim(assignment_id, ExpenseType::Travel, 10000))
        .await
        .expect("create");
    ops.expenses
        .approve(ApproveExpenseRequest {
            actor: actor(),
            expense_id: approved.expense.id,
        })
        .await
        .expect("approve");
    let pending = ops
        .expenses
        .create(claim(assignment_id, ExpenseType::Food, 3000))
        .await
        .expect("create");

    let listed = ops
        .expenses
        .list(ListExpensesRequest {
            assignment_id: Some(assignment_id),
            approved: Some(false),
            ..ListExpensesRequest::default()
        })
        .await
        .expect("list");
    assert_eq!(listed.expenses.len(), 1);
    assert_eq!(listed.expenses[0].id, pending.expense.id);
}

#[tokio::test]
async fn summary_splits_totals_by_approval_state() {
    let ops = field_ops();
    let assignment_id = booked_assignment(&ops, Uuid::new_v4(), AssignmentStatus::Active)
        .await
        .expect("activate");

    for (expense_type, cents) in [
        (ExpenseType::Travel, 10000_i64),
        (ExpenseType::Food, 2000),
        (ExpenseType::Materials, 1000),
    ] {
        let filed = ops
            .expenses
            .create(claim(assignment_id, expense_type, cents))
            .await
            .expect("create");
        if expense_type == ExpenseType::Travel {
            ops.expenses
                .approve(ApproveExpenseRequest {
                    actor: actor(),
                    expense_id: filed.expense.id,
                })
                .await
                .expect("approve");
        }
    }

    let summary = ops
        .expenses
        .summary(ExpenseSummaryRequest {
            assignment_id: Some(assignment_id),
            ..ExpenseSummaryRequest::default()
        })
        .await
        .expect("summary");
    assert_eq!(summary.total_amount, Decimal::new(13000, 2));
    assert_eq!(summary.approved_amount, Decimal::new(10000, 2));
    assert_eq!(summary.pending_amount, Decimal::new(3000, 2));
    assert_eq!(summary.count, 3);
}
