//! Tests for the expense service.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    AllowAllAccessPolicy, ExpenseTotals, MockAssignmentRepository, MockExpenseRepository,
};
use crate::domain::{
    ActorId, Approval, Assignment, AssignmentDraft, AssignmentStatus, ErrorCode, ExpenseType,
};

fn actor() -> ActorContext {
    ActorContext::new(ActorId::random())
}

fn sample_assignment() -> Assignment {
    let now = Utc::now();
    Assignment::new(AssignmentDraft {
        id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        resource_id: Uuid::new_v4(),
        status: AssignmentStatus::Active,
        start_date: now.date_naive(),
        end_date: now.date_naive(),
        assigned_districts: vec![],
        assigned_villages: vec![],
        target_interviews: 5,
        total_days: 1,
        daily_rate: None,
        instructions: None,
        notes: None,
        created_at: now,
        updated_at: now,
    })
    .expect("valid assignment")
}

fn sample_expense(assignment_id: Uuid, approval: Option<Approval>) -> Expense {
    Expense::new(ExpenseDraft {
        id: Uuid::new_v4(),
        assignment_id,
        expense_type: ExpenseType::Travel,
        date: Utc::now().date_naive(),
        amount: Decimal::new(2_500, 2),
        description: "bus fare to the district office".to_owned(),
        receipt_ref: None,
        approval,
        created_at: Utc::now(),
    })
    .expect("valid expense")
}

fn service(
    assignments: MockAssignmentRepository,
    expenses: MockExpenseRepository,
) -> ExpenseService<MockAssignmentRepository, MockExpenseRepository> {
    ExpenseService::new(
        Arc::new(assignments),
        Arc::new(expenses),
        Arc::new(AllowAllAccessPolicy),
        Arc::new(mockable::DefaultClock),
    )
}

fn create_request(amount: Decimal) -> CreateExpenseRequest {
    CreateExpenseRequest {
        actor: actor(),
        assignment_id: Uuid::new_v4(),
        expense_type: ExpenseType::Travel,
        date: Utc::now().date_naive(),
        amount,
        description: "bus fare".to_owned(),
        receipt_ref: None,
    }
}

#[tokio::test]
async fn create_records_a_pending_claim() {
    let mut assignments = MockAssignmentRepository::new();
    assignments
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(sample_assignment())));
    let mut expenses = MockExpenseRepository::new();
    expenses.expect_insert().times(1).return_once(|_| Ok(()));

    let response = service(assignments, expenses)
        .create(create_request(Decimal::new(2_500, 2)))
        .await
        .expect("create succeeds");

    assert!(response.expense.approval.is_none());
    assert_eq!(response.expense.amount, Decimal::new(2_500, 2));
}

#[tokio::test]
async fn create_rejects_a_non_positive_amount() {
    let mut assignments = MockAssignmentRepository::new();
    assignments
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(sample_assignment())));
    let mut expenses = MockExpenseRepository::new();
    expenses.expect_insert().times(0);

    let error = service(assignments, expenses)
        .create(create_request(Decimal::new(-5, 0)))
        .await
        .expect_err("negative amount");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn update_of_an_approved_claim_is_edit_locked() {
    let assignment = sample_assignment();
    let approved = sample_expense(
        assignment.id(),
        Some(Approval {
            approved_by: ActorId::random(),
            approved_at: Utc::now(),
        }),
    );
    let mut assignments = MockAssignmentRepository::new();
    assignments
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(assignment)));
    let mut expenses = MockExpenseRepository::new();
    expenses
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(approved)));
    expenses.expect_update().times(0);

    let error = service(assignments, expenses)
        .update(UpdateExpenseRequest {
            actor: actor(),
            expense_id: Uuid::new_v4(),
            expense_type: None,
            date: None,
            amount: Some(Decimal::new(9_900, 2)),
            description: None,
            receipt_ref: None,
        })
        .await
        .expect_err("edit-locked");

    assert_eq!(error.code(), ErrorCode::ImmutableState);
}

#[tokio::test]
async fn delete_of_an_approved_claim_is_edit_locked() {
    let assignment = sample_assignment();
    let approved = sample_expense(
        assignment.id(),
        Some(Approval {
            approved_by: ActorId::random(),
            approved_at: Utc::now(),
        }),
    );
    let mut assignments = MockAssignmentRepository::new();
    assignments
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(assignment)));
    let mut expenses = MockExpenseRepository::new();
    expenses
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(approved)));
    expenses.expect_delete().times(0);

    let error = service(assignments, expenses)
        .delete(DeleteExpenseRequest {
            actor: actor(),
            expense_id: Uuid::new_v4(),
        })
        .await
        .expect_err("edit-locked");

    assert_eq!(error.code(), ErrorCode::ImmutableState);
}

#[tokio::test]
async fn update_of_a_pending_claim_changes_the_amount() {
    let assignment = sample_assignment();
    let pending = sample_expense(assignment.id(), None);
    let mut assignments = MockAssignmentRepository::new();
    assignments
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(assignment)));
    let mut expenses = MockExpenseRepository::new();
    expenses
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(pending)));
    expenses.expect_update().times(1).return_once(|_| Ok(()));

    let response = service(assignments, expenses)
        .update(UpdateExpenseRequest {
            actor: actor(),
            expense_id: Uuid::new_v4(),
            expense_type: None,
            date: None,
            amount: Some(Decimal::new(9_900, 2)),
            description: None,
            receipt_ref: None,
        })
        .await
        .expect("update succeeds");

    assert_eq!(response.expense.amount, Decimal::new(9_900, 2));
}

#[tokio::test]
async fn approval_returns_the_stored_stamp_on_repeat_calls() {
    let assignment = sample_assignment();
    let approved_at = Utc::now();
    let stamped = sample_expense(
        assignment.id(),
        Some(Approval {
            approved_by: ActorId::random(),
            approved_at,
        }),
    );
    let pending = sample_expense(assignment.id(), None);
    let second_load = stamped.clone();
    let first_return = stamped.clone();
    let second_return = stamped.clone();

    let mut assignments = MockAssignmentRepository::new();
    assignments
        .expect_find_by_id()
        .times(2)
        .returning({
            let assignment = assignment.clone();
            move |_| Ok(Some(assignment.clone()))
        });
    let mut expenses = MockExpenseRepository::new();
    let mut loads = vec![Ok(Some(second_load)), Ok(Some(pending))];
    expenses
        .expect_find_by_id()
        .times(2)
        .returning(move |_| loads.pop().unwrap_or(Ok(None)));
    let mut stamps = vec![Ok(Some(second_return)), Ok(Some(first_return))];
    expenses
        .expect_approve()
        .times(2)
        .returning(move |_, _, _| stamps.pop().unwrap_or(Ok(None)));

    let expense_service = service(assignments, expenses);
    let request = ApproveExpenseRequest {
        actor: actor(),
        expense_id: Uuid::new_v4(),
    };
    let first = expense_service
        .approve(request.clone())
        .await
        .expect("first approval succeeds");
    let second = expense_service
        .approve(request)
        .await
        .expect("second approval succeeds");

    let first_stamp = first.expense.approval.expect("stamped");
    let second_stamp = second.expense.approval.expect("stamped");
    assert_eq!(first_stamp.approved_at, approved_at);
    assert_eq!(first_stamp, second_stamp);
}

#[tokio::test]
async fn summary_carries_the_repository_totals() {
    let mut expenses = MockExpenseRepository::new();
    expenses.expect_aggregate().times(1).return_once(|_| {
        Ok(ExpenseTotals {
            total: Decimal::new(10_000, 2),
            approved: Decimal::new(7_500, 2),
            pending: Decimal::new(2_500, 2),
            count: 4,
        })
    });

    let response = service(MockAssignmentRepository::new(), expenses)
        .summary(ExpenseSummaryRequest::default())
        .await
        .expect("summary succeeds");

    assert_eq!(response.total_amount, Decimal::new(10_000, 2));
    assert_eq!(response.approved_amount, Decimal::new(7_500, 2));
    assert_eq!(response.pending_amount, Decimal::new(2_500, 2));
    assert_eq!(response.count, 4);
}
