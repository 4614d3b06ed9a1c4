//! Expense domain service.
//!
//! Implements the expense driving ports: pending claims, the edit lock
//! after approval, idempotent approval stamping, listings and query-time
//! aggregates.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    AccessPolicy, ApproveExpenseRequest, AssignmentRepository, AssignmentRepositoryError,
    CreateExpenseRequest, DeleteExpenseRequest, ExpenseCommand, ExpenseFilter, ExpensePayload,
    ExpenseQuery, ExpenseRepository, ExpenseRepositoryError, ExpenseResponse,
    ExpenseSummaryRequest, ExpenseSummaryResponse, GetExpenseRequest, ListExpensesRequest,
    ListExpensesResponse, PolicyScope, UpdateExpenseRequest,
};
use crate::domain::{ActorContext, Error, Expense, ExpenseDraft};

use super::assignment_service::{authorize, clamp_page};

fn map_repository_error(error: ExpenseRepositoryError) -> Error {
    match error {
        ExpenseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("expense repository unavailable: {message}"))
        }
        ExpenseRepositoryError::Query { message } => {
            Error::internal(format!("expense repository error: {message}"))
        }
    }
}

fn map_assignment_error(error: AssignmentRepositoryError) -> Error {
    match error {
        AssignmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("assignment repository unavailable: {message}"))
        }
        other => Error::internal(format!("assignment repository error: {other}")),
    }
}

fn not_found(expense_id: Uuid) -> Error {
    Error::not_found(format!("expense {expense_id} not found"))
}

fn edit_locked(expense_id: Uuid) -> Error {
    Error::immutable_state(format!("expense {expense_id} is approved and edit-locked"))
}

/// Expense service implementing the command and query driving ports.
#[derive(Clone)]
pub struct ExpenseService<A, E> {
    assignments: Arc<A>,
    expenses: Arc<E>,
    policy: Arc<dyn AccessPolicy>,
    clock: Arc<dyn Clock>,
}

impl<A, E> ExpenseService<A, E> {
    /// Create the service over its driven ports.
    pub fn new(
        assignments: Arc<A>,
        expenses: Arc<E>,
        policy: Arc<dyn AccessPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            assignments,
            expenses,
            policy,
            clock,
        }
    }
}

impl<A, E> ExpenseService<A, E>
where
    A: AssignmentRepository,
    E: ExpenseRepository,
{
    async fn authorize_for_assignment(
        &self,
        actor: &ActorContext,
        assignment_id: Uuid,
    ) -> Result<(), Error> {
        let assignment = self
            .assignments
            .find_by_id(assignment_id)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| Error::not_found(format!("assignment {assignment_id} not found")))?;
        authorize(
            self.policy.as_ref(),
            actor,
            PolicyScope::project(assignment.project_id()),
        )
        .await
    }

    async fn load(&self, expense_id: Uuid) -> Result<Expense, Error> {
        self.expenses
            .find_by_id(expense_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(expense_id))
    }
}

#[async_trait]
impl<A, E> ExpenseCommand for ExpenseService<A, E>
where
    A: AssignmentRepository,
    E: ExpenseRepository,
{
    async fn create(&self, request: CreateExpenseRequest) -> Result<ExpenseResponse, Error> {
        self.authorize_for_assignment(&request.actor, request.assignment_id)
            .await?;

        let expense = Expense::new(ExpenseDraft {
            id: Uuid::new_v4(),
            assignment_id: request.assignment_id,
            expense_type: request.expense_type,
            date: request.date,
            amount: request.amount,
            description: request.description,
            receipt_ref: request.receipt_ref,
            approval: None,
            created_at: self.clock.utc(),
        })
        .map_err(|err| Error::invalid_request(format!("invalid expense: {err}")))?;

        self.expenses
            .insert(&expense)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(
            expense_id = %expense.id(),
            assignment_id = %expense.assignment_id(),
            amount = %expense.amount(),
            "expense recorded"
        );
        Ok(ExpenseResponse {
            expense: ExpensePayload::from(expense),
        })
    }

    async fn update(&self, request: UpdateExpenseRequest) -> Result<ExpenseResponse, Error> {
        let current = self.load(request.expense_id).await?;
        self.authorize_for_assignment(&request.actor, current.assignment_id())
            .await?;
        if current.is_approved() {
            return Err(edit_locked(current.id()));
        }

        let updated = Expense::new(ExpenseDraft {
            id: current.id(),
            assignment_id: current.assignment_id(),
            expense_type: request.expense_type.unwrap_or_else(|| current.expense_type()),
            date: request.date.unwrap_or_else(|| current.date()),
            amount: request.amount.unwrap_or_else(|| current.amount()),
            description: request
                .description
                .unwrap_or_else(|| current.description().to_owned()),
            receipt_ref: match request.receipt_ref {
                Some(receipt_ref) => receipt_ref,
                None => current.receipt_ref().map(str::to_owned),
            },
            approval: None,
            created_at: current.created_at(),
        })
        .map_err(|err| Error::invalid_request(format!("invalid expense update: {err}")))?;

        self.expenses
            .update(&updated)
            .await
            .map_err(map_repository_error)?;

        Ok(ExpenseResponse {
            expense: ExpensePayload::from(updated),
        })
    }

    async fn delete(&self, request: DeleteExpenseRequest) -> Result<(), Error> {
        let current = self.load(request.expense_id).await?;
        self.authorize_for_assignment(&request.actor, current.assignment_id())
            .await?;
        if current.is_approved() {
            return Err(edit_locked(current.id()));
        }

        let removed = self
            .expenses
            .delete(current.id())
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(not_found(current.id()));
        }
        Ok(())
    }

    async fn approve(&self, request: ApproveExpenseRequest) -> Result<ExpenseResponse, Error> {
        let current = self.load(request.expense_id).await?;
        self.authorize_for_assignment(&request.actor, current.assignment_id())
            .await?;

        // The repository stamps only when the row is still unapproved, so
        // a second approval returns the original stamp untouched.
        let approved = self
            .expenses
            .approve(current.id(), request.actor.actor_id, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(current.id()))?;

        tracing::info!(expense_id = %approved.id(), "expense approved");
        Ok(ExpenseResponse {
            expense: ExpensePayload::from(approved),
        })
    }
}

#[async_trait]
impl<A, E> ExpenseQuery for ExpenseService<A, E>
where
    A: AssignmentRepository,
    E: ExpenseRepository,
{
    async fn get(&self, request: GetExpenseRequest) -> Result<ExpensePayload, Error> {
        let expense = self.load(request.expense_id).await?;
        Ok(ExpensePayload::from(expense))
    }

    async fn list(&self, request: ListExpensesRequest) -> Result<ListExpensesResponse, Error> {
        let (limit, offset) = clamp_page(request.limit, request.offset);
        let filter = ExpenseFilter {
            assignment_id: request.assignment_id,
            expense_type: request.expense_type,
            approved: request.approved,
            from: request.from,
            to: request.to,
            limit,
            offset,
        };
        let expenses = self
            .expenses
            .list(&filter)
            .await
            .map_err(map_repository_error)?;
        Ok(ListExpensesResponse {
            expenses: expenses.into_iter().map(ExpensePayload::from).collect(),
        })
    }

    async fn summary(
        &self,
        request: ExpenseSummaryRequest,
    ) -> Result<ExpenseSummaryResponse, Error> {
        let filter = ExpenseFilter {
            assignment_id: request.assignment_id,
            expense_type: request.expense_type,
            approved: None,
            from: request.from,
            to: request.to,
            limit: 0,
            offset: 0,
        };
        let totals = self
            .expenses
            .aggregate(&filter)
            .await
            .map_err(map_repository_error)?;
        Ok(ExpenseSummaryResponse {
            total_amount: totals.total,
            approved_amount: totals.approved,
            pending_amount: totals.pending,
            count: totals.count,
        })
    }
}

#[cfg(test)]
#[path = "expense_service_tests.rs"]
mod tests;
