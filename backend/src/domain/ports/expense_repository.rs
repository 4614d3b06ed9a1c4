//! Port for expense ledger persistence.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{ActorId, Expense, ExpenseType};

use super::define_port_error;

define_port_error! {
    /// Errors raised by expense repository adapters.
    pub enum ExpenseRepositoryError {
        /// Repository connection could not be established.
        Connection {
            /// Adapter-specific detail.
            message: String
        } =>
            "expense repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Adapter-specific detail.
            message: String
        } =>
            "expense repository query failed: {message}",
    }
}

/// Filter for expense listings and aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Restrict to one assignment.
    pub assignment_id: Option<Uuid>,
    /// Restrict to one cost category.
    pub expense_type: Option<ExpenseType>,
    /// Restrict by approval state.
    pub approved: Option<bool>,
    /// Inclusive lower bound on the expense date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the expense date.
    pub to: Option<NaiveDate>,
    /// Page size; adapters clamp to a sane maximum.
    pub limit: i64,
    /// Page offset.
    pub offset: i64,
}

/// Sums over a filtered set of expenses, computed at query time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseTotals {
    /// Sum of all matching amounts.
    pub total: Decimal,
    /// Sum of approved amounts.
    pub approved: Decimal,
    /// Sum of unapproved amounts.
    pub pending: Decimal,
    /// Number of matching records.
    pub count: i64,
}

/// Port for reading and writing expense claims.
///
/// Contract: `approve` stamps the approval only when the stored row is not
/// yet approved, and returns the stored row either way, so two concurrent
/// approvals observe a single timestamp.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Persist a new expense.
    async fn insert(&self, expense: &Expense) -> Result<(), ExpenseRepositoryError>;

    /// Overwrite an existing expense's fields.
    async fn update(&self, expense: &Expense) -> Result<(), ExpenseRepositoryError>;

    /// Delete an expense row; returns whether a row was removed.
    async fn delete(&self, expense_id: Uuid) -> Result<bool, ExpenseRepositoryError>;

    /// Find one expense by id.
    async fn find_by_id(&self, expense_id: Uuid)
    -> Result<Option<Expense>, ExpenseRepositoryError>;

    /// Stamp approval if the row is unapproved; return the stored row.
    ///
    /// Returns `Ok(None)` when the expense does not exist.
    async fn approve(
        &self,
        expense_id: Uuid,
        approved_by: ActorId,
        approved_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, ExpenseRepositoryError>;

    /// List expenses matching the filter, ordered by date descending.
    async fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, ExpenseRepositoryError>;

    /// Compute totals over the filtered set at query time.
    async fn aggregate(
        &self,
        filter: &ExpenseFilter,
    ) -> Result<ExpenseTotals, ExpenseRepositoryError>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExpenseRepository;

#[async_trait]
impl ExpenseRepository for FixtureExpenseRepository {
    async fn insert(&self, _expense: &Expense) -> Result<(), ExpenseRepositoryError> {
        Ok(())
    }

    async fn update(&self, _expense: &Expense) -> Result<(), ExpenseRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _expense_id: Uuid) -> Result<bool, ExpenseRepositoryError> {
        Ok(false)
    }

    async fn find_by_id(
        &self,
        _expense_id: Uuid,
    ) -> Result<Option<Expense>, ExpenseRepositoryError> {
        Ok(None)
    }

    async fn approve(
        &self,
        _expense_id: Uuid,
        _approved_by: ActorId,
        _approved_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, ExpenseRepositoryError> {
        Ok(None)
    }

    async fn list(&self, _filter: &ExpenseFilter) -> Result<Vec<Expense>, ExpenseRepositoryError> {
        Ok(Vec::new())
    }

    async fn aggregate(
        &self,
        _filter: &ExpenseFilter,
    ) -> Result<ExpenseTotals, ExpenseRepositoryError> {
        Ok(ExpenseTotals::default())
    }
}
