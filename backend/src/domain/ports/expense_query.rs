//! Driving port for expense reads and aggregates.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, ExpenseType};

use super::expense_command::ExpensePayload;

/// Request to fetch one expense claim by identifier.
#[derive(Debug, Clone, Copy)]
pub struct GetExpenseRequest {
    /// Expense to fetch.
    pub expense_id: Uuid,
}

/// Request to list expense claims with optional filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListExpensesRequest {
    /// Restrict to one assignment.
    pub assignment_id: Option<Uuid>,
    /// Restrict to one cost category.
    pub expense_type: Option<ExpenseType>,
    /// Restrict by approval state.
    pub approved: Option<bool>,
    /// Earliest incurred day to include.
    pub from: Option<NaiveDate>,
    /// Latest incurred day to include.
    pub to: Option<NaiveDate>,
    /// Page size; defaults to the service cap.
    pub limit: Option<i64>,
    /// Rows to skip before the page.
    pub offset: Option<i64>,
}

/// Response carrying a page of expense claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExpensesResponse {
    /// Claims in the page, most recent incurred day first.
    pub expenses: Vec<ExpensePayload>,
}

/// Request for expense totals over a filter set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpenseSummaryRequest {
    /// Restrict to one assignment.
    pub assignment_id: Option<Uuid>,
    /// Restrict to one cost category.
    pub expense_type: Option<ExpenseType>,
    /// Earliest incurred day to include.
    pub from: Option<NaiveDate>,
    /// Latest incurred day to include.
    pub to: Option<NaiveDate>,
}

/// Response carrying expense totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummaryResponse {
    /// Sum over every matching claim.
    pub total_amount: Decimal,
    /// Sum over approved claims only.
    pub approved_amount: Decimal,
    /// Sum over pending claims only.
    pub pending_amount: Decimal,
    /// Number of matching claims.
    pub count: i64,
}

/// Driving port for expense reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseQuery: Send + Sync {
    /// Fetch one claim, or `NotFound`.
    async fn get(&self, request: GetExpenseRequest) -> Result<ExpensePayload, Error>;

    /// List claims matching the filters, most recent incurred day first.
    async fn list(&self, request: ListExpensesRequest) -> Result<ListExpensesResponse, Error>;

    /// Total the claims matching the filters.
    async fn summary(
        &self,
        request: ExpenseSummaryRequest,
    ) -> Result<ExpenseSummaryResponse, Error>;
}

/// Fixture query implementation used before a store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExpenseQuery;

#[async_trait]
impl ExpenseQuery for FixtureExpenseQuery {
    async fn get(&self, request: GetExpenseRequest) -> Result<ExpensePayload, Error> {
        Err(Error::not_found(format!(
            "expense {} not found",
            request.expense_id
        )))
    }

    async fn list(&self, _request: ListExpensesRequest) -> Result<ListExpensesResponse, Error> {
        Ok(ListExpensesResponse {
            expenses: Vec::new(),
        })
    }

    async fn summary(
        &self,
        _request: ExpenseSummaryRequest,
    ) -> Result<ExpenseSummaryResponse, Error> {
        Ok(ExpenseSummaryResponse {
            total_amount: Decimal::ZERO,
            approved_amount: Decimal::ZERO,
            pending_amount: Decimal::ZERO,
            count: 0,
        })
    }
}
