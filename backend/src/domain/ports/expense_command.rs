//! Driving port for the expense approval ledger.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ActorContext, ActorId, Expense, ExpenseType, Error};

/// Serializable approval stamp for driving ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPayload {
    /// Operator who approved the claim.
    pub approved_by: ActorId,
    /// Instant of approval.
    pub approved_at: DateTime<Utc>,
}

/// Serializable expense claim for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    /// Expense identifier.
    pub id: Uuid,
    /// Owning assignment.
    pub assignment_id: Uuid,
    /// Cost category.
    pub expense_type: ExpenseType,
    /// Day the cost was incurred.
    pub date: NaiveDate,
    /// Claimed amount.
    pub amount: Decimal,
    /// What the money was spent on.
    pub description: String,
    /// Optional receipt attachment reference.
    pub receipt_ref: Option<String>,
    /// Approval stamp, absent while pending.
    pub approval: Option<ApprovalPayload>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Expense> for ExpensePayload {
    fn from(value: Expense) -> Self {
        Self {
            id: value.id(),
            assignment_id: value.assignment_id(),
            expense_type: value.expense_type(),
            date: value.date(),
            amount: value.amount(),
            description: value.description().to_owned(),
            receipt_ref: value.receipt_ref().map(str::to_owned),
            approval: value.approval().map(|approval| ApprovalPayload {
                approved_by: approval.approved_by,
                approved_at: approval.approved_at,
            }),
            created_at: value.created_at(),
        }
    }
}

/// Request to record a pending expense claim.
#[derive(Debug, Clone)]
pub struct CreateExpenseRequest {
    /// Authenticated actor recording the claim.
    pub actor: ActorContext,
    /// Owning assignment.
    pub assignment_id: Uuid,
    /// Cost category.
    pub expense_type: ExpenseType,
    /// Day the cost was incurred.
    pub date: NaiveDate,
    /// Claimed amount; strictly positive.
    pub amount: Decimal,
    /// What the money was spent on.
    pub description: String,
    /// Optional receipt attachment reference.
    pub receipt_ref: Option<String>,
}

/// Request to modify a still-pending claim.
#[derive(Debug, Clone)]
pub struct UpdateExpenseRequest {
    /// Authenticated actor editing the claim.
    pub actor: ActorContext,
    /// Expense to update.
    pub expense_id: Uuid,
    /// Replacement cost category, if supplied.
    pub expense_type: Option<ExpenseType>,
    /// Replacement incurred day, if supplied.
    pub date: Option<NaiveDate>,
    /// Replacement amount, if supplied.
    pub amount: Option<Decimal>,
    /// Replacement description, if supplied.
    pub description: Option<String>,
    /// Replacement receipt reference; `Some(None)` clears it.
    pub receipt_ref: Option<Option<String>>,
}

/// Request to delete a still-pending claim.
#[derive(Debug, Clone)]
pub struct DeleteExpenseRequest {
    /// Authenticated actor deleting the claim.
    pub actor: ActorContext,
    /// Expense to delete.
    pub expense_id: Uuid,
}

/// Request to approve a claim.
#[derive(Debug, Clone)]
pub struct ApproveExpenseRequest {
    /// Authenticated actor approving the claim.
    pub actor: ActorContext,
    /// Expense to approve.
    pub expense_id: Uuid,
}

/// Response carrying one expense claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    /// The affected claim.
    pub expense: ExpensePayload,
}

/// Driving port for expense mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseCommand: Send + Sync {
    /// Record a pending claim against an assignment.
    async fn create(&self, request: CreateExpenseRequest) -> Result<ExpenseResponse, Error>;

    /// Modify a pending claim; approved claims are edit-locked.
    async fn update(&self, request: UpdateExpenseRequest) -> Result<ExpenseResponse, Error>;

    /// Delete a pending claim; approved claims are edit-locked.
    async fn delete(&self, request: DeleteExpenseRequest) -> Result<(), Error>;

    /// Approve a claim; re-approval returns the stored stamp unchanged.
    async fn approve(&self, request: ApproveExpenseRequest) -> Result<ExpenseResponse, Error>;
}

/// Fixture command implementation used before a store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExpenseCommand;

#[async_trait]
impl ExpenseCommand for FixtureExpenseCommand {
    async fn create(&self, _request: CreateExpenseRequest) -> Result<ExpenseResponse, Error> {
        Err(Error::service_unavailable("expense store not configured"))
    }

    async fn update(&self, _request: UpdateExpenseRequest) -> Result<ExpenseResponse, Error> {
        Err(Error::service_unavailable("expense store not configured"))
    }

    async fn delete(&self, _request: DeleteExpenseRequest) -> Result<(), Error> {
        Err(Error::service_unavailable("expense store not configured"))
    }

    async fn approve(&self, _request: ApproveExpenseRequest) -> Result<ExpenseResponse, Error> {
        Err(Error::service_unavailable("expense store not configured"))
    }
}
