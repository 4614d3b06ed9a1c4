//! Expense entity: one cost claim tied to an assignment.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ActorId;

use super::ExpenseType;

/// Approval stamp set exactly once by the approve operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approval {
    /// Operator who approved the claim.
    pub approved_by: ActorId,
    /// Instant of approval.
    pub approved_at: DateTime<Utc>,
}

/// Input payload for [`Expense::new`].
#[derive(Debug, Clone)]
pub struct ExpenseDraft {
    /// Expense identifier.
    pub id: Uuid,
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
    /// Optional attachment reference for the receipt.
    pub receipt_ref: Option<String>,
    /// Approval stamp, absent while pending.
    pub approval: Option<Approval>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validation errors raised by [`Expense::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseValidationError {
    /// `amount` must be strictly positive.
    #[error("amount must be positive, got {value}")]
    NonPositiveAmount {
        /// Supplied amount rendered as text.
        value: String,
    },
}

/// A validated expense claim.
///
/// Once approved the claim is edit-locked: the expense service refuses
/// updates and deletions, and re-approval returns the stored stamp
/// unchanged. There is no reversal path through the public surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub(super) id: Uuid,
    pub(super) assignment_id: Uuid,
    pub(super) expense_type: ExpenseType,
    pub(super) date: NaiveDate,
    pub(super) amount: Decimal,
    pub(super) description: String,
    pub(super) receipt_ref: Option<String>,
    pub(super) approval: Option<Approval>,
    pub(super) created_at: DateTime<Utc>,
}

impl Expense {
    /// Creates a validated expense from a draft.
    pub fn new(draft: ExpenseDraft) -> Result<Self, ExpenseValidationError> {
        if draft.amount.is_zero() || draft.amount.is_sign_negative() {
            return Err(ExpenseValidationError::NonPositiveAmount {
                value: draft.amount.to_string(),
            });
        }
        let ExpenseDraft {
            id,
            assignment_id,
            expense_type,
            date,
            amount,
            description,
            receipt_ref,
            approval,
            created_at,
        } = draft;
        Ok(Self {
            id,
            assignment_id,
            expense_type,
            date,
            amount,
            description,
            receipt_ref,
            approval,
            created_at,
        })
    }

    /// Whether the claim has been approved.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.approval.is_some()
    }

    /// Returns the expense id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the owning assignment id.
    #[must_use]
    pub const fn assignment_id(&self) -> Uuid {
        self.assignment_id
    }

    /// Returns the cost category.
    #[must_use]
    pub const fn expense_type(&self) -> ExpenseType {
        self.expense_type
    }

    /// Returns the day the cost was incurred.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the claimed amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the claim description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the receipt attachment reference, if any.
    #[must_use]
    pub fn receipt_ref(&self) -> Option<&str> {
        self.receipt_ref.as_deref()
    }

    /// Returns the approval stamp, if any.
    #[must_use]
    pub const fn approval(&self) -> Option<&Approval> {
        self.approval.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
