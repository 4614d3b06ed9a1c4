//! Expense aggregate: cost claims and the approval lock.

mod expense;
mod kind;

pub use expense::{Approval, Expense, ExpenseDraft, ExpenseValidationError};
pub use kind::{ExpenseType, UnknownExpenseTypeError};

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
