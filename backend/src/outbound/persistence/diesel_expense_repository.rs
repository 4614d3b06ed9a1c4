//! PostgreSQL-backed `ExpenseRepository` implementation using Diesel ORM.
//!
//! Approval is written through a filtered update that only matches rows
//! without a stamp, then the stored row is re-read. Two concurrent approvals
//! therefore observe a single `(approved_by, approved_at)` pair.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ports::{
    ExpenseFilter, ExpenseRepository, ExpenseRepositoryError, ExpenseTotals,
};
use crate::domain::{ActorId, Approval, Expense, ExpenseDraft};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ExpenseRow, ExpenseUpdate, NewExpenseRow};
use super::pool::{DbPool, PoolError};
use super::schema::expenses;

/// Diesel-backed implementation of the expense repository port.
#[derive(Clone)]
pub struct DieselExpenseRepository {
    pool: DbPool,
}

impl DieselExpenseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> ExpenseRepositoryError {
    map_basic_pool_error(error, |message| ExpenseRepositoryError::connection(message))
}

/// Map Diesel errors to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> ExpenseRepositoryError {
    map_basic_diesel_error(
        error,
        ExpenseRepositoryError::query,
        ExpenseRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain expense.
fn row_to_expense(row: ExpenseRow) -> Result<Expense, ExpenseRepositoryError> {
    let ExpenseRow {
        id,
        assignment_id,
        expense_type,
        date,
        amount,
        description,
        receipt_ref,
        approved_by,
        approved_at,
        created_at,
    } = row;

    let expense_type = expense_type.parse().map_err(|err| {
        ExpenseRepositoryError::query(format!("invalid expense type in expenses row: {err}"))
    })?;

    // The columns are only ever written as a pair; treat a half-set stamp
    // as data corruption.
    let approval = match (approved_by, approved_at) {
        (None, None) => None,
        (Some(approved_by), Some(approved_at)) => Some(Approval {
            approved_by: ActorId::from_uuid(approved_by),
            approved_at,
        }),
        _ => {
            return Err(ExpenseRepositoryError::query(
                "half-set approval stamp in expenses row",
            ));
        }
    };

    Expense::new(ExpenseDraft {
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
    .map_err(|err| ExpenseRepositoryError::query(err.to_string()))
}

fn apply_filter(filter: &ExpenseFilter) -> expenses::BoxedQuery<'_, diesel::pg::Pg> {
    let mut query = expenses::table.into_boxed();
    if let Some(assignment_id) = filter.assignment_id {
        query = query.filter(expenses::assignment_id.eq(assignment_id));
    }
    if let Some(expense_type) = filter.expense_type {
        query = query.filter(expenses::expense_type.eq(expense_type.as_str()));
    }
    if let Some(approved) = filter.approved {
        query = if approved {
            query.filter(expenses::approved_by.is_not_null())
        } else {
            query.filter(expenses::approved_by.is_null())
        };
    }
    if let Some(from) = filter.from {
        query = query.filter(expenses::date.ge(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(expenses::date.le(to));
    }
    query
}

/// Fold amounts into running totals, split by approval state.
fn fold_totals(rows: &[(Decimal, Option<Uuid>)]) -> ExpenseTotals {
    let mut totals = ExpenseTotals::default();
    for &(amount, approved_by) in rows {
        totals.total += amount;
        if approved_by.is_some() {
            totals.approved += amount;
        } else {
            totals.pending += amount;
        }
        totals.count += 1;
    }
    totals
}

#[async_trait]
impl ExpenseRepository for DieselExpenseRepository {
    async fn insert(&self, expense: &Expense) -> Result<(), ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewExpenseRow {
            id: expense.id(),
            assignment_id: expense.assignment_id(),
            expense_type: expense.expense_type().as_str(),
            date: expense.date(),
            amount: expense.amount(),
            description: expense.description(),
            receipt_ref: expense.receipt_ref(),
            approved_by: expense.approval().map(|stamp| *stamp.approved_by.as_uuid()),
            approved_at: expense.approval().map(|stamp| stamp.approved_at),
            created_at: expense.created_at(),
        };

        diesel::insert_into(expenses::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, expense: &Expense) -> Result<(), ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ExpenseUpdate {
            expense_type: expense.expense_type().as_str(),
            date: expense.date(),
            amount: expense.amount(),
            description: expense.description(),
            receipt_ref: expense.receipt_ref(),
        };

        diesel::update(expenses::table.filter(expenses::id.eq(expense.id())))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, expense_id: Uuid) -> Result<bool, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(expenses::table.filter(expenses::id.eq(expense_id)))
            .execute(&mut conn)
            .await
            .map(|rows| rows > 0)
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        expense_id: Uuid,
    ) -> Result<Option<Expense>, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = expenses::table
            .filter(expenses::id.eq(expense_id))
            .select(ExpenseRow::as_select())
            .first::<ExpenseRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_expense).transpose()
    }

    async fn approve(
        &self,
        expense_id: Uuid,
        approved_by: ActorId,
        approved_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Only unapproved rows match, so a second approval is a no-op and
        // the re-read below returns the original stamp.
        diesel::update(
            expenses::table.filter(
                expenses::id
                    .eq(expense_id)
                    .and(expenses::approved_by.is_null()),
            ),
        )
        .set((
            expenses::approved_by.eq(approved_by.as_uuid()),
            expenses::approved_at.eq(approved_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        let row = expenses::table
            .filter(expenses::id.eq(expense_id))
            .select(ExpenseRow::as_select())
            .first::<ExpenseRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_expense).transpose()
    }

    async fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ExpenseRow> = apply_filter(filter)
            .order((expenses::date.desc(), expenses::id.desc()))
            .limit(filter.limit)
            .offset(filter.offset)
            .select(ExpenseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_expense).collect()
    }

    async fn aggregate(
        &self,
        filter: &ExpenseFilter,
    ) -> Result<ExpenseTotals, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Pagination does not apply to aggregates: sums always cover the
        // whole filtered set.
        let rows: Vec<(Decimal, Option<Uuid>)> = apply_filter(filter)
            .select((expenses::amount, expenses::approved_by))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(fold_totals(&rows))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping, row conversion and totals.

    use chrono::Utc;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    use crate::domain::ExpenseType;

    use super::*;

    #[fixture]
    fn valid_row() -> ExpenseRow {
        ExpenseRow {
            id: Uuid::new_v4(),
            assignment_id: Uuid::new_v4(),
            expense_type: "travel".to_owned(),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
            amount: Decimal::new(12050, 2),
            description: "Bus fare to Kibo".to_owned(),
            receipt_ref: Some("RCPT-031".to_owned()),
            approved_by: None,
            approved_at: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let pool_err = PoolError::checkout("connection refused");
        let repo_err = map_pool_error(pool_err);

        assert!(matches!(repo_err, ExpenseRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn row_conversion_accepts_pending_claim(valid_row: ExpenseRow) {
        let expense = row_to_expense(valid_row).expect("valid row should convert");

        assert_eq!(expense.expense_type(), ExpenseType::Travel);
        assert_eq!(expense.amount(), Decimal::new(12050, 2));
        assert!(!expense.is_approved());
    }

    #[rstest]
    fn row_conversion_rebuilds_approval_stamp(mut valid_row: ExpenseRow) {
        let approver = Uuid::new_v4();
        let stamped_at = Utc::now();
        valid_row.approved_by = Some(approver);
        valid_row.approved_at = Some(stamped_at);

        let expense = row_to_expense(valid_row).expect("valid row should convert");
        let approval = expense.approval().expect("approval present");
        assert_eq!(approval.approved_by, ActorId::from_uuid(approver));
        assert_eq!(approval.approved_at, stamped_at);
    }

    #[rstest]
    fn row_conversion_rejects_half_set_stamp(mut valid_row: ExpenseRow) {
        valid_row.approved_by = Some(Uuid::new_v4());

        let error = row_to_expense(valid_row).expect_err("half-set stamp should fail");
        assert!(matches!(error, ExpenseRepositoryError::Query { .. }));
        assert!(error.to_string().contains("half-set approval"));
    }

    #[rstest]
    fn row_conversion_rejects_unknown_category(mut valid_row: ExpenseRow) {
        valid_row.expense_type = "snacks".to_owned();

        let error = row_to_expense(valid_row).expect_err("unknown category should fail");
        assert!(matches!(error, ExpenseRepositoryError::Query { .. }));
    }

    #[rstest]
    fn totals_split_by_approval_state() {
        let approver = Uuid::new_v4();
        let rows = vec![
            (Decimal::new(10000, 2), Some(approver)),
            (Decimal::new(2500, 2), None),
            (Decimal::new(500, 2), None),
        ];

        let totals = fold_totals(&rows);
        assert_eq!(totals.total, Decimal::new(13000, 2));
        assert_eq!(totals.approved, Decimal::new(10000, 2));
        assert_eq!(totals.pending, Decimal::new(3000, 2));
        assert_eq!(totals.count, 3);
    }
}
