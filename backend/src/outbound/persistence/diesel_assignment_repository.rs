//! PostgreSQL-backed `AssignmentRepository` implementation using Diesel ORM.
//!
//! Status transitions are written as a compare-and-set on the previous
//! state so two concurrent transitions cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AssignmentFilter, AssignmentRepository, AssignmentRepositoryError};
use crate::domain::{Assignment, AssignmentDraft, AssignmentStatus};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AssignmentRow, AssignmentUpdate, NewAssignmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{assignments, attendance_records, expenses};

/// Statuses that book the resource and therefore count for overlap checks.
const BOOKING_STATUSES: [&str; 2] = ["pending", "active"];

/// Diesel-backed implementation of the assignment repository port.
#[derive(Clone)]
pub struct DieselAssignmentRepository {
    pool: DbPool,
}

impl DieselAssignmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> AssignmentRepositoryError {
    map_basic_pool_error(error, |message| {
        AssignmentRepositoryError::connection(message)
    })
}

/// Map Diesel errors to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> AssignmentRepositoryError {
    map_basic_diesel_error(
        error,
        AssignmentRepositoryError::query,
        AssignmentRepositoryError::connection,
    )
}

fn parse_status(raw: &str) -> Result<AssignmentStatus, AssignmentRepositoryError> {
    raw.parse().map_err(|err| {
        AssignmentRepositoryError::query(format!("invalid status in assignments row: {err}"))
    })
}

/// Convert a database row into a validated domain assignment.
fn row_to_assignment(row: AssignmentRow) -> Result<Assignment, AssignmentRepositoryError> {
    let AssignmentRow {
        id,
        project_id,
        resource_id,
        status,
        start_date,
        end_date,
        assigned_districts,
        assigned_villages,
        target_interviews,
        total_days,
        daily_rate,
        instructions,
        notes,
        created_at,
        updated_at,
    } = row;

    let status = parse_status(&status)?;

    Assignment::new(AssignmentDraft {
        id,
        project_id,
        resource_id,
        status,
        start_date,
        end_date,
        assigned_districts,
        assigned_villages,
        target_interviews,
        total_days,
        daily_rate,
        instructions,
        notes,
        created_at,
        updated_at,
    })
    .map_err(|err| AssignmentRepositoryError::query(err.to_string()))
}

fn apply_filter(
    filter: &AssignmentFilter,
) -> assignments::BoxedQuery<'_, diesel::pg::Pg> {
    let mut query = assignments::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(assignments::status.eq(status.as_str()));
    }
    if let Some(project_id) = filter.project_id {
        query = query.filter(assignments::project_id.eq(project_id));
    }
    if let Some(resource_id) = filter.resource_id {
        query = query.filter(assignments::resource_id.eq(resource_id));
    }
    query
}

#[async_trait]
impl AssignmentRepository for DieselAssignmentRepository {
    async fn insert(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewAssignmentRow {
            id: assignment.id(),
            project_id: assignment.project_id(),
            resource_id: assignment.resource_id(),
            status: assignment.status().as_str(),
            start_date: assignment.start_date(),
            end_date: assignment.end_date(),
            assigned_districts: assignment.assigned_districts(),
            assigned_villages: assignment.assigned_villages(),
            target_interviews: assignment.target_interviews(),
            total_days: assignment.total_days(),
            daily_rate: assignment.daily_rate(),
            instructions: assignment.instructions(),
            notes: assignment.notes(),
            created_at: assignment.created_at(),
            updated_at: assignment.updated_at(),
        };

        diesel::insert_into(assignments::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = AssignmentUpdate {
            status: assignment.status().as_str(),
            start_date: assignment.start_date(),
            end_date: assignment.end_date(),
            assigned_districts: assignment.assigned_districts(),
            assigned_villages: assignment.assigned_villages(),
            target_interviews: assignment.target_interviews(),
            total_days: assignment.total_days(),
            daily_rate: assignment.daily_rate(),
            instructions: assignment.instructions(),
            notes: assignment.notes(),
            updated_at: assignment.updated_at(),
        };

        diesel::update(assignments::table.filter(assignments::id.eq(assignment.id())))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn set_status(
        &self,
        assignment_id: Uuid,
        expected: AssignmentStatus,
        next: AssignmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The filter on the expected status makes the write compare-and-set:
        // a concurrent transition leaves zero rows to update.
        let updated = diesel::update(
            assignments::table.filter(
                assignments::id
                    .eq(assignment_id)
                    .and(assignments::status.eq(expected.as_str())),
            ),
        )
        .set((
            assignments::status.eq(next.as_str()),
            assignments::updated_at.eq(updated_at),
        ))
        .returning(AssignmentRow::as_returning())
        .get_result::<AssignmentRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        if let Some(row) = updated {
            return row_to_assignment(row).map(Some);
        }

        // Distinguish "gone" from "lost the race" by re-reading the row.
        let current = assignments::table
            .filter(assignments::id.eq(assignment_id))
            .select(AssignmentRow::as_select())
            .first::<AssignmentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match current {
            None => Ok(None),
            Some(row) => {
                let actual = parse_status(&row.status)?;
                Err(AssignmentRepositoryError::status_conflict(
                    assignment_id,
                    actual,
                ))
            }
        }
    }

    async fn delete(&self, assignment_id: Uuid) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(assignments::table.filter(assignments::id.eq(assignment_id)))
            .execute(&mut conn)
            .await
            .map(|rows| rows > 0)
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        assignment_id: Uuid,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = assignments::table
            .filter(assignments::id.eq(assignment_id))
            .select(AssignmentRow::as_select())
            .first::<AssignmentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_assignment).transpose()
    }

    async fn list(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AssignmentRow> = apply_filter(filter)
            .order((assignments::created_at.desc(), assignments::id.desc()))
            .limit(filter.limit)
            .offset(filter.offset)
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_assignment).collect()
    }

    async fn find_overlapping(
        &self,
        resource_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AssignmentRow> = assignments::table
            .filter(
                assignments::resource_id
                    .eq(resource_id)
                    .and(assignments::status.eq_any(BOOKING_STATUSES))
                    .and(assignments::start_date.le(end_date))
                    .and(assignments::end_date.ge(start_date)),
            )
            .order(assignments::start_date.asc())
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_assignment).collect()
    }

    async fn count_active_for_resource(
        &self,
        resource_id: Uuid,
    ) -> Result<i64, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        assignments::table
            .filter(
                assignments::resource_id
                    .eq(resource_id)
                    .and(assignments::status.eq(AssignmentStatus::Active.as_str())),
            )
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn resources_with_active_assignments(
        &self,
    ) -> Result<Vec<Uuid>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        assignments::table
            .filter(assignments::status.eq(AssignmentStatus::Active.as_str()))
            .select(assignments::resource_id)
            .distinct()
            .load::<Uuid>(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn has_dependents(
        &self,
        assignment_id: Uuid,
    ) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let has_attendance: bool = diesel::select(diesel::dsl::exists(
            attendance_records::table.filter(attendance_records::assignment_id.eq(assignment_id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if has_attendance {
            return Ok(true);
        }

        diesel::select(diesel::dsl::exists(
            expenses::table.filter(expenses::assignment_id.eq(assignment_id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
