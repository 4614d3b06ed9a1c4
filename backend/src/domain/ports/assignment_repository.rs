//! Port for assignment persistence.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Assignment, AssignmentStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by assignment repository adapters.
    pub enum AssignmentRepositoryError {
        /// Repository connection could not be established.
        Connection {
            /// Adapter-specific detail.
            message: String
        } =>
            "assignment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Adapter-specific detail.
            message: String
        } =>
            "assignment repository query failed: {message}",
        /// A compare-and-set status write lost against a concurrent writer.
        StatusConflict {
            /// Assignment whose status moved underneath the caller.
            assignment_id: Uuid,
            /// Status observed by the losing writer.
            actual: AssignmentStatus,
        } =>
            "assignment {assignment_id} status changed concurrently (now {actual})",
    }
}

/// Filter for assignment listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    /// Restrict to one lifecycle state.
    pub status: Option<AssignmentStatus>,
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one field resource.
    pub resource_id: Option<Uuid>,
    /// Page size; adapters clamp to a sane maximum.
    pub limit: i64,
    /// Page offset.
    pub offset: i64,
}

/// Port for reading and writing assignments.
///
/// Contracts:
/// - `set_status` is compare-and-set: it writes only when the stored status
///   equals `expected` and fails with `StatusConflict` otherwise, so two
///   concurrent transitions cannot both win.
/// - `find_overlapping` returns pending/active assignments for the resource
///   whose period intersects the given inclusive range.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Persist a new assignment.
    async fn insert(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError>;

    /// Overwrite an existing assignment's fields.
    async fn update(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError>;

    /// Compare-and-set the status, returning the updated assignment.
    ///
    /// Returns `Ok(None)` when the assignment does not exist.
    async fn set_status(
        &self,
        assignment_id: Uuid,
        expected: AssignmentStatus,
        next: AssignmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError>;

    /// Delete an assignment row; returns whether a row was removed.
    async fn delete(&self, assignment_id: Uuid) -> Result<bool, AssignmentRepositoryError>;

    /// Find one assignment by id.
    async fn find_by_id(
        &self,
        assignment_id: Uuid,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError>;

    /// List assignments matching the filter, newest first.
    async fn list(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError>;

    /// Pending/active assignments for `resource_id` overlapping the range.
    async fn find_overlapping(
        &self,
        resource_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError>;

    /// Count of assignments in `active` status for the resource.
    async fn count_active_for_resource(
        &self,
        resource_id: Uuid,
    ) -> Result<i64, AssignmentRepositoryError>;

    /// Resource ids that currently hold at least one active assignment.
    async fn resources_with_active_assignments(
        &self,
    ) -> Result<Vec<Uuid>, AssignmentRepositoryError>;

    /// Whether attendance or expense records reference the assignment.
    async fn has_dependents(&self, assignment_id: Uuid)
    -> Result<bool, AssignmentRepositoryError>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAssignmentRepository;

#[async_trait]
impl AssignmentRepository for FixtureAssignmentRepository {
    async fn insert(&self, _assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        Ok(())
    }

    async fn update(&self, _assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        Ok(())
    }

    async fn set_status(
        &self,
        _assignment_id: Uuid,
        _expected: AssignmentStatus,
        _next: AssignmentStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _assignment_id: Uuid) -> Result<bool, AssignmentRepositoryError> {
        Ok(false)
    }

    async fn find_by_id(
        &self,
        _assignment_id: Uuid,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_overlapping(
        &self,
        _resource_id: Uuid,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn count_active_for_resource(
        &self,
        _resource_id: Uuid,
    ) -> Result<i64, AssignmentRepositoryError> {
        Ok(0)
    }

    async fn resources_with_active_assignments(
        &self,
    ) -> Result<Vec<Uuid>, AssignmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn has_dependents(
        &self,
        _assignment_id: Uuid,
    ) -> Result<bool, AssignmentRepositoryError> {
        Ok(false)
    }
}
