//! Progress aggregation over the attendance ledger.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    AssignmentRepository, AssignmentRepositoryError, AttendanceRepository,
    AttendanceRepositoryError, ProgressQuery, ProgressRequest, ProgressResponse,
};
use crate::domain::Error;

fn map_assignment_error(error: AssignmentRepositoryError) -> Error {
    match error {
        AssignmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("assignment repository unavailable: {message}"))
        }
        other => Error::internal(format!("assignment repository error: {other}")),
    }
}

fn map_attendance_error(error: AttendanceRepositoryError) -> Error {
    match error {
        AttendanceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("attendance repository unavailable: {message}"))
        }
        other => Error::internal(format!("attendance repository error: {other}")),
    }
}

/// Whole-number percentage of `completed` against `target`, rounded half
/// up and deliberately uncapped: overachieving staff read above 100.
fn completion_percentage(completed: i64, target: i64) -> i64 {
    if target <= 0 {
        return 0;
    }
    (100 * completed + target / 2) / target
}

/// Progress service implementing the progress driving port.
#[derive(Clone)]
pub struct ProgressService<A, R> {
    assignments: Arc<A>,
    attendance: Arc<R>,
}

impl<A, R> ProgressService<A, R> {
    /// Create the service over its driven ports.
    pub fn new(assignments: Arc<A>, attendance: Arc<R>) -> Self {
        Self {
            assignments,
            attendance,
        }
    }
}

#[async_trait]
impl<A, R> ProgressQuery for ProgressService<A, R>
where
    A: AssignmentRepository,
    R: AttendanceRepository,
{
    async fn progress(&self, request: ProgressRequest) -> Result<ProgressResponse, Error> {
        let assignment = self
            .assignments
            .find_by_id(request.assignment_id)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| {
                Error::not_found(format!("assignment {} not found", request.assignment_id))
            })?;

        let tally = self
            .attendance
            .tally(assignment.id())
            .await
            .map_err(map_attendance_error)?;

        Ok(ProgressResponse {
            assignment_id: assignment.id(),
            status: assignment.status(),
            target_interviews: assignment.target_interviews(),
            completed_interviews: tally.interviews,
            completion_percentage: completion_percentage(
                tally.interviews,
                i64::from(assignment.target_interviews()),
            ),
            days_worked: tally.days,
            total_days: assignment.total_days(),
        })
    }
}

#[cfg(test)]
#[path = "progress_service_tests.rs"]
mod tests;
