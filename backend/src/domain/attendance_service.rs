//! Attendance domain service.
//!
//! Implements the attendance ledger driving ports: live check-in and
//! check-out, supervisor manual entries, listings and the day status
//! probe. Uniqueness of the open session and of (assignment, date) is
//! enforced by the repository insert; this service translates those
//! conflicts into the public error codes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    AccessPolicy, AssignmentRepository, AttendanceCommand, AttendanceFilter, AttendancePayload,
    AttendanceQuery, AttendanceRepository, AttendanceRepositoryError, AttendanceResponse,
    CheckInRequest, CheckOutRequest, DayState, DayStatusRequest, DayStatusResponse,
    ListAttendanceRequest, ListAttendanceResponse, ManualAttendanceRequest, PolicyScope,
};
use crate::domain::{
    ActorContext, Assignment, AssignmentStatus, AttendanceDraft, AttendanceRecord, Error,
    GeoPoint, SessionMark,
};

use super::assignment_service::{authorize, clamp_page};

fn map_repository_error(error: AttendanceRepositoryError) -> Error {
    match error {
        AttendanceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("attendance repository unavailable: {message}"))
        }
        AttendanceRepositoryError::Query { message } => {
            Error::internal(format!("attendance repository error: {message}"))
        }
        AttendanceRepositoryError::OpenSessionExists { assignment_id } => {
            Error::already_checked_in(format!(
                "assignment {assignment_id} already has an open session"
            ))
        }
        AttendanceRepositoryError::DuplicateDate {
            assignment_id,
            date,
        } => Error::duplicate_date(format!(
            "assignment {assignment_id} already has an attendance record for {date}"
        )),
    }
}

/// Attendance service implementing the command and query driving ports.
#[derive(Clone)]
pub struct AttendanceService<A, R> {
    assignments: Arc<A>,
    attendance: Arc<R>,
    policy: Arc<dyn AccessPolicy>,
    clock: Arc<dyn Clock>,
}

impl<A, R> AttendanceService<A, R> {
    /// Create the service over its driven ports.
    pub fn new(
        assignments: Arc<A>,
        attendance: Arc<R>,
        policy: Arc<dyn AccessPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            assignments,
            attendance,
            policy,
            clock,
        }
    }
}

impl<A, R> AttendanceService<A, R>
where
    A: AssignmentRepository,
    R: AttendanceRepository,
{
    async fn load_assignment(&self, assignment_id: Uuid) -> Result<Assignment, Error> {
        self.assignments
            .find_by_id(assignment_id)
            .await
            .map_err(|err| match err {
                crate::domain::ports::AssignmentRepositoryError::Connection { message } => {
                    Error::service_unavailable(format!(
                        "assignment repository unavailable: {message}"
                    ))
                }
                other => Error::internal(format!("assignment repository error: {other}")),
            })?
            .ok_or_else(|| Error::not_found(format!("assignment {assignment_id} not found")))
    }

    async fn authorized_assignment(
        &self,
        actor: &ActorContext,
        assignment_id: Uuid,
    ) -> Result<Assignment, Error> {
        let assignment = self.load_assignment(assignment_id).await?;
        authorize(
            self.policy.as_ref(),
            actor,
            PolicyScope::project(assignment.project_id()),
        )
        .await?;
        Ok(assignment)
    }
}

#[async_trait]
impl<A, R> AttendanceCommand for AttendanceService<A, R>
where
    A: AssignmentRepository,
    R: AttendanceRepository,
{
    async fn check_in(&self, request: CheckInRequest) -> Result<AttendanceResponse, Error> {
        let assignment = self
            .authorized_assignment(&request.actor, request.assignment_id)
            .await?;
        if assignment.status() != AssignmentStatus::Active {
            return Err(Error::invalid_transition(format!(
                "assignment {} is {}; check-in requires an active assignment",
                assignment.id(),
                assignment.status(),
            )));
        }

        let now = self.clock.utc();
        let record = AttendanceRecord::new(AttendanceDraft {
            id: Uuid::new_v4(),
            assignment_id: assignment.id(),
            date: now.date_naive(),
            check_in: Some(SessionMark {
                time: now,
                location: request.location,
                coordinates: request.coordinates.map(GeoPoint::from),
            }),
            check_out: None,
            interviews_conducted: 0,
            villages_visited: request.villages_visited,
            travel_distance_km: None,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(format!("invalid attendance record: {err}")))?;

        self.attendance
            .insert(&record)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(
            assignment_id = %record.assignment_id(),
            date = %record.date(),
            "checked in"
        );
        Ok(AttendanceResponse {
            record: AttendancePayload::from(record),
        })
    }

    async fn check_out(&self, request: CheckOutRequest) -> Result<AttendanceResponse, Error> {
        self.authorized_assignment(&request.actor, request.assignment_id)
            .await?;

        let open = self
            .attendance
            .find_open(request.assignment_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::no_open_session(format!(
                    "assignment {} has no open session to check out of",
                    request.assignment_id
                ))
            })?;

        let now = self.clock.utc();
        let closed = open
            .close(
                SessionMark {
                    time: now,
                    location: request.location,
                    coordinates: request.coordinates.map(GeoPoint::from),
                },
                request.interviews_conducted.unwrap_or(0),
                request.villages_visited,
                request.notes,
                now,
            )
            .map_err(|err| Error::invalid_request(format!("invalid check-out: {err}")))?;

        self.attendance
            .update(&closed)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(
            assignment_id = %closed.assignment_id(),
            date = %closed.date(),
            interviews = closed.interviews_conducted(),
            "checked out"
        );
        Ok(AttendanceResponse {
            record: AttendancePayload::from(closed),
        })
    }

    async fn manual_entry(
        &self,
        request: ManualAttendanceRequest,
    ) -> Result<AttendanceResponse, Error> {
        self.authorized_assignment(&request.actor, request.assignment_id)
            .await?;

        let now = self.clock.utc();
        let mark = |time| SessionMark {
            time,
            location: None,
            coordinates: None,
        };
        let record = AttendanceRecord::new(AttendanceDraft {
            id: Uuid::new_v4(),
            assignment_id: request.assignment_id,
            date: request.date,
            check_in: request.check_in_time.map(mark),
            check_out: request.check_out_time.map(mark),
            interviews_conducted: request.interviews_conducted,
            villages_visited: request.villages_visited,
            travel_distance_km: request.travel_distance_km,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(format!("invalid attendance record: {err}")))?;

        self.attendance
            .insert(&record)
            .await
            .map_err(map_repository_error)?;

        Ok(AttendanceResponse {
            record: AttendancePayload::from(record),
        })
    }
}

#[async_trait]
impl<A, R> AttendanceQuery for AttendanceService<A, R>
where
    A: AssignmentRepository,
    R: AttendanceRepository,
{
    async fn list(&self, request: ListAttendanceRequest) -> Result<ListAttendanceResponse, Error> {
        let (limit, offset) = clamp_page(request.limit, request.offset);
        let filter = AttendanceFilter {
            assignment_id: request.assignment_id,
            resource_id: request.resource_id,
            from: request.from,
            to: request.to,
            limit,
            offset,
        };
        let records = self
            .attendance
            .list(&filter)
            .await
            .map_err(map_repository_error)?;
        Ok(ListAttendanceResponse {
            records: records.into_iter().map(AttendancePayload::from).collect(),
        })
    }

    async fn day_status(&self, request: DayStatusRequest) -> Result<DayStatusResponse, Error> {
        let record = self
            .attendance
            .find_by_date(request.assignment_id, request.date)
            .await
            .map_err(map_repository_error)?;
        let state = match &record {
            None => DayState::NotCheckedIn,
            Some(record) if record.is_open() => DayState::CheckedIn,
            Some(_) => DayState::CheckedOut,
        };
        Ok(DayStatusResponse {
            state,
            record: record.map(AttendancePayload::from),
        })
    }
}

#[cfg(test)]
#[path = "attendance_service_tests.rs"]
mod tests;
