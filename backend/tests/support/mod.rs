//! Shared fixtures for the backend integration suites.
//!
//! Every suite runs the real domain services over the in-memory adapters
//! from `backend::test_support::memory`. All five services share one
//! [`MemoryStore`] per scenario, so cross-ledger rules (deletion guards,
//! availability derivation) behave exactly as they do over the shared
//! database.

use std::sync::Arc;

use backend::domain::ports::{
    AllowAllAccessPolicy, AssignmentCommand, AssignmentResponse, AvailabilityCoordinator,
    CreateAssignmentRequest, TransitionAssignmentRequest,
};
use backend::domain::{
    ActorContext, ActorId, AssignmentService, AssignmentStatus, AttendanceService,
    AvailabilityService, Error, ExpenseService, ProgressService,
};
use backend::test_support::memory::{
    MemoryAssignmentRepository, MemoryAttendanceRepository, MemoryExpenseRepository,
    MemoryResourceRepository, MemoryStore,
};
use chrono::NaiveDate;
use uuid::Uuid;

/// The availability service doubles as the coordinator hook used by the
/// assignment service, so it is shared behind an `Arc`.
pub type SharedAvailability =
    AvailabilityService<MemoryAssignmentRepository, MemoryResourceRepository>;

/// All five services wired over one shared in-memory store.
pub struct FieldOps {
    pub assignments: AssignmentService<MemoryAssignmentRepository>,
    pub attendance: AttendanceService<MemoryAssignmentRepository, MemoryAttendanceRepository>,
    pub expenses: ExpenseService<MemoryAssignmentRepository, MemoryExpenseRepository>,
    pub progress: ProgressService<MemoryAssignmentRepository, MemoryAttendanceRepository>,
    pub availability: Arc<SharedAvailability>,
}

/// Wire the services the way the server's state builder does, but over
/// the in-memory adapters.
pub fn field_ops() -> FieldOps {
    let store = MemoryStore::shared();
    let assignments_repo = Arc::new(MemoryAssignmentRepository::new(store.clone()));
    let attendance_repo = Arc::new(MemoryAttendanceRepository::new(store.clone()));
    let expenses_repo = Arc::new(MemoryExpenseRepository::new(store.clone()));
    let resources_repo = Arc::new(MemoryResourceRepository::new(store));
    let policy = Arc::new(AllowAllAccessPolicy);
    let clock = Arc::new(mockable::DefaultClock);

    let availability = Arc::new(AvailabilityService::new(
        assignments_repo.clone(),
        resources_repo,
        policy.clone(),
        clock.clone(),
    ));

    let coordinator: Arc<dyn AvailabilityCoordinator> = availability.clone();

    FieldOps {
        assignments: AssignmentService::new(
            assignments_repo.clone(),
            coordinator,
            policy.clone(),
            clock.clone(),
        ),
        attendance: AttendanceService::new(
            assignments_repo.clone(),
            attendance_repo.clone(),
            policy.clone(),
            clock.clone(),
        ),
        expenses: ExpenseService::new(assignments_repo.clone(), expenses_repo, policy, clock),
        progress: ProgressService::new(assignments_repo, attendance_repo),
        availability,
    }
}

pub fn actor() -> ActorContext {
    ActorContext::new(ActorId::random())
}

pub fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
}

/// A create request for a two-week survey round; callers override the
/// fields a scenario cares about.
pub fn create_request(resource_id: Uuid) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        actor: actor(),
        project_id: Uuid::new_v4(),
        resource_id,
        start_date: day(3, 2),
        end_date: day(3, 20),
        assigned_districts: vec!["North".to_owned()],
        assigned_villages: vec!["Kibo".to_owned(), "Mwanza".to_owned()],
        target_interviews: 40,
        total_days: 15,
        daily_rate: None,
        instructions: None,
        notes: None,
    }
}

/// Create an assignment for the resource and walk it to the requested
/// status, returning its identifier.
pub async fn booked_assignment(
    ops: &FieldOps,
    resource_id: Uuid,
    status: AssignmentStatus,
) -> Result<Uuid, Error> {
    let AssignmentResponse { assignment } =
        ops.assignments.create(create_request(resource_id)).await?;
    if status == AssignmentStatus::Pending {
        return Ok(assignment.id);
    }
    ops.assignments
        .transition(TransitionAssignmentRequest {
            actor: actor(),
            assignment_id: assignment.id,
            next_status: AssignmentStatus::Active,
        })
        .await?;
    if status != AssignmentStatus::Active {
        ops.assignments
            .transition(TransitionAssignmentRequest {
                actor: actor(),
                assignment_id: assignment.id,
                next_status: status,
            })
            .await?;
    }
    Ok(assignment.id)
}
