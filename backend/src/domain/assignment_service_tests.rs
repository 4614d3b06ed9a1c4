//! Tests for the assignment service.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    AccessPolicy, AccessPolicyError, AllowAllAccessPolicy, MockAccessPolicy,
    MockAssignmentRepository, MockAvailabilityCoordinator,
};
use crate::domain::{ActorContext, ActorId, AssignmentDraft, AssignmentFieldUpdate, ErrorCode};

fn day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).expect("valid date")
}

fn actor() -> ActorContext {
    ActorContext::new(ActorId::random())
}

fn sample_assignment(status: AssignmentStatus) -> Assignment {
    let now = Utc::now();
    Assignment::new(AssignmentDraft {
        id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        resource_id: Uuid::new_v4(),
        status,
        start_date: day(1),
        end_date: day(10),
        assigned_districts: vec!["North".to_owned()],
        assigned_villages: vec!["Kigoma".to_owned()],
        target_interviews: 10,
        total_days: 8,
        daily_rate: None,
        instructions: None,
        notes: None,
        created_at: now,
        updated_at: now,
    })
    .expect("valid assignment")
}

fn sample_create_request() -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        actor: actor(),
        project_id: Uuid::new_v4(),
        resource_id: Uuid::new_v4(),
        start_date: day(1),
        end_date: day(10),
        assigned_districts: vec!["North".to_owned()],
        assigned_villages: vec![],
        target_interviews: 10,
        total_days: 8,
        daily_rate: None,
        instructions: None,
        notes: None,
    }
}

fn service(
    repo: MockAssignmentRepository,
    availability: MockAvailabilityCoordinator,
) -> AssignmentService<MockAssignmentRepository> {
    AssignmentService::new(
        Arc::new(repo),
        Arc::new(availability),
        Arc::new(AllowAllAccessPolicy),
        Arc::new(mockable::DefaultClock),
    )
}

#[tokio::test]
async fn create_persists_pending_assignment() {
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_overlapping()
        .times(1)
        .return_once(|_, _, _| Ok(Vec::new()));
    repo.expect_insert().times(1).return_once(|_| Ok(()));

    let response = service(repo, MockAvailabilityCoordinator::new())
        .create(sample_create_request())
        .await
        .expect("create succeeds");

    assert_eq!(response.assignment.status, AssignmentStatus::Pending);
    assert_eq!(response.assignment.target_interviews, 10);
}

#[tokio::test]
async fn create_rejects_overlapping_booking() {
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_overlapping()
        .times(1)
        .return_once(|_, _, _| Ok(vec![sample_assignment(AssignmentStatus::Pending)]));
    repo.expect_insert().times(0);

    let error = service(repo, MockAvailabilityCoordinator::new())
        .create(sample_create_request())
        .await
        .expect_err("overlap rejected");

    assert_eq!(error.code(), ErrorCode::ResourceUnavailable);
}

#[tokio::test]
async fn create_rejects_inverted_period() {
    let mut request = sample_create_request();
    request.start_date = day(10);
    request.end_date = day(1);

    let error = service(
        MockAssignmentRepository::new(),
        MockAvailabilityCoordinator::new(),
    )
    .create(request)
    .await
    .expect_err("invalid period");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn create_is_forbidden_when_policy_denies() {
    let mut policy = MockAccessPolicy::new();
    policy
        .expect_is_permitted()
        .times(1)
        .return_once(|_, _| Ok(false));

    let assignment_service = AssignmentService::new(
        Arc::new(MockAssignmentRepository::new()),
        Arc::new(MockAvailabilityCoordinator::new()),
        Arc::new(policy),
        Arc::new(mockable::DefaultClock),
    );
    let error = assignment_service
        .create(sample_create_request())
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

/// Policy stub whose future never resolves.
struct StallingPolicy;

#[async_trait::async_trait]
impl AccessPolicy for StallingPolicy {
    async fn is_permitted(
        &self,
        _actor: &ActorContext,
        _scope: PolicyScope,
    ) -> Result<bool, AccessPolicyError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn policy_check_times_out_as_dependency_timeout() {
    let error = authorize(&StallingPolicy, &actor(), PolicyScope::project(Uuid::new_v4()))
        .await
        .expect_err("timeout");

    assert_eq!(error.code(), ErrorCode::DependencyTimeout);
}

#[tokio::test]
async fn update_freezes_dates_outside_pending() {
    let current = sample_assignment(AssignmentStatus::Active);
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    repo.expect_update().times(0);

    let request = UpdateAssignmentRequest {
        actor: actor(),
        assignment_id: Uuid::new_v4(),
        update: AssignmentFieldUpdate {
            start_date: Some(day(2)),
            ..AssignmentFieldUpdate::default()
        },
    };
    let error = service(repo, MockAvailabilityCoordinator::new())
        .update(request)
        .await
        .expect_err("frozen fields");

    assert_eq!(error.code(), ErrorCode::ImmutableState);
}

#[tokio::test]
async fn update_allows_notes_in_any_state() {
    let current = sample_assignment(AssignmentStatus::Active);
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    repo.expect_update().times(1).return_once(|_| Ok(()));

    let request = UpdateAssignmentRequest {
        actor: actor(),
        assignment_id: Uuid::new_v4(),
        update: AssignmentFieldUpdate {
            notes: Some(Some("escalated to supervisor".to_owned())),
            ..AssignmentFieldUpdate::default()
        },
    };
    let response = service(repo, MockAvailabilityCoordinator::new())
        .update(request)
        .await
        .expect("notes update succeeds");

    assert_eq!(
        response.assignment.notes.as_deref(),
        Some("escalated to supervisor")
    );
}

#[tokio::test]
async fn delete_is_blocked_by_dependents() {
    let current = sample_assignment(AssignmentStatus::Pending);
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    repo.expect_has_dependents()
        .times(1)
        .return_once(|_| Ok(true));
    repo.expect_delete().times(0);

    let error = service(repo, MockAvailabilityCoordinator::new())
        .delete(DeleteAssignmentRequest {
            actor: actor(),
            assignment_id: Uuid::new_v4(),
        })
        .await
        .expect_err("dependents block delete");

    assert_eq!(error.code(), ErrorCode::HasDependents);
}

#[tokio::test]
async fn delete_of_active_assignment_frees_the_resource() {
    let current = sample_assignment(AssignmentStatus::Active);
    let resource_id = current.resource_id();
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    repo.expect_has_dependents()
        .times(1)
        .return_once(|_| Ok(false));
    repo.expect_delete().times(1).return_once(|_| Ok(true));

    let mut availability = MockAvailabilityCoordinator::new();
    availability
        .expect_on_assignment_deactivated()
        .withf(move |id| *id == resource_id)
        .times(1)
        .return_once(|_| Ok(()));

    service(repo, availability)
        .delete(DeleteAssignmentRequest {
            actor: actor(),
            assignment_id: Uuid::new_v4(),
        })
        .await
        .expect("delete succeeds");
}

#[tokio::test]
async fn transition_rejects_illegal_move() {
    let current = sample_assignment(AssignmentStatus::Completed);
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    repo.expect_set_status().times(0);

    let error = service(repo, MockAvailabilityCoordinator::new())
        .transition(TransitionAssignmentRequest {
            actor: actor(),
            assignment_id: Uuid::new_v4(),
            next_status: AssignmentStatus::Active,
        })
        .await
        .expect_err("terminal state");

    assert_eq!(error.code(), ErrorCode::InvalidTransition);
    assert!(error.message().contains("completed"));
    assert!(error.message().contains("active"));
}

#[tokio::test]
async fn activation_requires_an_available_resource() {
    let current = sample_assignment(AssignmentStatus::Pending);
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    repo.expect_set_status().times(0);

    let mut availability = MockAvailabilityCoordinator::new();
    availability
        .expect_is_available()
        .times(1)
        .return_once(|_| Ok(false));

    let error = service(repo, availability)
        .transition(TransitionAssignmentRequest {
            actor: actor(),
            assignment_id: Uuid::new_v4(),
            next_status: AssignmentStatus::Active,
        })
        .await
        .expect_err("resource busy");

    assert_eq!(error.code(), ErrorCode::ResourceUnavailable);
}

#[tokio::test]
async fn activation_flips_availability_after_the_status_write() {
    let current = sample_assignment(AssignmentStatus::Pending);
    let resource_id = current.resource_id();
    let activated = current.with_status(AssignmentStatus::Active, Utc::now());

    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    repo.expect_set_status()
        .times(1)
        .return_once(move |_, _, _, _| Ok(Some(activated)));

    let mut availability = MockAvailabilityCoordinator::new();
    availability
        .expect_is_available()
        .times(1)
        .return_once(|_| Ok(true));
    availability
        .expect_on_assignment_activated()
        .withf(move |id| *id == resource_id)
        .times(1)
        .return_once(|_| Ok(()));

    let response = service(repo, availability)
        .transition(TransitionAssignmentRequest {
            actor: actor(),
            assignment_id: Uuid::new_v4(),
            next_status: AssignmentStatus::Active,
        })
        .await
        .expect("activation succeeds");

    assert_eq!(response.assignment.status, AssignmentStatus::Active);
}

#[tokio::test]
async fn completion_restores_availability() {
    let current = sample_assignment(AssignmentStatus::Active);
    let resource_id = current.resource_id();
    let completed = current.with_status(AssignmentStatus::Completed, Utc::now());

    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    repo.expect_set_status()
        .times(1)
        .return_once(move |_, _, _, _| Ok(Some(completed)));

    let mut availability = MockAvailabilityCoordinator::new();
    availability
        .expect_on_assignment_deactivated()
        .withf(move |id| *id == resource_id)
        .times(1)
        .return_once(|_| Ok(()));

    let response = service(repo, availability)
        .transition(TransitionAssignmentRequest {
            actor: actor(),
            assignment_id: Uuid::new_v4(),
            next_status: AssignmentStatus::Completed,
        })
        .await
        .expect("completion succeeds");

    assert_eq!(response.assignment.status, AssignmentStatus::Completed);
}

#[tokio::test]
async fn failed_activation_flip_reverts_the_status_write() {
    use crate::test_support::memory::{MemoryAssignmentRepository, MemoryStore};

    let stored = sample_assignment(AssignmentStatus::Pending);
    let assignment_id = stored.id();
    let repo = MemoryAssignmentRepository::new(MemoryStore::shared());
    repo.insert(&stored).await.expect("seed assignment");

    let mut failing = MockAvailabilityCoordinator::new();
    failing.expect_is_available().times(1).return_once(|_| Ok(true));
    failing
        .expect_on_assignment_activated()
        .times(1)
        .return_once(|_| Err(Error::service_unavailable("availability store unreachable")));

    let error = AssignmentService::new(
        Arc::new(repo.clone()),
        Arc::new(failing),
        Arc::new(AllowAllAccessPolicy),
        Arc::new(mockable::DefaultClock),
    )
    .transition(TransitionAssignmentRequest {
        actor: actor(),
        assignment_id,
        next_status: AssignmentStatus::Active,
    })
    .await
    .expect_err("flip failure surfaces");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);

    // The status write was undone, so the booking still looks pending.
    let reloaded = repo
        .find_by_id(assignment_id)
        .await
        .expect("lookup succeeds")
        .expect("assignment present");
    assert_eq!(reloaded.status(), AssignmentStatus::Pending);

    // A retry over the same store succeeds once availability recovers.
    let mut recovered = MockAvailabilityCoordinator::new();
    recovered.expect_is_available().times(1).return_once(|_| Ok(true));
    recovered
        .expect_on_assignment_activated()
        .times(1)
        .return_once(|_| Ok(()));

    let response = AssignmentService::new(
        Arc::new(repo),
        Arc::new(recovered),
        Arc::new(AllowAllAccessPolicy),
        Arc::new(mockable::DefaultClock),
    )
    .transition(TransitionAssignmentRequest {
        actor: actor(),
        assignment_id,
        next_status: AssignmentStatus::Active,
    })
    .await
    .expect("retry succeeds");
    assert_eq!(response.assignment.status, AssignmentStatus::Active);
}

#[tokio::test]
async fn failed_deactivation_flip_keeps_the_assignment_active() {
    use crate::test_support::memory::{MemoryAssignmentRepository, MemoryStore};

    let stored = sample_assignment(AssignmentStatus::Active);
    let assignment_id = stored.id();
    let repo = MemoryAssignmentRepository::new(MemoryStore::shared());
    repo.insert(&stored).await.expect("seed assignment");

    let mut failing = MockAvailabilityCoordinator::new();
    failing
        .expect_on_assignment_deactivated()
        .times(1)
        .return_once(|_| Err(Error::service_unavailable("availability store unreachable")));

    let error = AssignmentService::new(
        Arc::new(repo.clone()),
        Arc::new(failing),
        Arc::new(AllowAllAccessPolicy),
        Arc::new(mockable::DefaultClock),
    )
    .transition(TransitionAssignmentRequest {
        actor: actor(),
        assignment_id,
        next_status: AssignmentStatus::Completed,
    })
    .await
    .expect_err("flip failure surfaces");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);

    let reloaded = repo
        .find_by_id(assignment_id)
        .await
        .expect("lookup succeeds")
        .expect("assignment present");
    assert_eq!(reloaded.status(), AssignmentStatus::Active);
}

#[tokio::test]
async fn concurrent_status_change_maps_to_invalid_transition() {
    let current = sample_assignment(AssignmentStatus::Pending);
    let assignment_id = current.id();
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    repo.expect_set_status().times(1).return_once(move |_, _, _, _| {
        Err(AssignmentRepositoryError::status_conflict(
            assignment_id,
            AssignmentStatus::Cancelled,
        ))
    });

    let error = service(repo, MockAvailabilityCoordinator::new())
        .transition(TransitionAssignmentRequest {
            actor: actor(),
            assignment_id: Uuid::new_v4(),
            next_status: AssignmentStatus::Cancelled,
        })
        .await
        .expect_err("lost the race");

    assert_eq!(error.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn list_clamps_oversized_page_requests() {
    let mut repo = MockAssignmentRepository::new();
    repo.expect_list()
        .withf(|filter| filter.limit == MAX_PAGE_SIZE && filter.offset == 0)
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    let response = service(repo, MockAvailabilityCoordinator::new())
        .list(ListAssignmentsRequest {
            limit: Some(5_000),
            ..ListAssignmentsRequest::default()
        })
        .await
        .expect("list succeeds");

    assert!(response.assignments.is_empty());
}

#[tokio::test]
async fn get_maps_missing_assignment_to_not_found() {
    let mut repo = MockAssignmentRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let error = service(repo, MockAvailabilityCoordinator::new())
        .get(GetAssignmentRequest {
            assignment_id: Uuid::new_v4(),
        })
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}
