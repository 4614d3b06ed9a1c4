//! End-to-end lifecycle tests for the assignment booking ledger.
//!
//! Exercises the real services over shared in-memory adapters: booking,
//! activation and the availability flip, the deletion guard, field
//! freezing outside `pending` and the reconcile repair pass.

use backend::domain::ports::{
    AssignmentCommand, AssignmentQuery, AttendanceCommand, AvailabilityCommand, AvailabilityQuery,
    DeleteAssignmentRequest, GetAvailabilityRequest, ListAssignmentsRequest,
    ManualAttendanceRequest, SetAvailabilityRequest, TransitionAssignmentRequest,
    UpdateAssignmentRequest,
};
use backend::domain::{AssignmentFieldUpdate, AssignmentStatus, ErrorCode};
use uuid::Uuid;

mod support;

use support::{actor, booked_assignment, create_request, day, field_ops};

#[tokio::test]
async fn create_books_a_pending_assignment() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();

    let response = ops
        .assignments
        .create(create_request(resource_id))
        .await
        .expect("create succeeds");

    assert_eq!(response.assignment.status, AssignmentStatus::Pending);
    assert_eq!(response.assignment.resource_id, resource_id);

    let listed = ops
        .assignments
        .list(ListAssignmentsRequest {
            resource_id: Some(resource_id),
            ..ListAssignmentsRequest::default()
        })
        .await
        .expect("list succeeds");
    assert_eq!(listed.assignments.len(), 1);
    assert_eq!(listed.assignments[0].id, response.assignment.id);
}

#[tokio::test]
async fn overlapping_booking_for_the_same_resource_is_rejected() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    booked_assignment(&ops, resource_id, AssignmentStatus::Pending)
        .await
        .expect("first booking");

    let mut second = create_request(resource_id);
    second.start_date = day(3, 15);
    second.end_date = day(3, 25);

    let error = ops
        .assignments
        .create(second)
        .await
        .expect_err("overlap rejected");
    assert_eq!(error.code(), ErrorCode::ResourceUnavailable);
}

#[tokio::test]
async fn disjoint_periods_for_the_same_resource_are_allowed() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    booked_assignment(&ops, resource_id, AssignmentStatus::Pending)
        .await
        .expect("first booking");

    let mut second = create_request(resource_id);
    second.start_date = day(4, 1);
    second.end_date = day(4, 10);

    ops.assignments
        .create(second)
        .await
        .expect("disjoint booking succeeds");
}

#[tokio::test]
async fn activation_marks_the_resource_busy() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    booked_assignment(&ops, resource_id, AssignmentStatus::Active)
        .await
        .expect("activate");

    let flag = ops
        .availability
        .get(GetAvailabilityRequest { resource_id })
        .await
        .expect("availability read");
    assert!(!flag.available);
}

#[tokio::test]
async fn completing_the_only_active_booking_frees_the_resource() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    booked_assignment(&ops, resource_id, AssignmentStatus::Completed)
        .await
        .expect("complete");

    let flag = ops
        .availability
        .get(GetAvailabilityRequest { resource_id })
        .await
        .expect("availability read");
    assert!(flag.available);
}

#[tokio::test]
async fn activation_is_refused_while_the_resource_is_flagged_busy() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    let assignment_id = booked_assignment(&ops, resource_id, AssignmentStatus::Pending)
        .await
        .expect("booking");

    ops.availability
        .set(SetAvailabilityRequest {
            actor: actor(),
            resource_id,
            available: false,
        })
        .await
        .expect("manual override");

    let error = ops
        .assignments
        .transition(TransitionAssignmentRequest {
            actor: actor(),
            assignment_id,
            next_status: AssignmentStatus::Active,
        })
        .await
        .expect_err("activation refused");
    assert_eq!(error.code(), ErrorCode::ResourceUnavailable);
}

#[tokio::test]
async fn terminal_states_accept_no_further_transitions() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    let assignment_id = booked_assignment(&ops, resource_id, AssignmentStatus::Completed)
        .await
        .expect("complete");

    let error = ops
        .assignments
        .transition(TransitionAssignmentRequest {
            actor: actor(),
            assignment_id,
            next_status: AssignmentStatus::Active,
        })
        .await
        .expect_err("reopening refused");
    assert_eq!(error.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn dates_and_targets_freeze_once_active() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    let assignment_id = booked_assignment(&ops, resource_id, AssignmentStatus::Active)
        .await
        .expect("activate");

    let error = ops
        .assignments
        .update(UpdateAssignmentRequest {
            actor: actor(),
            assignment_id,
            update: AssignmentFieldUpdate {
                end_date: Some(day(3, 25)),
                ..AssignmentFieldUpdate::default()
            },
        })
        .await
        .expect_err("frozen field rejected");
    assert_eq!(error.code(), ErrorCode::ImmutableState);
}

#[tokio::test]
async fn notes_stay_editable_in_every_state() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    let assignment_id = booked_assignment(&ops, resource_id, AssignmentStatus::Active)
        .await
        .expect("activate");

    let response = ops
        .assignments
        .update(UpdateAssignmentRequest {
            actor: actor(),
            assignment_id,
            update: AssignmentFieldUpdate {
                notes: Some(Some("rains delayed the northern route".to_owned())),
                ..AssignmentFieldUpdate::default()
            },
        })
        .await
        .expect("notes update succeeds");
    assert_eq!(
        response.assignment.notes.as_deref(),
        Some("rains delayed the northern route")
    );
}

#[tokio::test]
async fn deletion_is_blocked_while_ledger_entries_exist() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    let assignment_id = booked_assignment(&ops, resource_id, AssignmentStatus::Active)
        .await
        .expect("activate");

    ops.attendance
        .manual_entry(ManualAttendanceRequest {
            actor: actor(),
            assignment_id,
            date: day(3, 3),
            check_in_time: None,
            check_out_time: None,
            interviews_conducted: 4,
            villages_visited: vec!["Kibo".to_owned()],
            travel_distance_km: None,
            notes: None,
        })
        .await
        .expect("manual entry");

    let error = ops
        .assignments
        .delete(DeleteAssignmentRequest {
            actor: actor(),
            assignment_id,
        })
        .await
        .expect_err("deletion blocked");
    assert_eq!(error.code(), ErrorCode::HasDependents);
}

#[tokio::test]
async fn deleting_an_active_booking_without_dependents_frees_the_resource() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    let assignment_id = booked_assignment(&ops, resource_id, AssignmentStatus::Active)
        .await
        .expect("activate");

    ops.assignments
        .delete(DeleteAssignmentRequest {
            actor: actor(),
            assignment_id,
        })
        .await
        .expect("delete succeeds");

    let flag = ops
        .availability
        .get(GetAvailabilityRequest { resource_id })
        .await
        .expect("availability read");
    assert!(flag.available);
}

#[tokio::test]
async fn reconcile_repairs_a_drifted_availability_flag() {
    let ops = field_ops();
    let resource_id = Uuid::new_v4();
    booked_assignment(&ops, resource_id, AssignmentStatus::Active)
        .await
        .expect("activate");

    // Simulate drift: an operator override left the busy resource
    // flagged available.
    ops.availability
        .set(SetAvailabilityRequest {
            actor: actor(),
            resource_id,
            available: true,
        })
        .await
        .expect("manual override");

    let outcome = ops.availability.reconcile().await.expect("reconcile");
    assert_eq!(outcome.corrected.len(), 1);
    assert_eq!(outcome.corrected[0].resource_id, resource_id);
    assert!(!outcome.corrected[0].available);

    let flag = ops
        .availability
        .get(GetAvailabilityRequest { resource_id })
        .await
        .expect("availability read");
    assert!(!flag.available);
}
