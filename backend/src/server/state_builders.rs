//! Builders for the HTTP state over repository-backed services.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use backend::domain::ports::{AccessPolicy, AllowAllAccessPolicy, AvailabilityCoordinator};
use backend::domain::{
    AssignmentService, AttendanceService, AvailabilityService, ExpenseService, ProgressService,
};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DbPool, DieselAssignmentRepository, DieselAttendanceRepository, DieselExpenseRepository,
    DieselResourceRepository,
};

use super::ServerConfig;

/// Wire the domain services over Diesel repositories.
///
/// The availability service doubles as the coordinator hook the assignment
/// service calls around `active` transitions, so the two share one instance.
fn build_db_state(pool: &DbPool) -> HttpState {
    let assignments_repo = Arc::new(DieselAssignmentRepository::new(pool.clone()));
    let attendance_repo = Arc::new(DieselAttendanceRepository::new(pool.clone()));
    let expenses_repo = Arc::new(DieselExpenseRepository::new(pool.clone()));
    let resources_repo = Arc::new(DieselResourceRepository::new(pool.clone()));

    let policy: Arc<dyn AccessPolicy> = Arc::new(AllowAllAccessPolicy);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let availability = Arc::new(AvailabilityService::new(
        assignments_repo.clone(),
        resources_repo,
        policy.clone(),
        clock.clone(),
    ));
    let coordinator: Arc<dyn AvailabilityCoordinator> = availability.clone();
    let assignments = Arc::new(AssignmentService::new(
        assignments_repo.clone(),
        coordinator,
        policy.clone(),
        clock.clone(),
    ));
    let attendance = Arc::new(AttendanceService::new(
        assignments_repo.clone(),
        attendance_repo.clone(),
        policy.clone(),
        clock.clone(),
    ));
    let expenses = Arc::new(ExpenseService::new(
        assignments_repo.clone(),
        expenses_repo,
        policy,
        clock,
    ));
    let progress = Arc::new(ProgressService::new(assignments_repo, attendance_repo));

    HttpState {
        assignments: assignments.clone(),
        assignments_query: assignments,
        attendance: attendance.clone(),
        attendance_query: attendance,
        expenses: expenses.clone(),
        expenses_query: expenses,
        progress,
        availability: availability.clone(),
        availability_query: availability,
    }
}

/// Build the HTTP state, database-backed when a pool is configured.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => build_db_state(pool),
        None => HttpState::default(),
    };
    web::Data::new(state)
}
