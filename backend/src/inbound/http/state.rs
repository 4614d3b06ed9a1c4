//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AssignmentCommand, AssignmentQuery, AttendanceCommand, AttendanceQuery, AvailabilityCommand,
    AvailabilityQuery, ExpenseCommand, ExpenseQuery, ProgressQuery,
};
use crate::domain::ports::{
    FixtureAssignmentCommand, FixtureAssignmentQuery, FixtureAttendanceCommand,
    FixtureAttendanceQuery, FixtureAvailabilityCommand, FixtureAvailabilityQuery,
    FixtureExpenseCommand, FixtureExpenseQuery, FixtureProgressQuery,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```
/// use backend::inbound::http::state::HttpState;
///
/// let state = HttpState::default();
/// let _assignments = state.assignments.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub assignments: Arc<dyn AssignmentCommand>,
    pub assignments_query: Arc<dyn AssignmentQuery>,
    pub attendance: Arc<dyn AttendanceCommand>,
    pub attendance_query: Arc<dyn AttendanceQuery>,
    pub expenses: Arc<dyn ExpenseCommand>,
    pub expenses_query: Arc<dyn ExpenseQuery>,
    pub progress: Arc<dyn ProgressQuery>,
    pub availability: Arc<dyn AvailabilityCommand>,
    pub availability_query: Arc<dyn AvailabilityQuery>,
}

impl Default for HttpState {
    /// Fixture-backed state: queries answer empty, commands answer 503.
    fn default() -> Self {
        Self {
            assignments: Arc::new(FixtureAssignmentCommand),
            assignments_query: Arc::new(FixtureAssignmentQuery),
            attendance: Arc::new(FixtureAttendanceCommand),
            attendance_query: Arc::new(FixtureAttendanceQuery),
            expenses: Arc::new(FixtureExpenseCommand),
            expenses_query: Arc::new(FixtureExpenseQuery),
            progress: Arc::new(FixtureProgressQuery),
            availability: Arc::new(FixtureAvailabilityCommand),
            availability_query: Arc::new(FixtureAvailabilityQuery),
        }
    }
}
