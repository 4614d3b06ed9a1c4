//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod access_policy;
mod assignment_command;
mod assignment_query;
mod assignment_repository;
mod attendance_command;
mod attendance_query;
mod attendance_repository;
mod availability;
mod expense_command;
mod expense_query;
mod expense_repository;
mod progress_query;
mod resource_repository;

#[cfg(test)]
pub use access_policy::MockAccessPolicy;
pub use access_policy::{AccessPolicy, AccessPolicyError, AllowAllAccessPolicy, PolicyScope};
#[cfg(test)]
pub use assignment_command::MockAssignmentCommand;
pub use assignment_command::{
    AssignmentCommand, AssignmentPayload, AssignmentResponse, CreateAssignmentRequest,
    DeleteAssignmentRequest, FixtureAssignmentCommand, TransitionAssignmentRequest,
    UpdateAssignmentRequest,
};
#[cfg(test)]
pub use assignment_query::MockAssignmentQuery;
pub use assignment_query::{
    AssignmentQuery, FixtureAssignmentQuery, GetAssignmentRequest, ListAssignmentsRequest,
    ListAssignmentsResponse,
};
#[cfg(test)]
pub use assignment_repository::MockAssignmentRepository;
pub use assignment_repository::{
    AssignmentFilter, AssignmentRepository, AssignmentRepositoryError,
    FixtureAssignmentRepository,
};
#[cfg(test)]
pub use attendance_command::MockAttendanceCommand;
pub use attendance_command::{
    AttendanceCommand, AttendancePayload, AttendanceResponse, CheckInRequest, CheckOutRequest,
    FixtureAttendanceCommand, GeoPointPayload, ManualAttendanceRequest, SessionMarkPayload,
};
#[cfg(test)]
pub use attendance_query::MockAttendanceQuery;
pub use attendance_query::{
    AttendanceQuery, DayState, DayStatusRequest, DayStatusResponse, FixtureAttendanceQuery,
    ListAttendanceRequest, ListAttendanceResponse,
};
#[cfg(test)]
pub use attendance_repository::MockAttendanceRepository;
pub use attendance_repository::{
    AttendanceFilter, AttendanceRepository, AttendanceRepositoryError, AttendanceTally,
    FixtureAttendanceRepository,
};
#[cfg(test)]
pub use availability::{MockAvailabilityCommand, MockAvailabilityCoordinator, MockAvailabilityQuery};
pub use availability::{
    AvailabilityCommand, AvailabilityCoordinator, AvailabilityPayload, AvailabilityQuery,
    FixtureAvailabilityCommand, FixtureAvailabilityQuery, GetAvailabilityRequest,
    ReconcileResponse, SetAvailabilityRequest,
};
#[cfg(test)]
pub use expense_command::MockExpenseCommand;
pub use expense_command::{
    ApprovalPayload, ApproveExpenseRequest, CreateExpenseRequest, DeleteExpenseRequest,
    ExpenseCommand, ExpensePayload, ExpenseResponse, FixtureExpenseCommand, UpdateExpenseRequest,
};
#[cfg(test)]
pub use expense_query::MockExpenseQuery;
pub use expense_query::{
    ExpenseQuery, ExpenseSummaryRequest, ExpenseSummaryResponse, FixtureExpenseQuery,
    GetExpenseRequest, ListExpensesRequest, ListExpensesResponse,
};
#[cfg(test)]
pub use expense_repository::MockExpenseRepository;
pub use expense_repository::{
    ExpenseFilter, ExpenseRepository, ExpenseRepositoryError, ExpenseTotals,
    FixtureExpenseRepository,
};
#[cfg(test)]
pub use progress_query::MockProgressQuery;
pub use progress_query::{FixtureProgressQuery, ProgressQuery, ProgressRequest, ProgressResponse};
#[cfg(test)]
pub use resource_repository::MockResourceRepository;
pub use resource_repository::{
    FixtureResourceRepository, ResourceRepository, ResourceRepositoryError,
};
