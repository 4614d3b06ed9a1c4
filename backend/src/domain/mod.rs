//! Domain layer: entities, ports and services for field operations.
//!
//! Entities validate their own invariants at construction; ports define
//! the hexagonal boundary; services implement the driving ports on top of
//! the driven ones. Nothing in this module knows about HTTP or Diesel.

pub mod actor;
pub mod assignments;
pub mod attendance;
pub mod error;
pub mod expenses;
pub mod ports;

mod assignment_service;
mod attendance_service;
mod availability_service;
mod expense_service;
mod progress_service;

pub use self::actor::{ActorContext, ActorId, ActorIdValidationError};
pub use self::assignment_service::AssignmentService;
pub use self::assignments::{
    Assignment, AssignmentDraft, AssignmentFieldUpdate, AssignmentStatus,
    AssignmentValidationError, UnknownStatusError,
};
pub use self::attendance::{
    AttendanceDraft, AttendanceRecord, AttendanceValidationError, GeoPoint, SessionMark,
};
pub use self::attendance_service::AttendanceService;
pub use self::availability_service::AvailabilityService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::expense_service::ExpenseService;
pub use self::expenses::{
    Approval, Expense, ExpenseDraft, ExpenseType, ExpenseValidationError, UnknownExpenseTypeError,
};
pub use self::progress_service::ProgressService;

/// Convenient result alias for driving-port operations.
pub type ApiResult<T> = Result<T, Error>;
