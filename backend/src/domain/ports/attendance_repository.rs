//! Port for attendance ledger persistence.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::AttendanceRecord;

use super::define_port_error;

define_port_error! {
    /// Errors raised by attendance repository adapters.
    pub enum AttendanceRepositoryError {
        /// Repository connection could not be established.
        Connection {
            /// Adapter-specific detail.
            message: String
        } =>
            "attendance repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Adapter-specific detail.
            message: String
        } =>
            "attendance repository query failed: {message}",
        /// An open session already exists for the assignment.
        OpenSessionExists {
            /// Assignment holding the open session.
            assignment_id: Uuid,
        } =>
            "assignment {assignment_id} already has an open attendance session",
        /// A record already exists for the assignment and date.
        DuplicateDate {
            /// Assignment the insert targeted.
            assignment_id: Uuid,
            /// Date already covered by a record.
            date: NaiveDate,
        } =>
            "assignment {assignment_id} already has an attendance record for {date}",
    }
}

/// Filter for attendance listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    /// Restrict to one assignment.
    pub assignment_id: Option<Uuid>,
    /// Restrict to assignments held by one field resource.
    pub resource_id: Option<Uuid>,
    /// Inclusive lower bound on the record date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the record date.
    pub to: Option<NaiveDate>,
    /// Page size; adapters clamp to a sane maximum.
    pub limit: i64,
    /// Page offset.
    pub offset: i64,
}

/// Port for reading and writing attendance records.
///
/// Contracts:
/// - `insert` must atomically enforce both uniqueness rules: it fails with
///   `OpenSessionExists` when the new record is open-shaped and the
///   assignment already holds an open session (any date), and with
///   `DuplicateDate` when a record exists for (assignment, date). Two racing
///   check-ins must not both succeed.
/// - `list` orders by date descending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Persist a new attendance record, enforcing the uniqueness rules.
    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError>;

    /// Overwrite an existing record (check-out fill or direct edit).
    async fn update(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError>;

    /// Find the assignment's open session, if one exists.
    async fn find_open(
        &self,
        assignment_id: Uuid,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError>;

    /// Find the record for (assignment, date), if one exists.
    async fn find_by_date(
        &self,
        assignment_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError>;

    /// List records matching the filter, ordered by date descending.
    async fn list(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError>;

    /// Aggregate the assignment's ledger: interview sum and day count.
    async fn tally(&self, assignment_id: Uuid) -> Result<AttendanceTally, AttendanceRepositoryError>;
}

/// Aggregates over one assignment's attendance ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTally {
    /// Sum of `interviews_conducted` across the ledger.
    pub interviews: i64,
    /// Number of recorded working days.
    pub days: i64,
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAttendanceRepository;

#[async_trait]
impl AttendanceRepository for FixtureAttendanceRepository {
    async fn insert(&self, _record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        Ok(())
    }

    async fn update(&self, _record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        Ok(())
    }

    async fn find_open(
        &self,
        _assignment_id: Uuid,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        Ok(None)
    }

    async fn find_by_date(
        &self,
        _assignment_id: Uuid,
        _date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
        Ok(Vec::new())
    }

    async fn tally(&self, _assignment_id: Uuid) -> Result<AttendanceTally, AttendanceRepositoryError> {
        Ok(AttendanceTally::default())
    }
}
