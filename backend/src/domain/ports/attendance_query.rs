//! Driving port for attendance reads.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;

use super::attendance_command::AttendancePayload;

/// Request to list attendance records.
#[derive(Debug, Clone, Copy)]
pub struct ListAttendanceRequest {
    /// Restrict to one assignment's ledger.
    pub assignment_id: Option<Uuid>,
    /// Restrict to one resource's records across assignments.
    pub resource_id: Option<Uuid>,
    /// Earliest day to include.
    pub from: Option<NaiveDate>,
    /// Latest day to include.
    pub to: Option<NaiveDate>,
    /// Page size; defaults to the service cap.
    pub limit: Option<i64>,
    /// Rows to skip before the page.
    pub offset: Option<i64>,
}

/// Response carrying a page of attendance records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAttendanceResponse {
    /// Records in the page, most recent day first.
    pub records: Vec<AttendancePayload>,
}

/// Request for an assignment's status on one day.
#[derive(Debug, Clone, Copy)]
pub struct DayStatusRequest {
    /// Assignment being queried.
    pub assignment_id: Uuid,
    /// The day in question, usually today.
    pub date: NaiveDate,
}

/// Where the assignment stands on one working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    /// No record exists for the day.
    NotCheckedIn,
    /// A session is open: checked in, not yet checked out.
    CheckedIn,
    /// The day's session is closed.
    CheckedOut,
}

/// Response describing one working day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatusResponse {
    /// Where the day stands.
    pub state: DayState,
    /// The day's record, absent when `state` is `not_checked_in`.
    pub record: Option<AttendancePayload>,
}

/// Driving port for attendance reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceQuery: Send + Sync {
    /// List matching records, most recent day first.
    async fn list(&self, request: ListAttendanceRequest) -> Result<ListAttendanceResponse, Error>;

    /// Report whether the assignment is checked in, out, or absent for a day.
    async fn day_status(&self, request: DayStatusRequest) -> Result<DayStatusResponse, Error>;
}

/// Fixture query implementation used before a store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAttendanceQuery;

#[async_trait]
impl AttendanceQuery for FixtureAttendanceQuery {
    async fn list(&self, _request: ListAttendanceRequest) -> Result<ListAttendanceResponse, Error> {
        Ok(ListAttendanceResponse {
            records: Vec::new(),
        })
    }

    async fn day_status(&self, _request: DayStatusRequest) -> Result<DayStatusResponse, Error> {
        Ok(DayStatusResponse {
            state: DayState::NotCheckedIn,
            record: None,
        })
    }
}
