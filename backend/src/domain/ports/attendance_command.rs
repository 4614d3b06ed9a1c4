//! Driving port for the attendance ledger: check-in, check-out and
//! supervisor-entered manual records.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    ActorContext, AttendanceRecord, Error, GeoPoint, SessionMark,
};

/// Serializable coordinates for driving ports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPointPayload {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl From<GeoPoint> for GeoPointPayload {
    fn from(value: GeoPoint) -> Self {
        Self {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

impl From<GeoPointPayload> for GeoPoint {
    fn from(value: GeoPointPayload) -> Self {
        Self {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

/// Serializable session mark for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMarkPayload {
    /// Wall-clock instant of the mark.
    pub time: DateTime<Utc>,
    /// Free-text place description.
    pub location: Option<String>,
    /// Optional device coordinates.
    pub coordinates: Option<GeoPointPayload>,
}

impl From<SessionMark> for SessionMarkPayload {
    fn from(value: SessionMark) -> Self {
        Self {
            time: value.time,
            location: value.location,
            coordinates: value.coordinates.map(GeoPointPayload::from),
        }
    }
}

/// Serializable attendance record for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePayload {
    /// Record identifier.
    pub id: Uuid,
    /// Owning assignment.
    pub assignment_id: Uuid,
    /// Working day the record covers.
    pub date: NaiveDate,
    /// Check-in mark, if recorded.
    pub check_in: Option<SessionMarkPayload>,
    /// Check-out mark, if recorded.
    pub check_out: Option<SessionMarkPayload>,
    /// Interviews tallied for the day.
    pub interviews_conducted: i32,
    /// Villages visited during the day.
    pub villages_visited: Vec<String>,
    /// Distance travelled, if recorded.
    pub travel_distance_km: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<AttendanceRecord> for AttendancePayload {
    fn from(value: AttendanceRecord) -> Self {
        Self {
            id: value.id(),
            assignment_id: value.assignment_id(),
            date: value.date(),
            check_in: value.check_in().cloned().map(SessionMarkPayload::from),
            check_out: value.check_out().cloned().map(SessionMarkPayload::from),
            interviews_conducted: value.interviews_conducted(),
            villages_visited: value.villages_visited().to_vec(),
            travel_distance_km: value.travel_distance_km(),
            notes: value.notes().map(str::to_owned),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// Request to open the day's session for an assignment.
#[derive(Debug, Clone)]
pub struct CheckInRequest {
    /// Authenticated actor performing the check-in.
    pub actor: ActorContext,
    /// Assignment the session belongs to.
    pub assignment_id: Uuid,
    /// Free-text place description.
    pub location: Option<String>,
    /// Optional device coordinates.
    pub coordinates: Option<GeoPointPayload>,
    /// Villages planned or visited so far.
    pub villages_visited: Vec<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request to close the assignment's open session.
#[derive(Debug, Clone)]
pub struct CheckOutRequest {
    /// Authenticated actor performing the check-out.
    pub actor: ActorContext,
    /// Assignment whose open session is being closed.
    pub assignment_id: Uuid,
    /// Free-text place description.
    pub location: Option<String>,
    /// Optional device coordinates.
    pub coordinates: Option<GeoPointPayload>,
    /// Interviews tallied for the day; defaults to zero.
    pub interviews_conducted: Option<i32>,
    /// Replacement villages-visited list, if supplied.
    pub villages_visited: Option<Vec<String>>,
    /// Replacement notes, if supplied.
    pub notes: Option<String>,
}

/// Request to record a day without a live session.
#[derive(Debug, Clone)]
pub struct ManualAttendanceRequest {
    /// Authenticated actor entering the record.
    pub actor: ActorContext,
    /// Assignment the record belongs to.
    pub assignment_id: Uuid,
    /// Working day the record covers.
    pub date: NaiveDate,
    /// Optional check-in instant.
    pub check_in_time: Option<DateTime<Utc>>,
    /// Optional check-out instant.
    pub check_out_time: Option<DateTime<Utc>>,
    /// Interviews tallied for the day.
    pub interviews_conducted: i32,
    /// Villages visited during the day.
    pub villages_visited: Vec<String>,
    /// Optional distance travelled.
    pub travel_distance_km: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Response carrying one attendance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    /// The affected record.
    pub record: AttendancePayload,
}

/// Driving port for attendance mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceCommand: Send + Sync {
    /// Open today's session for an active assignment.
    async fn check_in(&self, request: CheckInRequest) -> Result<AttendanceResponse, Error>;

    /// Close the assignment's open session and record the day's tally.
    async fn check_out(&self, request: CheckOutRequest) -> Result<AttendanceResponse, Error>;

    /// Record a day retroactively without a live session.
    async fn manual_entry(
        &self,
        request: ManualAttendanceRequest,
    ) -> Result<AttendanceResponse, Error>;
}

/// Fixture command implementation used before a store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAttendanceCommand;

#[async_trait]
impl AttendanceCommand for FixtureAttendanceCommand {
    async fn check_in(&self, _request: CheckInRequest) -> Result<AttendanceResponse, Error> {
        Err(Error::service_unavailable("attendance store not configured"))
    }

    async fn check_out(&self, _request: CheckOutRequest) -> Result<AttendanceResponse, Error> {
        Err(Error::service_unavailable("attendance store not configured"))
    }

    async fn manual_entry(
        &self,
        _request: ManualAttendanceRequest,
    ) -> Result<AttendanceResponse, Error> {
        Err(Error::service_unavailable("attendance store not configured"))
    }
}
