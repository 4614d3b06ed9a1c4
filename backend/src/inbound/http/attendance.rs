//! Attendance ledger HTTP handlers.
//!
//! ```text
//! POST /api/v1/assignments/{id}/attendance/check-in
//! POST /api/v1/assignments/{id}/attendance/check-out
//! POST /api/v1/assignments/{id}/attendance
//! GET  /api/v1/assignments/{id}/attendance/today
//! GET  /api/v1/attendance
//! ```

use actix_web::{get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    AttendancePayload, CheckInRequest, CheckOutRequest, DayState, DayStatusRequest,
    GeoPointPayload, ListAttendanceRequest, ManualAttendanceRequest, SessionMarkPayload,
};
use crate::domain::{ActorContext, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_date, parse_optional_date, parse_optional_decimal,
    parse_optional_rfc3339_timestamp, parse_optional_uuid, parse_uuid,
};

/// Geographic point captured alongside a check-in or check-out.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoPointBody {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeoPointBody> for GeoPointPayload {
    fn from(value: GeoPointBody) -> Self {
        Self {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

impl From<GeoPointPayload> for GeoPointBody {
    fn from(value: GeoPointPayload) -> Self {
        Self {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

/// Request payload for opening a day's attendance session.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequestBody {
    pub location: Option<String>,
    pub coordinates: Option<GeoPointBody>,
    #[serde(default)]
    pub villages_visited: Vec<String>,
    pub notes: Option<String>,
}

/// Request payload for closing the open attendance session.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequestBody {
    pub location: Option<String>,
    pub coordinates: Option<GeoPointBody>,
    pub interviews_conducted: Option<i32>,
    pub villages_visited: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Request payload for recording a past day in one shot.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualAttendanceRequestBody {
    #[schema(format = "date")]
    pub date: String,
    #[schema(format = "date-time")]
    pub check_in_time: Option<String>,
    #[schema(format = "date-time")]
    pub check_out_time: Option<String>,
    #[serde(default)]
    pub interviews_conducted: i32,
    #[serde(default)]
    pub villages_visited: Vec<String>,
    #[schema(example = "12.5")]
    pub travel_distance_km: Option<String>,
    pub notes: Option<String>,
}

/// Query parameters for listing attendance records.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAttendanceQuery {
    /// Restrict to one assignment's ledger.
    pub assignment_id: Option<String>,
    /// Restrict to one resource's records across assignments.
    pub resource_id: Option<String>,
    /// Earliest date to include.
    pub from: Option<String>,
    /// Latest date to include.
    pub to: Option<String>,
    /// Page size, clamped server-side.
    pub limit: Option<i64>,
    /// Rows to skip before the page.
    pub offset: Option<i64>,
}

/// Query parameters for the day-status endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DayStatusQuery {
    /// Day to inspect; defaults to today (UTC).
    pub date: Option<String>,
}

/// Check-in or check-out mark returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionMarkBody {
    #[schema(format = "date-time")]
    pub time: String,
    pub location: Option<String>,
    pub coordinates: Option<GeoPointBody>,
}

impl From<SessionMarkPayload> for SessionMarkBody {
    fn from(value: SessionMarkPayload) -> Self {
        Self {
            time: value.time.to_rfc3339(),
            location: value.location,
            coordinates: value.coordinates.map(GeoPointBody::from),
        }
    }
}

/// Attendance record representation returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub assignment_id: String,
    #[schema(format = "date")]
    pub date: String,
    pub check_in: Option<SessionMarkBody>,
    pub check_out: Option<SessionMarkBody>,
    pub interviews_conducted: i32,
    pub villages_visited: Vec<String>,
    pub travel_distance_km: Option<String>,
    pub notes: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<AttendancePayload> for AttendanceBody {
    fn from(value: AttendancePayload) -> Self {
        Self {
            id: value.id.to_string(),
            assignment_id: value.assignment_id.to_string(),
            date: value.date.to_string(),
            check_in: value.check_in.map(SessionMarkBody::from),
            check_out: value.check_out.map(SessionMarkBody::from),
            interviews_conducted: value.interviews_conducted,
            villages_visited: value.villages_visited,
            travel_distance_km: value.travel_distance_km.map(|km| km.to_string()),
            notes: value.notes,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Response payload listing attendance records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListAttendanceBody {
    pub records: Vec<AttendanceBody>,
}

/// Response payload for the day-status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayStatusBody {
    #[schema(example = "checked_in")]
    pub state: String,
    pub record: Option<AttendanceBody>,
}

/// Open today's attendance session for an active assignment.
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/attendance/check-in",
    params(("id" = String, Path, format = "uuid", description = "Assignment id")),
    request_body = CheckInRequestBody,
    responses(
        (status = 200, description = "Session opened", body = AttendanceBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Assignment not active or session already open", body = Error)
    ),
    tags = ["attendance"],
    operation_id = "checkIn",
    security(("SessionCookie" = []))
)]
#[post("/assignments/{id}/attendance/check-in")]
pub async fn check_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CheckInRequestBody>,
) -> ApiResult<web::Json<AttendanceBody>> {
    let actor = session.require_actor()?;
    let assignment_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let payload = payload.into_inner();

    let response = state
        .attendance
        .check_in(CheckInRequest {
            actor,
            assignment_id,
            location: payload.location,
            coordinates: payload.coordinates.map(GeoPointPayload::from),
            villages_visited: payload.villages_visited,
            notes: payload.notes,
        })
        .await?;

    Ok(web::Json(AttendanceBody::from(response.record)))
}

/// Close the open attendance session and record the day's tally.
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/attendance/check-out",
    params(("id" = String, Path, format = "uuid", description = "Assignment id")),
    request_body = CheckOutRequestBody,
    responses(
        (status = 200, description = "Session closed", body = AttendanceBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "No open session to close", body = Error)
    ),
    tags = ["attendance"],
    operation_id = "checkOut",
    security(("SessionCookie" = []))
)]
#[post("/assignments/{id}/attendance/check-out")]
pub async fn check_out(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CheckOutRequestBody>,
) -> ApiResult<web::Json<AttendanceBody>> {
    let actor = session.require_actor()?;
    let assignment_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let payload = payload.into_inner();

    let response = state
        .attendance
        .check_out(CheckOutRequest {
            actor,
            assignment_id,
            location: payload.location,
            coordinates: payload.coordinates.map(GeoPointPayload::from),
            interviews_conducted: payload.interviews_conducted,
            villages_visited: payload.villages_visited,
            notes: payload.notes,
        })
        .await?;

    Ok(web::Json(AttendanceBody::from(response.record)))
}

fn parse_manual_payload(
    payload: ManualAttendanceRequestBody,
    actor: ActorContext,
    assignment_id: uuid::Uuid,
) -> Result<ManualAttendanceRequest, Error> {
    Ok(ManualAttendanceRequest {
        actor,
        assignment_id,
        date: parse_date(payload.date, FieldName::new("date"))?,
        check_in_time: parse_optional_rfc3339_timestamp(
            payload.check_in_time,
            FieldName::new("checkInTime"),
        )?,
        check_out_time: parse_optional_rfc3339_timestamp(
            payload.check_out_time,
            FieldName::new("checkOutTime"),
        )?,
        interviews_conducted: payload.interviews_conducted,
        villages_visited: payload.villages_visited,
        travel_distance_km: parse_optional_decimal(
            payload.travel_distance_km,
            FieldName::new("travelDistanceKm"),
        )?,
        notes: payload.notes,
    })
}

/// Record a full day's attendance in one shot.
///
/// Used to backfill days where the field resource had no connectivity.
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/attendance",
    params(("id" = String, Path, format = "uuid", description = "Assignment id")),
    request_body = ManualAttendanceRequestBody,
    responses(
        (status = 200, description = "Record created", body = AttendanceBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "A record already exists for this date", body = Error)
    ),
    tags = ["attendance"],
    operation_id = "recordManualAttendance",
    security(("SessionCookie" = []))
)]
#[post("/assignments/{id}/attendance")]
pub async fn record_manual_attendance(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ManualAttendanceRequestBody>,
) -> ApiResult<web::Json<AttendanceBody>> {
    let actor = session.require_actor()?;
    let assignment_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let request = parse_manual_payload(payload.into_inner(), actor, assignment_id)?;

    let response = state.attendance.manual_entry(request).await?;

    Ok(web::Json(AttendanceBody::from(response.record)))
}

/// Report whether the assignment is checked in for a given day.
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/attendance/today",
    params(
        ("id" = String, Path, format = "uuid", description = "Assignment id"),
        DayStatusQuery
    ),
    responses(
        (status = 200, description = "Day status", body = DayStatusBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["attendance"],
    operation_id = "attendanceDayStatus",
    security(("SessionCookie" = []))
)]
#[get("/assignments/{id}/attendance/today")]
pub async fn day_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<DayStatusQuery>,
) -> ApiResult<web::Json<DayStatusBody>> {
    session.require_actor()?;
    let assignment_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let date = parse_optional_date(query.into_inner().date, FieldName::new("date"))?
        .unwrap_or_else(|| Utc::now().date_naive());

    let response = state
        .attendance_query
        .day_status(DayStatusRequest {
            assignment_id,
            date,
        })
        .await?;

    let state_name = match response.state {
        DayState::NotCheckedIn => "not_checked_in",
        DayState::CheckedIn => "checked_in",
        DayState::CheckedOut => "checked_out",
    };

    Ok(web::Json(DayStatusBody {
        state: state_name.to_owned(),
        record: response.record.map(AttendanceBody::from),
    }))
}

/// List attendance records, most recent day first.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(ListAttendanceQuery),
    responses(
        (status = 200, description = "Attendance records", body = ListAttendanceBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["attendance"],
    operation_id = "listAttendance",
    security(("SessionCookie" = []))
)]
#[get("/attendance")]
pub async fn list_attendance(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListAttendanceQuery>,
) -> ApiResult<web::Json<ListAttendanceBody>> {
    session.require_actor()?;
    let query = query.into_inner();

    let response = state
        .attendance_query
        .list(ListAttendanceRequest {
            assignment_id: parse_optional_uuid(query.assignment_id, FieldName::new("assignmentId"))?,
            resource_id: parse_optional_uuid(query.resource_id, FieldName::new("resourceId"))?,
            from: parse_optional_date(query.from, FieldName::new("from"))?,
            to: parse_optional_date(query.to, FieldName::new("to"))?,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;

    Ok(web::Json(ListAttendanceBody {
        records: response
            .records
            .into_iter()
            .map(AttendanceBody::from)
            .collect(),
    }))
}

#[cfg(test)]
#[path = "attendance_tests.rs"]
mod tests;
