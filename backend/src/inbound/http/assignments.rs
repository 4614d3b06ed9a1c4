//! Assignment HTTP handlers.
//!
//! ```text
//! POST   /api/v1/assignments
//! GET    /api/v1/assignments
//! GET    /api/v1/assignments/{id}
//! PATCH  /api/v1/assignments/{id}
//! DELETE /api/v1/assignments/{id}
//! POST   /api/v1/assignments/{id}/status
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    AssignmentPayload, CreateAssignmentRequest, DeleteAssignmentRequest, GetAssignmentRequest,
    ListAssignmentsRequest, TransitionAssignmentRequest, UpdateAssignmentRequest,
};
use crate::domain::{ActorContext, AssignmentFieldUpdate, AssignmentStatus, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, double_option, invalid_enum_value_error, parse_date, parse_decimal,
    parse_optional_date, parse_optional_decimal, parse_optional_uuid, parse_uuid,
};

/// Request payload for creating an assignment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequestBody {
    #[schema(format = "uuid")]
    pub project_id: String,
    #[schema(format = "uuid")]
    pub resource_id: String,
    #[schema(format = "date")]
    pub start_date: String,
    #[schema(format = "date")]
    pub end_date: String,
    #[serde(default)]
    pub assigned_districts: Vec<String>,
    #[serde(default)]
    pub assigned_villages: Vec<String>,
    pub target_interviews: i32,
    pub total_days: i32,
    #[schema(example = "120.50")]
    pub daily_rate: Option<String>,
    pub instructions: Option<String>,
    pub notes: Option<String>,
}

/// Request payload for partially updating an assignment.
///
/// The double-optional fields distinguish "leave alone" (absent) from
/// "clear" (explicit `null`).
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequestBody {
    #[schema(format = "date")]
    pub start_date: Option<String>,
    #[schema(format = "date")]
    pub end_date: Option<String>,
    pub assigned_districts: Option<Vec<String>>,
    pub assigned_villages: Option<Vec<String>>,
    pub target_interviews: Option<i32>,
    pub total_days: Option<i32>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub daily_rate: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub instructions: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

/// Request payload for moving an assignment along its lifecycle.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionAssignmentRequestBody {
    #[schema(example = "active")]
    pub status: String,
}

/// Query parameters for listing assignments.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAssignmentsQuery {
    /// Restrict to one lifecycle state.
    pub status: Option<String>,
    /// Restrict to one project.
    pub project_id: Option<String>,
    /// Restrict to one field resource.
    pub resource_id: Option<String>,
    /// Page size, clamped server-side.
    pub limit: Option<i64>,
    /// Rows to skip before the page.
    pub offset: Option<i64>,
}

/// Assignment representation returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub project_id: String,
    #[schema(format = "uuid")]
    pub resource_id: String,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(format = "date")]
    pub start_date: String,
    #[schema(format = "date")]
    pub end_date: String,
    pub assigned_districts: Vec<String>,
    pub assigned_villages: Vec<String>,
    pub target_interviews: i32,
    pub total_days: i32,
    pub daily_rate: Option<String>,
    pub instructions: Option<String>,
    pub notes: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<AssignmentPayload> for AssignmentBody {
    fn from(value: AssignmentPayload) -> Self {
        Self {
            id: value.id.to_string(),
            project_id: value.project_id.to_string(),
            resource_id: value.resource_id.to_string(),
            status: value.status.to_string(),
            start_date: value.start_date.to_string(),
            end_date: value.end_date.to_string(),
            assigned_districts: value.assigned_districts,
            assigned_villages: value.assigned_villages,
            target_interviews: value.target_interviews,
            total_days: value.total_days,
            daily_rate: value.daily_rate.map(|rate| rate.to_string()),
            instructions: value.instructions,
            notes: value.notes,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Response payload listing assignments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListAssignmentsBody {
    pub assignments: Vec<AssignmentBody>,
}

fn parse_status(value: String, field: FieldName) -> Result<AssignmentStatus, Error> {
    AssignmentStatus::from_str(value.as_str())
        .map_err(|_| invalid_enum_value_error(field, &value, "pending, active, completed, cancelled"))
}

fn parse_create_payload(
    payload: CreateAssignmentRequestBody,
    actor: ActorContext,
) -> Result<CreateAssignmentRequest, Error> {
    Ok(CreateAssignmentRequest {
        actor,
        project_id: parse_uuid(payload.project_id, FieldName::new("projectId"))?,
        resource_id: parse_uuid(payload.resource_id, FieldName::new("resourceId"))?,
        start_date: parse_date(payload.start_date, FieldName::new("startDate"))?,
        end_date: parse_date(payload.end_date, FieldName::new("endDate"))?,
        assigned_districts: payload.assigned_districts,
        assigned_villages: payload.assigned_villages,
        target_interviews: payload.target_interviews,
        total_days: payload.total_days,
        daily_rate: parse_optional_decimal(payload.daily_rate, FieldName::new("dailyRate"))?,
        instructions: payload.instructions,
        notes: payload.notes,
    })
}

/// Create an assignment in `pending` state.
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    request_body = CreateAssignmentRequestBody,
    responses(
        (status = 200, description = "Assignment created", body = AssignmentBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Resource already booked for the period", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["assignments"],
    operation_id = "createAssignment",
    security(("SessionCookie" = []))
)]
#[post("/assignments")]
pub async fn create_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateAssignmentRequestBody>,
) -> ApiResult<web::Json<AssignmentBody>> {
    let actor = session.require_actor()?;
    let request = parse_create_payload(payload.into_inner(), actor)?;

    let response = state.assignments.create(request).await?;

    Ok(web::Json(AssignmentBody::from(response.assignment)))
}

/// List assignments with optional filters, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    params(ListAssignmentsQuery),
    responses(
        (status = 200, description = "Assignments matching the filters", body = ListAssignmentsBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["assignments"],
    operation_id = "listAssignments",
    security(("SessionCookie" = []))
)]
#[get("/assignments")]
pub async fn list_assignments(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListAssignmentsQuery>,
) -> ApiResult<web::Json<ListAssignmentsBody>> {
    session.require_actor()?;
    let query = query.into_inner();

    let response = state
        .assignments_query
        .list(ListAssignmentsRequest {
            status: query
                .status
                .map(|raw| parse_status(raw, FieldName::new("status")))
                .transpose()?,
            project_id: parse_optional_uuid(query.project_id, FieldName::new("projectId"))?,
            resource_id: parse_optional_uuid(query.resource_id, FieldName::new("resourceId"))?,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;

    Ok(web::Json(ListAssignmentsBody {
        assignments: response
            .assignments
            .into_iter()
            .map(AssignmentBody::from)
            .collect(),
    }))
}

/// Fetch one assignment by id.
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}",
    params(("id" = String, Path, format = "uuid", description = "Assignment id")),
    responses(
        (status = 200, description = "The assignment", body = AssignmentBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["assignments"],
    operation_id = "getAssignment",
    security(("SessionCookie" = []))
)]
#[get("/assignments/{id}")]
pub async fn get_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AssignmentBody>> {
    session.require_actor()?;
    let assignment_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let payload = state
        .assignments_query
        .get(GetAssignmentRequest { assignment_id })
        .await?;

    Ok(web::Json(AssignmentBody::from(payload)))
}

fn parse_update_payload(payload: UpdateAssignmentRequestBody) -> Result<AssignmentFieldUpdate, Error> {
    Ok(AssignmentFieldUpdate {
        start_date: parse_optional_date(payload.start_date, FieldName::new("startDate"))?,
        end_date: parse_optional_date(payload.end_date, FieldName::new("endDate"))?,
        assigned_districts: payload.assigned_districts,
        assigned_villages: payload.assigned_villages,
        target_interviews: payload.target_interviews,
        total_days: payload.total_days,
        daily_rate: payload
            .daily_rate
            .map(|inner| parse_optional_decimal(inner, FieldName::new("dailyRate")))
            .transpose()?,
        instructions: payload.instructions,
        notes: payload.notes,
    })
}

/// Partially update an assignment.
///
/// Period, area and target fields are only editable while the assignment is
/// still `pending`; instructions and notes stay editable throughout.
#[utoipa::path(
    patch,
    path = "/api/v1/assignments/{id}",
    params(("id" = String, Path, format = "uuid", description = "Assignment id")),
    request_body = UpdateAssignmentRequestBody,
    responses(
        (status = 200, description = "Updated assignment", body = AssignmentBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Fields frozen outside pending", body = Error)
    ),
    tags = ["assignments"],
    operation_id = "updateAssignment",
    security(("SessionCookie" = []))
)]
#[patch("/assignments/{id}")]
pub async fn update_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateAssignmentRequestBody>,
) -> ApiResult<web::Json<AssignmentBody>> {
    let actor = session.require_actor()?;
    let assignment_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let update = parse_update_payload(payload.into_inner())?;

    let response = state
        .assignments
        .update(UpdateAssignmentRequest {
            actor,
            assignment_id,
            update,
        })
        .await?;

    Ok(web::Json(AssignmentBody::from(response.assignment)))
}

/// Delete an assignment that has no attendance or expense records.
#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{id}",
    params(("id" = String, Path, format = "uuid", description = "Assignment id")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Dependent records exist", body = Error)
    ),
    tags = ["assignments"],
    operation_id = "deleteAssignment",
    security(("SessionCookie" = []))
)]
#[delete("/assignments/{id}")]
pub async fn delete_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let assignment_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    state
        .assignments
        .delete(DeleteAssignmentRequest {
            actor,
            assignment_id,
        })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Move an assignment along its lifecycle.
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/status",
    params(("id" = String, Path, format = "uuid", description = "Assignment id")),
    request_body = TransitionAssignmentRequestBody,
    responses(
        (status = 200, description = "Transitioned assignment", body = AssignmentBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Illegal transition or resource unavailable", body = Error)
    ),
    tags = ["assignments"],
    operation_id = "transitionAssignment",
    security(("SessionCookie" = []))
)]
#[post("/assignments/{id}/status")]
pub async fn transition_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TransitionAssignmentRequestBody>,
) -> ApiResult<web::Json<AssignmentBody>> {
    let actor = session.require_actor()?;
    let assignment_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let next_status = parse_status(payload.into_inner().status, FieldName::new("status"))?;

    let response = state
        .assignments
        .transition(TransitionAssignmentRequest {
            actor,
            assignment_id,
            next_status,
        })
        .await?;

    Ok(web::Json(AssignmentBody::from(response.assignment)))
}

#[cfg(test)]
#[path = "assignments_tests.rs"]
mod tests;
