//! Progress reporting HTTP handlers.
//!
//! ```text
//! GET /api/v1/assignments/{id}/progress
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{ProgressRequest, ProgressResponse};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Progress snapshot returned to clients.
///
/// `completionPercentage` is uncapped: finishing past the advisory target
/// reports more than 100.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBody {
    #[schema(format = "uuid")]
    pub assignment_id: String,
    #[schema(example = "active")]
    pub status: String,
    pub target_interviews: i32,
    pub completed_interviews: i64,
    pub completion_percentage: i64,
    pub days_worked: i64,
    pub total_days: i32,
}

impl From<ProgressResponse> for ProgressBody {
    fn from(value: ProgressResponse) -> Self {
        Self {
            assignment_id: value.assignment_id.to_string(),
            status: value.status.to_string(),
            target_interviews: value.target_interviews,
            completed_interviews: value.completed_interviews,
            completion_percentage: value.completion_percentage,
            days_worked: value.days_worked,
            total_days: value.total_days,
        }
    }
}

/// Report interview progress against the assignment's advisory target.
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/progress",
    params(("id" = String, Path, format = "uuid", description = "Assignment id")),
    responses(
        (status = 200, description = "Progress snapshot", body = ProgressBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["progress"],
    operation_id = "assignmentProgress",
    security(("SessionCookie" = []))
)]
#[get("/assignments/{id}/progress")]
pub async fn assignment_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProgressBody>> {
    session.require_actor()?;
    let assignment_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let response = state.progress.progress(ProgressRequest { assignment_id }).await?;

    Ok(web::Json(ProgressBody::from(response)))
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
