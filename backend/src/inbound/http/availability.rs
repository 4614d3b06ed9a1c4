//! Resource availability HTTP handlers.
//!
//! ```text
//! GET  /api/v1/resources/{id}/availability
//! PUT  /api/v1/resources/{id}/availability
//! POST /api/v1/resources/availability/reconcile
//! ```

use actix_web::{get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{
    AvailabilityPayload, GetAvailabilityRequest, SetAvailabilityRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Availability flag returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBody {
    #[schema(format = "uuid")]
    pub resource_id: String,
    pub available: bool,
}

impl From<AvailabilityPayload> for AvailabilityBody {
    fn from(value: AvailabilityPayload) -> Self {
        Self {
            resource_id: value.resource_id.to_string(),
            available: value.available,
        }
    }
}

/// Request payload for the manual availability override.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetAvailabilityRequestBody {
    pub available: bool,
}

/// Response payload for the reconcile endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileBody {
    pub corrected: Vec<AvailabilityBody>,
}

/// Read a resource's availability flag.
///
/// Resources without a tracked flag read as available.
#[utoipa::path(
    get,
    path = "/api/v1/resources/{id}/availability",
    params(("id" = String, Path, format = "uuid", description = "Resource id")),
    responses(
        (status = 200, description = "Availability flag", body = AvailabilityBody),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["availability"],
    operation_id = "getAvailability",
    security(("SessionCookie" = []))
)]
#[get("/resources/{id}/availability")]
pub async fn get_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AvailabilityBody>> {
    session.require_actor()?;
    let resource_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let payload = state
        .availability_query
        .get(GetAvailabilityRequest { resource_id })
        .await?;

    Ok(web::Json(AvailabilityBody::from(payload)))
}

/// Manually override a resource's availability flag.
#[utoipa::path(
    put,
    path = "/api/v1/resources/{id}/availability",
    params(("id" = String, Path, format = "uuid", description = "Resource id")),
    request_body = SetAvailabilityRequestBody,
    responses(
        (status = 200, description = "Stored flag", body = AvailabilityBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["availability"],
    operation_id = "setAvailability",
    security(("SessionCookie" = []))
)]
#[put("/resources/{id}/availability")]
pub async fn set_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SetAvailabilityRequestBody>,
) -> ApiResult<web::Json<AvailabilityBody>> {
    let actor = session.require_actor()?;
    let resource_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let response = state
        .availability
        .set(SetAvailabilityRequest {
            actor,
            resource_id,
            available: payload.into_inner().available,
        })
        .await?;

    Ok(web::Json(AvailabilityBody::from(response)))
}

/// Recompute every tracked availability flag from active assignments.
///
/// Reports the flags that had drifted and were corrected.
#[utoipa::path(
    post,
    path = "/api/v1/resources/availability/reconcile",
    responses(
        (status = 200, description = "Corrected flags", body = ReconcileBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["availability"],
    operation_id = "reconcileAvailability",
    security(("SessionCookie" = []))
)]
#[post("/resources/availability/reconcile")]
pub async fn reconcile_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ReconcileBody>> {
    session.require_actor()?;

    let response = state.availability.reconcile().await?;

    Ok(web::Json(ReconcileBody {
        corrected: response
            .corrected
            .into_iter()
            .map(AvailabilityBody::from)
            .collect(),
    }))
}

#[cfg(test)]
#[path = "availability_tests.rs"]
mod tests;
