//! Login endpoint and credential checks.
//!
//! ```text
//! POST /api/v1/login {"username":"admin","password":"password"}
//! ```
//!
//! Credential storage belongs to an external identity subsystem; the fixture
//! check below stands in for it so sessions can be established and the
//! remaining endpoints exercised.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{ActorId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn authenticate(username: &str, password: &str) -> ApiResult<ActorId> {
    if username.trim().is_empty() {
        return Err(Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })));
    }
    if password.is_empty() {
        return Err(Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })));
    }
    if username == "admin" && password == "password" {
        ActorId::new("123e4567-e89b-12d3-a456-426614174000")
            .map_err(|err| Error::internal(format!("invalid fixture actor id: {err}")))
    } else {
        Err(Error::unauthorized("invalid credentials"))
    }
}

/// Authenticate an operator and establish a session.
///
/// Uses the centralised `Error` type so clients get a consistent error
/// schema across all endpoints.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let actor_id = authenticate(&payload.username, &payload.password)?;
    session.persist_actor(actor_id)?;
    Ok(HttpResponse::Ok().finish())
}
