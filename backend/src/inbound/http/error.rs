//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};
use crate::middleware::trace::TraceId;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        // Ledger rule violations are state conflicts, not malformed requests.
        ErrorCode::InvalidTransition
        | ErrorCode::AlreadyCheckedIn
        | ErrorCode::NoOpenSession
        | ErrorCode::DuplicateDate
        | ErrorCode::ImmutableState
        | ErrorCode::HasDependents
        | ErrorCode::ResourceUnavailable => StatusCode::CONFLICT,
        ErrorCode::DependencyTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        // Errors raised inside a traced request inherit the scoped trace id
        // unless one was attached explicitly.
        let mut error = self.clone();
        if error.trace_id().is_none()
            && let Some(id) = TraceId::current()
        {
            error = error.with_trace_id(id.to_string());
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = error.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(&error))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::json;

    const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::invalid_transition("no path"), StatusCode::CONFLICT)]
    #[case(Error::already_checked_in("open session"), StatusCode::CONFLICT)]
    #[case(Error::no_open_session("nothing open"), StatusCode::CONFLICT)]
    #[case(Error::duplicate_date("day taken"), StatusCode::CONFLICT)]
    #[case(Error::immutable_state("approved"), StatusCode::CONFLICT)]
    #[case(Error::has_dependents("records exist"), StatusCode::CONFLICT)]
    #[case(Error::resource_unavailable("booked"), StatusCode::CONFLICT)]
    #[case(Error::dependency_timeout("policy stalled"), StatusCode::GATEWAY_TIMEOUT)]
    #[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(ResponseError::status_code(&error), status);
    }

    async fn assert_error_response(
        error: Error,
        expected_status: StatusCode,
        expected_trace_id: Option<&str>,
    ) -> Error {
        let response = ResponseError::error_response(&error);
        assert_eq!(response.status(), expected_status);

        let header = response.headers().get(TRACE_ID_HEADER);
        match expected_trace_id {
            Some(expected) => {
                let trace_id = header
                    .expect("trace-id header is set by error_response")
                    .to_str()
                    .expect("trace-id not valid UTF-8");
                assert_eq!(trace_id, expected);
            }
            None => assert!(header.is_none(), "trace-id header should not be present"),
        }

        let bytes = to_bytes(response.into_body())
            .await
            .expect("reading response body succeeds");

        serde_json::from_slice(&bytes).expect("error JSON deserialisation succeeds")
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted_but_keep_their_trace_id() {
        let error = Error::internal("boom")
            .with_trace_id(TRACE_ID)
            .with_details(json!({"secret": "x"}));

        let redacted =
            assert_error_response(error, StatusCode::INTERNAL_SERVER_ERROR, Some(TRACE_ID)).await;
        assert_eq!(redacted.code(), ErrorCode::InternalError);
        assert_eq!(redacted.message(), "Internal server error");
        assert!(redacted.details().is_none());
    }

    #[actix_web::test]
    async fn client_errors_keep_their_payloads() {
        let error = Error::invalid_request("bad")
            .with_trace_id(TRACE_ID)
            .with_details(json!({"field": "amount"}));

        let payload = assert_error_response(error, StatusCode::BAD_REQUEST, Some(TRACE_ID)).await;
        assert_eq!(payload.code(), ErrorCode::InvalidRequest);
        assert_eq!(payload.message(), "bad");
        assert_eq!(payload.details(), Some(&json!({"field": "amount"})));
    }

    #[actix_web::test]
    async fn error_without_trace_id_omits_trace_header() {
        let error = Error::duplicate_date("day taken");

        let payload = assert_error_response(error, StatusCode::CONFLICT, None).await;
        assert_eq!(payload.code(), ErrorCode::DuplicateDate);
        assert_eq!(payload.trace_id(), None);
    }

    #[test]
    fn from_actix_error_is_redacted_internal_error() {
        use actix_web::error;

        let actix_err = error::ErrorBadRequest("boom");
        let err: Error = actix_err.into();

        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.message(), "Internal server error");
        assert_eq!(err.trace_id(), None);
        assert_eq!(err.details(), None);
    }
}
