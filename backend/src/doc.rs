//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer
//! - **Schemas**: The wire bodies and the shared error envelope
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::assignments::{
    AssignmentBody, CreateAssignmentRequestBody, ListAssignmentsBody, TransitionAssignmentRequestBody,
    UpdateAssignmentRequestBody,
};
use crate::inbound::http::attendance::{
    AttendanceBody, CheckInRequestBody, CheckOutRequestBody, DayStatusBody, GeoPointBody,
    ListAttendanceBody, ManualAttendanceRequestBody, SessionMarkBody,
};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::availability::{
    AvailabilityBody, ReconcileBody, SetAvailabilityRequestBody,
};
use crate::inbound::http::expenses::{
    ApprovalBody, CreateExpenseRequestBody, ExpenseBody, ExpenseSummaryBody, ListExpensesBody,
    UpdateExpenseRequestBody,
};
use crate::inbound::http::progress::ProgressBody;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Field operations API",
        description = "HTTP interface for assignment lifecycle, attendance and \
                       expense ledgers, progress and resource availability."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::assignments::create_assignment,
        crate::inbound::http::assignments::list_assignments,
        crate::inbound::http::assignments::get_assignment,
        crate::inbound::http::assignments::update_assignment,
        crate::inbound::http::assignments::delete_assignment,
        crate::inbound::http::assignments::transition_assignment,
        crate::inbound::http::attendance::check_in,
        crate::inbound::http::attendance::check_out,
        crate::inbound::http::attendance::record_manual_attendance,
        crate::inbound::http::attendance::day_status,
        crate::inbound::http::attendance::list_attendance,
        crate::inbound::http::expenses::create_expense,
        crate::inbound::http::expenses::list_expenses,
        crate::inbound::http::expenses::expense_summary,
        crate::inbound::http::expenses::get_expense,
        crate::inbound::http::expenses::update_expense,
        crate::inbound::http::expenses::delete_expense,
        crate::inbound::http::expenses::approve_expense,
        crate::inbound::http::progress::assignment_progress,
        crate::inbound::http::availability::get_availability,
        crate::inbound::http::availability::set_availability,
        crate::inbound::http::availability::reconcile_availability,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        CreateAssignmentRequestBody,
        UpdateAssignmentRequestBody,
        TransitionAssignmentRequestBody,
        AssignmentBody,
        ListAssignmentsBody,
        GeoPointBody,
        SessionMarkBody,
        CheckInRequestBody,
        CheckOutRequestBody,
        ManualAttendanceRequestBody,
        AttendanceBody,
        ListAttendanceBody,
        DayStatusBody,
        CreateExpenseRequestBody,
        UpdateExpenseRequestBody,
        ApprovalBody,
        ExpenseBody,
        ListExpensesBody,
        ExpenseSummaryBody,
        ProgressBody,
        AvailabilityBody,
        SetAvailabilityRequestBody,
        ReconcileBody,
    )),
    tags(
        (name = "auth", description = "Session login"),
        (name = "assignments", description = "Assignment lifecycle"),
        (name = "attendance", description = "Attendance ledger"),
        (name = "expenses", description = "Expense ledger and approval"),
        (name = "progress", description = "Progress aggregation"),
        (name = "availability", description = "Resource availability"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn openapi_registers_every_ledger_path() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/v1/login",
            "/api/v1/assignments",
            "/api/v1/assignments/{id}",
            "/api/v1/assignments/{id}/status",
            "/api/v1/assignments/{id}/attendance/check-in",
            "/api/v1/assignments/{id}/attendance/check-out",
            "/api/v1/assignments/{id}/attendance",
            "/api/v1/assignments/{id}/attendance/today",
            "/api/v1/assignments/{id}/progress",
            "/api/v1/attendance",
            "/api/v1/expenses",
            "/api/v1/expenses/summary",
            "/api/v1/expenses/{id}",
            "/api/v1/expenses/{id}/approve",
            "/api/v1/resources/{id}/availability",
            "/api/v1/resources/availability/reconcile",
            "/health/ready",
            "/health/live",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn openapi_declares_session_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");

        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
