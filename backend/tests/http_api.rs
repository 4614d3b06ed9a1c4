//! End-to-end HTTP tests over the full adapter stack.
//!
//! Builds the actix application the way the server does, with the real
//! domain services wired over shared in-memory adapters, then drives the
//! booking, attendance and expense flows through the REST surface.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use backend::inbound::http::state::HttpState;
use backend::inbound::http::{assignments, attendance, auth, availability, expenses, progress};

mod support;

use support::field_ops;

fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

fn ledger_state() -> HttpState {
    let ops = field_ops();
    let assignments = Arc::new(ops.assignments);
    let attendance = Arc::new(ops.attendance);
    let expenses = Arc::new(ops.expenses);
    HttpState {
        assignments: assignments.clone(),
        assignments_query: assignments,
        attendance: attendance.clone(),
        attendance_query: attendance,
        expenses: expenses.clone(),
        expenses_query: expenses,
        progress: Arc::new(ops.progress),
        availability: ops.availability.clone(),
        availability_query: ops.availability,
    }
}

fn ledger_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ledger_state()))
        .wrap(session_middleware())
        .service(
            web::scope("/api/v1")
                .service(auth::login)
                .service(assignments::create_assignment)
                .service(assignments::list_assignments)
                .service(assignments::get_assignment)
                .service(assignments::update_assignment)
                .service(assignments::delete_assignment)
                .service(assignments::transition_assignment)
                .service(attendance::check_in)
                .service(attendance::check_out)
                .service(attendance::record_manual_attendance)
                .service(attendance::day_status)
                .service(attendance::list_attendance)
                .service(expenses::create_expense)
                .service(expenses::list_expenses)
                .service(expenses::expense_summary)
                .service(expenses::get_expense)
                .service(expenses::update_expense)
                .service(expenses::delete_expense)
                .service(expenses::approve_expense)
                .service(progress::assignment_progress)
                .service(availability::get_availability)
                .service(availability::set_availability)
                .service(availability::reconcile_availability),
        )
}

async fn login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) -> Cookie<'static> {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": "admin", "password": "password" }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie issued")
        .into_owned()
}

fn create_assignment_body() -> Value {
    json!({
        "projectId": "00000000-0000-0000-0000-000000000052",
        "resourceId": "00000000-0000-0000-0000-000000000053",
        "startDate": "2026-03-02",
        "endDate": "2026-03-20",
        "assignedDistricts": ["North"],
        "assignedVillages": ["Kibo"],
        "targetInterviews": 40,
        "totalDays": 15
    })
}

async fn create_assignment(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
) -> String {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/assignments")
        .cookie(cookie.clone())
        .set_json(create_assignment_body())
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    body.get("id")
        .and_then(Value::as_str)
        .expect("assignment id")
        .to_owned()
}

async fn activate(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
    assignment_id: &str,
) {
    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/assignments/{assignment_id}/status"))
        .cookie(cookie.clone())
        .set_json(json!({ "status": "active" }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("status").and_then(Value::as_str), Some("active"));
}

#[actix_web::test]
async fn unauthenticated_requests_get_the_error_envelope() {
    let app = actix_test::init_service(ledger_app()).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/assignments")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("unauthorized")
    );
    assert!(body.get("message").and_then(Value::as_str).is_some());
}

#[actix_web::test]
async fn booking_flow_flips_availability_over_http() {
    let app = actix_test::init_service(ledger_app()).await;
    let cookie = login(&app).await;

    let assignment_id = create_assignment(&app, &cookie).await;
    activate(&app, &cookie, &assignment_id).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/resources/00000000-0000-0000-0000-000000000053/availability")
        .cookie(cookie.clone())
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("available").and_then(Value::as_bool), Some(false));
}

#[actix_web::test]
async fn attendance_round_trip_feeds_progress() {
    let app = actix_test::init_service(ledger_app()).await;
    let cookie = login(&app).await;
    let assignment_id = create_assignment(&app, &cookie).await;
    activate(&app, &cookie, &assignment_id).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!(
            "/api/v1/assignments/{assignment_id}/attendance/check-in"
        ))
        .cookie(cookie.clone())
        .set_json(json!({ "location": "Kibo market" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = actix_test::TestRequest::post()
        .uri(&format!(
            "/api/v1/assignments/{assignment_id}/attendance/check-out"
        ))
        .cookie(cookie.clone())
        .set_json(json!({ "interviewsConducted": 7 }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("interviewsConducted").and_then(Value::as_i64),
        Some(7)
    );

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/assignments/{assignment_id}/progress"))
        .cookie(cookie.clone())
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("completedInterviews").and_then(Value::as_i64),
        Some(7)
    );
    assert_eq!(body.get("daysWorked").and_then(Value::as_i64), Some(1));
}

#[actix_web::test]
async fn double_check_in_returns_conflict_code() {
    let app = actix_test::init_service(ledger_app()).await;
    let cookie = login(&app).await;
    let assignment_id = create_assignment(&app, &cookie).await;
    activate(&app, &cookie, &assignment_id).await;

    for expected in [StatusCode::OK, StatusCode::CONFLICT] {
        let request = actix_test::TestRequest::post()
            .uri(&format!(
                "/api/v1/assignments/{assignment_id}/attendance/check-in"
            ))
            .cookie(cookie.clone())
            .set_json(json!({}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), expected);
        if expected == StatusCode::CONFLICT {
            let body: Value = actix_test::read_body_json(response).await;
            assert_eq!(
                body.get("code").and_then(Value::as_str),
                Some("already_checked_in")
            );
        }
    }
}

#[actix_web::test]
async fn expense_approval_flow_over_http() {
    let app = actix_test::init_service(ledger_app()).await;
    let cookie = login(&app).await;
    let assignment_id = create_assignment(&app, &cookie).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/expenses")
        .cookie(cookie.clone())
        .set_json(json!({
            "assignmentId": assignment_id,
            "expenseType": "travel",
            "date": "2026-03-05",
            "amount": "120.50",
            "description": "minibus fare"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    let expense_id = body
        .get("id")
        .and_then(Value::as_str)
        .expect("expense id")
        .to_owned();
    assert!(body.get("approval").expect("approval field").is_null());

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/expenses/{expense_id}/approve"))
        .cookie(cookie.clone())
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert!(body.pointer("/approval/approvedBy").is_some());

    let request = actix_test::TestRequest::get()
        .uri(&format!(
            "/api/v1/expenses/summary?assignmentId={assignment_id}"
        ))
        .cookie(cookie.clone())
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("approvedAmount").and_then(Value::as_str),
        Some("120.50")
    );
    assert_eq!(body.get("count").and_then(Value::as_i64), Some(1));
}

#[actix_web::test]
async fn invalid_field_values_return_bad_request_with_details() {
    let app = actix_test::init_service(ledger_app()).await;
    let cookie = login(&app).await;

    let mut body = create_assignment_body();
    body["startDate"] = Value::String("March 2nd".to_owned());

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/assignments")
        .cookie(cookie.clone())
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("invalid_request")
    );
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("startDate")
    );
}

#[actix_web::test]
async fn deleting_a_booked_up_assignment_returns_conflict() {
    let app = actix_test::init_service(ledger_app()).await;
    let cookie = login(&app).await;
    let assignment_id = create_assignment(&app, &cookie).await;
    activate(&app, &cookie, &assignment_id).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/assignments/{assignment_id}/attendance"))
        .cookie(cookie.clone())
        .set_json(json!({ "date": "2026-03-03", "interviewsConducted": 4 }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/assignments/{assignment_id}"))
        .cookie(cookie.clone())
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("has_dependents")
    );
}
