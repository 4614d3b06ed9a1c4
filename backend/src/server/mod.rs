//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::assignments::{
    create_assignment, delete_assignment, get_assignment, list_assignments, transition_assignment,
    update_assignment,
};
use backend::inbound::http::attendance::{
    check_in, check_out, day_status, list_attendance, record_manual_attendance,
};
use backend::inbound::http::auth::login;
use backend::inbound::http::availability::{
    get_availability, reconcile_availability, set_availability,
};
use backend::inbound::http::expenses::{
    approve_expense, create_expense, delete_expense, expense_summary, get_expense, list_expenses,
    update_expense,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::progress::assignment_progress;
use backend::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(create_assignment)
        .service(list_assignments)
        .service(get_assignment)
        .service(update_assignment)
        .service(delete_assignment)
        .service(transition_assignment)
        .service(check_in)
        .service(check_out)
        .service(record_manual_attendance)
        .service(day_status)
        .service(list_attendance)
        .service(create_expense)
        .service(list_expenses)
        .service(expense_summary)
        .service(get_expense)
        .service(update_expense)
        .service(delete_expense)
        .service(approve_expense)
        .service(assignment_progress)
        .service(get_availability)
        .service(set_availability)
        .service(reconcile_availability);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// Runs an availability reconcile pass before serving so drift left by a
/// crash between a status write and its flag flip is repaired at startup.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);

    match http_state.availability.reconcile().await {
        Ok(outcome) => {
            if !outcome.corrected.is_empty() {
                info!(
                    corrected = outcome.corrected.len(),
                    "availability flags reconciled at startup"
                );
            }
        }
        Err(error) => warn!(%error, "startup availability reconcile failed"),
    }

    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
