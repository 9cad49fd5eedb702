//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All picker endpoints are mounted under `/api/v1`; `/health` and the
//! `/ws` event stream sit at the root. With the `swagger-ui` feature the
//! OpenAPI document is served at `/api-docs/openapi.json` and browsable at
//! `/swagger-ui`.

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "rollcall",
        description = "Classroom random name picker: roster, absences, draws, history and class documents."
    ),
    paths(
        handlers::system::health_handler,
        handlers::state::get_state,
        handlers::state::update_settings,
        handlers::state::reset_history,
        handlers::roster::add_names,
        handlers::roster::remove_name,
        handlers::roster::clear_roster,
        handlers::roster::set_absence,
        handlers::roster::clear_absence,
        handlers::class::switch_class,
        handlers::class::list_classes,
        handlers::class::import_document,
        handlers::class::export_document,
        handlers::draw::draw,
        handlers::draw::stop_draw,
        handlers::ocr::recognize,
    ),
    tags(
        (name = "System", description = "Service health"),
        (name = "State", description = "Current state, settings and history"),
        (name = "Roster", description = "Names and absences"),
        (name = "Class", description = "Class switching, import and export"),
        (name = "Draw", description = "Drawing a name"),
        (name = "OCR", description = "Reading names from images"),
    )
)]
pub struct ApiDoc;

/// Builds the API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

/// Builds the complete application: REST routes, the `/ws` endpoint, and
/// the tracing, CORS, timeout and body-limit layers.
pub fn build_app(state: AppState, request_timeout: Duration, max_body_bytes: usize) -> Router {
    Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/state",
            "/api/v1/names",
            "/api/v1/names/{key}",
            "/api/v1/absence",
            "/api/v1/absence/{key}",
            "/api/v1/settings",
            "/api/v1/history",
            "/api/v1/class",
            "/api/v1/classes",
            "/api/v1/import",
            "/api/v1/export",
            "/api/v1/draw",
            "/api/v1/draw/stop",
            "/api/v1/ocr",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
