pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Lab requests (TESTER)
        .route(
            "/api/lab-requests",
            get(routes::lab_requests::mine),
        )
        .route(
            "/api/lab-requests/to-be-tested",
            get(routes::lab_requests::to_be_tested),
        )
        .route(
            "/api/lab-requests/assign/{id}",
            put(routes::lab_requests::assign),
        )
        .route(
            "/api/lab-requests/update/{id}",
            put(routes::lab_requests::update),
        )
        // Consultations (DOCTOR)
        .route("/api/consultations", get(routes::consultations::mine))
        .route(
            "/api/consultations/in-queue",
            get(routes::consultations::in_queue),
        )
        .route(
            "/api/consultations/assign/{id}",
            put(routes::consultations::assign),
        )
        .route(
            "/api/consultations/update/{id}",
            put(routes::consultations::update),
        )
        // Intake and lookups
        .route(
            "/api/test-requests",
            get(routes::test_requests::mine).post(routes::test_requests::create),
        )
        .route(
            "/api/test-requests/{id}",
            get(routes::test_requests::get_request),
        )
        .route(
            "/api/test-requests/{id}/flow",
            get(routes::test_requests::flow),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the API server on a pre-bound listener.
///
/// Lets the caller read the actual port first (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(root: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    let app = build_router(root);

    tracing::info!("upstac API listening on http://{local}");

    axum::serve(listener, app).await?;
    Ok(())
}
