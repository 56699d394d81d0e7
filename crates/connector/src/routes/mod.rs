//! HTTP route handlers for the connector.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database ping)
//!
//! # Import (admin token)
//! POST /import/organizations      - Organizations of the API login
//! POST /import/terminals          - Terminal groups of an organization
//! POST /import/nomenclature       - Refresh the cached nomenclature
//! POST /import/cities             - Cities of an organization
//! POST /import/streets            - Streets of a city
//! POST /import/run                - Import chosen groups and their products
//!
//! # Export (admin token)
//! POST /orders/{id}/export        - Export a stored order
//! POST /orders/{id}/delivery      - Look up an exported order in iiko
//! POST /webhooks/order-created    - Store and export a new order
//! ```
//!
//! The picker endpoints (organizations, terminals, nomenclature, cities,
//! streets) answer with the iiko payload itself. The import run and the order
//! endpoints wrap their result in a `{data, logs}` envelope. Every failure is
//! a `{data: null, logs}` envelope.

pub mod import;
pub mod orders;
pub mod validation;

use axum::{Router, extract::State, http::StatusCode, middleware, routing::get};

use crate::middleware::require_admin_token;
use crate::state::AppState;

/// All routes, with the admin guard applied to everything but health checks.
pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .merge(import::router())
        .merge(orders::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_token,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(admin)
}

/// Router with state applied, without the tracing and Sentry layers.
pub fn app(state: AppState) -> Router {
    routes(&state).with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
