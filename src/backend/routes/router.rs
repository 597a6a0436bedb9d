/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Layers
 *
 * - `TraceLayer` opens a span per request
 * - `HandleErrorLayer` turns middleware errors into JSON error bodies
 * - `TimeoutLayer` bounds each request, including every update retry;
 *   when it fires the handler future is dropped and any pending backoff is
 *   cancelled with it, and the client gets a 408
 */

use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode, Router};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

use crate::backend::error::{handle_middleware_error, BackendError};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Store and updater shared by all handlers
/// * `request_timeout` - Deadline for a whole request
pub fn create_router(app_state: AppState, request_timeout: Duration) -> Router<()> {
    let router = configure_api_routes(Router::new());

    // Unknown routes get the same JSON error shape as everything else
    let router = router.fallback(|| async {
        BackendError::handler(StatusCode::NOT_FOUND, "Route not found")
    });

    // Outermost first: the trace span also covers timed-out requests
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .layer(TimeoutLayer::new(request_timeout));

    router.layer(layers).with_state(app_state)
}
