/**
 * Server Initialization
 *
 * This module assembles the Axum application from configuration.
 *
 * # Initialization Process
 *
 * 1. Open the conversation store (PostgreSQL or in-memory)
 * 2. Build the optimistic updater from the retry policy
 * 3. Create the router with tracing and the request timeout
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_store, load_updater};
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails when a database is configured but cannot be reached or migrated.
pub async fn create_app(config: &AppConfig) -> Result<Router<()>, StoreError> {
    tracing::info!("Initializing convodesk backend server");

    let store = load_store(config).await?;
    let updater = load_updater(config);
    let app_state = AppState::new(store, updater);

    let app = create_router(app_state, config.request_timeout);
    tracing::info!(
        timeout_secs = config.request_timeout.as_secs(),
        "Router configured"
    );

    Ok(app)
}
