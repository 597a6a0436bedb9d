/**
 * Server Configuration
 *
 * This module turns an `AppConfig` into the services the server runs on:
 * the conversation store and the optimistic updater.
 *
 * # Store Selection
 *
 * - `DATABASE_URL` set: connect to PostgreSQL and run migrations. Failure
 *   here is fatal; the caller decides whether to exit.
 * - `DATABASE_URL` unset: fall back to the in-memory store, with a warning
 *   that nothing survives a restart.
 */

use std::sync::Arc;

use crate::backend::optimistic::{OptimisticUpdater, RetryPolicy};
use crate::backend::store::{ConversationStore, InMemoryStore, PgStore, StoreError};
use crate::shared::AppConfig;

/// Open the store selected by `config`
pub async fn load_store(config: &AppConfig) -> Result<Arc<dyn ConversationStore>, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.map_err(|e| {
                tracing::error!("Failed to initialise database: {}", e);
                e
            })?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Using in-memory store; data will not persist.");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

/// Build the updater from the configured retry policy
pub fn load_updater(config: &AppConfig) -> OptimisticUpdater {
    let policy = RetryPolicy::from(config);
    tracing::info!(
        max_retries = policy.max_retries,
        max_jitter_ms = policy.max_jitter.as_millis() as u64,
        "Optimistic update policy loaded"
    );
    OptimisticUpdater::with_jitter(policy)
}
