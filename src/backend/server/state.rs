/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds:
 * - the conversation store, as a trait object so the in-memory and
 *   PostgreSQL back ends are interchangeable
 * - the optimistic updater carrying the retry policy and backoff
 *
 * Both are cheap to clone; every request handler gets its own handle.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::optimistic::OptimisticUpdater;
use crate::backend::store::ConversationStore;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Conversation persistence
    pub store: Arc<dyn ConversationStore>,

    /// Runs versioned updates against `store`
    pub updater: OptimisticUpdater,
}

impl AppState {
    pub fn new(store: Arc<dyn ConversationStore>, updater: OptimisticUpdater) -> Self {
        Self { store, updater }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("updater", &self.updater)
            .finish_non_exhaustive()
    }
}

/// Lets handlers take `State<Arc<dyn ConversationStore>>` directly
impl FromRef<AppState> for Arc<dyn ConversationStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}
