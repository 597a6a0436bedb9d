//! Backend Module
//!
//! This module contains all server-side code: the Axum HTTP server, the
//! conversation handlers, storage, and the optimistic update protocol that
//! guards concurrent edits.
//!
//! This module is only compiled when the `server` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`conversations`** - Conversation and customer-agent handlers
//! - **`optimistic`** - Versioned update loop with bounded, jittered retries
//! - **`store`** - Storage traits, in-memory and PostgreSQL implementations
//! - **`error`** - Backend error type and HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── conversations/  - HTTP handlers
//! ├── optimistic/     - Optimistic update protocol
//! ├── store/          - Persistence
//! └── error/          - Error types
//! ```
//!
//! # Concurrency
//!
//! Every request runs as its own task. Two requests may update the same
//! conversation at once; no lock is held across a request. The stores make
//! each conditional write atomic and the updater retries losers a bounded
//! number of times.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Conversation handlers
pub mod conversations;

/// Optimistic update protocol
pub mod optimistic;

/// Persistence
pub mod store;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use server::{create_app, AppState};
pub use error::BackendError;
pub use optimistic::{OptimisticUpdater, RetryPolicy, UpdateError};
pub use store::{ConversationStore, InMemoryStore, PgStore, StoreError, VersionedStore};
