//! convodesk - Conversation Records Service
//!
//! A REST backend for the conversations recorded between customers and the
//! agents serving them. Conversation edits are guarded by optimistic
//! concurrency: every record carries a version counter, updates are
//! compare-and-swap writes against the version just read, and writers that
//! lose the race retry a bounded number of times with a jittered pause
//! before giving up with a conflict.
//!
//! # Module Structure
//!
//! - **`shared`** - Payload types, validation rules, configuration
//! - **`backend`** - Axum server, handlers, storage, update protocol
//!   (only compiled with the `server` feature, on by default)
//!
//! # Usage
//!
//! ```rust,no_run
//! use convodesk::backend::server::create_app;
//! use convodesk::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(&config).await?;
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation failures
//! - `backend::StoreError` for storage failures
//! - `backend::UpdateError` for the outcome of a versioned update
//! - `backend::BackendError` for HTTP responses

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "server")]
pub mod backend;
