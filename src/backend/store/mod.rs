//! Persistence Module
//!
//! Storage traits and their two implementations.
//!
//! # Architecture
//!
//! - **`VersionedStore`** - the two operations the optimistic update loop
//!   needs: a version projection and a compare-and-swap write
//! - **`ConversationStore`** - the conversation resource on top of that
//! - **`memory`** - `InMemoryStore`, a lock-protected map
//! - **`postgres`** - `PgStore`, backed by `sqlx::PgPool`
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs      - Traits and StoreError
//! ├── memory.rs   - In-memory implementation
//! └── postgres.rs - PostgreSQL implementation
//! ```

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::{
    Conversation, ConversationChanges, ConversationFilter, CustAgent, NewConversation,
};

/// In-memory store
pub mod memory;

/// PostgreSQL store
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Version counter type shared by every versioned record
pub type Version = i64;

/// What kind of constraint a write tripped over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    Other,
}

/// Storage-layer failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// The engine aborted the write because of a concurrent transaction.
    /// Safe to retry.
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// The database could not be reached
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// A constraint rejected the write
    #[error("Constraint violation: {message}")]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Any other database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Whether the optimistic update loop may try again after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match classify(&err) {
            Some(mapped) => mapped,
            None => Self::Database(err),
        }
    }
}

/// Map the sqlx errors that have a dedicated variant.
///
/// Only `serialization_failure` (40001) and `deadlock_detected` (40P01) are
/// retryable; unique violations are terminal.
fn classify(err: &sqlx::Error) -> Option<StoreError> {
    use sqlx::error::ErrorKind;

    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => Some(StoreError::Unavailable(err.to_string())),
        sqlx::Error::Database(db) => {
            if matches!(db.code().as_deref(), Some("40001") | Some("40P01")) {
                return Some(StoreError::Conflict(db.message().to_string()));
            }
            let kind = match db.kind() {
                ErrorKind::UniqueViolation => ConstraintKind::Unique,
                ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => ConstraintKind::Other,
                _ => return None,
            };
            Some(StoreError::Constraint {
                kind,
                message: db.message().to_string(),
            })
        }
        _ => None,
    }
}

/// A store holding records guarded by a version counter.
///
/// Implementations must make `update_if_version` atomic: the version check,
/// the field changes, and the increment happen as one step that no other
/// writer can interleave with.
#[async_trait]
pub trait VersionedStore: Send + Sync {
    type Id: fmt::Display + Send + Sync;
    type Changes: Send + Sync;
    type Record: Send;

    /// Current version of a record, or `None` if it does not exist
    async fn read_version(&self, id: &Self::Id) -> Result<Option<Version>, StoreError>;

    /// Apply `changes` and set the version to `expected + 1`, but only if the
    /// stored version still equals `expected`.
    ///
    /// Returns `None` when nothing matched.
    async fn update_if_version(
        &self,
        id: &Self::Id,
        expected: Version,
        changes: &Self::Changes,
    ) -> Result<Option<Self::Record>, StoreError>;
}

/// Conversation persistence
#[async_trait]
pub trait ConversationStore:
    VersionedStore<Id = Uuid, Changes = ConversationChanges, Record = Conversation>
{
    /// Link a customer to an agent, returning the existing link if present
    async fn link_cust_agent(
        &self,
        customer_id: Uuid,
        agent_id: Uuid,
    ) -> Result<CustAgent, StoreError>;

    async fn get_cust_agent(&self, id: Uuid) -> Result<Option<CustAgent>, StoreError>;

    /// Insert a new conversation under `link` at the initial version
    async fn create_conversation(
        &self,
        link: &CustAgent,
        input: NewConversation,
    ) -> Result<Conversation, StoreError>;

    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, StoreError>;

    /// Conversations matching `filter`, newest `time_date` first
    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, StoreError>;

    /// Remove a conversation; `false` when it did not exist
    async fn delete_conversation(&self, id: Uuid) -> Result<bool, StoreError>;
}
