//! Shared Module
//!
//! This module contains the types that cross the HTTP boundary: request and
//! response payloads, their validation rules, and configuration. Nothing in
//! here touches the network or the database.

/// Conversation and customer-agent types
pub mod conversation;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use conversation::{
    Conversation, ConversationChanges, ConversationFilter, ConversationQuery, CustAgent,
    LinkCustAgentRequest, NewConversation, INITIAL_VERSION,
};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
