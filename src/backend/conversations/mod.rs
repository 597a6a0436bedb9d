//! Conversations
//!
//! HTTP handlers for the conversation resource and the customer-agent links
//! it belongs to.

pub mod handlers;

pub use handlers::{
    create_conversation, delete_conversation, get_conversation, link_cust_agent, list_by_agent,
    list_by_customer, list_conversations, update_conversation,
};
