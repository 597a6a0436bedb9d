//! Conversation HTTP Handlers
//!
//! CRUD handlers for conversations and customer-agent links. Updates go
//! through the optimistic updater; everything else talks to the store
//! directly.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::ConversationStore;
use crate::shared::conversation::parse_uuid;
use crate::shared::{
    Conversation, ConversationChanges, ConversationFilter, ConversationQuery, CustAgent,
    LinkCustAgentRequest, NewConversation, SharedError,
};

type Store = Arc<dyn ConversationStore>;

/// Parse a path segment as a UUID, reporting `field` on failure
fn parse_path_id(field: &str, raw: &str) -> Result<Uuid, BackendError> {
    parse_uuid(raw).map_err(|message| SharedError::validation(field, message).into())
}

/// Link a customer to an agent
pub async fn link_cust_agent(
    State(store): State<Store>,
    payload: Result<Json<LinkCustAgentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CustAgent>), BackendError> {
    let Json(request) = payload?;

    let link = store
        .link_cust_agent(request.customer_id, request.agent_id)
        .await?;
    tracing::info!(cust_agent_id = %link.id, "Customer-agent link ready");

    Ok((StatusCode::CREATED, Json(link)))
}

/// Create a conversation under an existing customer-agent link
pub async fn create_conversation(
    State(store): State<Store>,
    payload: Result<Json<NewConversation>, JsonRejection>,
) -> Result<(StatusCode, Json<Conversation>), BackendError> {
    let Json(input) = payload?;
    let input = input.validate(Utc::now())?;

    let link = store
        .get_cust_agent(input.cust_agent_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Customer-Agent relationship not found"))?;

    let conversation = store.create_conversation(&link, input).await?;
    tracing::info!(conversation_id = %conversation.id, "Conversation created");

    Ok((StatusCode::CREATED, Json(conversation)))
}

/// List conversations, newest first
///
/// Query parameters: `customerId`, `agentId`, `startDate` + `endDate`,
/// `minDuration`, `maxDuration`.
pub async fn list_conversations(
    State(store): State<Store>,
    query: Result<Query<ConversationQuery>, QueryRejection>,
) -> Result<Json<Vec<Conversation>>, BackendError> {
    let Query(query) = query?;
    let filter = ConversationFilter::from_query(&query)?;
    let conversations = store.list_conversations(&filter).await?;
    Ok(Json(conversations))
}

pub async fn get_conversation(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, BackendError> {
    let id = parse_path_id("id", &id)?;
    let conversation = store
        .get_conversation(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Conversation not found"))?;
    Ok(Json(conversation))
}

/// Apply a partial update under optimistic concurrency
///
/// - 200 with the updated record, version bumped by one
/// - 404 when the conversation does not exist
/// - 409 when concurrent writers kept winning until the retry budget ran out
pub async fn update_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ConversationChanges>, JsonRejection>,
) -> Result<Json<Conversation>, BackendError> {
    let id = parse_path_id("id", &id)?;
    let Json(changes) = payload?;
    let changes = changes.validate(Utc::now())?;

    let conversation = state
        .updater
        .apply(state.store.as_ref(), &id, &changes)
        .await?;
    tracing::info!(
        conversation_id = %conversation.id,
        version = conversation.version,
        "Conversation updated"
    );

    Ok(Json(conversation))
}

pub async fn delete_conversation(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<StatusCode, BackendError> {
    let id = parse_path_id("id", &id)?;
    if !store.delete_conversation(id).await? {
        return Err(BackendError::not_found("Conversation not found"));
    }
    tracing::info!(conversation_id = %id, "Conversation deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_by_customer(
    State(store): State<Store>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Conversation>>, BackendError> {
    let customer_id = parse_path_id("customerId", &customer_id)?;
    let conversations = store
        .list_conversations(&ConversationFilter::for_customer(customer_id))
        .await?;
    Ok(Json(conversations))
}

pub async fn list_by_agent(
    State(store): State<Store>,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<Conversation>>, BackendError> {
    let agent_id = parse_path_id("agentId", &agent_id)?;
    let conversations = store
        .list_conversations(&ConversationFilter::for_agent(agent_id))
        .await?;
    Ok(Json(conversations))
}
