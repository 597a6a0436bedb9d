/**
 * In-Memory Store
 *
 * Keeps customer-agent links and conversations in hash maps behind a single
 * `tokio::sync::RwLock`. Used when no `DATABASE_URL` is configured and by
 * the test suite.
 *
 * # Atomicity
 *
 * `update_if_version` performs the version check, the merge, and the
 * increment while holding the write lock, so it is a true compare-and-swap.
 * Nothing is held between separate calls.
 */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ConversationStore, StoreError, Version, VersionedStore};
use crate::shared::{
    Conversation, ConversationChanges, ConversationFilter, CustAgent, NewConversation,
};

#[derive(Debug, Default)]
struct Tables {
    cust_agents: HashMap<Uuid, CustAgent>,
    conversations: HashMap<Uuid, Conversation>,
}

/// Conversation store held entirely in process memory
///
/// Cloning is cheap and every clone shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a conversation as-is, version included.
    ///
    /// Useful for seeding fixtures at an arbitrary version.
    pub async fn insert_conversation(&self, conversation: Conversation) {
        let mut tables = self.tables.write().await;
        tables.conversations.insert(conversation.id, conversation);
    }

    /// Number of stored conversations
    pub async fn conversation_count(&self) -> usize {
        self.tables.read().await.conversations.len()
    }
}

#[async_trait]
impl VersionedStore for InMemoryStore {
    type Id = Uuid;
    type Changes = ConversationChanges;
    type Record = Conversation;

    async fn read_version(&self, id: &Uuid) -> Result<Option<Version>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.conversations.get(id).map(|c| c.version))
    }

    async fn update_if_version(
        &self,
        id: &Uuid,
        expected: Version,
        changes: &ConversationChanges,
    ) -> Result<Option<Conversation>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(conversation) = tables.conversations.get_mut(id) else {
            return Ok(None);
        };
        if conversation.version != expected {
            return Ok(None);
        }

        conversation.merge(changes);
        conversation.version += 1;
        conversation.updated_at = Utc::now();
        Ok(Some(conversation.clone()))
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn link_cust_agent(
        &self,
        customer_id: Uuid,
        agent_id: Uuid,
    ) -> Result<CustAgent, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .cust_agents
            .values()
            .find(|link| link.customer_id == customer_id && link.agent_id == agent_id)
        {
            return Ok(existing.clone());
        }

        let link = CustAgent {
            id: Uuid::new_v4(),
            customer_id,
            agent_id,
            created_at: Utc::now(),
        };
        tables.cust_agents.insert(link.id, link.clone());
        Ok(link)
    }

    async fn get_cust_agent(&self, id: Uuid) -> Result<Option<CustAgent>, StoreError> {
        Ok(self.tables.read().await.cust_agents.get(&id).cloned())
    }

    async fn create_conversation(
        &self,
        link: &CustAgent,
        input: NewConversation,
    ) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(link, input, Utc::now());
        let mut tables = self.tables.write().await;
        tables
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        Ok(self.tables.read().await.conversations.get(&id).cloned())
    }

    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, StoreError> {
        let tables = self.tables.read().await;
        let mut conversations: Vec<Conversation> = tables
            .conversations
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.time_date.cmp(&a.time_date));
        Ok(conversations)
    }

    async fn delete_conversation(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.conversations.remove(&id).is_some())
    }
}
