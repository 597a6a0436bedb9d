//! Store wrappers that script version conflicts
//!
//! `ContendedStore` wraps an `InMemoryStore` and can simulate a competing
//! client writing between our version read and our conditional write.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use convodesk::backend::store::{
    ConversationStore, InMemoryStore, StoreError, Version, VersionedStore,
};
use convodesk::shared::{
    Conversation, ConversationChanges, ConversationFilter, CustAgent, NewConversation,
};

#[derive(Debug, Default)]
pub struct ContendedStore {
    inner: InMemoryStore,
    /// Rival writes, one landed right after each version read until drained
    rivals: Mutex<VecDeque<ConversationChanges>>,
    /// Every conditional write matches nothing
    always_stale: bool,
    reads: AtomicU32,
    writes: AtomicU32,
}

impl ContendedStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Store whose conditional writes never match, as if another client
    /// always got there first
    pub fn always_stale(inner: InMemoryStore) -> Self {
        Self {
            inner,
            always_stale: true,
            ..Self::default()
        }
    }

    /// Queue a rival write to land after the next version read
    pub fn push_rival(&self, changes: ConversationChanges) {
        self.rivals.lock().unwrap().push_back(changes);
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }
}

#[async_trait]
impl VersionedStore for ContendedStore {
    type Id = Uuid;
    type Changes = ConversationChanges;
    type Record = Conversation;

    async fn read_version(&self, id: &Uuid) -> Result<Option<Version>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let Some(version) = self.inner.read_version(id).await? else {
            return Ok(None);
        };

        let rival = self.rivals.lock().unwrap().pop_front();
        if let Some(rival) = rival {
            self.inner.update_if_version(id, version, &rival).await?;
        }
        Ok(Some(version))
    }

    async fn update_if_version(
        &self,
        id: &Uuid,
        expected: Version,
        changes: &ConversationChanges,
    ) -> Result<Option<Conversation>, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.always_stale {
            return Ok(None);
        }
        self.inner.update_if_version(id, expected, changes).await
    }
}

#[async_trait]
impl ConversationStore for ContendedStore {
    async fn link_cust_agent(
        &self,
        customer_id: Uuid,
        agent_id: Uuid,
    ) -> Result<CustAgent, StoreError> {
        self.inner.link_cust_agent(customer_id, agent_id).await
    }

    async fn get_cust_agent(&self, id: Uuid) -> Result<Option<CustAgent>, StoreError> {
        self.inner.get_cust_agent(id).await
    }

    async fn create_conversation(
        &self,
        link: &CustAgent,
        input: NewConversation,
    ) -> Result<Conversation, StoreError> {
        self.inner.create_conversation(link, input).await
    }

    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        self.inner.get_conversation(id).await
    }

    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, StoreError> {
        self.inner.list_conversations(filter).await
    }

    async fn delete_conversation(&self, id: Uuid) -> Result<bool, StoreError> {
        self.inner.delete_conversation(id).await
    }
}
