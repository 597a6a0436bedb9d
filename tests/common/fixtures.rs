//! Test server and request fixtures

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use convodesk::backend::optimistic::{NoBackoff, OptimisticUpdater, RetryPolicy};
use convodesk::backend::routes::create_router;
use convodesk::backend::server::AppState;
use convodesk::backend::store::{ConversationStore, InMemoryStore};
use convodesk::shared::{Conversation, CustAgent, NewConversation};

/// Request deadline used by test servers
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Updater that retries immediately, so conflict tests stay fast
pub fn instant_updater(max_retries: u32) -> OptimisticUpdater {
    let policy = RetryPolicy {
        max_retries,
        ..RetryPolicy::default()
    };
    OptimisticUpdater::new(policy, Arc::new(NoBackoff))
}

/// Test server over an arbitrary store
pub fn server_with(store: Arc<dyn ConversationStore>, updater: OptimisticUpdater) -> TestServer {
    let app = create_router(AppState::new(store, updater), TEST_TIMEOUT);
    TestServer::new(app).expect("Failed to start test server")
}

/// Test server over a fresh in-memory store, which is also returned for seeding
pub fn memory_server() -> (TestServer, InMemoryStore) {
    let store = InMemoryStore::new();
    let server = server_with(Arc::new(store.clone()), instant_updater(3));
    (server, store)
}

/// Link a fresh customer and agent through the API
pub async fn link_through_api(server: &TestServer) -> CustAgent {
    let response = server
        .post("/api/cust-agents")
        .json(&json!({
            "customerId": Uuid::new_v4(),
            "agentId": Uuid::new_v4(),
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<CustAgent>()
}

/// JSON body for creating a conversation `minutes_ago` minutes in the past
pub fn conversation_body(link: &CustAgent, minutes_ago: i64, duration: i32) -> Value {
    json!({
        "custAgentId": link.id,
        "timeDate": minutes_before_now(minutes_ago),
        "duration": duration,
        "exchange": "Customer asked about a late delivery",
    })
}

/// Create a conversation through the API
pub async fn create_through_api(
    server: &TestServer,
    link: &CustAgent,
    minutes_ago: i64,
    duration: i32,
) -> Conversation {
    let response = server
        .post("/api/conversations")
        .json(&conversation_body(link, minutes_ago, duration))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Conversation>()
}

/// Seed a link and a conversation directly in a store
pub async fn seed_conversation(store: &dyn ConversationStore) -> Conversation {
    let link = store
        .link_cust_agent(Uuid::new_v4(), Uuid::new_v4())
        .await
        .expect("Failed to link customer and agent");
    store
        .create_conversation(
            &link,
            NewConversation {
                cust_agent_id: link.id,
                time_date: minutes_before_now(10),
                duration: 300,
                exchange: "Initial exchange".to_string(),
                transcript: None,
                file: None,
            },
        )
        .await
        .expect("Failed to create conversation")
}

pub fn minutes_before_now(minutes: i64) -> DateTime<Utc> {
    Utc::now() - chrono::Duration::minutes(minutes)
}
