/**
 * API Route Handlers
 *
 * This module wires the `/api` endpoints onto the router.
 *
 * # Routes
 *
 * ## Status
 * - `GET /api/check-status` - Liveness probe
 *
 * ## Customer-agent links
 * - `POST /api/cust-agents` - Link a customer to an agent
 *
 * ## Conversations
 * - `POST /api/conversations` - Create
 * - `GET /api/conversations` - List with filters
 * - `GET /api/conversations/{id}` - Fetch one
 * - `PUT /api/conversations/{id}` - Partial update under optimistic concurrency
 * - `DELETE /api/conversations/{id}` - Delete
 * - `GET /api/conversations/customer/{customer_id}` - By customer
 * - `GET /api/conversations/agent/{agent_id}` - By agent
 */

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::backend::conversations::{
    create_conversation, delete_conversation, get_conversation, link_cust_agent, list_by_agent,
    list_by_customer, list_conversations, update_conversation,
};
use crate::backend::server::state::AppState;

/// Liveness probe
pub async fn check_status() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "active" }))
}

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/check-status", get(check_status))
        .route("/api/cust-agents", post(link_cust_agent))
        .route(
            "/api/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/api/conversations/{id}",
            get(get_conversation)
                .put(update_conversation)
                .delete(delete_conversation),
        )
        .route(
            "/api/conversations/customer/{customer_id}",
            get(list_by_customer),
        )
        .route("/api/conversations/agent/{agent_id}", get(list_by_agent))
}
