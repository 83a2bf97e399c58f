use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{AppState, accounts, chat};

/// REST routes under `/api` plus the health probe. CORS and tracing layers
/// are added by the server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/info", get(accounts::list_accounts).post(accounts::create_account))
        .route("/api/find-user", post(accounts::find_user))
        .route("/api/chat", get(chat::list_chats))
        .route("/api/add-chat", post(chat::add_chat))
        .route("/api/chat-follow-namelogin", get(chat::chats_for_user))
        .route("/api/get-chat-double-user", post(chat::chat_between))
        .route("/api/update-liked", post(chat::update_liked))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
