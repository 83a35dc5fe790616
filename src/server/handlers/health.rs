use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let session = state.session.lock().await;
    Ok(Json(json!({
        "state": session.index_state().name(),
        "indexed_chunks": session.index_state().chunk_count(),
        "conversation_turns": session.conversation().len(),
        "chat_model": state.config.openai.chat_model,
        "embedding_model": state.config.openai.embedding_model,
    })))
}
