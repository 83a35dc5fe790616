use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::session::{AskOutcome, NOT_INDEXED_NOTICE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = state.session.lock().await;

    match state.pipeline.ask(&mut session, &payload.question).await? {
        AskOutcome::Answered(answer) => Ok(Json(json!({
            "answered": true,
            "answer": answer,
        }))),
        AskOutcome::NotIndexed => Ok(Json(json!({
            "answered": false,
            "notice": NOT_INDEXED_NOTICE,
        }))),
    }
}

pub async fn get_history(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let session = state.session.lock().await;
    Ok(Json(json!({ "turns": session.conversation() })))
}
