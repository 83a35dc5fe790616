use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::ingest::SourceFile;
use crate::state::AppState;

/// The upload is itself the "index now" trigger: every multipart field
/// carrying a filename becomes one source file, and the batch is indexed
/// before the response is sent.
pub async fn index_documents(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::BadRequest(format!("failed to read {name}: {err}")))?;
        files.push(SourceFile {
            name,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("no files uploaded".to_string()));
    }

    let mut session = state.session.lock().await;
    let report = state.pipeline.index_documents(&mut session, &files).await?;

    Ok(Json(json!({
        "state": session.index_state().name(),
        "files": report.files,
        "pages": report.pages,
        "chunks": report.chunks,
    })))
}
