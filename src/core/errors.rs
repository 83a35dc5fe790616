use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("ingestion failed: {0}")]
    Ingestion(String),
    #[error("embedding service error: {0}")]
    EmbeddingService(String),
    #[error("generation service error: {0}")]
    GenerationService(String),
    #[error("no document index is available")]
    IndexUnavailable,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::Configuration(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Ingestion(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::EmbeddingService(_) | ApiError::GenerationService(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::IndexUnavailable => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        let cases = [
            (ApiError::Configuration("x".into()), 500),
            (ApiError::Ingestion("x".into()), 422),
            (ApiError::EmbeddingService("x".into()), 502),
            (ApiError::GenerationService("x".into()), 502),
            (ApiError::IndexUnavailable, 409),
            (ApiError::BadRequest("x".into()), 400),
            (ApiError::Internal("x".into()), 500),
        ];

        for (err, expected) in cases {
            let response = err.into_response();
            assert_eq!(response.status().as_u16(), expected);
        }
    }
}
