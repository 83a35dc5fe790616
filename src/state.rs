use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::core::config::{AppConfig, Credentials};
use crate::core::errors::ApiError;
use crate::llm::openai::OpenAiProvider;
use crate::session::{SessionPipeline, StudySession};

/// Shared application state. The session mutex serializes pipeline
/// operations: handlers hold it across the whole index or ask call.
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: SessionPipeline,
    pub session: Mutex<StudySession>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn initialize(config: AppConfig, credentials: &Credentials) -> Result<Arc<Self>, ApiError> {
        let provider = Arc::new(OpenAiProvider::new(&config.openai, credentials)?);
        let pipeline =
            SessionPipeline::new(provider, config.chunking.clone(), &config.retrieval);

        Ok(Arc::new(AppState {
            config,
            pipeline,
            session: Mutex::new(StudySession::new()),
            started_at: Utc::now(),
        }))
    }
}
