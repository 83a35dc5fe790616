use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::config::{Credentials, OpenAiConfig};
use crate::core::errors::ApiError;

/// OpenAI-compatible HTTP provider for both chat completions and embeddings.
/// Model identifiers are fixed at construction; failures surface as
/// transient-service errors and are never retried here.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig, credentials: &Credentials) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            api_key: credentials.api_key.clone(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.chat_model,
            "messages": request.messages,
            "stream": false,
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(temperature) = request.temperature {
                obj.insert("temperature".to_string(), json!(temperature));
            }
            if let Some(max_tokens) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(max_tokens));
            }
        }

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ApiError::GenerationService(format!("chat request failed: {err}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::GenerationService(format!(
                "chat completion failed ({status}): {text}"
            )));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|err| ApiError::GenerationService(format!("invalid chat response: {err}")))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::GenerationService("chat response has no message content".to_string())
            })
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ApiError::EmbeddingService(format!("embedding request failed: {err}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::EmbeddingService(format!(
                "embedding request failed ({status}): {text}"
            )));
        }

        let payload: Value = res.json().await.map_err(|err| {
            ApiError::EmbeddingService(format!("invalid embedding response: {err}"))
        })?;

        let data = payload["data"].as_array().ok_or_else(|| {
            ApiError::EmbeddingService("embedding response has no data array".to_string())
        })?;

        let mut embeddings = Vec::with_capacity(data.len());
        for item in data {
            let values = item["embedding"].as_array().ok_or_else(|| {
                ApiError::EmbeddingService("embedding item has no vector".to_string())
            })?;
            let vector: Vec<f32> = values
                .iter()
                .filter_map(|value| value.as_f64().map(|f| f as f32))
                .collect();
            embeddings.push(vector);
        }

        if embeddings.len() != inputs.len() {
            return Err(ApiError::EmbeddingService(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }
}
