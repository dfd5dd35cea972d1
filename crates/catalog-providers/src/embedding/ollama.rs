//! HTTP embedder adapter for an Ollama-compatible server (C4). Grounded
//! on `original_source/catalog/llm/embeddings.py`'s `EmbeddingService`
//! (`/api/embeddings`, `/api/tags`).

use std::time::Duration;

use async_trait::async_trait;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::Embedder;
use serde::Deserialize;

/// Default Ollama base URL, overridden by `OLLAMA_BASE_URL` at the bin
/// crate's DI root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Speaks the Ollama `/api/embeddings` and `/api/tags` surface. Retry and
/// backoff live one layer up in `catalog_application::embedding::EmbeddingService`;
/// this adapter makes a single request attempt per call.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    /// Build an adapter targeting `base_url` for `model`, with a fixed
    /// request timeout (§4.4: the original's 60s Ollama timeout).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|error| Error::Config { message: format!("failed to build HTTP client: {error}") })?;
        Ok(Self { client, base_url: base_url.into(), model: model.into() })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "model": self.model, "prompt": text }))
            .send()
            .await
            .map_err(|error| Error::transient(format!("embedding request failed: {error}")))?;

        if !response.status().is_success() {
            return Err(Error::transient(format!("embedding API returned status {}", response.status())));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|error| Error::transient(format!("malformed embedding response: {error}")))?;
        Ok(body.embedding)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|error| Error::transient(format!("tags request failed: {error}")))?;

        if !response.status().is_success() {
            return Err(Error::transient(format!("tags API returned status {}", response.status())));
        }

        let body: TagsResponse = response
            .json()
            .await
            .map_err(|error| Error::transient(format!("malformed tags response: {error}")))?;
        Ok(body.models.into_iter().map(|entry| entry.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embeddings_response() {
        let raw = r#"{"embedding": [0.1, 0.2, 0.3]}"#;
        let parsed: EmbeddingsResponse = serde_json::from_str(raw).expect("valid response");
        assert_eq!(parsed.embedding, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn parses_tags_response_into_model_names() {
        let raw = r#"{"models": [{"name": "nomic-embed-text:latest"}, {"name": "llama3.1:latest"}]}"#;
        let parsed: TagsResponse = serde_json::from_str(raw).expect("valid response");
        let names: Vec<String> = parsed.models.into_iter().map(|entry| entry.name).collect();
        assert_eq!(names, vec!["nomic-embed-text:latest".to_owned(), "llama3.1:latest".to_owned()]);
    }

    #[tokio::test]
    async fn builds_with_a_configured_model() {
        let embedder = OllamaEmbedder::new(DEFAULT_BASE_URL, "nomic-embed-text").expect("client builds");
        assert_eq!(embedder.model, "nomic-embed-text");
    }
}
