//! HTTP text-generation adapter for an Ollama-compatible server. Grounded
//! on `original_source/catalog/llm/service.py`'s `LLMService.generate`
//! (`/api/chat`, non-streaming, `options.temperature`/`num_predict`).

use std::time::Duration;

use async_trait::async_trait;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::{GenerateOptions, Llm};
use serde::{Deserialize, Serialize};

/// Default sampling temperature when [`GenerateOptions::temperature`] is unset.
const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Default generation cap when [`GenerateOptions::max_tokens`] is unset.
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// Speaks the Ollama `/api/chat` surface with `stream: false`.
pub struct OllamaLlm {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaLlm {
    /// Build an adapter targeting `base_url` for `model`, with a longer
    /// timeout than the embedder (§4.11: larger models, slower responses).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|error| Error::Config { message: format!("failed to build HTTP client: {error}") })?;
        Ok(Self { client, base_url: base_url.into(), model: model.into() })
    }
}

#[async_trait]
impl Llm for OllamaLlm {
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system.as_deref() {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: prompt });

        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                num_predict: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            },
        };

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|error| Error::transient(format!("chat request failed: {error}")))?;

        if !response.status().is_success() {
            return Err(Error::transient(format!("chat API returned status {}", response.status())));
        }

        let body: ChatResponse =
            response.json().await.map_err(|error| Error::transient(format!("malformed chat response: {error}")))?;
        Ok(body.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chat_response_content() {
        let raw = r#"{"message": {"role": "assistant", "content": "hello there"}}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).expect("valid response");
        assert_eq!(parsed.message.content, "hello there");
    }

    #[tokio::test]
    async fn builds_with_a_configured_model() {
        let llm = OllamaLlm::new("http://localhost:11434", "qwen2.5-coder:14b").expect("client builds");
        assert_eq!(llm.model, "qwen2.5-coder:14b");
    }
}
