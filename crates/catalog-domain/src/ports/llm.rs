//! Text-generation provider port (§6).

use async_trait::async_trait;

use crate::error::Result;

/// Parameters accepted by [`Llm::generate`]. All optional; providers apply
/// their own defaults for anything left unset.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Optional system prompt prepended to the conversation.
    pub system: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

/// System prompt for [`Llm::expand_query`]'s default implementation.
const EXPAND_QUERY_SYSTEM_PROMPT: &str = "Expand this software project search query with 2-3 related terms. \
Add synonyms and related concepts that would help find relevant projects. \
Keep the original terms and add space-separated additions.\n\n\
Examples:\n\
- \"python web\" -> \"python web framework api http server\"\n\
- \"machine learning\" -> \"machine learning ml ai neural network deep learning\"\n\
- \"discord bot\" -> \"discord bot chatbot automation messaging\"\n\n\
Just output the expanded query, nothing else.";

/// Generates free-text completions. Used by the natural-language query
/// parser (§4.11), LLM analysis job handler, and quality assessment
/// fallback chain.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Generate text for `prompt`, honoring `options`.
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String>;

    /// Expand a search query with related terms to widen semantic recall
    /// (C11 supplemental). The default implementation asks the model with
    /// a fixed prompt; providers may override it for a specialized path.
    async fn expand_query(&self, query: &str) -> Result<String> {
        self.generate(
            &format!("Query: {query}"),
            GenerateOptions {
                system: Some(EXPAND_QUERY_SYSTEM_PROMPT.to_owned()),
                temperature: Some(0.2),
                max_tokens: Some(100),
            },
        )
        .await
    }
}
