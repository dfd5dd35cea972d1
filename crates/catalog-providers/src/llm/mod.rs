//! `Llm` adapter for an Ollama-compatible chat endpoint.

mod ollama;

pub use ollama::OllamaLlm;
