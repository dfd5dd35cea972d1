//! Embedder adapters: an HTTP client for an Ollama-compatible server and,
//! behind `embedding-fastembed`, a local dependency-free alternative.

mod ollama;

pub use ollama::OllamaEmbedder;

#[cfg(feature = "embedding-fastembed")]
mod fastembed_local;

#[cfg(feature = "embedding-fastembed")]
pub use fastembed_local::FastEmbedEmbedder;
