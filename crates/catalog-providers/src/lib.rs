//! Embedding and text-generation provider adapters (C4) implementing
//! `catalog_domain::ports::{Embedder, Llm}` against external backends.

pub mod embedding;
pub mod llm;

pub use embedding::OllamaEmbedder;
pub use llm::OllamaLlm;

#[cfg(feature = "embedding-fastembed")]
pub use embedding::FastEmbedEmbedder;
