//! Local, dependency-free embedder backed by `fastembed`'s bundled ONNX
//! models. An alternative to [`super::OllamaEmbedder`] when no external
//! Ollama server is available (§1 redesign guidance: the provider seam is
//! swappable behind the same `Embedder` port).

use async_trait::async_trait;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::Embedder;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Wraps a `fastembed::TextEmbedding` session. Model loading happens once,
/// at construction; `embed` dispatches to a blocking thread since ONNX
/// inference is CPU-bound.
pub struct FastEmbedEmbedder {
    model: TextEmbedding,
    model_name: String,
}

impl FastEmbedEmbedder {
    /// Build a local embedder for `model_id`. Recognised identifiers map
    /// onto `fastembed::EmbeddingModel` variants; anything else falls back
    /// to `NomicEmbedTextV15`, the bundled default closest to the Ollama
    /// adapter's `nomic-embed-text`.
    pub fn new(model_id: &str) -> Result<Self> {
        let model_variant = resolve_model(model_id);
        let init = InitOptions::new(model_variant.clone());
        let model = TextEmbedding::try_new(init)
            .map_err(|error| Error::Config { message: format!("failed to load fastembed model: {error}") })?;
        Ok(Self { model, model_name: model_id.to_owned() })
    }
}

fn resolve_model(model_id: &str) -> EmbeddingModel {
    match model_id.to_lowercase().as_str() {
        "nomic-embed-text" | "nomic-embed-text-v1.5" => EmbeddingModel::NomicEmbedTextV15,
        "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "all-minilm-l6-v2" => EmbeddingModel::AllMiniLML6V2,
        _ => EmbeddingModel::NomicEmbedTextV15,
    }
}

#[async_trait]
impl Embedder for FastEmbedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self
            .model
            .embed(vec![text.to_owned()], None)
            .map_err(|error| Error::transient(format!("fastembed inference failed: {error}")))?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::transient("fastembed returned no embeddings".to_owned()))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec![self.model_name.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_model_ids_fall_back_to_nomic() {
        assert!(matches!(resolve_model("something-unheard-of"), EmbeddingModel::NomicEmbedTextV15));
    }

    #[test]
    fn known_aliases_resolve_to_their_variant() {
        assert!(matches!(resolve_model("bge-small-en-v1.5"), EmbeddingModel::BGESmallENV15));
    }
}
