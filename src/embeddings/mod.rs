pub mod fastembed;
pub mod hash;

use anyhow::{anyhow, Result};
use std::path::Path;

/// Text encoder contract: any string maps to a vector of `dim()` floats.
///
/// `embed` takes `&self` so a single encoder can serve concurrent queries.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow!("Encoder returned no vector"))
    }
}

/// Factory function to create an embedder based on the backend configuration.
///
/// # Arguments
/// * `backend` - The embeddings backend to use
/// * `model_dir` - Local model directory (required for FastEmbed)
/// * `device` - Device to use for inference (CPU/Metal)
/// * `max_length` - Token limit applied by the FastEmbed tokenizer
/// * `hash_dim` - Dimension for hash embedder (only used if backend is Hash)
///
/// # Errors
/// Returns error if the model directory is missing, FastEmbed fails to
/// initialize from it, or `hash_dim` is below [`hash::MIN_DIM`].
pub fn create_embedder(
    backend: crate::config::EmbeddingsBackend,
    model_dir: Option<&Path>,
    device: crate::config::EmbeddingsDevice,
    max_length: usize,
    hash_dim: usize,
) -> Result<Box<dyn Embedder>> {
    match backend {
        crate::config::EmbeddingsBackend::FastEmbed => {
            let model_dir =
                model_dir.ok_or_else(|| anyhow!("FastEmbed backend requires a model directory"))?;
            Ok(Box::new(fastembed::FastEmbedder::from_dir(
                model_dir, device, max_length,
            )?))
        }
        crate::config::EmbeddingsBackend::Hash => {
            if hash_dim < hash::MIN_DIM {
                return Err(anyhow!(
                    "Hash embedding dimension {} is below the minimum of {}",
                    hash_dim,
                    hash::MIN_DIM
                ));
            }
            Ok(Box::new(hash::HashEmbedder::new(hash_dim)))
        }
    }
}
