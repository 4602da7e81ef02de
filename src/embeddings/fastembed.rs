use crate::config::EmbeddingsDevice;
use crate::embeddings::Embedder;
use anyhow::{anyhow, Context, Result};
use fastembed::{
    InitOptionsUserDefined, Pooling, TextEmbedding, TokenizerFiles, UserDefinedEmbeddingModel,
};
use serde::Deserialize;
use std::path::Path;

// Execution provider imports for Metal acceleration
#[cfg(target_os = "macos")]
use ort::execution_providers::CoreMLExecutionProvider;

/// Files a sentence-transformers ONNX export must contain.
pub const REQUIRED_MODEL_FILES: [&str; 5] = [
    "model.onnx",
    "tokenizer.json",
    "config.json",
    "special_tokens_map.json",
    "tokenizer_config.json",
];

#[derive(Debug, Deserialize)]
struct ModelConfig {
    hidden_size: usize,
}

/// Sentence encoder loaded from a local model directory through FastEmbed.
///
/// Uses mean pooling, which is how sentence-transformers models such as
/// all-MiniLM-L6-v2 produce their sentence vectors.
pub struct FastEmbedder {
    model: TextEmbedding,
    dim: usize,
}

impl FastEmbedder {
    pub fn from_dir(model_dir: &Path, device: EmbeddingsDevice, max_length: usize) -> Result<Self> {
        let missing = missing_model_files(model_dir);
        if !missing.is_empty() {
            return Err(anyhow!(
                "Model directory {} is missing: {}",
                model_dir.display(),
                missing.join(", ")
            ));
        }

        let read = |name: &str| -> Result<Vec<u8>> {
            let path = model_dir.join(name);
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
        };

        let config: ModelConfig = serde_json::from_slice(&read("config.json")?)
            .context("config.json has no usable hidden_size")?;

        let tokenizer_files = TokenizerFiles {
            tokenizer_file: read("tokenizer.json")?,
            config_file: read("config.json")?,
            special_tokens_map_file: read("special_tokens_map.json")?,
            tokenizer_config_file: read("tokenizer_config.json")?,
        };
        let user_model = UserDefinedEmbeddingModel::new(read("model.onnx")?, tokenizer_files)
            .with_pooling(Pooling::Mean);

        let mut options = InitOptionsUserDefined::new().with_max_length(max_length);

        match device {
            EmbeddingsDevice::Metal => {
                #[cfg(target_os = "macos")]
                {
                    tracing::info!("Initializing FastEmbed with Metal (CoreML) acceleration");
                    let coreml = CoreMLExecutionProvider::default();
                    options = options.with_execution_providers(vec![coreml.into()]);
                }
                #[cfg(not(target_os = "macos"))]
                {
                    tracing::warn!("Metal device requested but not on macOS - falling back to CPU");
                }
            }
            EmbeddingsDevice::Cpu => {
                tracing::debug!("Initializing FastEmbed with CPU execution provider");
            }
        }

        let model = TextEmbedding::try_new_from_user_defined(user_model, options)
            .map_err(|e| anyhow!("Failed to initialize FastEmbed: {}", e))?;

        tracing::info!(
            model_dir = %model_dir.display(),
            dim = config.hidden_size,
            "Loaded sentence encoder"
        );

        Ok(Self {
            model,
            dim: config.hidden_size,
        })
    }
}

impl Embedder for FastEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| anyhow!("Embedding failed: {}", e))
    }
}

/// Names of required model files absent from `model_dir`.
pub fn missing_model_files(model_dir: &Path) -> Vec<&'static str> {
    REQUIRED_MODEL_FILES
        .iter()
        .copied()
        .filter(|name| !model_dir.join(name).is_file())
        .collect()
}
