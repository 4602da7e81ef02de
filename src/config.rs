use crate::catalog::loader::{ArtifactPaths, EncoderArtifact};
use crate::embeddings::hash::MIN_DIM as MIN_HASH_DIM;
use crate::recommend::RecommendOptions;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingsDevice {
    Cpu,
    Metal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingsBackend {
    FastEmbed,
    Hash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub artifacts_dir: PathBuf,
    pub jobs_csv_path: PathBuf,
    pub embeddings_path: PathBuf,
    pub embeddings_backend: EmbeddingsBackend,
    pub embeddings_model_dir: Option<PathBuf>,
    pub embeddings_device: EmbeddingsDevice,
    pub embeddings_max_length: usize,
    pub hash_embedding_dim: usize,
    pub top_k: usize,
    pub similarity_threshold: f32,
    pub serve_addr: SocketAddr,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let artifacts_dir = optional_env("ARTIFACTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./trained_model"));

        let jobs_csv_path = default_path(&artifacts_dir, "JOBS_CSV_PATH", "jobs_embedded.csv");
        let embeddings_path =
            default_path(&artifacts_dir, "JOB_EMBEDDINGS_PATH", "job_embeddings.npy");

        let embeddings_backend = optional_env("EMBEDDINGS_BACKEND")
            .as_deref()
            .map(parse_embeddings_backend)
            .transpose()?
            .unwrap_or(EmbeddingsBackend::FastEmbed);

        let embeddings_model_dir = match embeddings_backend {
            EmbeddingsBackend::FastEmbed => Some(default_path(
                &artifacts_dir,
                "EMBEDDINGS_MODEL_DIR",
                "sbert_job_model",
            )),
            EmbeddingsBackend::Hash => None,
        };

        let embeddings_device = optional_env("EMBEDDINGS_DEVICE")
            .as_deref()
            .map(parse_embeddings_device)
            .transpose()?
            .unwrap_or(EmbeddingsDevice::Cpu);

        let embeddings_max_length = optional_env("EMBEDDINGS_MAX_LENGTH")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(256);

        let hash_embedding_dim = optional_env("HASH_EMBEDDING_DIM")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(384);
        if embeddings_backend == EmbeddingsBackend::Hash && hash_embedding_dim < MIN_HASH_DIM {
            return Err(anyhow!(
                "HASH_EMBEDDING_DIM must be at least {MIN_HASH_DIM}, got {hash_embedding_dim}"
            ));
        }

        let top_k = optional_env("TOP_K")
            .as_deref()
            .map(parse_usize)
            .transpose()?
            .unwrap_or(5);
        if top_k == 0 {
            return Err(anyhow!("TOP_K must be at least 1"));
        }

        let similarity_threshold = optional_env("SIMILARITY_THRESHOLD")
            .as_deref()
            .map(parse_threshold)
            .transpose()?
            .unwrap_or(0.3);

        let serve_addr = optional_env("SERVE_ADDR")
            .as_deref()
            .map(parse_socket_addr)
            .transpose()?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8787)));

        let log_dir = optional_env("LOG_DIR").map(PathBuf::from);

        Ok(Self {
            artifacts_dir,
            jobs_csv_path,
            embeddings_path,
            embeddings_backend,
            embeddings_model_dir,
            embeddings_device,
            embeddings_max_length,
            hash_embedding_dim,
            top_k,
            similarity_threshold,
            serve_addr,
            log_dir,
        })
    }

    /// The three catalog inputs this configuration points at.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        let encoder = match self.embeddings_backend {
            EmbeddingsBackend::FastEmbed => EncoderArtifact::ModelDir {
                path: self
                    .embeddings_model_dir
                    .clone()
                    .unwrap_or_else(|| self.artifacts_dir.join("sbert_job_model")),
                device: self.embeddings_device,
                max_length: self.embeddings_max_length,
            },
            EmbeddingsBackend::Hash => EncoderArtifact::Hash {
                dim: self.hash_embedding_dim,
            },
        };
        ArtifactPaths {
            jobs_csv: self.jobs_csv_path.clone(),
            embeddings: self.embeddings_path.clone(),
            encoder,
        }
    }

    pub fn recommend_options(&self) -> RecommendOptions {
        RecommendOptions {
            top_k: self.top_k,
            similarity_threshold: self.similarity_threshold,
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

fn default_path(artifacts_dir: &Path, key: &str, default_name: &str) -> PathBuf {
    optional_env(key)
        .map(PathBuf::from)
        .unwrap_or_else(|| artifacts_dir.join(default_name))
}

fn parse_embeddings_device(value: &str) -> Result<EmbeddingsDevice> {
    match value.trim().to_lowercase().as_str() {
        "cpu" => Ok(EmbeddingsDevice::Cpu),
        "metal" => Ok(EmbeddingsDevice::Metal),
        other => Err(anyhow!("Invalid EMBEDDINGS_DEVICE: {other}")),
    }
}

fn parse_embeddings_backend(value: &str) -> Result<EmbeddingsBackend> {
    match value.trim().to_lowercase().as_str() {
        "fastembed" => Ok(EmbeddingsBackend::FastEmbed),
        "hash" => Ok(EmbeddingsBackend::Hash),
        other => Err(anyhow!("Invalid EMBEDDINGS_BACKEND: {other}")),
    }
}

fn parse_usize(value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|err| anyhow!("Invalid integer '{value}': {err}"))
}

fn parse_threshold(value: &str) -> Result<f32> {
    let v = value
        .trim()
        .parse::<f32>()
        .map_err(|err| anyhow!("Invalid float '{value}': {err}"))?;

    if !(-1.0..=1.0).contains(&v) {
        return Err(anyhow!("SIMILARITY_THRESHOLD must be in -1..=1"));
    }

    Ok(v)
}

fn parse_socket_addr(value: &str) -> Result<SocketAddr> {
    value
        .trim()
        .parse::<SocketAddr>()
        .map_err(|err| anyhow!("Invalid SERVE_ADDR '{value}': {err}"))
}
