//! Builds a [`Recommender`] from on-disk artifacts.
//!
//! Inputs are three explicit handles resolved by the caller: the job metadata
//! CSV, the `.npy` embedding matrix and the encoder. Nothing here searches
//! directories or fetches files; a missing input is a [`RecommendError`].

use crate::catalog::{Catalog, JobRecord};
use crate::config::{EmbeddingsBackend, EmbeddingsDevice};
use crate::embeddings::{create_embedder, fastembed::missing_model_files, Embedder};
use crate::error::{ArtifactKind, RecommendError, Result};
use crate::recommend::Recommender;
use ndarray::Array2;
use ndarray_npy::read_npy;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Columns the metadata table must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["title", "company", "location", "skills"];

#[derive(Debug, Clone, PartialEq)]
pub enum EncoderArtifact {
    /// Local sentence-transformers ONNX export.
    ModelDir {
        path: PathBuf,
        device: EmbeddingsDevice,
        max_length: usize,
    },
    /// Deterministic hashing encoder; has no files.
    Hash { dim: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub jobs_csv: PathBuf,
    pub embeddings: PathBuf,
    pub encoder: EncoderArtifact,
}

/// Load and validate every artifact, then bind them into a recommender.
///
/// Either all checks pass and a ready engine is returned, or nothing is.
pub fn load(paths: &ArtifactPaths) -> Result<Recommender> {
    let started = Instant::now();

    ensure_present(ArtifactKind::Metadata, &paths.jobs_csv)?;
    ensure_present(ArtifactKind::Embeddings, &paths.embeddings)?;
    if let EncoderArtifact::ModelDir { path, .. } = &paths.encoder {
        ensure_model_dir(path)?;
    }

    let jobs = read_jobs_csv(&paths.jobs_csv)?;
    let embeddings = read_embeddings(&paths.embeddings)?;
    let catalog = Catalog::new(jobs, embeddings)?;
    let encoder = build_encoder(&paths.encoder)?;
    let recommender = Recommender::new(catalog, encoder)?;

    info!(
        jobs = recommender.catalog().len(),
        dim = recommender.catalog().dim(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Job catalog loaded"
    );
    Ok(recommender)
}

/// Read job rows from a CSV with a header row. Extra columns are ignored.
pub fn read_jobs_csv(path: &Path) -> Result<Vec<JobRecord>> {
    let unreadable = |reason: &dyn std::fmt::Display| {
        RecommendError::missing(ArtifactKind::Metadata, path, reason)
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| unreadable(&e))?;
    let headers = reader.headers().map_err(|e| unreadable(&e))?.clone();
    let absent: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !absent.is_empty() {
        return Err(unreadable(&format!(
            "missing required column(s): {}",
            absent.join(", ")
        )));
    }

    reader
        .deserialize::<JobRecord>()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| unreadable(&format!("row {}: {e}", i + 1))))
        .collect()
}

/// Read a 2-D `.npy` matrix. `f64` matrices are narrowed to `f32`.
pub fn read_embeddings(path: &Path) -> Result<Array2<f32>> {
    match read_npy::<_, Array2<f32>>(path) {
        Ok(matrix) => Ok(matrix),
        Err(f32_err) => match read_npy::<_, Array2<f64>>(path) {
            Ok(matrix) => Ok(matrix.mapv(|x| x as f32)),
            Err(_) => Err(RecommendError::missing(
                ArtifactKind::Embeddings,
                path,
                f32_err,
            )),
        },
    }
}

fn build_encoder(artifact: &EncoderArtifact) -> Result<Box<dyn Embedder>> {
    match artifact {
        EncoderArtifact::ModelDir {
            path,
            device,
            max_length,
        } => create_embedder(
            EmbeddingsBackend::FastEmbed,
            Some(path.as_path()),
            *device,
            *max_length,
            0,
        )
        .map_err(|e| RecommendError::missing(ArtifactKind::Encoder, path, format!("{e:#}"))),
        EncoderArtifact::Hash { dim } => create_embedder(
            EmbeddingsBackend::Hash,
            None,
            EmbeddingsDevice::Cpu,
            0,
            *dim,
        )
        .map_err(|e| RecommendError::missing(ArtifactKind::Encoder, "<hash>", format!("{e:#}"))),
    }
}

fn ensure_present(artifact: ArtifactKind, path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(RecommendError::missing(artifact, path, "not a regular file")),
        Err(e) => Err(RecommendError::missing(artifact, path, e)),
    }
}

fn ensure_model_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(RecommendError::missing(
            ArtifactKind::Encoder,
            path,
            "model directory not found",
        ));
    }
    let missing = missing_model_files(path);
    if !missing.is_empty() {
        return Err(RecommendError::missing(
            ArtifactKind::Encoder,
            path,
            format!("missing {}", missing.join(", ")),
        ));
    }
    Ok(())
}
