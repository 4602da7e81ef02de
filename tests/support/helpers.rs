//! Helpers that write small job catalogs to disk.
//!
//! Embeddings are produced with the hash encoder, so a query equal to a job's
//! source text (see [`job_text`]) encodes to exactly that job's vector.

use job_recommender::catalog::loader::{ArtifactPaths, EncoderArtifact};
use job_recommender::embeddings::{hash::HashEmbedder, Embedder};
use job_recommender::JobRecord;
use ndarray::Array2;
use std::path::Path;

pub const TEST_DIM: usize = 64;

pub fn job(title: &str, company: &str, location: &str, skills: &str) -> JobRecord {
    JobRecord {
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        skills: skills.to_string(),
    }
}

/// Seven postings; rows 0 and 1 share (title, company) and source text.
pub fn sample_jobs() -> Vec<JobRecord> {
    vec![
        job("ML Engineer", "Acme", "NYC", "python,pytorch,tensorflow,mlops"),
        job("ML Engineer", "Acme", "Boston", "python,pytorch,tensorflow,mlops"),
        job("Data Scientist", "Initech", "Austin", "python,sql,statistics,pandas"),
        job("Frontend Developer", "Globex", "Remote", "javascript,react,css,typescript"),
        job("Barista", "Cafe Luna", "NYC", "coffee,espresso,customer service"),
        job("DevOps Engineer", "Umbrella", "Denver", "docker,kubernetes,terraform,aws"),
        job("NLP Engineer", "Acme", "Seattle", "python,transformers,nlp,pytorch"),
    ]
}

/// Text a job's embedding is computed from.
pub fn job_text(job: &JobRecord) -> String {
    format!("{} {}", job.title, job.skills.replace(',', " "))
}

pub fn embed_jobs(jobs: &[JobRecord], dim: usize) -> Array2<f32> {
    let encoder = HashEmbedder::new(dim);
    let texts: Vec<String> = jobs.iter().map(job_text).collect();
    let rows = encoder.embed(&texts).unwrap();
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((jobs.len(), dim), flat).unwrap()
}

pub fn write_jobs_csv(path: &Path, jobs: &[JobRecord]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    for job in jobs {
        writer.serialize(job).unwrap();
    }
    writer.flush().unwrap();
}

/// Write CSV + `.npy` for `jobs` into `dir` and return hash-encoder paths.
pub fn write_catalog(dir: &Path, jobs: &[JobRecord], embeddings: &Array2<f32>) -> ArtifactPaths {
    let jobs_csv = dir.join("jobs_embedded.csv");
    let embeddings_path = dir.join("job_embeddings.npy");
    write_jobs_csv(&jobs_csv, jobs);
    ndarray_npy::write_npy(&embeddings_path, embeddings).unwrap();
    ArtifactPaths {
        jobs_csv,
        embeddings: embeddings_path,
        encoder: EncoderArtifact::Hash {
            dim: embeddings.ncols(),
        },
    }
}
