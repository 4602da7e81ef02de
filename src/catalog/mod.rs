//! Job catalog: posting metadata plus the row-aligned embedding matrix.

pub mod loader;

use crate::error::{RecommendError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Number of skills presentation layers show per job.
pub const SKILL_PREVIEW_LEN: usize = 5;

/// One job posting. Row `i` of the catalog pairs with embedding row `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Comma-separated skill tokens.
    pub skills: String,
}

impl JobRecord {
    pub fn skill_list(&self) -> Vec<&str> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn skill_preview(&self) -> Vec<&str> {
        let mut skills = self.skill_list();
        skills.truncate(SKILL_PREVIEW_LEN);
        skills
    }
}

/// Immutable N x D catalog. Row counts are checked once at construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    jobs: Vec<JobRecord>,
    embeddings: Array2<f32>,
    row_norms: Array1<f32>,
}

impl Catalog {
    pub fn new(jobs: Vec<JobRecord>, embeddings: Array2<f32>) -> Result<Self> {
        if jobs.len() != embeddings.nrows() {
            return Err(RecommendError::ShapeMismatch(format!(
                "{} job rows but {} embedding rows",
                jobs.len(),
                embeddings.nrows()
            )));
        }

        let row_norms = embeddings.map_axis(Axis(1), |row| row.dot(&row).sqrt());
        let zero_rows = row_norms.iter().filter(|&&n| n == 0.0).count();
        if zero_rows > 0 {
            tracing::warn!(zero_rows, "catalog has zero-norm embeddings; they score 0.0");
        }

        Ok(Self {
            jobs,
            embeddings,
            row_norms,
        })
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Embedding dimension D.
    pub fn dim(&self) -> usize {
        self.embeddings.ncols()
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn embeddings(&self) -> ArrayView2<'_, f32> {
        self.embeddings.view()
    }

    pub(crate) fn row_norms(&self) -> &Array1<f32> {
        &self.row_norms
    }
}
