//! Recommendation engine: encode a resume, score it against the catalog and
//! shape the ranked list.

pub mod rank;
pub mod similarity;

use crate::catalog::{loader, Catalog, JobRecord};
use crate::embeddings::Embedder;
use crate::error::{RecommendError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendOptions {
    pub top_k: usize,
    pub similarity_threshold: f32,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl RecommendOptions {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RecommendError::InvalidArgument(
                "top_k must be at least 1".to_string(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(RecommendError::InvalidArgument(format!(
                "similarity_threshold must be in [-1, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

/// How closely a job matches, bucketed for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrength {
    Strong,
    Moderate,
    Weak,
}

impl MatchStrength {
    pub fn from_score(score: f32) -> Self {
        if score >= 0.7 {
            MatchStrength::Strong
        } else if score >= 0.5 {
            MatchStrength::Moderate
        } else {
            MatchStrength::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub job: JobRecord,
    pub similarity: f32,
    pub strength: MatchStrength,
}

/// Catalog plus the encoder that produced its embedding space.
///
/// Immutable once built; `recommend` takes `&self` and may be called from
/// many threads at once.
pub struct Recommender {
    catalog: Catalog,
    encoder: Box<dyn Embedder>,
}

impl fmt::Debug for Recommender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recommender")
            .field("jobs", &self.catalog.len())
            .field("dim", &self.catalog.dim())
            .finish_non_exhaustive()
    }
}

impl Recommender {
    pub fn new(catalog: Catalog, encoder: Box<dyn Embedder>) -> Result<Self> {
        if catalog.dim() != encoder.dim() {
            return Err(RecommendError::ShapeMismatch(format!(
                "catalog embeddings have dimension {} but the encoder produces {}",
                catalog.dim(),
                encoder.dim()
            )));
        }
        Ok(Self { catalog, encoder })
    }

    /// Load catalog and encoder from disk. See [`loader::load`].
    pub fn load(paths: &loader::ArtifactPaths) -> Result<Self> {
        loader::load(paths)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Rank catalog jobs against free-text `query`.
    ///
    /// Empty or whitespace-only queries fail with [`RecommendError::EmptyQuery`].
    /// A query nothing matches returns an empty list, not an error.
    pub fn recommend(&self, query: &str, options: RecommendOptions) -> Result<Vec<Recommendation>> {
        options.validate()?;
        if query.trim().is_empty() {
            return Err(RecommendError::EmptyQuery);
        }

        let vector = self
            .encoder
            .embed_one(query)
            .map_err(|e| RecommendError::Encoding(format!("{e:#}")))?;
        if vector.len() != self.catalog.dim() {
            return Err(RecommendError::Encoding(format!(
                "encoder returned {} values, expected {}",
                vector.len(),
                self.catalog.dim()
            )));
        }

        let results = self.rank_vector(&vector, options)?;
        debug!(
            query_chars = query.chars().count(),
            results = results.len(),
            "Recommendation computed"
        );
        Ok(results)
    }

    /// Rank catalog jobs against an already-encoded query vector.
    pub fn rank_vector(&self, query: &[f32], options: RecommendOptions) -> Result<Vec<Recommendation>> {
        options.validate()?;
        if query.len() != self.catalog.dim() {
            return Err(RecommendError::InvalidArgument(format!(
                "query vector has dimension {}, catalog has {}",
                query.len(),
                self.catalog.dim()
            )));
        }

        let scores = similarity::cosine_similarities(
            self.catalog.embeddings(),
            self.catalog.row_norms().view(),
            ArrayView1::from(query),
        );
        let scores = scores.to_vec();
        let jobs = self.catalog.jobs();

        Ok(
            rank::rank_rows(jobs, &scores, options.top_k, options.similarity_threshold)
                .into_iter()
                .map(|(row, score)| Recommendation {
                    job: jobs[row].clone(),
                    similarity: score,
                    strength: MatchStrength::from_score(score),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::hash::HashEmbedder;
    use anyhow::anyhow;
    use ndarray::{array, Array2};
    use std::sync::atomic::{AtomicBool, Ordering};
    use test_case::test_case;

    /// Encoder that always returns a fixed vector, or always fails.
    struct FixedEncoder {
        vector: Option<Vec<f32>>,
        dim: usize,
    }

    impl Embedder for FixedEncoder {
        fn dim(&self) -> usize {
            self.dim
        }

        fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            match &self.vector {
                Some(v) => Ok(texts.iter().map(|_| v.clone()).collect()),
                None => Err(anyhow!("tokenizer exploded")),
            }
        }
    }

    fn job(title: &str, company: &str, skills: &str) -> JobRecord {
        JobRecord {
            title: title.to_string(),
            company: company.to_string(),
            location: "NYC".to_string(),
            skills: skills.to_string(),
        }
    }

    fn scenario(encoder: FixedEncoder) -> Recommender {
        let catalog = Catalog::new(
            vec![
                job("ML Engineer", "Acme", "python,pytorch"),
                job("ML Engineer", "Acme", "python,pytorch"),
                job("Barista", "Cafe", "coffee"),
            ],
            array![[0.8f32, 0.6], [0.6, 0.8], [0.1, 0.994_987_4]],
        )
        .unwrap();
        Recommender::new(catalog, Box::new(encoder)).unwrap()
    }

    fn unit_x() -> FixedEncoder {
        FixedEncoder {
            vector: Some(vec![1.0, 0.0]),
            dim: 2,
        }
    }

    #[test]
    fn scenario_keeps_only_best_distinct_match() {
        let rec = scenario(unit_x());
        let out = rec.recommend("python pytorch", RecommendOptions::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].job.title, "ML Engineer");
        assert_eq!(out[0].job.company, "Acme");
        assert!((out[0].similarity - 0.8).abs() < 1e-5);
        assert_eq!(out[0].strength, MatchStrength::Strong);
    }

    #[test]
    fn encoder_dimension_must_match_catalog() {
        let catalog = Catalog::new(vec![job("a", "b", "c")], Array2::ones((1, 4))).unwrap();
        let err = Recommender::new(catalog, Box::new(HashEmbedder::new(8)))
            .err()
            .unwrap();
        assert!(matches!(err, RecommendError::ShapeMismatch(_)));
    }

    /// Fails the first call, then behaves like [`unit_x`].
    struct FailOnceEncoder {
        failed: AtomicBool,
    }

    impl Embedder for FailOnceEncoder {
        fn dim(&self) -> usize {
            2
        }

        fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(anyhow!("onnx session busy"));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    #[test]
    fn encoder_failure_is_encoding_error() {
        let rec = scenario(FixedEncoder {
            vector: None,
            dim: 2,
        });
        let err = rec.recommend("anything", RecommendOptions::default()).unwrap_err();
        assert!(matches!(err, RecommendError::Encoding(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn encoder_failure_only_affects_that_request() {
        let catalog = Catalog::new(
            vec![job("ML Engineer", "Acme", "python"), job("Barista", "Cafe", "coffee")],
            array![[0.8f32, 0.6], [0.0, 1.0]],
        )
        .unwrap();
        let rec = Recommender::new(
            catalog,
            Box::new(FailOnceEncoder {
                failed: AtomicBool::new(false),
            }),
        )
        .unwrap();

        let err = rec.recommend("python", RecommendOptions::default()).unwrap_err();
        assert!(matches!(err, RecommendError::Encoding(_)));

        let out = rec.recommend("python", RecommendOptions::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].job.title, "ML Engineer");
        assert!((out[0].similarity - 0.8).abs() < 1e-5);
    }

    #[test]
    fn wrong_length_vector_from_encoder_is_encoding_error() {
        let rec = scenario(FixedEncoder {
            vector: Some(vec![1.0, 0.0, 0.0]),
            dim: 2,
        });
        let err = rec.recommend("anything", RecommendOptions::default()).unwrap_err();
        assert!(matches!(err, RecommendError::Encoding(_)));
    }

    #[test_case("" ; "empty")]
    #[test_case("   \n\t" ; "whitespace")]
    fn blank_queries_are_rejected(query: &str) {
        let rec = scenario(unit_x());
        let err = rec.recommend(query, RecommendOptions::default()).unwrap_err();
        assert!(matches!(err, RecommendError::EmptyQuery));
    }

    #[test_case(0, 0.3 ; "zero top_k")]
    #[test_case(5, 1.5 ; "threshold above one")]
    #[test_case(5, -1.5 ; "threshold below minus one")]
    #[test_case(5, f32::NAN ; "nan threshold")]
    fn bad_options_are_rejected(top_k: usize, similarity_threshold: f32) {
        let rec = scenario(unit_x());
        let options = RecommendOptions {
            top_k,
            similarity_threshold,
        };
        let err = rec.recommend("python", options).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidArgument(_)));
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let rec = scenario(FixedEncoder {
            vector: Some(vec![-1.0, 0.0]),
            dim: 2,
        });
        let out = rec.recommend("knitting", RecommendOptions::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn rank_vector_wrong_length_is_invalid_argument() {
        let rec = scenario(unit_x());
        let err = rec
            .rank_vector(&[1.0, 0.0, 0.0], RecommendOptions::default())
            .unwrap_err();
        assert!(matches!(err, RecommendError::InvalidArgument(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn debug_shows_catalog_shape() {
        let rec = scenario(unit_x());
        assert_eq!(format!("{rec:?}"), "Recommender { jobs: 3, dim: 2, .. }");
    }

    #[test]
    fn lower_threshold_admits_more() {
        let rec = scenario(unit_x());
        let out = rec
            .rank_vector(
                &[1.0, 0.0],
                RecommendOptions {
                    top_k: 5,
                    similarity_threshold: 0.05,
                },
            )
            .unwrap();
        let titles: Vec<_> = out.iter().map(|r| r.job.title.as_str()).collect();
        assert_eq!(titles, vec!["ML Engineer", "Barista"]);
        assert_eq!(out[1].strength, MatchStrength::Weak);
    }

    #[test_case(0.95, MatchStrength::Strong)]
    #[test_case(0.7, MatchStrength::Strong)]
    #[test_case(0.69, MatchStrength::Moderate)]
    #[test_case(0.5, MatchStrength::Moderate)]
    #[test_case(0.49, MatchStrength::Weak)]
    #[test_case(-0.2, MatchStrength::Weak)]
    fn strength_bands(score: f32, expected: MatchStrength) {
        assert_eq!(MatchStrength::from_score(score), expected);
    }

    #[test]
    fn recommendation_serializes_flat() {
        let r = Recommendation {
            job: job("Data Scientist", "Initech", "sql,python"),
            similarity: 0.5,
            strength: MatchStrength::Moderate,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["title"], "Data Scientist");
        assert_eq!(v["skills"], "sql,python");
        assert_eq!(v["similarity"], 0.5);
        assert_eq!(v["strength"], "moderate");
    }

    #[test]
    fn recommender_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Recommender>();
    }
}
