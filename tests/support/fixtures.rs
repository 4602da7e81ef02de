//! rstest fixtures for integration tests
//!
//! Fixtures build a catalog on disk from [`helpers::sample_jobs`] with the
//! hash encoder (no model files), load it, and wrap it in server state.
//!
//! ```rust
//! #[rstest]
//! fn my_test(recommender: Arc<Recommender>) {
//!     assert_eq!(recommender.catalog().len(), 7);
//! }
//! ```

use super::helpers::{embed_jobs, sample_jobs, write_catalog, TEST_DIM};
use job_recommender::catalog::loader::ArtifactPaths;
use job_recommender::metrics::MetricsRegistry;
use job_recommender::server::AppState;
use job_recommender::{RecommendOptions, Recommender};
use rstest::*;
use std::sync::Arc;
use tempfile::TempDir;

/// Catalog files on disk; the directory lives as long as this value.
pub struct CatalogFiles {
    pub dir: TempDir,
    pub paths: ArtifactPaths,
}

#[fixture]
pub fn tmp_dir() -> TempDir {
    TempDir::new().unwrap()
}

#[fixture]
pub fn catalog_files(tmp_dir: TempDir) -> CatalogFiles {
    let jobs = sample_jobs();
    let embeddings = embed_jobs(&jobs, TEST_DIM);
    let paths = write_catalog(tmp_dir.path(), &jobs, &embeddings);
    CatalogFiles {
        dir: tmp_dir,
        paths,
    }
}

#[fixture]
pub fn recommender(catalog_files: CatalogFiles) -> Arc<Recommender> {
    Arc::new(Recommender::load(&catalog_files.paths).unwrap())
}

#[fixture]
pub fn app_state(recommender: Arc<Recommender>) -> AppState {
    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    AppState::new(recommender, metrics, RecommendOptions::default())
}
