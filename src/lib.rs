//! Semantic job recommendations: rank a fixed catalog of job postings against
//! a resume or skill description by embedding similarity.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod recommend;
pub mod server;
pub mod shared;

pub use catalog::{Catalog, JobRecord};
pub use error::{ArtifactKind, RecommendError};
pub use recommend::{MatchStrength, Recommendation, RecommendOptions, Recommender};
