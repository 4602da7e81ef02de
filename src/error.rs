//! Error taxonomy for catalog loading and recommendation requests.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the three catalog inputs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Metadata,
    Embeddings,
    Encoder,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Metadata => "job metadata",
            ArtifactKind::Embeddings => "job embeddings",
            ArtifactKind::Encoder => "encoder",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RecommendError {
    /// An artifact could not be located, opened or parsed. Fatal at load.
    #[error("{artifact} artifact unavailable at {}: {reason}", path.display())]
    MissingArtifact {
        artifact: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    /// Row or dimension disagreement between metadata, embeddings and encoder.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The encoder failed on a single query. The engine stays usable.
    #[error("failed to encode query: {0}")]
    Encoding(String),

    #[error("query is empty")]
    EmptyQuery,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RecommendError {
    pub(crate) fn missing(
        artifact: ArtifactKind,
        path: impl Into<PathBuf>,
        reason: impl fmt::Display,
    ) -> Self {
        RecommendError::MissingArtifact {
            artifact,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors caused by the request rather than the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RecommendError::EmptyQuery | RecommendError::InvalidArgument(_)
        )
    }
}

pub type Result<T, E = RecommendError> = std::result::Result<T, E>;
