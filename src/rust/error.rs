use std::path::PathBuf;

use crate::classifier::LearnerError;

/// Failures surfaced by the labeling core.
///
/// `NotFound` and `InvalidArgument` are caller mistakes; the rest are server-side.
#[derive(Debug, thiserror::Error)]
pub enum LabelerError {
    #[error("No email with the given ID: {id}")]
    NotFound { id: usize },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Learning error: {0}")]
    Learning(String),
    #[error("Failed to persist {}: {message}", path.display())]
    Persistence { path: PathBuf, message: String },
    #[error("Email {email_id} was not learned after {passes} passes")]
    ConvergenceFailure { email_id: usize, passes: usize },
    #[error("Dataset error: {0}")]
    Dataset(String),
}

impl LabelerError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        LabelerError::Persistence {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether the failure was caused by the request rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidArgument(_))
    }
}

impl From<LearnerError> for LabelerError {
    fn from(err: LearnerError) -> Self {
        LabelerError::Learning(err.to_string())
    }
}

pub type Result<T, E = LabelerError> = std::result::Result<T, E>;
