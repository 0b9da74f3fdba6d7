use thiserror::Error;

pub type TrainerResult<T> = std::result::Result<T, TrainerError>;

/// Errors surfaced by the model trainer. Nothing is retried internally; every
/// failure reaches the caller as one of these.
#[derive(Debug, Error)]
pub enum TrainerError {
    /// Dataset, model or remote job missing
    #[error("not found: {0}")]
    NotFound(String),

    /// The training service rejected a job creation request
    #[error("failed to submit job {job_id}: {message}")]
    Submission { job_id: String, message: String },

    /// Any other failed call to the training service
    #[error("training service request failed: {0}")]
    Transport(String),

    /// Blob or entity store read/write failure
    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Team, dataset or model id that cannot be used as a file name
    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TrainerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for TrainerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for TrainerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<std::io::Error> for TrainerError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
