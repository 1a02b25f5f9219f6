use thiserror::Error;

/// Errors surfaced by the external collaborators (document store, identity
/// provider, metadata provider).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("document not found")]
    NotFound,

    #[error("not authenticated")]
    Unauthenticated,

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl BackendError {
    pub fn other(message: impl Into<String>) -> Self {
        BackendError::Other(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound)
    }
}
