use thiserror::Error;
use watchlister_models::MovieKey;

/// User-facing error taxonomy. All of these are recoverable; the
/// presentation layer surfaces them as transient notifications and the
/// session continues.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("operation requires a signed-in user")]
    Unauthenticated,

    #[error("{0} is already on the watchlist")]
    DuplicateEntry(MovieKey),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("copying is disabled for this shared watchlist")]
    CopyingDisabled,

    #[error("remote write failed: {0}")]
    RemoteWriteFailed(String),

    #[error("remote read failed: {0}")]
    RemoteReadFailed(String),
}

impl StoreError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        StoreError::NotFound(what.to_string())
    }

    pub fn write_failed(e: impl std::fmt::Display) -> Self {
        StoreError::RemoteWriteFailed(e.to_string())
    }

    pub fn read_failed(e: impl std::fmt::Display) -> Self {
        StoreError::RemoteReadFailed(e.to_string())
    }
}
