use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use watchlister_models::{
    Achievement, DiscoverFilter, MediaType, MovieKey, MovieRecord, PagedResults, ShareSettings,
    UserDocument, UserSession, Video,
};

use crate::error::BackendError;

/// CRUD operations against the per-user remote document plus the snapshot
/// subscription. The document is the durable source of truth; arrays are
/// written wholesale or via union/remove-by-value, with no field-level
/// locking (concurrent writers can lose updates).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the user's document if absent and return it.
    async fn ensure_document(&self, uid: &str, email: &str) -> Result<UserDocument, BackendError>;

    async fn get_document(&self, uid: &str) -> Result<Option<UserDocument>, BackendError>;

    /// Whole-array replace of the watchlist.
    async fn set_watchlist(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError>;

    /// Union records into the watchlist array.
    async fn union_watchlist(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError>;

    /// Remove the watchlist entry matching `key`, if present.
    async fn remove_from_watchlist(&self, uid: &str, key: MovieKey) -> Result<(), BackendError>;

    /// Whole-array replace of the watched overlay.
    async fn set_watched(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError>;

    async fn union_achievements(
        &self,
        uid: &str,
        achievements: &[Achievement],
    ) -> Result<(), BackendError>;

    async fn set_share_settings(
        &self,
        uid: &str,
        settings: &ShareSettings,
    ) -> Result<(), BackendError>;

    /// Look up the unique document whose share settings carry `share_id`.
    /// Returns the owner uid alongside the document.
    async fn find_by_share_id(
        &self,
        share_id: &str,
    ) -> Result<Option<(String, UserDocument)>, BackendError>;

    /// Atomically bump the share view counter, returning the new value.
    async fn increment_view_count(&self, uid: &str) -> Result<u32, BackendError>;

    /// Atomically bump the share copy counter by `by`, returning the new value.
    async fn increment_copy_count(&self, uid: &str, by: u32) -> Result<u32, BackendError>;

    /// Subscribe to document change snapshots. Every remote change delivers
    /// a full point-in-time copy of the document; the subscription ends when
    /// the receiver is dropped.
    async fn watch_document(
        &self,
        uid: &str,
    ) -> Result<mpsc::Receiver<UserDocument>, BackendError>;
}

/// Session lifecycle against the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserSession, BackendError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, BackendError>;

    /// Exchange an OAuth credential issued by an external provider
    /// (e.g. Google) for a session.
    async fn sign_in_with_provider(
        &self,
        provider_id: &str,
        provider_token: &str,
    ) -> Result<UserSession, BackendError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    fn current_session(&self) -> Option<UserSession>;

    /// Stream of session changes; emits the active session or `None`.
    fn session_stream(&self) -> watch::Receiver<Option<UserSession>>;
}

/// Read-only queries against the metadata provider. Results are paginated;
/// callers must not request past `total_pages`.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search(&self, query: &str, page: u32) -> Result<PagedResults, BackendError>;

    async fn discover(
        &self,
        media_type: MediaType,
        filter: &DiscoverFilter,
        page: u32,
    ) -> Result<PagedResults, BackendError>;

    async fn trending(&self, page: u32) -> Result<PagedResults, BackendError>;

    async fn details(&self, id: u64, media_type: MediaType) -> Result<MovieRecord, BackendError>;

    async fn videos(&self, id: u64, media_type: MediaType) -> Result<Vec<Video>, BackendError>;
}
