use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use watchlister_backend::DocumentStore;
use watchlister_models::{ShareSettings, SharedWatchlistView, UserSession};

use crate::error::StoreError;

/// A freshly enabled share: the capability token plus the public URL
/// embedding it.
#[derive(Debug, Clone)]
pub struct ShareLink {
    pub share_id: String,
    pub url: String,
}

/// Publishes read-only watchlist snapshots under generated share tokens and
/// maintains the view/copy counters.
pub struct SharingService {
    docs: Arc<dyn DocumentStore>,
    share_base_url: String,
}

impl SharingService {
    pub fn new(docs: Arc<dyn DocumentStore>, share_base_url: String) -> Self {
        Self {
            docs,
            share_base_url: share_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn share_url(&self, share_id: &str) -> String {
        format!("{}/{}", self.share_base_url, share_id)
    }

    /// Enable sharing under a fresh token. The token is the public lookup
    /// key, so a collision with an existing one is a hard failure rather
    /// than a silent overwrite.
    pub async fn enable_sharing(
        &self,
        session: &UserSession,
        title: Option<String>,
        allow_copying: bool,
    ) -> Result<ShareLink, StoreError> {
        let share_id = Uuid::new_v4().to_string();

        let existing = self
            .docs
            .find_by_share_id(&share_id)
            .await
            .map_err(StoreError::read_failed)?;
        if existing.is_some() {
            warn!(operation = "enable_sharing", "share token collision");
            return Err(StoreError::write_failed("share token collision"));
        }

        let settings = ShareSettings {
            is_public: true,
            share_id: Some(share_id.clone()),
            allow_copying,
            share_title: title.or_else(|| Some("My Watchlist".to_string())),
            shared_at: Some(Utc::now()),
            view_count: 0,
            copy_count: 0,
        };
        self.docs
            .set_share_settings(&session.uid, &settings)
            .await
            .map_err(StoreError::write_failed)?;

        info!(operation = "enable_sharing", uid = %session.uid, "sharing enabled");
        Ok(ShareLink {
            url: self.share_url(&share_id),
            share_id,
        })
    }

    /// Disable sharing and invalidate any outstanding URLs.
    pub async fn disable_sharing(&self, session: &UserSession) -> Result<(), StoreError> {
        let settings = ShareSettings {
            is_public: false,
            share_id: None,
            allow_copying: false,
            share_title: None,
            shared_at: None,
            view_count: 0,
            copy_count: 0,
        };
        self.docs
            .set_share_settings(&session.uid, &settings)
            .await
            .map_err(StoreError::write_failed)?;
        info!(operation = "disable_sharing", uid = %session.uid, "sharing disabled");
        Ok(())
    }

    /// Public, unauthenticated lookup. Counts the view and returns the
    /// read-only projection.
    pub async fn resolve_shared(&self, share_id: &str) -> Result<SharedWatchlistView, StoreError> {
        let (uid, doc) = self
            .docs
            .find_by_share_id(share_id)
            .await
            .map_err(StoreError::read_failed)?
            .ok_or_else(|| StoreError::not_found("shared watchlist"))?;

        if !doc.share_settings.is_public {
            return Err(StoreError::not_found("shared watchlist"));
        }

        let view_count = self
            .docs
            .increment_view_count(&uid)
            .await
            .map_err(StoreError::write_failed)?;

        let owner_name = doc.owner_name().to_string();
        Ok(SharedWatchlistView {
            watchlist: doc.watchlist,
            watched: doc.watched,
            share_title: doc.share_settings.share_title,
            owner_name,
            shared_at: doc.share_settings.shared_at,
            allow_copying: doc.share_settings.allow_copying,
            view_count,
            copy_count: doc.share_settings.copy_count,
        })
    }

    /// Copy the shared watchlist into the viewer's list, skipping records
    /// the viewer already has. Returns the number of records copied; the
    /// owner's copy counter moves by exactly that amount, so a no-op copy
    /// never inflates it. Does not count as a view.
    pub async fn copy_shared(
        &self,
        viewer: &UserSession,
        share_id: &str,
    ) -> Result<usize, StoreError> {
        let (owner_uid, source) = self
            .docs
            .find_by_share_id(share_id)
            .await
            .map_err(StoreError::read_failed)?
            .ok_or_else(|| StoreError::not_found("shared watchlist"))?;

        if !source.share_settings.is_public {
            return Err(StoreError::not_found("shared watchlist"));
        }
        if !source.share_settings.allow_copying {
            return Err(StoreError::CopyingDisabled);
        }

        let viewer_doc = self
            .docs
            .ensure_document(&viewer.uid, &viewer.email)
            .await
            .map_err(StoreError::read_failed)?;

        let now = Utc::now();
        let new_records: Vec<_> = source
            .watchlist
            .into_iter()
            .filter(|candidate| {
                !viewer_doc
                    .watchlist
                    .iter()
                    .any(|owned| owned.key() == candidate.key())
            })
            .map(|mut record| {
                record.added_at = Some(now);
                record.copied_from = Some(share_id.to_string());
                record
            })
            .collect();

        if new_records.is_empty() {
            info!(operation = "copy_shared", copied = 0, "nothing new to copy");
            return Ok(0);
        }

        self.docs
            .union_watchlist(&viewer.uid, &new_records)
            .await
            .map_err(StoreError::write_failed)?;
        self.docs
            .increment_copy_count(&owner_uid, new_records.len() as u32)
            .await
            .map_err(StoreError::write_failed)?;

        info!(
            operation = "copy_shared",
            copied = new_records.len(),
            viewer = %viewer.uid,
            "copied shared watchlist"
        );
        Ok(new_records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc;
    use watchlister_backend::{BackendError, MemoryStore};
    use watchlister_models::{
        Achievement, MediaType, MovieKey, MovieRecord, Priority, UserDocument,
    };

    fn record(id: u64, title: &str) -> MovieRecord {
        MovieRecord {
            id,
            media_type: MediaType::Movie,
            title: Some(title.to_string()),
            name: None,
            poster_path: Some("/p.jpg".to_string()),
            release_date: None,
            first_air_date: None,
            vote_average: Some(7.0),
            vote_count: Some(50),
            overview: None,
            priority: Priority::default(),
            added_at: Some(Utc::now()),
            watched_at: None,
            copied_from: None,
        }
    }

    fn session(uid: &str) -> UserSession {
        UserSession {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            display_name: None,
            id_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        }
    }

    async fn seeded_service() -> (Arc<MemoryStore>, SharingService) {
        let docs = Arc::new(MemoryStore::new());
        docs.ensure_document("owner", "owner@example.com")
            .await
            .unwrap();
        docs.union_watchlist("owner", &[record(1, "a"), record(2, "b")])
            .await
            .unwrap();
        let service = SharingService::new(
            docs.clone() as Arc<dyn DocumentStore>,
            "https://watchlister.app/shared".to_string(),
        );
        (docs, service)
    }

    /// Delegates to a real in-memory store but reports every share id as
    /// already taken.
    struct CollidingStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for CollidingStore {
        async fn ensure_document(
            &self,
            uid: &str,
            email: &str,
        ) -> Result<UserDocument, BackendError> {
            self.0.ensure_document(uid, email).await
        }

        async fn get_document(&self, uid: &str) -> Result<Option<UserDocument>, BackendError> {
            self.0.get_document(uid).await
        }

        async fn set_watchlist(
            &self,
            uid: &str,
            items: &[MovieRecord],
        ) -> Result<(), BackendError> {
            self.0.set_watchlist(uid, items).await
        }

        async fn union_watchlist(
            &self,
            uid: &str,
            items: &[MovieRecord],
        ) -> Result<(), BackendError> {
            self.0.union_watchlist(uid, items).await
        }

        async fn remove_from_watchlist(
            &self,
            uid: &str,
            key: MovieKey,
        ) -> Result<(), BackendError> {
            self.0.remove_from_watchlist(uid, key).await
        }

        async fn set_watched(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError> {
            self.0.set_watched(uid, items).await
        }

        async fn union_achievements(
            &self,
            uid: &str,
            achievements: &[Achievement],
        ) -> Result<(), BackendError> {
            self.0.union_achievements(uid, achievements).await
        }

        async fn set_share_settings(
            &self,
            uid: &str,
            settings: &ShareSettings,
        ) -> Result<(), BackendError> {
            self.0.set_share_settings(uid, settings).await
        }

        async fn find_by_share_id(
            &self,
            _share_id: &str,
        ) -> Result<Option<(String, UserDocument)>, BackendError> {
            let doc = self.0.get_document("owner").await?;
            Ok(doc.map(|d| ("owner".to_string(), d)))
        }

        async fn increment_view_count(&self, uid: &str) -> Result<u32, BackendError> {
            self.0.increment_view_count(uid).await
        }

        async fn increment_copy_count(&self, uid: &str, by: u32) -> Result<u32, BackendError> {
            self.0.increment_copy_count(uid, by).await
        }

        async fn watch_document(
            &self,
            uid: &str,
        ) -> Result<mpsc::Receiver<UserDocument>, BackendError> {
            self.0.watch_document(uid).await
        }
    }

    #[tokio::test]
    async fn share_token_collision_is_a_hard_failure() {
        let inner = MemoryStore::new();
        inner
            .ensure_document("owner", "owner@example.com")
            .await
            .unwrap();
        let service = SharingService::new(
            Arc::new(CollidingStore(inner)) as Arc<dyn DocumentStore>,
            "https://watchlister.app/shared".to_string(),
        );

        let err = service
            .enable_sharing(&session("owner"), None, true)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RemoteWriteFailed(_)));
    }

    #[tokio::test]
    async fn enable_then_resolve_counts_one_view() {
        let (_docs, service) = seeded_service().await;
        let link = service
            .enable_sharing(&session("owner"), Some("My List".to_string()), true)
            .await
            .unwrap();
        assert!(link.url.ends_with(&link.share_id));

        let view = service.resolve_shared(&link.share_id).await.unwrap();
        assert_eq!(view.view_count, 1);
        assert_eq!(view.watchlist.len(), 2);
        assert_eq!(view.share_title.as_deref(), Some("My List"));
        assert_eq!(view.owner_name, "owner");
    }

    #[tokio::test]
    async fn resolve_unknown_or_disabled_share_is_not_found() {
        let (_docs, service) = seeded_service().await;
        let err = service.resolve_shared("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let owner = session("owner");
        let link = service.enable_sharing(&owner, None, true).await.unwrap();
        service.disable_sharing(&owner).await.unwrap();
        let err = service.resolve_shared(&link.share_id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn copy_stamps_provenance_and_counts_copied_records() {
        let (docs, service) = seeded_service().await;
        let link = service
            .enable_sharing(&session("owner"), None, true)
            .await
            .unwrap();

        let viewer = session("viewer");
        let copied = service.copy_shared(&viewer, &link.share_id).await.unwrap();
        assert_eq!(copied, 2);

        let viewer_doc = docs.get_document("viewer").await.unwrap().unwrap();
        assert_eq!(viewer_doc.watchlist.len(), 2);
        assert!(viewer_doc
            .watchlist
            .iter()
            .all(|m| m.copied_from.as_deref() == Some(link.share_id.as_str())));

        let owner_doc = docs.get_document("owner").await.unwrap().unwrap();
        assert_eq!(owner_doc.share_settings.copy_count, 2);
        // Copying is not a view.
        assert_eq!(owner_doc.share_settings.view_count, 0);
    }

    #[tokio::test]
    async fn no_op_copy_does_not_inflate_copy_count() {
        let (docs, service) = seeded_service().await;
        let link = service
            .enable_sharing(&session("owner"), None, true)
            .await
            .unwrap();

        let viewer = session("viewer");
        service.copy_shared(&viewer, &link.share_id).await.unwrap();
        let copied = service.copy_shared(&viewer, &link.share_id).await.unwrap();
        assert_eq!(copied, 0);

        let owner_doc = docs.get_document("owner").await.unwrap().unwrap();
        assert_eq!(owner_doc.share_settings.copy_count, 2);
    }

    #[tokio::test]
    async fn copy_respects_allow_copying() {
        let (_docs, service) = seeded_service().await;
        let link = service
            .enable_sharing(&session("owner"), None, false)
            .await
            .unwrap();
        let err = service
            .copy_shared(&session("viewer"), &link.share_id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CopyingDisabled));
    }
}
