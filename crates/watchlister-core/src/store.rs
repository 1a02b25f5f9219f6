use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use watchlister_backend::{BackendError, DocumentStore};
use watchlister_models::{
    Achievement, MovieKey, MovieRecord, Priority, ShareSettings, UserDocument, UserSession,
};

use crate::achievements::thresholds_crossed;
use crate::error::StoreError;

/// Result of a store mutation. The store performs no presentation side
/// effects; the caller maps events to notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Added { key: MovieKey, title: String },
    Removed { key: MovieKey, title: String },
    Cleared { removed: usize },
    PriorityChanged { key: MovieKey, priority: Priority },
    MarkedWatched { key: MovieKey, title: String },
    UnmarkedWatched { key: MovieKey, title: String },
    AchievementUnlocked { threshold: u32 },
}

/// Canonical in-memory view of one user's watchlist and watched overlay.
///
/// One live instance per session. Mutations apply to local state before the
/// call returns; the matching remote write is spawned fire-and-forget and a
/// failure only logs (the next snapshot reverts the optimistic change).
/// `apply_snapshot` replaces local state wholesale: the remote document is
/// the arbiter, and a snapshot racing a local optimistic update from another
/// device can overwrite it. That data-loss window is an accepted property of
/// the persistence collaborator, not something the store works around.
pub struct WatchlistStore {
    session: Option<UserSession>,
    docs: Arc<dyn DocumentStore>,
    watchlist: Vec<MovieRecord>,
    watched: Vec<MovieRecord>,
    share_settings: ShareSettings,
    pending: Vec<tokio::task::JoinHandle<()>>,
}

impl WatchlistStore {
    pub fn new(docs: Arc<dyn DocumentStore>, session: Option<UserSession>) -> Self {
        Self {
            session,
            docs,
            watchlist: Vec::new(),
            watched: Vec::new(),
            share_settings: ShareSettings::default(),
            pending: Vec::new(),
        }
    }

    fn spawn_persist<Fut>(&mut self, operation: &'static str, fut: Fut)
    where
        Fut: Future<Output = Result<(), BackendError>> + Send + 'static,
    {
        self.pending.push(tokio::spawn(async move {
            if let Err(e) = fut.await {
                warn!(
                    operation,
                    status = "error",
                    error = %e,
                    "remote persist failed, local state stays optimistic until next snapshot"
                );
            }
        }));
    }

    /// Wait for every spawned persist to finish. Callers never await
    /// individual writes; a short-lived process drains them once before
    /// exit.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            let _ = handle.await;
        }
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    pub fn watchlist(&self) -> &[MovieRecord] {
        &self.watchlist
    }

    pub fn watched(&self) -> &[MovieRecord] {
        &self.watched
    }

    pub fn share_settings(&self) -> &ShareSettings {
        &self.share_settings
    }

    /// Always computed from the list itself, never tracked separately.
    pub fn count(&self) -> usize {
        self.watchlist.len()
    }

    pub fn get(&self, key: MovieKey) -> Option<&MovieRecord> {
        self.watchlist.iter().find(|m| m.key() == key)
    }

    pub fn is_watched(&self, key: MovieKey) -> bool {
        self.watched.iter().any(|m| m.key() == key)
    }

    /// Session-begin hydration from the remote document.
    pub fn hydrate(&mut self, doc: UserDocument) {
        self.apply_snapshot(doc);
        info!(
            operation = "hydrate",
            count = self.count(),
            watched = self.watched.len(),
            "hydrated store from remote document"
        );
    }

    /// Session-end teardown.
    pub fn reset(&mut self) {
        self.watchlist.clear();
        self.watched.clear();
        self.share_settings = ShareSettings::default();
        self.session = None;
    }

    /// Replace local state with an incoming snapshot. Last snapshot wins;
    /// no merge with local optimistic updates.
    pub fn apply_snapshot(&mut self, doc: UserDocument) {
        self.watchlist = doc.watchlist;
        self.watched = doc.watched;
        self.share_settings = doc.share_settings;
        debug!(
            operation = "apply_snapshot",
            count = self.count(),
            "replaced local state with remote snapshot"
        );
    }

    fn require_session(&self) -> Result<&UserSession, StoreError> {
        self.session.as_ref().ok_or(StoreError::Unauthenticated)
    }

    pub fn add_to_watchlist(
        &mut self,
        record: MovieRecord,
        priority: Priority,
    ) -> Result<Vec<StoreEvent>, StoreError> {
        let uid = self.require_session()?.uid.clone();
        let key = record.key();
        if self.watchlist.iter().any(|m| m.key() == key) {
            return Err(StoreError::DuplicateEntry(key));
        }

        let mut record = record;
        record.added_at = Some(Utc::now());
        record.priority = priority;
        let title = record.display_title().to_string();

        let old_count = self.watchlist.len();
        self.watchlist.push(record.clone());
        let new_count = self.watchlist.len();

        let docs = Arc::clone(&self.docs);
        let union_uid = uid.clone();
        self.spawn_persist("union_watchlist", async move {
            docs.union_watchlist(&union_uid, &[record]).await
        });

        let mut events = vec![StoreEvent::Added { key, title }];
        for threshold in thresholds_crossed(old_count, new_count) {
            events.push(StoreEvent::AchievementUnlocked { threshold });
            let docs = Arc::clone(&self.docs);
            let uid = uid.clone();
            self.spawn_persist("union_achievements", async move {
                docs.union_achievements(&uid, &[Achievement::new(threshold)])
                    .await
            });
        }

        info!(operation = "add", %key, count = new_count, "added to watchlist");
        Ok(events)
    }

    /// Idempotent: removing an absent key is a successful no-op, because a
    /// concurrent remote update may already have removed it.
    pub fn remove_from_watchlist(&mut self, key: MovieKey) -> Vec<StoreEvent> {
        let Some(index) = self.watchlist.iter().position(|m| m.key() == key) else {
            debug!(operation = "remove", %key, "key absent, no-op");
            return Vec::new();
        };
        let removed = self.watchlist.remove(index);

        if let Some(uid) = self.session.as_ref().map(|s| s.uid.clone()) {
            let docs = Arc::clone(&self.docs);
            self.spawn_persist("remove_from_watchlist", async move {
                docs.remove_from_watchlist(&uid, key).await
            });
        }

        info!(operation = "remove", %key, count = self.count(), "removed from watchlist");
        vec![StoreEvent::Removed {
            key,
            title: removed.display_title().to_string(),
        }]
    }

    /// Unconditionally empties the watchlist. Confirmation is the
    /// presentation layer's job.
    pub fn clear_watchlist(&mut self) -> Vec<StoreEvent> {
        let removed = self.watchlist.len();
        self.watchlist.clear();

        if let Some(uid) = self.session.as_ref().map(|s| s.uid.clone()) {
            let docs = Arc::clone(&self.docs);
            self.spawn_persist("set_watchlist", async move {
                docs.set_watchlist(&uid, &[]).await
            });
        }

        info!(operation = "clear", removed, "cleared watchlist");
        vec![StoreEvent::Cleared { removed }]
    }

    /// In-place priority edit; `added_at` and list position are untouched so
    /// "date added" ordering stays stable. No-op on an absent key.
    pub fn update_priority(&mut self, key: MovieKey, priority: Priority) -> Vec<StoreEvent> {
        let Some(record) = self.watchlist.iter_mut().find(|m| m.key() == key) else {
            debug!(operation = "update_priority", %key, "key absent, no-op");
            return Vec::new();
        };
        record.priority = priority;

        if let Some(uid) = self.session.as_ref().map(|s| s.uid.clone()) {
            let docs = Arc::clone(&self.docs);
            let items = self.watchlist.clone();
            self.spawn_persist("set_watchlist", async move {
                docs.set_watchlist(&uid, &items).await
            });
        }

        vec![StoreEvent::PriorityChanged { key, priority }]
    }

    /// Toggle watched membership. A record already in the watched overlay is
    /// unmarked even if it has since left the watchlist (the overlay is
    /// independent); marking requires the record to be on the watchlist.
    pub fn toggle_watched(&mut self, key: MovieKey) -> Result<Vec<StoreEvent>, StoreError> {
        let event = if let Some(index) = self.watched.iter().position(|m| m.key() == key) {
            let removed = self.watched.remove(index);
            StoreEvent::UnmarkedWatched {
                key,
                title: removed.display_title().to_string(),
            }
        } else {
            let record = self
                .watchlist
                .iter()
                .find(|m| m.key() == key)
                .ok_or_else(|| StoreError::not_found(key))?;
            let mut watched = record.clone();
            watched.watched_at = Some(Utc::now());
            let title = watched.display_title().to_string();
            self.watched.push(watched);
            StoreEvent::MarkedWatched { key, title }
        };

        if let Some(uid) = self.session.as_ref().map(|s| s.uid.clone()) {
            let docs = Arc::clone(&self.docs);
            let items = self.watched.clone();
            self.spawn_persist("set_watched", async move {
                docs.set_watched(&uid, &items).await
            });
        }

        info!(operation = "toggle_watched", %key, watched = self.watched.len(), "toggled watched");
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use watchlister_backend::MemoryStore;
    use watchlister_models::MediaType;

    fn record(id: u64, media_type: MediaType, title: &str) -> MovieRecord {
        MovieRecord {
            id,
            media_type,
            title: Some(title.to_string()),
            name: None,
            poster_path: Some("/poster.jpg".to_string()),
            release_date: Some("2010-07-16".to_string()),
            first_air_date: None,
            vote_average: Some(8.3),
            vote_count: Some(36000),
            overview: None,
            priority: Priority::default(),
            added_at: None,
            watched_at: None,
            copied_from: None,
        }
    }

    fn session() -> UserSession {
        UserSession {
            uid: "u1".to_string(),
            email: "viewer@example.com".to_string(),
            display_name: None,
            id_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        }
    }

    fn store() -> WatchlistStore {
        WatchlistStore::new(Arc::new(MemoryStore::new()), Some(session()))
    }

    #[tokio::test]
    async fn add_then_duplicate_fails_and_count_holds() {
        let mut store = store();
        let inception = record(27205, MediaType::Movie, "Inception");

        store
            .add_to_watchlist(inception.clone(), Priority::Medium)
            .unwrap();
        assert_eq!(store.watchlist().len(), 1);
        assert_eq!(store.count(), 1);

        let err = store
            .add_to_watchlist(inception, Priority::Medium)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEntry(_)));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn flush_drains_spawned_persists_into_backend() {
        let docs = Arc::new(MemoryStore::new());
        docs.insert_document("u1", UserDocument::new("viewer@example.com"));
        let mut store = WatchlistStore::new(docs.clone(), Some(session()));

        store
            .add_to_watchlist(record(27205, MediaType::Movie, "Inception"), Priority::Medium)
            .unwrap();
        store.flush().await;

        let doc = docs.get_document("u1").await.unwrap().unwrap();
        assert_eq!(doc.watchlist.len(), 1);
        assert_eq!(doc.watchlist[0].id, 27205);
    }

    #[tokio::test]
    async fn add_requires_authentication() {
        let mut store = WatchlistStore::new(Arc::new(MemoryStore::new()), None);
        let err = store
            .add_to_watchlist(record(1, MediaType::Movie, "x"), Priority::High)
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthenticated));
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn add_stamps_added_at_and_priority() {
        let mut store = store();
        store
            .add_to_watchlist(record(1, MediaType::Movie, "x"), Priority::High)
            .unwrap();
        let entry = store.get(MovieKey::new(1, MediaType::Movie)).unwrap();
        assert!(entry.added_at.is_some());
        assert_eq!(entry.priority, Priority::High);
    }

    #[tokio::test]
    async fn same_numeric_id_across_namespaces_coexists() {
        let mut store = store();
        store
            .add_to_watchlist(record(27205, MediaType::Movie, "Inception"), Priority::Medium)
            .unwrap();
        store
            .add_to_watchlist(record(27205, MediaType::Tv, "Some Series"), Priority::Medium)
            .unwrap();
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn removal_is_idempotent_and_tolerates_unknown_ids() {
        let mut store = store();
        store
            .add_to_watchlist(record(1, MediaType::Movie, "x"), Priority::Medium)
            .unwrap();

        let key = MovieKey::new(1, MediaType::Movie);
        let first = store.remove_from_watchlist(key);
        assert_eq!(first.len(), 1);
        let second = store.remove_from_watchlist(key);
        assert!(second.is_empty());
        assert_eq!(store.count(), 0);

        // Never-added id also reports success.
        let events = store.remove_from_watchlist(MovieKey::new(999999, MediaType::Movie));
        assert!(events.is_empty());
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn achievement_fires_exactly_once_on_fifth_add() {
        let mut store = store();
        let mut unlocks = Vec::new();
        for id in 1..=5u64 {
            let events = store
                .add_to_watchlist(record(id, MediaType::Movie, "m"), Priority::Medium)
                .unwrap();
            unlocks.extend(events.into_iter().filter(|e| {
                matches!(e, StoreEvent::AchievementUnlocked { .. })
            }));
        }
        assert_eq!(
            unlocks,
            vec![StoreEvent::AchievementUnlocked { threshold: 5 }]
        );
    }

    #[tokio::test]
    async fn priority_edit_keeps_added_at_and_order() {
        let mut store = store();
        for id in 1..=3u64 {
            store
                .add_to_watchlist(record(id, MediaType::Movie, "m"), Priority::Medium)
                .unwrap();
        }
        let key = MovieKey::new(2, MediaType::Movie);
        let added_at = store.get(key).unwrap().added_at;

        let events = store.update_priority(key, Priority::High);
        assert_eq!(
            events,
            vec![StoreEvent::PriorityChanged {
                key,
                priority: Priority::High
            }]
        );
        let ids: Vec<u64> = store.watchlist().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.get(key).unwrap().added_at, added_at);

        // Absent key is a no-op.
        let events = store.update_priority(MovieKey::new(42, MediaType::Movie), Priority::Low);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn toggle_watched_both_directions() {
        let mut store = store();
        store
            .add_to_watchlist(record(27205, MediaType::Movie, "Inception"), Priority::Medium)
            .unwrap();
        let key = MovieKey::new(27205, MediaType::Movie);

        let events = store.toggle_watched(key).unwrap();
        assert!(matches!(events[0], StoreEvent::MarkedWatched { .. }));
        assert!(store.is_watched(key));
        assert!(store.watched()[0].watched_at.is_some());

        let events = store.toggle_watched(key).unwrap();
        assert!(matches!(events[0], StoreEvent::UnmarkedWatched { .. }));
        assert!(!store.is_watched(key));
    }

    #[tokio::test]
    async fn toggle_watched_unknown_key_is_not_found() {
        let mut store = store();
        let err = store
            .toggle_watched(MovieKey::new(1, MediaType::Movie))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn watched_overlay_survives_watchlist_removal() {
        let mut store = store();
        store
            .add_to_watchlist(record(1, MediaType::Movie, "x"), Priority::Medium)
            .unwrap();
        let key = MovieKey::new(1, MediaType::Movie);
        store.toggle_watched(key).unwrap();

        store.remove_from_watchlist(key);
        assert_eq!(store.count(), 0);
        assert!(store.is_watched(key));

        // And the overlay can still be unmarked afterwards.
        store.toggle_watched(key).unwrap();
        assert!(!store.is_watched(key));
    }

    #[tokio::test]
    async fn clear_empties_watchlist_only() {
        let mut store = store();
        for id in 1..=3u64 {
            store
                .add_to_watchlist(record(id, MediaType::Movie, "m"), Priority::Medium)
                .unwrap();
        }
        store.toggle_watched(MovieKey::new(1, MediaType::Movie)).unwrap();

        let events = store.clear_watchlist();
        assert_eq!(events, vec![StoreEvent::Cleared { removed: 3 }]);
        assert_eq!(store.count(), 0);
        assert_eq!(store.watched().len(), 1);
    }

    #[tokio::test]
    async fn snapshot_replaces_state_wholesale() {
        let mut store = store();
        store
            .add_to_watchlist(record(1, MediaType::Movie, "local"), Priority::Medium)
            .unwrap();

        let mut doc = UserDocument::new("viewer@example.com");
        doc.watchlist = vec![
            record(2, MediaType::Movie, "remote a"),
            record(3, MediaType::Tv, "remote b"),
        ];
        store.apply_snapshot(doc);

        assert_eq!(store.count(), 2);
        assert!(store.get(MovieKey::new(1, MediaType::Movie)).is_none());
    }
}
