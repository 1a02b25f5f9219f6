use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::debug;
use watchlister_models::{
    Achievement, MovieKey, MovieRecord, ShareSettings, UserDocument,
};

use crate::error::BackendError;
use crate::traits::DocumentStore;

/// In-memory document store. Backs tests and offline/demo sessions; mirrors
/// the remote contract including snapshot delivery on every write.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: HashMap<String, UserDocument>,
    watchers: HashMap<String, Vec<mpsc::Sender<UserDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing `ensure_document`.
    pub fn insert_document(&self, uid: &str, doc: UserDocument) {
        let mut inner = self.inner.lock().unwrap();
        inner.documents.insert(uid.to_string(), doc);
        Self::notify(&mut inner, uid);
    }

    fn notify(inner: &mut Inner, uid: &str) {
        let Some(doc) = inner.documents.get(uid).cloned() else {
            return;
        };
        if let Some(senders) = inner.watchers.get_mut(uid) {
            senders.retain(|tx| tx.try_send(doc.clone()).is_ok());
        }
    }

    fn with_document<F, T>(&self, uid: &str, f: F) -> Result<T, BackendError>
    where
        F: FnOnce(&mut UserDocument) -> T,
    {
        let mut inner = self.inner.lock().unwrap();
        let out = {
            let doc = inner
                .documents
                .get_mut(uid)
                .ok_or(BackendError::NotFound)?;
            f(doc)
        };
        Self::notify(&mut inner, uid);
        Ok(out)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_document(&self, uid: &str, email: &str) -> Result<UserDocument, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        let doc = inner
            .documents
            .entry(uid.to_string())
            .or_insert_with(|| UserDocument::new(email))
            .clone();
        Ok(doc)
    }

    async fn get_document(&self, uid: &str) -> Result<Option<UserDocument>, BackendError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.documents.get(uid).cloned())
    }

    async fn set_watchlist(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError> {
        self.with_document(uid, |doc| doc.watchlist = items.to_vec())
    }

    async fn union_watchlist(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError> {
        self.with_document(uid, |doc| {
            for item in items {
                if !doc.watchlist.iter().any(|m| m.key() == item.key()) {
                    doc.watchlist.push(item.clone());
                }
            }
        })
    }

    async fn remove_from_watchlist(&self, uid: &str, key: MovieKey) -> Result<(), BackendError> {
        self.with_document(uid, |doc| doc.watchlist.retain(|m| m.key() != key))
    }

    async fn set_watched(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError> {
        self.with_document(uid, |doc| doc.watched = items.to_vec())
    }

    async fn union_achievements(
        &self,
        uid: &str,
        achievements: &[Achievement],
    ) -> Result<(), BackendError> {
        self.with_document(uid, |doc| {
            for achievement in achievements {
                if !doc.achievements.contains(achievement) {
                    doc.achievements.push(achievement.clone());
                }
            }
        })
    }

    async fn set_share_settings(
        &self,
        uid: &str,
        settings: &ShareSettings,
    ) -> Result<(), BackendError> {
        self.with_document(uid, |doc| doc.share_settings = settings.clone())
    }

    async fn find_by_share_id(
        &self,
        share_id: &str,
    ) -> Result<Option<(String, UserDocument)>, BackendError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .documents
            .iter()
            .find(|(_, doc)| doc.share_settings.share_id.as_deref() == Some(share_id))
            .map(|(uid, doc)| (uid.clone(), doc.clone())))
    }

    async fn increment_view_count(&self, uid: &str) -> Result<u32, BackendError> {
        self.with_document(uid, |doc| {
            doc.share_settings.view_count += 1;
            doc.share_settings.view_count
        })
    }

    async fn increment_copy_count(&self, uid: &str, by: u32) -> Result<u32, BackendError> {
        self.with_document(uid, |doc| {
            doc.share_settings.copy_count += by;
            doc.share_settings.copy_count
        })
    }

    async fn watch_document(
        &self,
        uid: &str,
    ) -> Result<mpsc::Receiver<UserDocument>, BackendError> {
        let (tx, rx) = mpsc::channel(32);
        let mut inner = self.inner.lock().unwrap();
        if let Some(doc) = inner.documents.get(uid).cloned() {
            // Initial snapshot, same as the remote listener contract.
            let _ = tx.try_send(doc);
        }
        inner
            .watchers
            .entry(uid.to_string())
            .or_default()
            .push(tx);
        debug!(operation = "watch_document", uid, "registered in-memory watcher");
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchlister_models::MediaType;

    fn record(id: u64, media_type: MediaType) -> MovieRecord {
        MovieRecord {
            id,
            media_type,
            title: Some(format!("Title {id}")),
            name: None,
            poster_path: Some("/poster.jpg".to_string()),
            release_date: None,
            first_air_date: None,
            vote_average: Some(7.5),
            vote_count: Some(100),
            overview: None,
            priority: Default::default(),
            added_at: None,
            watched_at: None,
            copied_from: None,
        }
    }

    #[tokio::test]
    async fn ensure_document_is_create_if_absent() {
        let store = MemoryStore::new();
        let first = store.ensure_document("u1", "a@b.c").await.unwrap();
        let again = store.ensure_document("u1", "ignored@b.c").await.unwrap();
        assert_eq!(first.email, "a@b.c");
        assert_eq!(again.email, "a@b.c");
    }

    #[tokio::test]
    async fn union_skips_records_already_present() {
        let store = MemoryStore::new();
        store.ensure_document("u1", "a@b.c").await.unwrap();
        let item = record(1, MediaType::Movie);
        store.union_watchlist("u1", &[item.clone()]).await.unwrap();
        store.union_watchlist("u1", &[item]).await.unwrap();
        let doc = store.get_document("u1").await.unwrap().unwrap();
        assert_eq!(doc.watchlist.len(), 1);
    }

    #[tokio::test]
    async fn watcher_receives_snapshot_on_write() {
        let store = MemoryStore::new();
        store.ensure_document("u1", "a@b.c").await.unwrap();
        let mut rx = store.watch_document("u1").await.unwrap();
        // Initial snapshot.
        let initial = rx.recv().await.unwrap();
        assert!(initial.watchlist.is_empty());

        store
            .union_watchlist("u1", &[record(1, MediaType::Movie)])
            .await
            .unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.watchlist.len(), 1);
    }

    #[tokio::test]
    async fn find_by_share_id_matches_settings() {
        let store = MemoryStore::new();
        store.ensure_document("u1", "a@b.c").await.unwrap();
        let settings = ShareSettings {
            is_public: true,
            share_id: Some("token-1".to_string()),
            ..Default::default()
        };
        store.set_share_settings("u1", &settings).await.unwrap();

        let hit = store.find_by_share_id("token-1").await.unwrap();
        assert_eq!(hit.map(|(uid, _)| uid), Some("u1".to_string()));
        assert!(store.find_by_share_id("nope").await.unwrap().is_none());
    }
}
