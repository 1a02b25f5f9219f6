use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use watchlister_models::{
    Achievement, MovieKey, MovieRecord, ShareSettings, UserDocument,
};

use crate::docstore::api::{self, UpdateRequest};
use crate::error::BackendError;
use crate::traits::DocumentStore;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// REST client for the hosted document service.
///
/// The change subscription is a poller keyed on the document's server-side
/// `updateTime`; each detected change delivers a full snapshot, matching the
/// push-feed contract the store expects.
#[derive(Clone)]
pub struct DocStoreClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    token: Arc<RwLock<Option<String>>>,
    poll_interval: Duration,
}

impl DocStoreClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url,
            api_key,
            token: Arc::new(RwLock::new(None)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Attach the session's id token. Calls made before this are
    /// unauthenticated (share lookup only).
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap() = token;
    }

    fn token(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    async fn update(&self, uid: &str, update: UpdateRequest) -> Result<UserDocument, BackendError> {
        let envelope = api::update_document(
            &self.client,
            &self.base_url,
            &self.api_key,
            self.token().as_deref(),
            uid,
            &update,
        )
        .await?;
        Ok(envelope.document)
    }
}

#[async_trait]
impl DocumentStore for DocStoreClient {
    async fn ensure_document(&self, uid: &str, email: &str) -> Result<UserDocument, BackendError> {
        if let Some(envelope) = api::get_document(
            &self.client,
            &self.base_url,
            &self.api_key,
            self.token().as_deref(),
            uid,
        )
        .await?
        {
            return Ok(envelope.document);
        }
        let document = UserDocument::new(email);
        let envelope = api::put_document(
            &self.client,
            &self.base_url,
            &self.api_key,
            self.token().as_deref(),
            uid,
            &document,
        )
        .await?;
        Ok(envelope.document)
    }

    async fn get_document(&self, uid: &str) -> Result<Option<UserDocument>, BackendError> {
        Ok(api::get_document(
            &self.client,
            &self.base_url,
            &self.api_key,
            self.token().as_deref(),
            uid,
        )
        .await?
        .map(|envelope| envelope.document))
    }

    async fn set_watchlist(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError> {
        self.update(uid, UpdateRequest::set("watchlist", serde_json::to_value(items)?))
            .await
            .map(|_| ())
    }

    async fn union_watchlist(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError> {
        self.update(uid, UpdateRequest::union("watchlist", serde_json::to_value(items)?))
            .await
            .map(|_| ())
    }

    async fn remove_from_watchlist(&self, uid: &str, key: MovieKey) -> Result<(), BackendError> {
        let matcher: Value = json!({ "id": key.id, "mediaType": key.media_type });
        self.update(uid, UpdateRequest::remove_where("watchlist", matcher))
            .await
            .map(|_| ())
    }

    async fn set_watched(&self, uid: &str, items: &[MovieRecord]) -> Result<(), BackendError> {
        self.update(uid, UpdateRequest::set("watched", serde_json::to_value(items)?))
            .await
            .map(|_| ())
    }

    async fn union_achievements(
        &self,
        uid: &str,
        achievements: &[Achievement],
    ) -> Result<(), BackendError> {
        self.update(
            uid,
            UpdateRequest::union("achievements", serde_json::to_value(achievements)?),
        )
        .await
        .map(|_| ())
    }

    async fn set_share_settings(
        &self,
        uid: &str,
        settings: &ShareSettings,
    ) -> Result<(), BackendError> {
        self.update(
            uid,
            UpdateRequest::set("shareSettings", serde_json::to_value(settings)?),
        )
        .await
        .map(|_| ())
    }

    async fn find_by_share_id(
        &self,
        share_id: &str,
    ) -> Result<Option<(String, UserDocument)>, BackendError> {
        Ok(
            api::lookup_share(&self.client, &self.base_url, &self.api_key, share_id)
                .await?
                .map(|response| (response.uid, response.document)),
        )
    }

    async fn increment_view_count(&self, uid: &str) -> Result<u32, BackendError> {
        let doc = self
            .update(uid, UpdateRequest::increment("shareSettings.viewCount", 1))
            .await?;
        Ok(doc.share_settings.view_count)
    }

    async fn increment_copy_count(&self, uid: &str, by: u32) -> Result<u32, BackendError> {
        let doc = self
            .update(uid, UpdateRequest::increment("shareSettings.copyCount", by as i64))
            .await?;
        Ok(doc.share_settings.copy_count)
    }

    async fn watch_document(
        &self,
        uid: &str,
    ) -> Result<mpsc::Receiver<UserDocument>, BackendError> {
        let (tx, rx) = mpsc::channel(32);
        let client = Arc::clone(&self.client);
        let base_url = self.base_url.clone();
        let api_key = self.api_key.clone();
        let token = Arc::clone(&self.token);
        let uid = uid.to_string();
        let interval = self.poll_interval;

        tokio::spawn(async move {
            let mut last_update_time: Option<String> = None;
            loop {
                let current_token = token.read().unwrap().clone();
                match api::get_document(&client, &base_url, &api_key, current_token.as_deref(), &uid)
                    .await
                {
                    Ok(Some(envelope)) => {
                        if last_update_time.as_deref() != Some(envelope.update_time.as_str()) {
                            last_update_time = Some(envelope.update_time.clone());
                            if tx.send(envelope.document).await.is_err() {
                                debug!(
                                    operation = "watch_document",
                                    uid, "subscriber dropped, stopping watcher"
                                );
                                break;
                            }
                        }
                    }
                    Ok(None) => {
                        // Document deleted or not yet created; keep polling.
                    }
                    Err(e) => {
                        warn!(
                            operation = "watch_document",
                            uid,
                            status = "error",
                            error = %e,
                            "snapshot poll failed"
                        );
                    }
                }
                tokio::time::sleep(interval).await;
            }
        });

        Ok(rx)
    }
}
