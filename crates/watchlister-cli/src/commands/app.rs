use chrono::{Duration as ChronoDuration, Utc};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use watchlister_backend::{
    DocStoreClient, DocumentStore, IdentityClient, MemoryStore, TmdbClient,
};
use watchlister_config::{Config, PathManager};
use watchlister_core::{SharingService, WatchlistStore};
use watchlister_models::UserSession;

use crate::output::Output;

/// Shared command context: config, paths, and the backend clients. Built
/// once per invocation. With `--offline` the document store is an
/// in-process one and a local session is synthesized, so list commands
/// work without any backend configured.
pub struct App {
    pub config: Config,
    pub paths: PathManager,
    identity: Option<IdentityClient>,
    docstore: Option<Arc<DocStoreClient>>,
    docs: Arc<dyn DocumentStore>,
    offline: bool,
}

impl App {
    pub fn init(offline: bool) -> Result<Self> {
        let paths = PathManager::new().map_err(|e| eyre!("Failed to resolve app paths: {}", e))?;
        paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create app directories: {}", e))?;
        let config = Config::load(&paths.config_file())
            .map_err(|e| eyre!("Failed to load config: {}", e))?;

        let (identity, docstore, docs): (
            Option<IdentityClient>,
            Option<Arc<DocStoreClient>>,
            Arc<dyn DocumentStore>,
        ) = if offline {
            debug!("running against the in-process store");
            (None, None, Arc::new(MemoryStore::new()))
        } else if let Some(backend) = &config.backend {
            debug!(docstore = %backend.docstore_url, "using configured backend");
            let identity = IdentityClient::new(
                backend.identity_url.clone(),
                backend.api_key.clone(),
                paths.credentials_file(),
            );
            let docstore = Arc::new(
                DocStoreClient::new(backend.docstore_url.clone(), backend.api_key.clone())
                    .with_poll_interval(Duration::from_secs(backend.poll_interval_secs)),
            );
            (Some(identity), Some(docstore.clone()), docstore)
        } else {
            // No backend configured yet; metadata-only commands still work.
            (None, None, Arc::new(MemoryStore::new()))
        };

        Ok(Self {
            config,
            paths,
            identity,
            docstore,
            docs,
            offline,
        })
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn docs(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.docs)
    }

    pub fn identity(&self) -> Result<&IdentityClient> {
        self.identity.as_ref().ok_or_else(|| {
            eyre!("No backend configured. Run `watchlister config set-backend` first")
        })
    }

    pub fn metadata(&self) -> Result<TmdbClient> {
        let tmdb = self.config.tmdb.as_ref().ok_or_else(|| {
            eyre!("No metadata provider configured. Run `watchlister config set-tmdb` first")
        })?;
        Ok(TmdbClient::with_base_url(
            tmdb.api_key.clone(),
            tmdb.base_url.clone(),
        ))
    }

    pub fn sharing(&self) -> SharingService {
        SharingService::new(Arc::clone(&self.docs), self.config.share.base_url.clone())
    }

    /// Resolve the active session. Offline mode gets a synthetic local
    /// user; otherwise the saved session is restored (and refreshed when
    /// near expiry) and the document store picks up its token.
    pub async fn session(&self) -> Result<UserSession> {
        if self.offline {
            return Ok(offline_session());
        }
        let identity = self.identity()?;
        let session = identity
            .restore_session()
            .await
            .map_err(|e| eyre!("Failed to restore session: {}", e))?
            .ok_or_else(|| eyre!("Not signed in. Run `watchlister auth login` first"))?;
        if let Some(docstore) = &self.docstore {
            docstore.set_token(Some(session.id_token.clone()));
        }
        Ok(session)
    }

    /// Build a store hydrated from the user's remote document. A read
    /// failure degrades to an empty store with a warning instead of
    /// aborting, so local commands still run through the same path.
    pub async fn hydrated_store(&self, output: &Output) -> Result<WatchlistStore> {
        let session = self.session().await?;
        let mut store = WatchlistStore::new(self.docs(), Some(session.clone()));
        match self.docs.ensure_document(&session.uid, &session.email).await {
            Ok(doc) => {
                store.hydrate(doc);
                debug!(
                    uid = %session.uid,
                    count = store.count(),
                    "hydrated store from remote document"
                );
            }
            Err(e) => {
                warn!(uid = %session.uid, error = %e, "hydration failed");
                output.warn(format!(
                    "Could not load your watchlist from the server ({}); starting empty",
                    e
                ));
            }
        }
        Ok(store)
    }
}

fn offline_session() -> UserSession {
    UserSession {
        uid: "offline".to_string(),
        email: "offline@localhost".to_string(),
        display_name: Some("offline".to_string()),
        id_token: String::new(),
        refresh_token: String::new(),
        expires_at: Utc::now() + ChronoDuration::hours(24),
    }
}
