use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use watchlister_config::CredentialStore;
use watchlister_models::UserSession;

use crate::error::BackendError;
use crate::identity::api;
use crate::traits::IdentityProvider;

/// REST client for the identity provider. Sessions are persisted to the
/// credential file so the CLI stays signed in across invocations; tokens
/// within 5 minutes of expiry are refreshed rather than reused.
pub struct IdentityClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    credentials_path: PathBuf,
    session_tx: watch::Sender<Option<UserSession>>,
}

impl IdentityClient {
    pub fn new(base_url: String, api_key: String, credentials_path: PathBuf) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            client: Arc::new(Client::new()),
            base_url,
            api_key,
            credentials_path,
            session_tx,
        }
    }

    /// Restore a saved session from the credential file, refreshing the
    /// token when it has expired or is about to.
    pub async fn restore_session(&self) -> Result<Option<UserSession>, BackendError> {
        let mut creds = CredentialStore::new(self.credentials_path.clone());
        creds
            .load()
            .map_err(|e| BackendError::other(format!("failed to load credentials: {e}")))?;

        let (Some(uid), Some(email)) = (creds.get_uid().cloned(), creds.get_email().cloned())
        else {
            return Ok(None);
        };

        if let (Some(id_token), Some(refresh), Some(expires_at)) = (
            creds.get_id_token().cloned(),
            creds.get_refresh_token().cloned(),
            creds.get_token_expires(),
        ) {
            if expires_at > Utc::now() + Duration::minutes(5) {
                let session = UserSession {
                    uid,
                    email,
                    display_name: creds.get_display_name().cloned(),
                    id_token,
                    refresh_token: refresh,
                    expires_at,
                };
                let _ = self.session_tx.send(Some(session.clone()));
                info!("Using saved session (token expires at {})", expires_at);
                return Ok(Some(session));
            }
            info!("Saved token expired or expiring soon, refreshing");
            let refreshed =
                api::refresh_token(&self.client, &self.base_url, &self.api_key, &refresh).await?;
            let expires_at = Utc::now()
                + Duration::seconds(refreshed.expires_in.parse::<i64>().unwrap_or(3600));
            let session = UserSession {
                uid: refreshed.user_id,
                email,
                display_name: creds.get_display_name().cloned(),
                id_token: refreshed.id_token,
                refresh_token: refreshed.refresh_token,
                expires_at,
            };
            self.save_session(&session)?;
            let _ = self.session_tx.send(Some(session.clone()));
            return Ok(Some(session));
        }

        Ok(None)
    }

    fn save_session(&self, session: &UserSession) -> Result<(), BackendError> {
        let mut creds = CredentialStore::new(self.credentials_path.clone());
        creds
            .load()
            .map_err(|e| BackendError::other(format!("failed to load credentials: {e}")))?;
        creds.set_uid(session.uid.clone());
        creds.set_email(session.email.clone());
        if let Some(name) = &session.display_name {
            creds.set_display_name(name.clone());
        }
        creds.set_id_token(session.id_token.clone());
        creds.set_refresh_token(session.refresh_token.clone());
        creds.set_token_expires(session.expires_at);
        creds
            .save()
            .map_err(|e| BackendError::other(format!("failed to save credentials: {e}")))
    }

    fn session_from_grant(&self, grant: api::SignResponse) -> UserSession {
        let expires_at =
            Utc::now() + Duration::seconds(grant.expires_in.parse::<i64>().unwrap_or(3600));
        UserSession {
            uid: grant.local_id,
            email: grant.email,
            display_name: grant.display_name,
            id_token: grant.id_token,
            refresh_token: grant.refresh_token,
            expires_at,
        }
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserSession, BackendError> {
        let grant =
            api::sign_up(&self.client, &self.base_url, &self.api_key, email, password).await?;
        let session = self.session_from_grant(grant);
        self.save_session(&session)?;
        let _ = self.session_tx.send(Some(session.clone()));
        info!(operation = "sign_up", uid = %session.uid, "account created");
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, BackendError> {
        let grant =
            api::sign_in(&self.client, &self.base_url, &self.api_key, email, password).await?;
        let session = self.session_from_grant(grant);
        self.save_session(&session)?;
        let _ = self.session_tx.send(Some(session.clone()));
        info!(operation = "sign_in", uid = %session.uid, "signed in");
        Ok(session)
    }

    async fn sign_in_with_provider(
        &self,
        provider_id: &str,
        provider_token: &str,
    ) -> Result<UserSession, BackendError> {
        let grant = api::sign_in_with_idp(
            &self.client,
            &self.base_url,
            &self.api_key,
            provider_id,
            provider_token,
        )
        .await?;
        let session = self.session_from_grant(grant);
        self.save_session(&session)?;
        let _ = self.session_tx.send(Some(session.clone()));
        info!(operation = "sign_in_with_provider", uid = %session.uid, provider = provider_id, "signed in");
        Ok(session)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        api::send_password_reset(&self.client, &self.base_url, &self.api_key, email).await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let mut creds = CredentialStore::new(self.credentials_path.clone());
        creds
            .load()
            .map_err(|e| BackendError::other(format!("failed to load credentials: {e}")))?;
        creds.clear();
        creds
            .save()
            .map_err(|e| BackendError::other(format!("failed to save credentials: {e}")))?;
        let _ = self.session_tx.send(None);
        info!(operation = "sign_out", "session cleared");
        Ok(())
    }

    fn current_session(&self) -> Option<UserSession> {
        self.session_tx.borrow().clone()
    }

    fn session_stream(&self) -> watch::Receiver<Option<UserSession>> {
        self.session_tx.subscribe()
    }
}
