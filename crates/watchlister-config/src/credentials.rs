use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use toml;

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Flat key/value credential file holding the saved identity session.
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn clear(&mut self) {
        self.credentials.clear();
    }

    // Convenience methods for the saved session
    pub fn get_uid(&self) -> Option<&String> {
        self.get("uid")
    }

    pub fn set_uid(&mut self, uid: String) {
        self.set("uid".to_string(), uid);
    }

    pub fn get_email(&self) -> Option<&String> {
        self.get("email")
    }

    pub fn set_email(&mut self, email: String) {
        self.set("email".to_string(), email);
    }

    pub fn get_display_name(&self) -> Option<&String> {
        self.get("display_name")
    }

    pub fn set_display_name(&mut self, name: String) {
        self.set("display_name".to_string(), name);
    }

    pub fn get_id_token(&self) -> Option<&String> {
        self.get("id_token")
    }

    pub fn set_id_token(&mut self, token: String) {
        self.set("id_token".to_string(), token);
    }

    pub fn get_refresh_token(&self) -> Option<&String> {
        self.get("refresh_token")
    }

    pub fn set_refresh_token(&mut self, token: String) {
        self.set("refresh_token".to_string(), token);
    }

    pub fn get_token_expires(&self) -> Option<DateTime<Utc>> {
        self.get("token_expires")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_token_expires(&mut self, expires: DateTime<Utc>) {
        self.set("token_expires".to_string(), expires.to_rfc3339());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn save_and_load_session_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let mut store = CredentialStore::new(path.clone());
        store.set_uid("u1".to_string());
        store.set_id_token("tok".to_string());
        let expires = Utc::now() + Duration::hours(1);
        store.set_token_expires(expires);
        store.save().unwrap();

        let mut loaded = CredentialStore::new(path);
        loaded.load().unwrap();
        assert_eq!(loaded.get_uid().map(String::as_str), Some("u1"));
        assert_eq!(loaded.get_id_token().map(String::as_str), Some("tok"));
        // RFC3339 round-trip keeps sub-second precision.
        assert_eq!(loaded.get_token_expires().unwrap(), expires);
    }

    #[test]
    fn clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.set_uid("u1".to_string());
        store.clear();
        assert!(store.get_uid().is_none());
    }
}
