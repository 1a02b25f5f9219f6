use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievement::Achievement;
use crate::movie::MovieRecord;
use crate::share::ShareSettings;

/// The per-user remote document. The durable source of truth; local store
/// state is a cache of the last snapshot of this document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub watchlist: Vec<MovieRecord>,
    #[serde(default)]
    pub watched: Vec<MovieRecord>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub share_settings: ShareSettings,
}

impl UserDocument {
    /// Fresh document for a newly registered user. Display name falls back
    /// to the local part of the email address.
    pub fn new(email: &str) -> Self {
        let display_name = email.split('@').next().unwrap_or(email).to_string();
        Self {
            email: email.to_string(),
            display_name,
            created_at: Utc::now(),
            watchlist: Vec::new(),
            watched: Vec::new(),
            achievements: Vec::new(),
            share_settings: ShareSettings::default(),
        }
    }

    pub fn owner_name(&self) -> &str {
        if self.display_name.is_empty() {
            self.email.split('@').next().unwrap_or(&self.email)
        } else {
            &self.display_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_derives_display_name_from_email() {
        let doc = UserDocument::new("viewer@example.com");
        assert_eq!(doc.display_name, "viewer");
        assert!(doc.watchlist.is_empty());
        assert!(!doc.share_settings.is_public);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let json = r#"{
            "email": "a@b.c",
            "displayName": "a",
            "createdAt": "2026-01-01T00:00:00Z"
        }"#;
        let doc: UserDocument = serde_json::from_str(json).unwrap();
        assert!(doc.watchlist.is_empty());
        assert!(doc.watched.is_empty());
        assert!(doc.achievements.is_empty());
    }
}
