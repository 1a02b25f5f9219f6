use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session as issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSession {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl UserSession {
    pub fn owner_name(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.email.split('@').next().unwrap_or(&self.email))
    }
}
