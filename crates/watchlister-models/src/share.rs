use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::movie::MovieRecord;

/// Per-user sharing state stored on the remote document.
///
/// `share_id` is an opaque capability token; it exists only while sharing
/// is enabled and is the public lookup key for shared watchlists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareSettings {
    pub is_public: bool,
    pub share_id: Option<String>,
    pub allow_copying: bool,
    pub share_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub copy_count: u32,
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            is_public: false,
            share_id: None,
            allow_copying: true,
            share_title: Some("My Watchlist".to_string()),
            shared_at: None,
            view_count: 0,
            copy_count: 0,
        }
    }
}

/// Read-only projection returned when resolving a share token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedWatchlistView {
    pub watchlist: Vec<MovieRecord>,
    pub watched: Vec<MovieRecord>,
    pub share_title: Option<String>,
    pub owner_name: String,
    pub shared_at: Option<DateTime<Utc>>,
    pub allow_copying: bool,
    pub view_count: u32,
    pub copy_count: u32,
}
