use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Namespace of a metadata-provider id. The provider reuses numeric ids
/// across movies and TV series, so logical identity is `(id, media_type)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-assigned priority on a watchlist entry. Mutable after add.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Sort rank, high first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite identity of a title within the user's lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MovieKey {
    pub id: u64,
    pub media_type: MediaType,
}

impl MovieKey {
    pub fn new(id: u64, media_type: MediaType) -> Self {
        Self { id, media_type }
    }
}

impl std::fmt::Display for MovieKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.media_type, self.id)
    }
}

/// Denormalized snapshot of one title as stored in a user's list.
///
/// Movies populate `title`/`release_date`, TV series populate
/// `name`/`first_air_date`; `display_title` falls back across both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub id: u64,
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    /// Stamped by the store when the record enters the watchlist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
    /// Stamped by the store when the record enters the watched overlay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<DateTime<Utc>>,
    /// Share token this record was copied from, if it arrived via a
    /// watchlist copy rather than a direct add.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copied_from: Option<String>,
}

impl MovieRecord {
    pub fn key(&self) -> MovieKey {
        MovieKey::new(self.id, self.media_type)
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("(untitled)")
    }

    /// Release or first-air date, whichever the namespace uses.
    pub fn date(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_defaults_to_medium_when_absent() {
        let json = r#"{"id": 27205, "mediaType": "movie", "title": "Inception"}"#;
        let record: MovieRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.priority, Priority::Medium);
        assert_eq!(record.media_type, MediaType::Movie);
    }

    #[test]
    fn display_title_falls_back_to_tv_name() {
        let json = r#"{"id": 1396, "mediaType": "tv", "name": "Breaking Bad"}"#;
        let record: MovieRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.display_title(), "Breaking Bad");
    }

    #[test]
    fn keys_differ_across_media_type_namespaces() {
        let movie = MovieKey::new(27205, MediaType::Movie);
        let tv = MovieKey::new(27205, MediaType::Tv);
        assert_ne!(movie, tv);
    }
}
