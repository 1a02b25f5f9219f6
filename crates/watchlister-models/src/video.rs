use serde::{Deserialize, Serialize};

/// A trailer/teaser entry from the metadata provider. Display-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub name: String,
    /// Provider-specific video key (e.g. a YouTube id).
    pub key: String,
    pub site: String,
    pub kind: String,
}

impl Video {
    pub fn is_trailer(&self) -> bool {
        self.kind.eq_ignore_ascii_case("trailer")
    }

    /// Watchable URL for sites we know how to link to.
    pub fn url(&self) -> Option<String> {
        if self.site.eq_ignore_ascii_case("youtube") {
            Some(format!("https://www.youtube.com/watch?v={}", self.key))
        } else {
            None
        }
    }
}
