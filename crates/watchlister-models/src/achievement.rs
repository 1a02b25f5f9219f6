use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Watchlist-size milestones, ascending. An achievement fires when the
/// watchlist count lands exactly on a threshold after an add.
pub const ACHIEVEMENT_THRESHOLDS: [u32; 4] = [5, 10, 20, 50];

/// A milestone unlock. Appended to the remote document for history, but the
/// unlock check itself runs off the live count, so a threshold can re-fire
/// after the count drops below it and climbs back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub threshold: u32,
    pub unlocked_at: DateTime<Utc>,
}

impl Achievement {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            unlocked_at: Utc::now(),
        }
    }
}
