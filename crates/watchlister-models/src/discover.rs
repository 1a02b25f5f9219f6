use serde::{Deserialize, Serialize};

use crate::movie::MovieRecord;

/// Sort key accepted by the discovery endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    PopularityDesc,
    PopularityAsc,
    RatingDesc,
    RatingAsc,
    ReleaseDateDesc,
    ReleaseDateAsc,
}

impl SortKey {
    /// Wire form understood by the metadata provider.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "popularity.desc",
            SortKey::PopularityAsc => "popularity.asc",
            SortKey::RatingDesc => "vote_average.desc",
            SortKey::RatingAsc => "vote_average.asc",
            SortKey::ReleaseDateDesc => "release_date.desc",
            SortKey::ReleaseDateAsc => "release_date.asc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "popularity.desc" | "popular" => Some(SortKey::PopularityDesc),
            "popularity.asc" => Some(SortKey::PopularityAsc),
            "vote_average.desc" | "rating" => Some(SortKey::RatingDesc),
            "vote_average.asc" => Some(SortKey::RatingAsc),
            "release_date.desc" | "newest" => Some(SortKey::ReleaseDateDesc),
            "release_date.asc" | "oldest" => Some(SortKey::ReleaseDateAsc),
            _ => None,
        }
    }
}

/// Filter criteria for a discovery query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoverFilter {
    /// Provider genre ids; empty means no genre restriction.
    #[serde(default)]
    pub genres: Vec<u32>,
    pub min_rating: Option<f64>,
    pub year: Option<u32>,
    #[serde(default)]
    pub sort_by: SortKey,
}

/// One page of provider results, already normalized into records.
#[derive(Debug, Clone)]
pub struct PagedResults {
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<MovieRecord>,
}
