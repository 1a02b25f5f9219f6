use std::sync::Arc;
use tracing::debug;
use watchlister_backend::MetadataProvider;
use watchlister_models::{DiscoverFilter, MediaType, MovieRecord, PagedResults};

use crate::error::StoreError;

/// What the feed is currently paginating over.
#[derive(Debug, Clone)]
enum FeedMode {
    Trending,
    Search(String),
    Discover(MediaType, DiscoverFilter),
}

/// Read-through adapter over the metadata provider. Accumulates normalized
/// results page by page; never touches the watchlist store (additions flow
/// through the store's own add operation).
pub struct DiscoveryFeed<P> {
    provider: Arc<P>,
    mode: FeedMode,
    page: u32,
    total_pages: u32,
    items: Vec<MovieRecord>,
}

/// A record is only surfaced when the UI can render a card for it.
fn displayable(record: &MovieRecord) -> bool {
    record.poster_path.is_some() && record.vote_average.map(|v| v > 0.0).unwrap_or(false)
}

impl<P: MetadataProvider> DiscoveryFeed<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            mode: FeedMode::Trending,
            page: 0,
            total_pages: 1,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[MovieRecord] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    fn reset(&mut self, mode: FeedMode) {
        self.mode = mode;
        self.page = 0;
        self.total_pages = 1;
        self.items.clear();
    }

    /// Free-text search; resets accumulated results and loads page 1.
    pub async fn search(&mut self, query: &str) -> Result<usize, StoreError> {
        self.reset(FeedMode::Search(query.to_string()));
        self.load_more().await
    }

    /// Filtered discovery; resets accumulated results and loads page 1.
    pub async fn discover(
        &mut self,
        media_type: MediaType,
        filter: DiscoverFilter,
    ) -> Result<usize, StoreError> {
        self.reset(FeedMode::Discover(media_type, filter));
        self.load_more().await
    }

    /// Default trending feed; resets accumulated results and loads page 1.
    pub async fn trending(&mut self) -> Result<usize, StoreError> {
        self.reset(FeedMode::Trending);
        self.load_more().await
    }

    /// Append the next page. Returns the number of records added after
    /// display filtering; 0 once pagination is exhausted.
    pub async fn load_more(&mut self) -> Result<usize, StoreError> {
        if self.page >= self.total_pages {
            debug!(
                operation = "feed_load_more",
                page = self.page,
                total_pages = self.total_pages,
                "pagination exhausted"
            );
            return Ok(0);
        }
        let next = self.page + 1;
        let results = self.fetch(next).await.map_err(StoreError::read_failed)?;
        self.page = results.page;
        self.total_pages = results.total_pages;

        let before = self.items.len();
        self.items
            .extend(results.results.into_iter().filter(displayable));
        Ok(self.items.len() - before)
    }

    async fn fetch(&self, page: u32) -> Result<PagedResults, watchlister_backend::BackendError> {
        match &self.mode {
            FeedMode::Trending => self.provider.trending(page).await,
            FeedMode::Search(query) => self.provider.search(query, page).await,
            FeedMode::Discover(media_type, filter) => {
                self.provider.discover(*media_type, filter, page).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use watchlister_backend::BackendError;
    use watchlister_models::{Priority, Video};

    fn record(id: u64, poster: Option<&str>, vote: Option<f64>) -> MovieRecord {
        MovieRecord {
            id,
            media_type: MediaType::Movie,
            title: Some(format!("m{id}")),
            name: None,
            poster_path: poster.map(str::to_string),
            release_date: None,
            first_air_date: None,
            vote_average: vote,
            vote_count: Some(10),
            overview: None,
            priority: Priority::default(),
            added_at: None,
            watched_at: None,
            copied_from: None,
        }
    }

    /// Canned two-page provider: page 1 mixes displayable and filtered-out
    /// entries, page 2 is clean.
    struct FakeProvider;

    #[async_trait]
    impl MetadataProvider for FakeProvider {
        async fn search(&self, _query: &str, page: u32) -> Result<PagedResults, BackendError> {
            self.trending(page).await
        }

        async fn discover(
            &self,
            _media_type: MediaType,
            _filter: &DiscoverFilter,
            page: u32,
        ) -> Result<PagedResults, BackendError> {
            self.trending(page).await
        }

        async fn trending(&self, page: u32) -> Result<PagedResults, BackendError> {
            let results = match page {
                1 => vec![
                    record(1, Some("/a.jpg"), Some(7.0)),
                    record(2, None, Some(8.0)),      // no poster
                    record(3, Some("/c.jpg"), Some(0.0)), // zero votes
                ],
                2 => vec![record(4, Some("/d.jpg"), Some(6.5))],
                _ => Vec::new(),
            };
            Ok(PagedResults {
                page,
                total_pages: 2,
                results,
            })
        }

        async fn details(
            &self,
            _id: u64,
            _media_type: MediaType,
        ) -> Result<MovieRecord, BackendError> {
            Err(BackendError::NotFound)
        }

        async fn videos(
            &self,
            _id: u64,
            _media_type: MediaType,
        ) -> Result<Vec<Video>, BackendError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn filters_entries_the_ui_cannot_render() {
        let mut feed = DiscoveryFeed::new(Arc::new(FakeProvider));
        let added = feed.trending().await.unwrap();
        assert_eq!(added, 1);
        assert_eq!(feed.items()[0].id, 1);
    }

    #[tokio::test]
    async fn pagination_appends_and_stops_at_total_pages() {
        let mut feed = DiscoveryFeed::new(Arc::new(FakeProvider));
        feed.trending().await.unwrap();
        assert!(feed.has_more());

        let added = feed.load_more().await.unwrap();
        assert_eq!(added, 1);
        let ids: Vec<u64> = feed.items().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 4]);

        assert!(!feed.has_more());
        assert_eq!(feed.load_more().await.unwrap(), 0);
        assert_eq!(feed.items().len(), 2);
    }

    #[tokio::test]
    async fn new_search_resets_accumulated_results() {
        let mut feed = DiscoveryFeed::new(Arc::new(FakeProvider));
        feed.trending().await.unwrap();
        feed.load_more().await.unwrap();
        assert_eq!(feed.items().len(), 2);

        feed.search("inception").await.unwrap();
        assert_eq!(feed.items().len(), 1);
        assert_eq!(feed.page(), 1);
    }
}
