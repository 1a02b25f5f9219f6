use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use watchlister_models::{DiscoverFilter, MediaType, MovieRecord, PagedResults, Video};

use crate::error::BackendError;
use crate::tmdb::api;
use crate::traits::MetadataProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Read-only client for the metadata provider.
#[derive(Clone)]
pub struct TmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search(&self, query: &str, page: u32) -> Result<PagedResults, BackendError> {
        api::search_multi(&self.client, &self.base_url, &self.api_key, query, page).await
    }

    async fn discover(
        &self,
        media_type: MediaType,
        filter: &DiscoverFilter,
        page: u32,
    ) -> Result<PagedResults, BackendError> {
        api::discover(
            &self.client,
            &self.base_url,
            &self.api_key,
            media_type,
            filter,
            page,
        )
        .await
    }

    async fn trending(&self, page: u32) -> Result<PagedResults, BackendError> {
        api::trending(&self.client, &self.base_url, &self.api_key, page).await
    }

    async fn details(&self, id: u64, media_type: MediaType) -> Result<MovieRecord, BackendError> {
        api::details(&self.client, &self.base_url, &self.api_key, id, media_type).await
    }

    async fn videos(&self, id: u64, media_type: MediaType) -> Result<Vec<Video>, BackendError> {
        api::videos(&self.client, &self.base_url, &self.api_key, id, media_type).await
    }
}
