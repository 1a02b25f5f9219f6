use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use watchlister_models::{
    DiscoverFilter, MediaType, MovieRecord, PagedResults, Priority, Video,
};

use crate::error::BackendError;

#[derive(Debug, Deserialize)]
struct ResultPage {
    page: u32,
    total_pages: u32,
    results: Vec<TmdbEntry>,
}

/// Heterogeneous search/discover result entry. Movie results carry
/// `title`/`release_date`, TV results carry `name`/`first_air_date`;
/// multi-search additionally tags each entry with `media_type`.
#[derive(Debug, Deserialize)]
pub struct TmdbEntry {
    pub id: u64,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoPage {
    results: Vec<TmdbVideo>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideo {
    name: String,
    key: String,
    site: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Normalize one provider entry into a record, defaulting the namespace when
/// the endpoint omits `media_type`. Entries from other namespaces (people in
/// multi-search results) are dropped.
pub fn normalize_entry(entry: TmdbEntry, default_type: MediaType) -> Option<MovieRecord> {
    let media_type = match entry.media_type.as_deref() {
        Some("movie") => MediaType::Movie,
        Some("tv") => MediaType::Tv,
        Some(_) => return None,
        None => default_type,
    };

    Some(MovieRecord {
        id: entry.id,
        media_type,
        title: entry.title,
        name: entry.name,
        poster_path: entry.poster_path,
        release_date: entry.release_date,
        first_air_date: entry.first_air_date,
        vote_average: entry.vote_average,
        vote_count: entry.vote_count,
        overview: entry.overview,
        priority: Priority::default(),
        added_at: None,
        watched_at: None,
        copied_from: None,
    })
}

async fn fetch_page(
    client: &Client,
    url: &str,
    default_type: MediaType,
) -> Result<PagedResults, BackendError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(BackendError::Status {
            status: response.status().as_u16(),
            message: response.text().await.unwrap_or_default(),
        });
    }
    let page: ResultPage = response.json().await?;
    debug!(
        operation = "metadata_fetch",
        page = page.page,
        total_pages = page.total_pages,
        results = page.results.len(),
        "fetched result page"
    );
    Ok(PagedResults {
        page: page.page,
        total_pages: page.total_pages,
        results: page
            .results
            .into_iter()
            .filter_map(|entry| normalize_entry(entry, default_type))
            .collect(),
    })
}

pub async fn search_multi(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
    page: u32,
) -> Result<PagedResults, BackendError> {
    let url = format!(
        "{}/search/multi?api_key={}&query={}&page={}",
        base_url,
        api_key,
        urlencoding::encode(query),
        page
    );
    fetch_page(client, &url, MediaType::Movie).await
}

pub async fn discover(
    client: &Client,
    base_url: &str,
    api_key: &str,
    media_type: MediaType,
    filter: &DiscoverFilter,
    page: u32,
) -> Result<PagedResults, BackendError> {
    let mut url = format!(
        "{}/discover/{}?api_key={}&page={}&sort_by={}",
        base_url,
        media_type.as_str(),
        api_key,
        page,
        filter.sort_by.as_query_value()
    );
    if !filter.genres.is_empty() {
        let genres: Vec<String> = filter.genres.iter().map(|g| g.to_string()).collect();
        url.push_str(&format!("&with_genres={}", genres.join(",")));
    }
    if let Some(min_rating) = filter.min_rating {
        url.push_str(&format!("&vote_average.gte={min_rating}"));
    }
    if let Some(year) = filter.year {
        // The movie and TV discovery endpoints name the year filter differently.
        match media_type {
            MediaType::Movie => url.push_str(&format!("&year={year}")),
            MediaType::Tv => url.push_str(&format!("&first_air_date_year={year}")),
        }
    }
    fetch_page(client, &url, media_type).await
}

pub async fn trending(
    client: &Client,
    base_url: &str,
    api_key: &str,
    page: u32,
) -> Result<PagedResults, BackendError> {
    let url = format!("{base_url}/trending/all/week?api_key={api_key}&page={page}");
    fetch_page(client, &url, MediaType::Movie).await
}

pub async fn details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: u64,
    media_type: MediaType,
) -> Result<MovieRecord, BackendError> {
    let url = format!(
        "{}/{}/{}?api_key={}",
        base_url,
        media_type.as_str(),
        id,
        api_key
    );
    let response = client.get(&url).send().await?;
    if response.status().as_u16() == 404 {
        return Err(BackendError::NotFound);
    }
    if !response.status().is_success() {
        return Err(BackendError::Status {
            status: response.status().as_u16(),
            message: response.text().await.unwrap_or_default(),
        });
    }
    let entry: TmdbEntry = response.json().await?;
    normalize_entry(entry, media_type)
        .ok_or_else(|| BackendError::other("detail lookup returned a non-title entry"))
}

pub async fn videos(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: u64,
    media_type: MediaType,
) -> Result<Vec<Video>, BackendError> {
    let url = format!(
        "{}/{}/{}/videos?api_key={}",
        base_url,
        media_type.as_str(),
        id,
        api_key
    );
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(BackendError::Status {
            status: response.status().as_u16(),
            message: response.text().await.unwrap_or_default(),
        });
    }
    let page: VideoPage = response.json().await?;
    Ok(page
        .results
        .into_iter()
        .map(|v| Video {
            name: v.name,
            key: v.key,
            site: v.site,
            kind: v.kind,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> TmdbEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn normalize_uses_tagged_media_type_when_present() {
        let e = entry(r#"{"id": 1396, "media_type": "tv", "name": "Breaking Bad"}"#);
        let record = normalize_entry(e, MediaType::Movie).unwrap();
        assert_eq!(record.media_type, MediaType::Tv);
        assert_eq!(record.display_title(), "Breaking Bad");
    }

    #[test]
    fn normalize_defaults_media_type_when_untagged() {
        let e = entry(r#"{"id": 27205, "title": "Inception"}"#);
        let record = normalize_entry(e, MediaType::Movie).unwrap();
        assert_eq!(record.media_type, MediaType::Movie);
    }

    #[test]
    fn normalize_drops_person_entries() {
        let e = entry(r#"{"id": 500, "media_type": "person", "name": "Tom Cruise"}"#);
        assert!(normalize_entry(e, MediaType::Movie).is_none());
    }
}
