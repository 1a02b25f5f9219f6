use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use watchlister_models::UserDocument;

use crate::error::BackendError;

/// A document read, carrying the server-side revision marker used by the
/// polling watcher to detect changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEnvelope {
    pub update_time: String,
    pub document: UserDocument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub uid: String,
    pub document: UserDocument,
}

/// Partial update against a user document. Field paths are dotted
/// (`shareSettings.viewCount`); `union` appends array elements not already
/// present, `remove_where` deletes array elements whose fields match the
/// given object, `increment` is applied atomically server-side.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub set: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub union: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub remove_where: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub increment: Map<String, Value>,
}

impl UpdateRequest {
    pub fn set(field: &str, value: Value) -> Self {
        let mut req = Self::default();
        req.set.insert(field.to_string(), value);
        req
    }

    pub fn union(field: &str, values: Value) -> Self {
        let mut req = Self::default();
        req.union.insert(field.to_string(), values);
        req
    }

    pub fn remove_where(field: &str, matcher: Value) -> Self {
        let mut req = Self::default();
        req.remove_where.insert(field.to_string(), matcher);
        req
    }

    pub fn increment(field: &str, by: i64) -> Self {
        let mut req = Self::default();
        req.increment.insert(field.to_string(), Value::from(by));
        req
    }
}

fn auth_headers(
    builder: reqwest::RequestBuilder,
    api_key: &str,
    token: Option<&str>,
) -> reqwest::RequestBuilder {
    let builder = builder.header("x-api-key", api_key);
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    match response.status().as_u16() {
        200..=299 => Ok(response),
        404 => Err(BackendError::NotFound),
        401 | 403 => Err(BackendError::Unauthenticated),
        status => Err(BackendError::Status {
            status,
            message: response.text().await.unwrap_or_default(),
        }),
    }
}

pub async fn get_document(
    client: &Client,
    base_url: &str,
    api_key: &str,
    token: Option<&str>,
    uid: &str,
) -> Result<Option<DocumentEnvelope>, BackendError> {
    let url = format!("{base_url}/v1/users/{uid}");
    let response = auth_headers(client.get(&url), api_key, token).send().await?;
    match check(response).await {
        Ok(response) => Ok(Some(response.json().await?)),
        Err(BackendError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn put_document(
    client: &Client,
    base_url: &str,
    api_key: &str,
    token: Option<&str>,
    uid: &str,
    document: &UserDocument,
) -> Result<DocumentEnvelope, BackendError> {
    let url = format!("{base_url}/v1/users/{uid}");
    let response = auth_headers(client.put(&url), api_key, token)
        .json(document)
        .send()
        .await?;
    debug!(operation = "put_document", uid, "created user document");
    Ok(check(response).await?.json().await?)
}

pub async fn update_document(
    client: &Client,
    base_url: &str,
    api_key: &str,
    token: Option<&str>,
    uid: &str,
    update: &UpdateRequest,
) -> Result<DocumentEnvelope, BackendError> {
    let url = format!("{base_url}/v1/users/{uid}:update");
    let response = auth_headers(client.post(&url), api_key, token)
        .json(update)
        .send()
        .await?;
    Ok(check(response).await?.json().await?)
}

/// Public share lookup. Takes no session token; the share id is the
/// capability.
pub async fn lookup_share(
    client: &Client,
    base_url: &str,
    api_key: &str,
    share_id: &str,
) -> Result<Option<LookupResponse>, BackendError> {
    let url = format!(
        "{base_url}/v1/users:lookup?shareId={}",
        urlencoding::encode(share_id)
    );
    let response = client.get(&url).header("x-api-key", api_key).send().await?;
    match check(response).await {
        Ok(response) => Ok(Some(response.json().await?)),
        Err(BackendError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}
