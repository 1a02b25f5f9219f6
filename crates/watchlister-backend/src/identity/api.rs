use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::BackendError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Token grant from sign-up/sign-in. `expires_in` is seconds, as a string,
/// per the identity service's wire format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub local_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub user_id: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status().as_u16();
    if (200..300).contains(&status) {
        return Ok(response);
    }
    // The identity service wraps failures in an error envelope with a
    // machine-readable message (EMAIL_EXISTS, INVALID_PASSWORD, ...).
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error.message,
        Err(_) => "unknown identity error".to_string(),
    };
    if status == 401 || status == 403 {
        return Err(BackendError::Unauthenticated);
    }
    Err(BackendError::Status { status, message })
}

pub async fn sign_up(
    client: &Client,
    base_url: &str,
    api_key: &str,
    email: &str,
    password: &str,
) -> Result<SignResponse, BackendError> {
    let url = format!("{base_url}/v1/accounts:signUp?key={api_key}");
    let response = client
        .post(&url)
        .json(&SignRequest {
            email,
            password,
            return_secure_token: true,
        })
        .send()
        .await?;
    Ok(check(response).await?.json().await?)
}

pub async fn sign_in(
    client: &Client,
    base_url: &str,
    api_key: &str,
    email: &str,
    password: &str,
) -> Result<SignResponse, BackendError> {
    let url = format!("{base_url}/v1/accounts:signInWithPassword?key={api_key}");
    let response = client
        .post(&url)
        .json(&SignRequest {
            email,
            password,
            return_secure_token: true,
        })
        .send()
        .await?;
    Ok(check(response).await?.json().await?)
}

/// Exchange an OAuth credential from an external provider for a first-party
/// session. The service takes the credential as a form-encoded `postBody`.
pub async fn sign_in_with_idp(
    client: &Client,
    base_url: &str,
    api_key: &str,
    provider_id: &str,
    provider_token: &str,
) -> Result<SignResponse, BackendError> {
    let url = format!("{base_url}/v1/accounts:signInWithIdp?key={api_key}");
    let response = client
        .post(&url)
        .json(&json!({
            "postBody": idp_post_body(provider_id, provider_token),
            "requestUri": "http://localhost",
            "returnSecureToken": true,
        }))
        .send()
        .await?;
    Ok(check(response).await?.json().await?)
}

fn idp_post_body(provider_id: &str, provider_token: &str) -> String {
    format!(
        "id_token={}&providerId={}",
        urlencoding::encode(provider_token),
        provider_id
    )
}

/// Map the short provider names users type to the ids the identity
/// service expects. Unrecognized names pass through untouched so new
/// providers work without a client update.
pub fn provider_id(alias: &str) -> String {
    match alias {
        "google" => "google.com".to_string(),
        "apple" => "apple.com".to_string(),
        other => other.to_string(),
    }
}

pub async fn send_password_reset(
    client: &Client,
    base_url: &str,
    api_key: &str,
    email: &str,
) -> Result<(), BackendError> {
    let url = format!("{base_url}/v1/accounts:sendOobCode?key={api_key}");
    let response = client
        .post(&url)
        .json(&json!({ "requestType": "PASSWORD_RESET", "email": email }))
        .send()
        .await?;
    check(response).await?;
    Ok(())
}

pub async fn refresh_token(
    client: &Client,
    base_url: &str,
    api_key: &str,
    refresh_token: &str,
) -> Result<RefreshResponse, BackendError> {
    let url = format!("{base_url}/v1/token?key={api_key}");
    let response = client
        .post(&url)
        .json(&json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        }))
        .send()
        .await?;
    Ok(check(response).await?.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idp_post_body_escapes_the_credential() {
        let body = idp_post_body("google.com", "ya29.a0+Af/H4=");
        assert_eq!(body, "id_token=ya29.a0%2BAf%2FH4%3D&providerId=google.com");
    }

    #[test]
    fn provider_aliases_map_to_service_ids() {
        assert_eq!(provider_id("google"), "google.com");
        assert_eq!(provider_id("apple"), "apple.com");
        assert_eq!(provider_id("github.com"), "github.com");
    }
}
