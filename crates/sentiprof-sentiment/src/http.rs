//! Shared `reqwest` plumbing for the external service clients.

use std::time::Duration;

use reqwest::{Client, Response, Url};

use crate::error::SentimentError;

/// Longest error body kept in [`SentimentError::Api`] messages.
const MAX_ERROR_BODY: usize = 500;

/// Builds a client with the per-request timeout every collaborator uses.
pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, SentimentError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses `base_url`, normalised to end with exactly one slash so that
/// `Url::join` appends to the path instead of replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, SentimentError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| SentimentError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Joins a relative path onto a normalised base URL.
pub(crate) fn join(base: &Url, path: &str) -> Result<Url, SentimentError> {
    base.join(path).map_err(|e| SentimentError::InvalidBaseUrl {
        url: format!("{base}{path}"),
        reason: e.to_string(),
    })
}

/// Passes 2xx responses through; turns anything else into
/// [`SentimentError::Api`] carrying a truncated copy of the body.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: Response,
) -> Result<Response, SentimentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
    Err(SentimentError::Api {
        service,
        status: status.as_u16(),
        message,
    })
}

/// Reads the body as text and decodes it, naming `context` on failure.
pub(crate) async fn decode_json<T>(response: Response, context: &str) -> Result<T, SentimentError>
where
    T: serde::de::DeserializeOwned,
{
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| SentimentError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}
