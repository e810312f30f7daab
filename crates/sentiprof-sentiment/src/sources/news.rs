//! Recent-news retrieval through the Exa search API.

use reqwest::{Client, Url};
use sentiprof_core::{CompanyQuery, NewsDocument};
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::http;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    contents: Contents,
}

#[derive(Debug, Serialize)]
struct Contents {
    text: bool,
    highlights: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<NewsDocument>,
}

/// Builds the search phrase sent to the provider.
#[must_use]
pub fn news_query(company: &CompanyQuery) -> String {
    format!("Latest financial news about {company}")
}

/// Fetches recent financial news with full text and highlights.
pub struct NewsFetcher {
    client: Client,
    search_url: Url,
    api_key: String,
}

impl NewsFetcher {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`SentimentError::InvalidBaseUrl`] for a malformed base URL.
    pub fn new(
        base_url: &str,
        api_key: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        let client = http::build_client(timeout_secs, user_agent)?;
        let search_url = http::join(&http::parse_base_url(base_url)?, "search")?;
        Ok(Self {
            client,
            search_url,
            api_key: api_key.to_owned(),
        })
    }

    /// Fetch up to `count` recent articles about `company`.
    ///
    /// A response without a `results` array yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::Http`] on network failure.
    /// - [`SentimentError::Api`] on a non-2xx status.
    /// - [`SentimentError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn fetch(
        &self,
        company: &CompanyQuery,
        count: usize,
    ) -> Result<Vec<NewsDocument>, SentimentError> {
        let query = news_query(company);
        let request = SearchRequest {
            query: &query,
            num_results: count,
            contents: Contents {
                text: true,
                highlights: true,
            },
        };

        let response = self
            .client
            .post(self.search_url.clone())
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = http::ensure_success("news search", response).await?;
        let body: SearchResponse = http::decode_json(response, "news search").await?;

        tracing::debug!(
            company = %company,
            requested = count,
            received = body.results.len(),
            "news search complete"
        );

        let mut results = body.results;
        results.truncate(count);
        Ok(results)
    }
}
