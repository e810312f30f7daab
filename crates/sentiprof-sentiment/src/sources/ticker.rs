//! Ticker lookup against the Yahoo Finance search endpoint.

use reqwest::{Client, Url};
use sentiprof_core::{CompanyQuery, TickerResolution};
use serde::Deserialize;

use crate::error::SentimentError;
use crate::http;

const SEARCH_PATH: &str = "v1/finance/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    symbol: Option<String>,
}

/// Resolves company names to ticker symbols.
///
/// Lookups never fail outright: every problem becomes a
/// [`TickerResolution::Degraded`] so the pipeline can continue.
pub struct TickerResolver {
    client: Client,
    search_url: Url,
}

impl TickerResolver {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`SentimentError::InvalidBaseUrl`] for a malformed base URL.
    pub fn new(base_url: &str, user_agent: &str, timeout_secs: u64) -> Result<Self, SentimentError> {
        let client = http::build_client(timeout_secs, user_agent)?;
        let search_url = http::join(&http::parse_base_url(base_url)?, SEARCH_PATH)?;
        Ok(Self { client, search_url })
    }

    /// Look up the top-ranked symbol for `company`.
    pub async fn resolve(&self, company: &CompanyQuery) -> TickerResolution {
        match self.lookup_symbol(company.as_str()).await {
            Ok(symbol) => {
                let resolution = TickerResolution::from_symbol(company.as_str(), &symbol);
                if resolution.is_degraded() {
                    tracing::warn!(
                        company = %company,
                        symbol = %symbol,
                        "search returned an unusable symbol"
                    );
                } else {
                    tracing::debug!(company = %company, symbol = %symbol, "ticker resolved");
                }
                resolution
            }
            Err(e) => {
                tracing::warn!(company = %company, error = %e, "ticker lookup failed");
                TickerResolution::degraded(company.as_str(), e.to_string())
            }
        }
    }

    fn build_url(&self, company: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", company)
            .append_pair("quotes_count", "1")
            .append_pair("country", "United States");
        url
    }

    async fn lookup_symbol(&self, company: &str) -> Result<String, SentimentError> {
        let url = self.build_url(company);
        let response = self.client.get(url).send().await?;
        let response = http::ensure_success("ticker search", response).await?;
        let body: SearchResponse = http::decode_json(response, "ticker search").await?;

        let quote = body
            .quotes
            .into_iter()
            .next()
            .ok_or_else(|| SentimentError::TickerLookup("no quotes returned".to_string()))?;

        quote
            .symbol
            .ok_or_else(|| SentimentError::TickerLookup("top quote has no symbol".to_string()))
    }
}
