use sentiprof_core::{ConfigError, CoreError};
use thiserror::Error;

use crate::pipeline::PipelineStage;

/// Failures talking to one of the external services.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{service} returned status {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("ticker lookup error: {0}")]
    TickerLookup(String),

    #[error("model response error: {0}")]
    Llm(String),

    #[error("experiment tracking error: {0}")]
    Tracking(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Why a pipeline run did not produce a sentiment record.
///
/// Each variant names the stage that failed. A degraded ticker lookup is not
/// an error and never appears here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("failed to build {service} client: {source}")]
    ClientSetup {
        service: &'static str,
        #[source]
        source: SentimentError,
    },

    #[error("invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    #[error("Failed to fetch news for {company}: {source}")]
    FetchFailure {
        company: String,
        #[source]
        source: SentimentError,
    },

    #[error("No valid news content found for {company}")]
    EmptyCorpus { company: String },

    #[error("Sentiment analysis failed for {company}: {source}")]
    ExtractionFailure {
        company: String,
        #[source]
        source: SentimentError,
    },
}

impl PipelineError {
    /// The stage the pipeline was in when this error stopped it.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Configuration(_) | Self::ClientSetup { .. } | Self::InvalidInput(_) => {
                PipelineStage::Idle
            }
            Self::FetchFailure { .. } => PipelineStage::FetchingNews,
            Self::EmptyCorpus { .. } => PipelineStage::Aggregating,
            Self::ExtractionFailure { .. } => PipelineStage::ExtractingSentiment,
        }
    }
}
