//! Shared configuration and domain types for the company sentiment profiler.

pub mod app_config;
pub mod company;
pub mod config;
pub mod news;
pub mod record;
pub mod ticker;

use thiserror::Error;

pub use app_config::{AppConfig, LlmSettings, TrackingSettings};
pub use company::CompanyQuery;
pub use config::{load_app_config, load_app_config_from_env};
pub use news::NewsDocument;
pub use record::{Sentiment, SentimentRecord};
pub use ticker::TickerResolution;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("company name must not be empty")]
    EmptyCompanyName,

    #[error("invalid sentiment label: {0}")]
    InvalidSentiment(String),

    #[error("confidence_score must be within [0, 1], got {0}")]
    ConfidenceOutOfRange(f64),
}
