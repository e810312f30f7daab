use crate::app_config::{AppConfig, LlmSettings, TrackingSettings};
use crate::ConfigError;

pub const DEFAULT_TICKER_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_EXA_BASE_URL: &str = "https://api.exa.ai";
pub const DEFAULT_EXPERIMENT_NAME: &str = "company_sentiment_profile";

/// Yahoo's search endpoint rejects non-browser agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    // Blank values count as missing: an empty key in `.env` is a common mistake.
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let endpoint = require("AZURE_OPENAI_ENDPOINT")?;
    let api_key = require("AZURE_OPENAI_API_KEY")?;
    let api_version = require("AZURE_OPENAI_API_VERSION")?;
    let deployment = require("AZURE_OPENAI_DEPLOYMENT_NAME")?;
    let exa_api_key = require("EXA_API_KEY")?;

    let model = optional("MODEL").unwrap_or_else(|| deployment.clone());
    let temperature = parse_temperature(&or_default("SENTIPROF_LLM_TEMPERATURE", "0.2"))?;

    let news_count = parse_usize("SENTIPROF_NEWS_COUNT", "5")?;
    if news_count == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SENTIPROF_NEWS_COUNT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let http_timeout_secs = parse_u64("SENTIPROF_HTTP_TIMEOUT_SECS", "30")?;
    let log_level = or_default("SENTIPROF_LOG_LEVEL", "info");
    let ticker_base_url = or_default("SENTIPROF_TICKER_BASE_URL", DEFAULT_TICKER_BASE_URL);
    let exa_base_url = or_default("SENTIPROF_EXA_BASE_URL", DEFAULT_EXA_BASE_URL);
    let user_agent = or_default("SENTIPROF_USER_AGENT", DEFAULT_USER_AGENT);

    let tracking = TrackingSettings {
        tracking_uri: optional("MLFLOW_TRACKING_URI"),
        experiment_name: or_default("MLFLOW_EXPERIMENT_NAME", DEFAULT_EXPERIMENT_NAME),
    };

    Ok(AppConfig {
        log_level,
        llm: LlmSettings {
            endpoint,
            api_key,
            api_version,
            deployment,
            model,
            temperature,
        },
        exa_api_key,
        exa_base_url,
        ticker_base_url,
        news_count,
        http_timeout_secs,
        user_agent,
        tracking,
    })
}

/// Parse the sampling temperature; Azure accepts `[0, 2]`.
fn parse_temperature(raw: &str) -> Result<f32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "SENTIPROF_LLM_TEMPERATURE".to_string(),
        reason,
    };
    let value = raw.parse::<f32>().map_err(|e| invalid(e.to_string()))?;
    if !(0.0..=2.0).contains(&value) {
        return Err(invalid(format!("{value} is outside [0, 2]")));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
