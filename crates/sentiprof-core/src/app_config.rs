/// Azure OpenAI deployment used for structured extraction.
#[derive(Clone)]
pub struct LlmSettings {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub deployment: String,
    pub model: String,
    pub temperature: f32,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("deployment", &self.deployment)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Where pipeline runs are recorded.
///
/// `tracking_uri` of `None` keeps runs in process only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingSettings {
    pub tracking_uri: Option<String>,
    pub experiment_name: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub llm: LlmSettings,
    pub exa_api_key: String,
    pub exa_base_url: String,
    pub ticker_base_url: String,
    pub news_count: usize,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub tracking: TrackingSettings,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("llm", &self.llm)
            .field("exa_api_key", &"[redacted]")
            .field("exa_base_url", &self.exa_base_url)
            .field("ticker_base_url", &self.ticker_base_url)
            .field("news_count", &self.news_count)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("tracking", &self.tracking)
            .finish()
    }
}
