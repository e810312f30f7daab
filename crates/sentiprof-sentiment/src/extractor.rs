//! Prompted structured extraction of a [`SentimentRecord`].

use sentiprof_core::SentimentRecord;
use serde::Serialize;
use tracing::Instrument;

use crate::error::SentimentError;
use crate::llm::ChatClient;
use crate::prompt;

/// Name under which one extraction call is traced.
pub const CHAIN_NAME: &str = "sentiment_chain";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainMetadata {
    pub stage: &'static str,
    pub company: String,
    pub stock_code: String,
    pub news_length: usize,
}

/// Record of one model call: what was sent, what came back, and why it was
/// rejected if it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainTrace {
    pub run_name: &'static str,
    pub metadata: ChainMetadata,
    pub prompt: String,
    pub response: Option<String>,
    pub error: Option<String>,
}

/// Result of [`SentimentExtractor::extract`]. The trace is present whether
/// or not a record could be produced.
#[derive(Debug)]
pub struct Extraction {
    pub trace: ChainTrace,
    pub result: Result<SentimentRecord, SentimentError>,
}

/// Renders the prompt, calls the model once, and validates its reply.
pub struct SentimentExtractor {
    llm: ChatClient,
}

impl SentimentExtractor {
    #[must_use]
    pub fn new(llm: ChatClient) -> Self {
        Self { llm }
    }

    /// Extract a sentiment record for `company_name` from `news`.
    ///
    /// One model call, no retry and no repair of malformed output. The call
    /// runs inside a `sentiment_chain` span carrying the company, stock code
    /// and corpus length, and the returned [`ChainTrace`] keeps the rendered
    /// prompt and the raw reply for the run's artifacts.
    ///
    /// `result` holds any [`ChatClient::complete`] error, or
    /// [`SentimentError::Deserialize`] if the reply is not a valid record.
    pub async fn extract(
        &self,
        company_name: &str,
        stock_code: &str,
        news: &str,
    ) -> Extraction {
        let metadata = ChainMetadata {
            stage: "sentiment_analysis",
            company: company_name.to_string(),
            stock_code: stock_code.to_string(),
            news_length: news.len(),
        };
        let span = tracing::info_span!(
            "sentiment_chain",
            stage = metadata.stage,
            company = company_name,
            stock_code = stock_code,
            news_length = metadata.news_length,
        );

        async {
            let rendered = prompt::render(company_name, stock_code, news);
            let mut trace = ChainTrace {
                run_name: CHAIN_NAME,
                metadata,
                prompt: rendered,
                response: None,
                error: None,
            };

            let result = match self.llm.complete(&trace.prompt).await {
                Ok(raw) => {
                    tracing::debug!(response_length = raw.len(), "model responded");
                    let parsed = parse_record(&raw);
                    trace.response = Some(raw);
                    parsed
                }
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                tracing::warn!(error = %e, "sentiment extraction rejected");
                trace.error = Some(e.to_string());
            }

            Extraction { trace, result }
        }
        .instrument(span)
        .await
    }
}

/// Parse a raw model reply into a validated record.
///
/// A single surrounding Markdown code fence is tolerated; everything else
/// must be exactly one JSON object matching the record schema.
///
/// # Errors
///
/// Returns [`SentimentError::Deserialize`] on malformed JSON, a missing or
/// mistyped field, an unknown sentiment label, or an out-of-range
/// confidence score.
pub fn parse_record(raw: &str) -> Result<SentimentRecord, SentimentError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| SentimentError::Deserialize {
        context: "sentiment record".to_string(),
        source: e,
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    let inner = inner.trim();
    // Drop the info string (`json`) on the opening fence line, or in front
    // of the object when the whole reply sits on one line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.strip_prefix("json").unwrap_or(inner).trim(),
    }
}
