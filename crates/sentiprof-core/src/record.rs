//! The structured sentiment profile produced by the extraction stage.
//!
//! Field names and their order are an external contract: the prompt asks the
//! model for exactly these keys and downstream consumers read them back.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Overall news sentiment. Parsed case-insensitively, serialized canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(CoreError::InvalidSentiment(s.to_string())),
        }
    }
}

impl TryFrom<String> for Sentiment {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Validated sentiment profile for one company.
///
/// Deserialization enforces every invariant: all keys present and correctly
/// typed, a known sentiment label, and `confidence_score` within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSentimentRecord")]
pub struct SentimentRecord {
    pub company_name: String,
    pub stock_code: String,
    pub newsdesc: String,
    pub sentiment: Sentiment,
    pub people_names: Vec<String>,
    pub places_names: Vec<String>,
    pub other_companies_referred: Vec<String>,
    pub related_industries: Vec<String>,
    pub market_implications: String,
    pub confidence_score: f64,
}

#[derive(Deserialize)]
struct RawSentimentRecord {
    company_name: String,
    stock_code: String,
    newsdesc: String,
    sentiment: Sentiment,
    people_names: Vec<String>,
    places_names: Vec<String>,
    other_companies_referred: Vec<String>,
    related_industries: Vec<String>,
    market_implications: String,
    confidence_score: f64,
}

impl TryFrom<RawSentimentRecord> for SentimentRecord {
    type Error = CoreError;

    fn try_from(raw: RawSentimentRecord) -> Result<Self, Self::Error> {
        if !raw.confidence_score.is_finite() || !(0.0..=1.0).contains(&raw.confidence_score) {
            return Err(CoreError::ConfidenceOutOfRange(raw.confidence_score));
        }
        Ok(Self {
            company_name: raw.company_name,
            stock_code: raw.stock_code,
            newsdesc: raw.newsdesc,
            sentiment: raw.sentiment,
            people_names: raw.people_names,
            places_names: raw.places_names,
            other_companies_referred: raw.other_companies_referred,
            related_industries: raw.related_industries,
            market_implications: raw.market_implications,
            confidence_score: raw.confidence_score,
        })
    }
}
