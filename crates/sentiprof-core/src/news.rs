use serde::{Deserialize, Serialize};

/// One article returned by the news search provider.
///
/// Only `text` and `highlights` feed the prompt; the remaining fields are kept
/// for the raw-news artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    /// Article body. May be empty when the provider could not extract it.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub highlights: Vec<String>,
}

impl NewsDocument {
    #[must_use]
    pub fn new(text: impl Into<String>, highlights: Vec<String>) -> Self {
        Self {
            text: text.into(),
            highlights,
            ..Self::default()
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_provider_shape() {
        let doc: NewsDocument = serde_json::from_value(serde_json::json!({
            "title": "Microsoft beats estimates",
            "url": "https://example.com/msft",
            "publishedDate": "2025-01-30T00:00:00.000Z",
            "text": "Revenue grew 16%.",
            "highlights": ["Azure up 31%"]
        }))
        .unwrap();
        assert_eq!(doc.text, "Revenue grew 16%.");
        assert_eq!(doc.highlights, vec!["Azure up 31%".to_string()]);
        assert_eq!(
            doc.published_date.as_deref(),
            Some("2025-01-30T00:00:00.000Z")
        );
    }

    #[test]
    fn null_and_missing_fields_become_empty() {
        let doc: NewsDocument =
            serde_json::from_value(serde_json::json!({ "text": null })).unwrap();
        assert!(doc.text.is_empty());
        assert!(doc.highlights.is_empty());
        assert!(doc.title.is_none());
    }
}
