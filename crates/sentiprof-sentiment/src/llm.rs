//! Azure OpenAI chat-completions client.

use reqwest::{Client, Url};
use sentiprof_core::LlmSettings;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::http;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Sends one prompt to a chat deployment and returns the raw reply text.
pub struct ChatClient {
    client: Client,
    completions_url: Url,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`SentimentError::InvalidBaseUrl`] for a malformed endpoint.
    pub fn new(
        settings: &LlmSettings,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        let client = http::build_client(timeout_secs, user_agent)?;
        let base = http::parse_base_url(&settings.endpoint)?;
        let mut completions_url = http::join(
            &base,
            &format!("openai/deployments/{}/chat/completions", settings.deployment),
        )?;
        completions_url
            .query_pairs_mut()
            .append_pair("api-version", &settings.api_version);

        Ok(Self {
            client,
            completions_url,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    /// Request a JSON-only completion for `prompt`.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::Http`] on network failure.
    /// - [`SentimentError::Api`] on a non-2xx status.
    /// - [`SentimentError::Deserialize`] if the envelope is malformed.
    /// - [`SentimentError::Llm`] if the reply carries no content.
    pub async fn complete(&self, prompt: &str) -> Result<String, SentimentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(self.completions_url.clone())
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = http::ensure_success("chat completion", response).await?;
        let body: ChatResponse = http::decode_json(response, "chat completion").await?;

        body.choices
            .into_iter()
            .next()
            .ok_or_else(|| SentimentError::Llm("response contained no choices".to_string()))?
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| SentimentError::Llm("response message was empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(endpoint: &str) -> LlmSettings {
        LlmSettings {
            endpoint: endpoint.to_string(),
            api_key: "k".to_string(),
            api_version: "2024-06-01".to_string(),
            deployment: "gpt-4o-mini".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
        }
    }

    #[test]
    fn completions_url_targets_deployment() {
        let client =
            ChatClient::new(&settings("https://example.openai.azure.com/"), "t", 5).unwrap();
        assert_eq!(
            client.completions_url.as_str(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2024-06-01"
        );
    }

    #[test]
    fn request_asks_for_json_object() {
        let request = ChatRequest {
            model: "m",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.5,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
    }
}
