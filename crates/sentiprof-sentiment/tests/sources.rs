//! Integration tests for the ticker, news and chat clients using wiremock.

use sentiprof_core::{CompanyQuery, LlmSettings, TickerResolution};
use sentiprof_sentiment::{ChatClient, NewsFetcher, SentimentError, TickerResolver};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn company(name: &str) -> CompanyQuery {
    CompanyQuery::parse(name).expect("valid company name")
}

fn resolver(base_url: &str) -> TickerResolver {
    TickerResolver::new(base_url, "sentiprof-test/0.1", 5).expect("resolver should build")
}

fn fetcher(base_url: &str) -> NewsFetcher {
    NewsFetcher::new(base_url, "exa-test-key", "sentiprof-test/0.1", 5)
        .expect("fetcher should build")
}

fn chat_client(base_url: &str) -> ChatClient {
    let settings = LlmSettings {
        endpoint: base_url.to_string(),
        api_key: "azure-test-key".to_string(),
        api_version: "2024-06-01".to_string(),
        deployment: "gpt-test".to_string(),
        model: "gpt-test".to_string(),
        temperature: 0.2,
    };
    ChatClient::new(&settings, "sentiprof-test/0.1", 5).expect("chat client should build")
}

fn is_token(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.len() <= 10 && symbol.chars().all(|c| c.is_ascii_alphanumeric())
}

// ---------------------------------------------------------------------------
// Ticker resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ticker_resolves_top_quote() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/finance/search"))
        .and(query_param("q", "Microsoft"))
        .and(query_param("quotes_count", "1"))
        .and(query_param("country", "United States"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quotes": [
                { "symbol": "MSFT", "shortname": "Microsoft Corporation" },
                { "symbol": "MSF.BR" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolution = resolver(&server.uri()).resolve(&company("Microsoft")).await;

    assert_eq!(resolution, TickerResolution::Resolved("MSFT".to_string()));
    assert!(is_token(&resolution.to_string()));
}

#[tokio::test]
async fn ticker_empty_quotes_degrades() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/finance/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "quotes": [] })))
        .mount(&server)
        .await;

    let resolution = resolver(&server.uri())
        .resolve(&company("Xyzzy Nonexistent Corp"))
        .await;

    assert!(resolution.is_degraded());
    assert!(resolution
        .to_string()
        .starts_with("ERROR: Could not fetch ticker for 'Xyzzy Nonexistent Corp'"));
}

#[tokio::test]
async fn ticker_server_error_degrades() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;

    let resolution = resolver(&server.uri()).resolve(&company("Acme")).await;

    let rendered = resolution.to_string();
    assert!(rendered.starts_with("ERROR: Could not fetch ticker for 'Acme'"), "{rendered}");
    assert!(rendered.contains("503"), "{rendered}");
}

#[tokio::test]
async fn ticker_missing_symbol_degrades() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quotes": [{ "shortname": "No Symbol Inc" }]
        })))
        .mount(&server)
        .await;

    let resolution = resolver(&server.uri()).resolve(&company("No Symbol")).await;
    assert!(resolution.is_degraded());
}

#[tokio::test]
async fn ticker_non_json_body_degrades() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let resolution = resolver(&server.uri()).resolve(&company("Acme")).await;
    assert!(resolution.is_degraded());
}

#[tokio::test]
async fn ticker_unreachable_host_degrades() {
    // Port 9 (discard) is not served by anything in the test environment.
    let resolution = resolver("http://127.0.0.1:9").resolve(&company("Acme")).await;
    assert!(resolution.is_degraded());
}

// ---------------------------------------------------------------------------
// News retrieval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn news_fetch_sends_query_and_parses_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("x-api-key", "exa-test-key"))
        .and(body_partial_json(json!({
            "query": "Latest financial news about Microsoft",
            "numResults": 5,
            "contents": { "text": true, "highlights": true }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "title": "Microsoft earnings",
                    "url": "https://example.com/1",
                    "text": "Revenue rose.",
                    "highlights": ["Azure +31%"]
                },
                { "url": "https://example.com/2", "text": null, "highlights": null }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let documents = fetcher(&server.uri())
        .fetch(&company("Microsoft"), 5)
        .await
        .expect("fetch should succeed");

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].text, "Revenue rose.");
    assert_eq!(documents[0].highlights, vec!["Azure +31%".to_string()]);
    assert!(documents[1].text.is_empty());
}

#[tokio::test]
async fn news_fetch_missing_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "requestId": "abc" })))
        .mount(&server)
        .await;

    let documents = fetcher(&server.uri())
        .fetch(&company("Acme"), 5)
        .await
        .expect("fetch should succeed");
    assert!(documents.is_empty());
}

#[tokio::test]
async fn news_fetch_caps_results_at_count() {
    let server = MockServer::start().await;

    let results: Vec<_> = (0..8)
        .map(|i| json!({ "text": format!("Article {i}"), "highlights": [] }))
        .collect();
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
        .mount(&server)
        .await;

    let documents = fetcher(&server.uri())
        .fetch(&company("Acme"), 3)
        .await
        .expect("fetch should succeed");
    assert_eq!(documents.len(), 3);
}

#[tokio::test]
async fn news_fetch_provider_error_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "bad key" })))
        .mount(&server)
        .await;

    let err = fetcher(&server.uri())
        .fetch(&company("Acme"), 5)
        .await
        .expect_err("401 must fail");

    assert!(
        matches!(err, SentimentError::Api { status: 401, .. }),
        "expected Api(401), got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// Chat completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_completion_returns_message_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-test/chat/completions"))
        .and(query_param("api-version", "2024-06-01"))
        .and(header("api-key", "azure-test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"ok\":true}" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let content = chat_client(&server.uri())
        .complete("prompt")
        .await
        .expect("completion should succeed");
    assert_eq!(content, "{\"ok\":true}");
}

#[tokio::test]
async fn chat_completion_without_choices_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = chat_client(&server.uri())
        .complete("prompt")
        .await
        .expect_err("no choices must fail");
    assert!(matches!(err, SentimentError::Llm(_)), "{err:?}");
}

#[tokio::test]
async fn chat_completion_rate_limit_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = chat_client(&server.uri())
        .complete("prompt")
        .await
        .expect_err("429 must fail");
    assert!(
        matches!(err, SentimentError::Api { status: 429, ref message, .. } if message == "slow down"),
        "{err:?}"
    );
}
