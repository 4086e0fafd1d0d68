//! Dify chat-messages generation client.
//!
//! Each call is a fresh, stateless turn: the conversation id is always empty
//! and the response mode is always `blocking`. The client performs exactly
//! one HTTP round trip per [`Generator::generate`] and never retries.
//!
//! Failure mapping:
//! - timeout            → [`GenerationError::Timeout`] (localized message)
//! - connect/DNS/non-2xx → [`GenerationError::Transport`] (with cause)
//! - body is not JSON   → [`GenerationError::Parse`] (localized message)
//! - JSON without a string `answer` → `Ok` with the localized fallback

use async_trait::async_trait;
use careerlens_config::GenerationSettings;
use careerlens_core::error::GenerationError;
use careerlens_core::locale::Locale;
use careerlens_core::provider::{GenerationRequest, GenerationResult, Generator};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Longest slice of an error body carried into a transport error.
const ERROR_BODY_EXCERPT: usize = 200;

/// A client for a Dify-style `chat-messages` endpoint.
pub struct DifyClient {
    endpoint: String,
    api_key: String,
    user: String,
    locale: Locale,
    timeout: Duration,
    client: reqwest::Client,
}

/// Request body expected by the endpoint.
#[derive(Debug, Serialize)]
struct ChatMessageBody<'a> {
    inputs: serde_json::Map<String, serde_json::Value>,
    query: &'a str,
    response_mode: &'static str,
    conversation_id: &'static str,
    user: &'a str,
}

impl DifyClient {
    /// Create a client from immutable settings.
    pub fn new(settings: GenerationSettings) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GenerationError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            endpoint: settings.endpoint,
            api_key: settings.api_key,
            user: settings.user,
            locale: settings.locale,
            timeout: settings.timeout,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest) -> ChatMessageBody<'a> {
        ChatMessageBody {
            inputs: serde_json::Map::new(),
            query: &request.query,
            response_mode: "blocking",
            conversation_id: "",
            user: &self.user,
        }
    }

    /// Classify a reqwest failure. Timeouts are reported separately from
    /// every other transport problem.
    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            warn!(
                timeout_ms = self.timeout.as_millis() as u64,
                "Generation request timed out"
            );
            GenerationError::Timeout(self.locale.timeout_message().to_string())
        } else {
            let cause = error_chain(&e);
            error!(error = %cause, "Generation request failed");
            GenerationError::Transport(cause)
        }
    }
}

/// Render an error and every `source()` below it, joined with `": "`.
///
/// reqwest's own message only names the URL; the refused connection or DNS
/// failure lives further down the chain.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut rendered = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

/// Extract the `answer` string, if the payload has one.
fn answer_field(payload: &serde_json::Value) -> Option<&str> {
    payload.get("answer").and_then(serde_json::Value::as_str)
}

fn excerpt(body: &str) -> String {
    body.chars().take(ERROR_BODY_EXCERPT).collect()
}

#[async_trait]
impl Generator for DifyClient {
    fn name(&self) -> &str {
        "dify"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        info!(
            kind = ?request.kind,
            mode = ?request.mode,
            history = request.history_excerpt.len(),
            "Sending request to generation service"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %excerpt(&text), "Generation service returned error");
            return Err(GenerationError::Transport(format!(
                "status {}: {}",
                status.as_u16(),
                excerpt(&text)
            )));
        }

        let payload: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Generation response is not valid JSON");
            GenerationError::Parse(self.locale.parse_message().to_string())
        })?;

        match answer_field(&payload) {
            Some(answer) => {
                info!(chars = answer.chars().count(), "Response received from generation service");
                Ok(GenerationResult::generated(answer))
            }
            None => {
                warn!(kind = ?request.kind, "Generation response has no answer field, using fallback");
                debug!(payload = %excerpt(&text), "Response without answer");
                Ok(GenerationResult::fallback_for(request))
            }
        }
    }

    async fn health_check(&self) -> Result<bool, GenerationError> {
        Ok(!self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careerlens_core::provider::{PromptMode, RequestKind};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(endpoint: String, timeout: Duration) -> GenerationSettings {
        GenerationSettings {
            endpoint,
            api_key: "app-test".into(),
            timeout,
            user: "user".into(),
            locale: Locale::Ja,
        }
    }

    fn client(server: &MockServer) -> DifyClient {
        DifyClient::new(settings(
            format!("{}/v1/chat-messages", server.uri()),
            Duration::from_secs(5),
        ))
        .unwrap()
    }

    fn request(kind: RequestKind) -> GenerationRequest {
        GenerationRequest {
            kind,
            mode: PromptMode::ColdStart,
            history_excerpt: vec![],
            instructions: "Ask one question.".into(),
            query: "Ask one question.".into(),
            locale: Locale::Ja,
        }
    }

    #[tokio::test]
    async fn sends_blocking_stateless_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat-messages"))
            .and(header("Authorization", "Bearer app-test"))
            .and(body_json(json!({
                "inputs": {},
                "query": "Ask one question.",
                "response_mode": "blocking",
                "conversation_id": "",
                "user": "user"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "What skill do you want to grow this year?",
                "conversation_id": "abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server)
            .generate(&request(RequestKind::Question))
            .await
            .unwrap();
        assert_eq!(result.text, "What skill do you want to grow this year?");
        assert!(!result.fallback);
    }

    #[tokio::test]
    async fn slow_upstream_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"answer": "late"}))
                    .set_delay(Duration::from_millis(800)),
            )
            .mount(&server)
            .await;

        let client = DifyClient::new(settings(
            format!("{}/v1/chat-messages", server.uri()),
            Duration::from_millis(100),
        ))
        .unwrap();

        let err = client.generate(&request(RequestKind::Question)).await.unwrap_err();
        match err {
            GenerationError::Timeout(message) => {
                assert_eq!(message, Locale::Ja.timeout_message());
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate(&request(RequestKind::Question))
            .await
            .unwrap_err();
        match err {
            GenerationError::Transport(cause) => {
                assert!(cause.contains("500"));
                assert!(cause.contains("upstream exploded"));
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate(&request(RequestKind::Advice))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_transport() {
        let client = DifyClient::new(settings(
            "http://127.0.0.1:1/v1/chat-messages".into(),
            Duration::from_secs(2),
        ))
        .unwrap();

        let err = client.generate(&request(RequestKind::Question)).await.unwrap_err();
        match err {
            GenerationError::Transport(cause) => {
                assert!(cause.contains("127.0.0.1:1"), "cause: {cause}");
                assert!(cause.to_lowercase().contains("refused"), "cause: {cause}");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn error_chain_joins_every_source() {
        #[derive(Debug)]
        struct Outer(std::io::Error);

        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("error sending request")
            }
        }

        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Connection refused (os error 111)",
        ));
        assert_eq!(
            error_chain(&err),
            "error sending request: Connection refused (os error 111)"
        );
    }

    #[tokio::test]
    async fn non_json_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate(&request(RequestKind::Question))
            .await
            .unwrap_err();
        match err {
            GenerationError::Parse(message) => assert_eq!(message, Locale::Ja.parse_message()),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_answer_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"event": "message"})))
            .mount(&server)
            .await;

        let result = client(&server)
            .generate(&request(RequestKind::Advice))
            .await
            .unwrap();
        assert!(result.fallback);
        assert_eq!(result.text, Locale::Ja.advice_fallback());
    }

    #[tokio::test]
    async fn non_string_answer_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": 42})))
            .mount(&server)
            .await;

        let result = client(&server)
            .generate(&request(RequestKind::Question))
            .await
            .unwrap();
        assert_eq!(result.text, Locale::Ja.question_fallback());
    }

    #[tokio::test]
    async fn health_check_reports_configuration() {
        let server = MockServer::start().await;
        assert!(client(&server).health_check().await.unwrap());
    }

    #[test]
    fn excerpt_is_bounded() {
        let long = "x".repeat(1000);
        assert_eq!(excerpt(&long).len(), ERROR_BODY_EXCERPT);
    }
}
