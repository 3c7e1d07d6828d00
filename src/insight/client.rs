use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::InsightError;
use crate::config::ProxyConfig;

/// One upstream generation call: model, system instruction, user
/// instruction, and sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Upstream text-generation abstraction (allows mocking).
///
/// Implementations block; async callers go through `spawn_blocking`.
pub trait LlmClient: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<String, InsightError>;
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpLlmClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: Option<u64>,
}

impl HttpLlmClient {
    /// Build a client. Must not be called from inside an async context.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, InsightError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| InsightError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &ProxyConfig) -> Result<Self, InsightError> {
        Self::new(
            &config.upstream_url,
            config.api_key.clone(),
            config.timeout_secs,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for `/chat/completions`
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response body from `/chat/completions`
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn timeout_message(timeout_secs: Option<u64>) -> String {
    match timeout_secs {
        Some(secs) => format!("Request timed out after {secs}s"),
        None => "Request timed out".to_string(),
    }
}

impl LlmClient for HttpLlmClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, InsightError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut call = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call.send().map_err(|e| {
            if e.is_connect() {
                InsightError::UpstreamConnection(self.base_url.clone())
            } else if e.is_timeout() {
                InsightError::HttpClient(timeout_message(self.timeout_secs))
            } else {
                InsightError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InsightError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| InsightError::ResponseParsing(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| InsightError::ResponseParsing("No completion content".into()))
    }
}

/// What the mock answers with.
#[derive(Debug, Clone)]
enum MockReply {
    Content(String),
    Status { status: u16, body: String },
    Unreachable,
}

/// Mock LLM client for testing. Returns a configurable reply and records
/// every request it receives.
pub struct MockLlmClient {
    reply: MockReply,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self::with_reply(MockReply::Content(response.to_string()))
    }

    /// Upstream answers with a non-success status.
    pub fn failing(status: u16, body: &str) -> Self {
        Self::with_reply(MockReply::Status {
            status,
            body: body.to_string(),
        })
    }

    /// Upstream cannot be reached at all.
    pub fn unreachable() -> Self {
        Self::with_reply(MockReply::Unreachable)
    }

    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, InsightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.reply {
            MockReply::Content(text) => Ok(text.clone()),
            MockReply::Status { status, body } => Err(InsightError::UpstreamStatus {
                status: *status,
                body: body.clone(),
            }),
            MockReply::Unreachable => {
                Err(InsightError::UpstreamConnection("mock://upstream".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            model: "gpt-4o-mini".into(),
            system: "You are a triage assistant.".into(),
            prompt: "Symptoms: headache".into(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    type Captured = Arc<Mutex<Option<(Value, Option<String>)>>>;

    /// Run a fake upstream on a background runtime. The runtime must stay
    /// alive for the duration of the test.
    fn spawn_upstream(
        status: StatusCode,
        reply: Value,
    ) -> (tokio::runtime::Runtime, SocketAddr, Captured) {
        let captured: Captured = Arc::new(Mutex::new(None));
        let sink = captured.clone();

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let sink = sink.clone();
                let reply = reply.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *sink.lock().unwrap() = Some((body, auth));
                    (status, Json(reply))
                }
            }),
        );

        let rt = tokio::runtime::Runtime::new().unwrap();
        let addr = rt.block_on(async {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            addr
        });
        (rt, addr, captured)
    }

    #[test]
    fn http_client_sends_chat_completion_envelope() {
        let (_rt, addr, captured) = spawn_upstream(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "{\"urgency\":\"low\"}"}}]}),
        );
        let client =
            HttpLlmClient::new(&format!("http://{addr}/v1/"), Some("sk-test".into()), Some(5))
                .unwrap();

        let text = client.generate(&sample_request()).unwrap();
        assert_eq!(text, "{\"urgency\":\"low\"}");

        let (body, auth) = captured.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a triage assistant.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Symptoms: headache");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    }

    #[test]
    fn http_client_omits_auth_without_key() {
        let (_rt, addr, captured) = spawn_upstream(
            StatusCode::OK,
            json!({"choices": [{"message": {"content": "ok"}}]}),
        );
        let client = HttpLlmClient::new(&format!("http://{addr}/v1"), None, None).unwrap();
        client.generate(&sample_request()).unwrap();

        let (_, auth) = captured.lock().unwrap().clone().unwrap();
        assert!(auth.is_none());
    }

    #[test]
    fn http_client_maps_non_success_status() {
        let (_rt, addr, _) = spawn_upstream(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "rate limited"}}),
        );
        let client = HttpLlmClient::new(&format!("http://{addr}/v1"), None, None).unwrap();

        let err = client.generate(&sample_request()).unwrap_err();
        match err {
            InsightError::UpstreamStatus { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("expected UpstreamStatus, got {other:?}"),
        }
    }

    #[test]
    fn http_client_rejects_empty_choices() {
        let (_rt, addr, _) = spawn_upstream(StatusCode::OK, json!({"choices": []}));
        let client = HttpLlmClient::new(&format!("http://{addr}/v1"), None, None).unwrap();

        let err = client.generate(&sample_request()).unwrap_err();
        assert!(matches!(err, InsightError::ResponseParsing(_)));
    }

    #[test]
    fn http_client_rejects_foreign_envelope() {
        let (_rt, addr, _) = spawn_upstream(StatusCode::OK, json!({"response": "ollama style"}));
        let client = HttpLlmClient::new(&format!("http://{addr}/v1"), None, None).unwrap();

        let err = client.generate(&sample_request()).unwrap_err();
        assert!(matches!(err, InsightError::ResponseParsing(_)));
    }

    #[test]
    fn http_client_reports_connection_failure() {
        // Bind then drop to get a port with nothing listening
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let client = HttpLlmClient::new(&format!("http://{addr}/v1"), None, Some(5)).unwrap();

        let err = client.generate(&sample_request()).unwrap_err();
        assert!(
            matches!(err, InsightError::UpstreamConnection(_)),
            "got {err:?}"
        );
    }

    #[test]
    fn http_client_trims_trailing_slash() {
        let client = HttpLlmClient::new("https://api.example.com/v1/", None, None).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/v1");
    }

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        let result = client.generate(&sample_request()).unwrap();
        assert_eq!(result, "test response");
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.last_request().unwrap().prompt, "Symptoms: headache");
    }

    #[test]
    fn mock_client_failure_modes() {
        let client = MockLlmClient::failing(500, "boom");
        assert!(matches!(
            client.generate(&sample_request()),
            Err(InsightError::UpstreamStatus { status: 500, .. })
        ));

        let client = MockLlmClient::unreachable();
        assert!(matches!(
            client.generate(&sample_request()),
            Err(InsightError::UpstreamConnection(_))
        ));
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn timeout_message_reports_configured_limit_only() {
        assert_eq!(timeout_message(Some(45)), "Request timed out after 45s");
        assert_eq!(timeout_message(None), "Request timed out");
    }
}
