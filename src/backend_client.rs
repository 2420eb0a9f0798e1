use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Body of a `POST /ask` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskRequest {
    pub prompt: String,
    pub service: String,
}

/// Body of an `/ask` reply. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskResponse {
    pub response: Option<String>,
    pub error: Option<String>,
}

impl AskResponse {
    /// Reads the two fields out of any JSON body.
    ///
    /// A body that is not an object has neither field. Field values that are
    /// `null`, `false`, `0` or `""` count as missing; other non-string values
    /// are shown as their JSON text.
    pub fn from_value(body: &Value) -> Self {
        Self {
            response: field_text(body, "response"),
            error: field_text(body, "error"),
        }
    }
}

fn field_text(body: &Value, name: &str) -> Option<String> {
    match body.get(name)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Failure to complete an `/ask` exchange.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend url: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Anything that can answer an [`AskRequest`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, AskError>;
}

pub struct BackendClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &Url) -> Result<Self, AskError> {
        let endpoint = ask_endpoint(base_url)?;
        let client = reqwest::Client::new();

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, AskError> {
        debug!("Sending request to {}: {:?}", self.endpoint, request);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        // The backend puts `{"error": ...}` bodies on 4xx/5xx replies, so the
        // status is only logged and the body is always decoded.
        let status = response.status();
        let body = response.text().await?;
        debug!("Received {} from backend: {}", status, body);

        let body: Value = serde_json::from_str(&body)?;
        Ok(AskResponse::from_value(&body))
    }
}

/// Resolves `ask` relative to `base`, keeping any path prefix on the base.
pub fn ask_endpoint(base: &Url) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        return base.join("ask");
    }

    let mut base = base.clone();
    let path = format!("{}/", base.path());
    base.set_path(&path);
    base.join("ask")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(prompt: &str) -> AskRequest {
        AskRequest {
            prompt: prompt.to_string(),
            service: "groq".to_string(),
        }
    }

    fn client_for(server: &MockServer) -> BackendClient {
        let base = Url::parse(&server.uri()).unwrap();
        BackendClient::new(&base).unwrap()
    }

    #[test]
    fn endpoint_from_bare_host() {
        let base = Url::parse("http://127.0.0.1:5000").unwrap();
        assert_eq!(ask_endpoint(&base).unwrap().as_str(), "http://127.0.0.1:5000/ask");
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let base = Url::parse("http://localhost:8080/api").unwrap();
        assert_eq!(ask_endpoint(&base).unwrap().as_str(), "http://localhost:8080/api/ask");

        let base = Url::parse("http://localhost:8080/api/").unwrap();
        assert_eq!(ask_endpoint(&base).unwrap().as_str(), "http://localhost:8080/api/ask");
    }

    #[tokio::test]
    async fn posts_prompt_and_service_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "prompt": "hi there", "service": "groq" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Hello" })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).ask(&request("hi there")).await.unwrap();

        assert_eq!(reply.response.as_deref(), Some("Hello"));
        assert_eq!(reply.error, None);
    }

    #[tokio::test]
    async fn error_status_with_json_body_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "missing key" })),
            )
            .mount(&server)
            .await;

        let reply = client_for(&server).ask(&request("x")).await.unwrap();

        assert_eq!(reply.error.as_deref(), Some("missing key"));
        assert_eq!(reply.response, None);
    }

    #[tokio::test]
    async fn empty_object_has_neither_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let reply = client_for(&server).ask(&request("x")).await.unwrap();

        assert_eq!(reply, AskResponse::default());
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).ask(&request("x")).await.unwrap_err();

        assert!(matches!(err, AskError::Decode(_)));
    }

    #[test]
    fn non_object_bodies_have_neither_field() {
        for body in [json!([]), json!("str"), json!(7), json!(null)] {
            assert_eq!(AskResponse::from_value(&body), AskResponse::default(), "{body}");
        }
    }

    #[test]
    fn non_string_fields_show_as_text() {
        let reply = AskResponse::from_value(&json!({ "response": 42, "error": true }));

        assert_eq!(reply.response.as_deref(), Some("42"));
        assert_eq!(reply.error.as_deref(), Some("true"));
    }

    #[test]
    fn falsy_fields_count_as_missing() {
        let reply = AskResponse::from_value(&json!({ "response": false, "error": "quota" }));
        assert_eq!(reply.response, None);
        assert_eq!(reply.error.as_deref(), Some("quota"));

        let reply = AskResponse::from_value(&json!({ "response": 0, "error": null }));
        assert_eq!(reply, AskResponse::default());
    }

    #[tokio::test]
    async fn numeric_response_over_http_is_an_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": 42 })))
            .mount(&server)
            .await;

        let reply = client_for(&server).ask(&request("x")).await.unwrap();

        assert_eq!(reply.response.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        drop(listener);
        let client = BackendClient::new(&base).unwrap();

        let err = client.ask(&request("x")).await.unwrap_err();

        assert!(matches!(err, AskError::Transport(_)));
    }
}
