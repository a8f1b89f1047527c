//! HTTP transport seam.
//!
//! `LibraryClient` never talks to reqwest directly: it builds an
//! `ApiRequest`, hands it to a `Transport`, and classifies the
//! `ApiResponse` it gets back. `ReqwestTransport` is the real network
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method};
use tracing::debug;

use super::LibraryError;

/// HTTP request timeout in seconds when the config does not say otherwise.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    None,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path relative to the service base URL, starting with `/`.
    pub path: String,
    pub bearer_token: Option<String>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer_token: None,
            body: RequestBody::None,
        }
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }
}

/// Raw response: status code plus the body text, unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP exchange. Only transport-level failures
    /// (connect, timeout) are errors; any status code is a response.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, LibraryError>;
}

/// Network transport backed by `reqwest`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, LibraryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, LibraryError> {
        let url = self.url_for(&request.path);
        debug!(method = ?request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &url)
            .header(header::ACCEPT, "application/json");

        if let Some(ref token) = request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::None => builder,
            RequestBody::Json(ref value) => builder.json(value),
            RequestBody::Form(ref fields) => builder.form(fields),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = if response.status().is_success() {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };
        debug!(status, url = %url, "Received response");

        Ok(ApiResponse { status, body })
    }
}

/// In-memory transport that replays queued responses and records
/// every request it receives.
#[cfg(any(test, feature = "test-util"))]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{ApiRequest, ApiResponse, Transport};
    use crate::api::LibraryError;

    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<ApiResponse, LibraryError>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&self, status: u16, body: &str) {
            self.push(Ok(ApiResponse::new(status, body)));
        }

        pub fn push_error(&self, err: LibraryError) {
            self.push(Err(err));
        }

        fn push(&self, item: Result<ApiResponse, LibraryError>) {
            self.responses
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_back(item);
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, LibraryError> {
            self.requests
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(request.clone());
            self.responses
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_else(|| {
                    Err(LibraryError::Other(format!(
                        "No scripted response for {:?} {}",
                        request.method, request.path
                    )))
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    /// Serve one raw HTTP reply on a local port and return its base URL.
    fn serve_once(reply: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut seen = Vec::new();
            let mut buf = [0u8; 1024];
            while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                seen.extend_from_slice(&buf[..n]);
            }
            stream.write_all(reply.as_bytes()).unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = ReqwestTransport::new("http://localhost:8000/", 5).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8000");
        assert_eq!(transport.url_for("/books/3"), "http://localhost:8000/books/3");
    }

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::new(HttpMethod::Post, "/auth/login")
            .form(&[("username", "carlo"), ("password", "bianchi")]);
        assert_eq!(req.bearer_token, None);
        assert_eq!(
            req.body,
            RequestBody::Form(vec![
                ("username".to_string(), "carlo".to_string()),
                ("password".to_string(), "bianchi".to_string()),
            ])
        );

        let req = ApiRequest::new(HttpMethod::Get, "/books").bearer("abc");
        assert_eq!(req.bearer_token.as_deref(), Some("abc"));
        assert_eq!(req.body, RequestBody::None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(ApiResponse::new(200, "").is_success());
        assert!(ApiResponse::new(204, "").is_success());
        assert!(!ApiResponse::new(199, "").is_success());
        assert!(!ApiResponse::new(300, "").is_success());
        assert!(!ApiResponse::new(404, "").is_success());
    }

    #[tokio::test]
    async fn test_truncated_success_body_is_an_error() {
        let base_url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"books\"");
        let transport = ReqwestTransport::new(&base_url, 5).unwrap();
        let err = transport
            .send(ApiRequest::new(HttpMethod::Get, "/books"))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::Other(_)));
    }

    #[tokio::test]
    async fn test_truncated_error_body_keeps_status() {
        let base_url = serve_once("HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\noops");
        let transport = ReqwestTransport::new(&base_url, 5).unwrap();
        let response = transport
            .send(ApiRequest::new(HttpMethod::Get, "/books"))
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert!(!response.is_success());
    }
}
