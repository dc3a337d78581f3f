//! Backend client: every call to the CareerPilot analysis API goes through here.
//!
//! Handlers depend on the `AnalysisBackend` trait, carried in `AppState` as
//! `Arc<dyn AnalysisBackend>`; `HttpBackend` is the reqwest implementation.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::AnalysisKind;
use crate::models::analysis::AnalysisReport;
use crate::models::backend::{ChatReply, ChatRequest};

pub mod retry;

pub use retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request timeout")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Http(e)
        }
    }
}

impl BackendError {
    /// Status reported to callers. Timeouts surface as 408.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Timeout => Some(408),
            BackendError::Api { status, .. } => Some(*status),
            BackendError::Http(_) | BackendError::Decode(_) => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Timeout | BackendError::Http(_) => true,
            BackendError::Api { status, .. } => *status == 429 || *status >= 500,
            BackendError::Decode(_) => false,
        }
    }
}

/// How a stored resume is looked up: by parsed profile, or latest for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeLookup<'a> {
    Profile(&'a str),
    User(&'a str),
}

impl ResumeLookup<'_> {
    fn path(&self) -> String {
        match self {
            ResumeLookup::Profile(id) => format!("/resume/{id}"),
            ResumeLookup::User(id) => format!("/resume/user/{id}"),
        }
    }
}

/// A resume file received from the client, forwarded as multipart `file`.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Typed overview, used to compose report exports.
    async fn overview(&self, user_id: &str) -> Result<AnalysisReport, BackendError>;

    /// Any proxied view, body passed through untouched.
    async fn analysis(
        &self,
        kind: AnalysisKind,
        query: &[(&'static str, String)],
    ) -> Result<Value, BackendError>;

    async fn fetch_resume(&self, lookup: ResumeLookup<'_>) -> Result<Value, BackendError>;

    /// Uploads and enriches a resume. Returns the raw response body; callers
    /// pull identifiers out of it with `UploadIdentifiers::from_body`.
    async fn upload_resume(&self, file: UploadFile) -> Result<Value, BackendError>;

    async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, BackendError>;
}

// ────────────────────────────────────────────────────────────────────────────
// reqwest implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    upload_timeout: Duration,
    retry: RetryPolicy,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        upload_timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_timeout,
            retry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        label: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let url = self.url(path);
        let value = self
            .retry
            .run(label, || {
                let request = self.client.get(&url).query(query);
                async move { read_json(request.send().await?).await }
            })
            .await?;
        debug!("Backend call {} succeeded", label);
        Ok(value)
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn overview(&self, user_id: &str) -> Result<AnalysisReport, BackendError> {
        let query = [("user_id", user_id.to_string())];
        self.get_json("overview", AnalysisKind::Overview.path(), &query)
            .await
    }

    async fn analysis(
        &self,
        kind: AnalysisKind,
        query: &[(&'static str, String)],
    ) -> Result<Value, BackendError> {
        self.get_json(kind.as_str(), kind.path(), query).await
    }

    async fn fetch_resume(&self, lookup: ResumeLookup<'_>) -> Result<Value, BackendError> {
        self.get_json("resume", &lookup.path(), &[]).await
    }

    async fn upload_resume(&self, file: UploadFile) -> Result<Value, BackendError> {
        let size = file.bytes.len();
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }

        // Uploads are not idempotent; a single attempt with the longer timeout.
        let response = self
            .client
            .post(self.url("/resume/upload"))
            .query(&[("enrich", "true")])
            .multipart(Form::new().part("file", part))
            .timeout(self.upload_timeout)
            .send()
            .await?;
        let body: Value = read_json(response).await?;

        info!("Uploaded resume {} ({} bytes)", file.file_name, size);
        Ok(body)
    }

    async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, BackendError> {
        // Single attempt: the agent may already have acted on the message.
        let response = self
            .client
            .post(self.url("/agent/chat"))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }

    serde_json::from_slice(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Prefers the backend's `detail` field, falling back to the status reason.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| match v.get("detail")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::String(_) | Value::Null => None,
            other => Some(other.to_string()),
        });

    detail.unwrap_or_else(|| {
        format!(
            "Request failed: {}",
            status.canonical_reason().unwrap_or(status.as_str())
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn test_error_message_prefers_detail() {
        let body = br#"{"detail": "No resume found for user"}"#;
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, body),
            "No resume found for user"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, b"<html>oops</html>"),
            "Request failed: Bad Gateway"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, br#"{"detail": null}"#),
            "Request failed: Bad Request"
        );
    }

    #[test]
    fn test_error_message_stringifies_structured_detail() {
        let body = br#"{"detail": [{"loc": ["query", "user_id"], "msg": "field required"}]}"#;
        let message = error_message(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(message.contains("field required"));
    }

    #[test]
    fn test_status_and_retryability() {
        assert_eq!(BackendError::Timeout.status(), Some(408));
        assert!(BackendError::Timeout.is_retryable());

        let throttled = BackendError::Api {
            status: 429,
            message: String::new(),
        };
        assert!(throttled.is_retryable());

        let missing = BackendError::Api {
            status: 404,
            message: String::new(),
        };
        assert_eq!(missing.status(), Some(404));
        assert!(!missing.is_retryable());

        assert!(!BackendError::Decode("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_resume_lookup_paths() {
        assert_eq!(ResumeLookup::Profile("p-1").path(), "/resume/p-1");
        assert_eq!(ResumeLookup::User("u-1").path(), "/resume/user/u-1");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new(
            "http://localhost:8000/",
            Duration::from_secs(30),
            Duration::from_secs(120),
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(
            backend.url("/analysis/overview"),
            "http://localhost:8000/analysis/overview"
        );
    }

    /// Answers every request with `status` and `body`, counting requests.
    async fn canned_server(status: &'static str, body: &'static str) -> (String, Arc<AtomicU32>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}"), hits)
    }

    /// Drains headers plus a `Content-Length` body.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    fn backend_for(base_url: &str) -> HttpBackend {
        HttpBackend::new(
            base_url,
            Duration::from_secs(5),
            Duration::from_secs(5),
            RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_chat_is_sent_once_on_server_error() {
        let (url, hits) = canned_server(
            "503 Service Unavailable",
            r#"{"detail": "agent overloaded"}"#,
        )
        .await;
        let request = ChatRequest {
            message: "book an interview slot",
            user_id: Some("u-1"),
            session_id: Some("s-1"),
            include_sources: true,
            context: serde_json::json!({}),
        };

        let err = backend_for(&url).chat(&request).await.unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_is_retried_on_server_error() {
        let (url, hits) = canned_server("503 Service Unavailable", "{}").await;
        let err = backend_for(&url)
            .analysis(AnalysisKind::CareerPath, &[("user_id", "u-1".to_string())])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_analysis_body_is_passed_through() {
        let (url, _hits) = canned_server(
            "200 OK",
            r#"{"overall_score": 72, "metrics": {"word_count": 512}, "improvements": {"optional_enhancements": ["Add a portfolio link"]}}"#,
        )
        .await;
        let body = backend_for(&url)
            .analysis(AnalysisKind::Overview, &[("user_id", "u-1".to_string())])
            .await
            .unwrap();
        assert_eq!(body["metrics"]["word_count"], 512);
        assert_eq!(
            body["improvements"]["optional_enhancements"][0],
            "Add a portfolio link"
        );
    }
}
