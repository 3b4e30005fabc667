//! Client side of the design backend.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::{ChatError, Result};
use crate::protocol::{ChatRequest, ServerResponse, decode_response};

/// Something that can answer a chat message.
///
/// One call is one request/response exchange; implementations must not
/// retry.
#[async_trait]
pub trait ChatBackend: Send + Sync + std::fmt::Debug {
    /// Send a message and decode the reply.
    async fn send(&self, message: &str) -> Result<ServerResponse>;
}

/// Backend reached over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use netcafe_chat::backend::{ChatBackend, HttpBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpBackend::new("http://127.0.0.1:5000", "/api/chat")?;
/// let reply = backend.send("2 bàn").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend for `base_url` + `chat_path`.
    pub fn new(base_url: impl AsRef<str>, chat_path: &str) -> Result<Self> {
        Self::with_client(base_url, chat_path, reqwest::Client::new())
    }

    /// Create a backend with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        chat_path: &str,
        http: reqwest::Client,
    ) -> Result<Self> {
        let mut base = Url::parse(base_url.as_ref())?;
        // `join` replaces the last segment unless the base ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(chat_path.trim_start_matches('/'))?;
        Ok(Self { endpoint, http })
    }

    /// Full URL of the chat endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, message: &str) -> Result<ServerResponse> {
        let request = ChatRequest {
            message: message.to_string(),
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;

        decode_response(content_type.as_deref(), body)
    }
}
