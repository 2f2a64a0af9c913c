//! Chat transport: one POST per exchange, failures classified for the UI.
//!
//! There is deliberately no retry, no queueing, and no default timeout: the
//! widget issues one request per send action, and every outcome (answer or
//! classified failure) resolves exactly one placeholder bubble. Concurrent
//! sends are independent exchanges that may complete in any order.

use crate::config::WidgetConfig;
use crate::model::{ChatReply, ChatRequest};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Fixed user-facing string for failures where no response arrived at all.
pub const CONNECTION_FAILED_TEXT: &str = "Connection failed. Please try again later.";

/// Fixed user-facing string for failures where the server answered, but not
/// with a usable success response. Wording is deliberately distinct from
/// [`CONNECTION_FAILED_TEXT`].
pub const SERVER_ERROR_TEXT: &str = "The server did not respond. Please try again later.";

pub type ChatResult<T> = Result<T, ChatError>;

/// Failure classes for one exchange.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The configured endpoint URL does not parse. Construction-time only;
    /// never produced by [`ChatClient::ask`].
    #[error("invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The request never produced a response (DNS failure, connection
    /// refused, reset, timeout).
    #[error("connection failed: {0}")]
    Connection(String),

    /// The server responded with a non-success status.
    #[error("server returned HTTP {0}")]
    Server(reqwest::StatusCode),

    /// The server responded 2xx but the body was not the expected JSON.
    #[error("unreadable response body: {0}")]
    Payload(String),
}

impl ChatError {
    /// The fixed string shown in the placeholder bubble for this failure.
    /// Undecodable bodies share the server wording; only transmission
    /// failures get the connection wording.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChatError::Connection(_) => CONNECTION_FAILED_TEXT,
            ChatError::Server(_) | ChatError::Payload(_) | ChatError::Endpoint(_) => {
                SERVER_ERROR_TEXT
            }
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::Payload(err.to_string())
        } else {
            ChatError::Connection(err.to_string())
        }
    }
}

/// Success response body. Both fields are optional on the wire; defaults and
/// citation typing are applied in [`ChatReply::from_wire`].
#[derive(Deserialize)]
struct WireReply {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    sources: Value,
}

/// HTTP client for the chat endpoint. Clones share the underlying connection
/// pool, so the widget hands one clone to each in-flight exchange.
#[derive(Clone)]
pub struct ChatClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl ChatClient {
    /// Client against `endpoint` with platform-default timeouts.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }

    /// Client from widget configuration: parses the endpoint and applies the
    /// optional request timeout.
    pub fn from_config(config: &WidgetConfig) -> ChatResult<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().unwrap_or_else(|_| reqwest::Client::new());
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Perform exactly one request-reply exchange.
    ///
    /// Transmission failures map to [`ChatError::Connection`], non-2xx
    /// statuses to [`ChatError::Server`], and undecodable 2xx bodies to
    /// [`ChatError::Payload`]. The response body is awaited in full before
    /// normalization.
    pub async fn ask(&self, request: &ChatRequest) -> ChatResult<ChatReply> {
        tracing::debug!(
            endpoint = %self.endpoint,
            history_len = request.history.len(),
            "dispatching chat request"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "chat endpoint signaled failure");
            return Err(ChatError::Server(status));
        }

        let wire: WireReply = response.json().await?;
        Ok(ChatReply::from_wire(wire.answer, &wire.sources, &self.endpoint))
    }
}
