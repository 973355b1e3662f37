//! A tutoring provider for the Google Generative Language API.

#[macro_use]
extern crate tracing;

mod config;
mod proto;
mod sse;
mod stream;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use mime::Mime;
use reqwest::{Client, StatusCode, header};
use uba_tutor_model::{
    ChatRequest, ErrorKind, TutorProvider, TutorProviderError,
};

pub use config::{GeminiConfig, GeminiConfigBuilder};
use sse::{ByteSource, EventReader};
pub use stream::GeminiChatStream;

/// Error type for [`GeminiProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn not_configured() -> Self {
        Self::new("API key is not configured", ErrorKind::CredentialMissing)
    }

    fn from_sse(err: sse::Error) -> Self {
        match err {
            sse::Error::Transport => Self::new(
                "response body ended unexpectedly",
                ErrorKind::Network,
            ),
            sse::Error::InvalidPayload => {
                Self::new("malformed event stream payload", ErrorKind::Api)
            }
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl TutorProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

fn status_error(status: StatusCode, body: &str) -> Error {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ErrorKind::CredentialMissing
        }
        _ => ErrorKind::Api,
    };
    Error::new(format!("HTTP {status}: {body}"), kind)
}

/// Generative Language ("Gemini") tutoring provider.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: Client,
    config: Arc<GeminiConfig>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider` with the given configuration.
    #[inline]
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url, self.config.model, method
        )
    }
}

impl TutorProvider for GeminiProvider {
    type Error = Error;
    type Stream = GeminiChatStream;

    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        debug!(model = %self.config.model, "one-shot generation request");
        let configured = self.config.is_configured();
        let resp_fut = self
            .client
            .post(self.endpoint("generateContent"))
            .header("x-goog-api-key", self.config.api_key.as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&proto::plan_request(prompt))
            .send();

        async move {
            if !configured {
                return Err(Error::not_configured());
            }
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Network,
                    ));
                }
            };
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(status_error(status, &body));
            }

            let resp: proto::GenerateContentResponse =
                resp.json().await.map_err(|err| {
                    Error::new(format!("{err}"), ErrorKind::Api)
                })?;
            let text = resp.text();
            if text.trim().is_empty() {
                return Err(Error::new(
                    "no candidate text in response",
                    ErrorKind::EmptyResult,
                ));
            }
            Ok(text)
        }
    }

    fn open_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        debug!(model = %self.config.model, "streamed chat request");
        let configured = self.config.is_configured();
        let resp_fut = self
            .client
            .post(format!(
                "{}?alt=sse",
                self.endpoint("streamGenerateContent")
            ))
            .header("x-goog-api-key", self.config.api_key.as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(&proto::chat_request(req))
            .send();

        async move {
            if !configured {
                return Err(Error::not_configured());
            }
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Network,
                    ));
                }
            };
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(status_error(status, &body));
            }

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_event_stream = content_type
                .and_then(|v| v.parse::<Mime>().ok())
                .map(|m| {
                    m.type_() == mime::TEXT
                        && m.subtype() == mime::EVENT_STREAM
                })
                .unwrap_or(false);
            if !is_event_stream {
                return Err(Error::new(
                    format!("unexpected content type: {content_type:?}"),
                    ErrorKind::Api,
                ));
            }

            // Here we got a streaming response.
            let events = EventReader::new(ByteSource::from_response(resp));
            Ok(GeminiChatStream::new(events))
        }
    }
}
