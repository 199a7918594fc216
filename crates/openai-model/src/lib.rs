//! A model provider for OpenAI-compatible APIs.
//!
//! Both the official OpenAI endpoint and Groq speak the same streaming
//! chat-completion protocol, so a single provider serves them. Pick the
//! backend with [`OpenAIConfigBuilder::with_base_url`].

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use agent_api_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use mime::Mime;
use reqwest::{Client, Response, StatusCode, header};

pub use config::{
    GROQ_BASE_URL, OPENAI_BASE_URL, OpenAIConfig, OpenAIConfigBuilder,
};
use io::{Chunks, Sse};
use proto::{ErrorBody, ErrorResponse};
pub use response::OpenAIResponse;

/// Error type for [`OpenAIProvider`].
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

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// OpenAI-compatible model provider.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Creates a new `OpenAIProvider` sending requests through `client`.
    ///
    /// Providers built from clones of one client share its connection
    /// pool.
    #[inline]
    pub fn with_client(config: OpenAIConfig, client: Client) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this provider.
    #[inline]
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

impl ModelProvider for OpenAIProvider {
    type Error = Error;
    type Response = OpenAIResponse;

    #[inline]
    fn model_id(&self) -> &str {
        &self.config.model
    }

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let openai_req = proto::create_request(req, &self.config);
        let url = format!("{}/chat/completions", self.config.base_url);
        debug!("sending completion request to {url}");
        let resp_fut = self
            .client
            .post(url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(&openai_req)
            .send();

        async move {
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(format!("{err}"), ErrorKind::Other));
                }
            };
            let resp = check_status(resp).await?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_valid_content_type = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| {
                    m.type_() == mime::TEXT && m.subtype() == mime::EVENT_STREAM
                })
                .unwrap_or(false);
            if !is_valid_content_type {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            // Here we got a successful response.
            let chunks = Chunks::from_response(resp);
            let sse = Sse::new(chunks);
            Ok(OpenAIResponse::from_sse(sse))
        }
    }
}

async fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    warn!("completion request failed with {status}");
    Err(status_error(status, &body))
}

// Error codes the backends use when a request breaks their content policy.
const MODERATION_CODES: [&str; 2] =
    ["content_policy_violation", "content_filter"];

fn status_error(status: StatusCode, body: &str) -> Error {
    let error = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|resp| resp.error);
    let moderated = error
        .as_ref()
        .and_then(|error| error.code.as_deref())
        .is_some_and(|code| MODERATION_CODES.contains(&code));
    let kind = if status == StatusCode::TOO_MANY_REQUESTS {
        ErrorKind::RateLimitExceeded
    } else if moderated {
        ErrorKind::Moderated
    } else {
        ErrorKind::Other
    };
    let message = match error {
        Some(ErrorBody {
            message,
            code: Some(code),
        }) => format!("{status}: {message} ({code})"),
        Some(ErrorBody { message, .. }) => format!("{status}: {message}"),
        None => format!("{status}: {body}"),
    };
    Error::new(message, kind)
}
