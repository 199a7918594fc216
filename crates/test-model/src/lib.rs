//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use agent_api_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

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
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    events: Vec<PresetEvent>,
    event_idx: usize,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.get_mut();

        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;

            let event_idx = this.event_idx;
            this.event_idx += 1;
            if let Some(preset) = this.events.get(event_idx) {
                let event = match preset {
                    PresetEvent::MessageDelta(msg) => {
                        ModelResponseEvent::MessageDelta(msg.clone())
                    }
                    PresetEvent::ReasoningDelta(msg) => {
                        ModelResponseEvent::ReasoningDelta(msg.clone())
                    }
                    PresetEvent::Failure(msg) => {
                        return Poll::Ready(Err(Error::new(
                            msg.clone(),
                            ErrorKind::Other,
                        )));
                    }
                };
                return Poll::Ready(Ok(Some(event)));
            } else if event_idx == this.events.len() {
                return Poll::Ready(Ok(Some(ModelResponseEvent::Completed(
                    ModelFinishReason::Stop,
                ))));
            } else {
                // In case this method is called after completion.
                return Poll::Ready(Ok(None));
            }
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_event(cx)
    }
}

#[derive(Default)]
struct Shared {
    script: Mutex<Script>,
    requests: Mutex<Vec<ModelRequest>>,
}

#[derive(Default)]
struct Script {
    // Index of the preset answering the next request.
    next: usize,
    // Failed attempts on the current preset.
    attempts: u64,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request. Presets answer requests in the
/// order they are added; a preset with failures answers only after the
/// configured number of failed attempts. If there are no enough presets in
/// the script, an error will be returned.
///
/// Clones share the script position and the recorded requests, so a test
/// can keep a clone around and inspect what the agent has sent.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone)]
pub struct TestModelProvider {
    model_id: String,
    script: Vec<PresetResponse>,
    delay: Option<Duration>,
    shared: Arc<Shared>,
}

impl TestModelProvider {
    #[inline]
    pub fn new<S: Into<String>>(model_id: S) -> Self {
        Self {
            model_id: model_id.into(),
            script: vec![],
            delay: None,
            shared: Default::default(),
        }
    }

    #[inline]
    pub fn add_response(&mut self, preset: PresetResponse) {
        self.script.push(preset);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the requests received so far, in order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        match self.shared.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, req: &ModelRequest) {
        let mut requests = match self.shared.requests.lock() {
            Ok(requests) => requests,
            Err(poisoned) => poisoned.into_inner(),
        };
        requests.push(req.clone());
    }

    /// Picks the preset for the next request, or the error to answer it
    /// with.
    fn next_preset(&self) -> Result<&PresetResponse, Error> {
        let mut script = match self.shared.script.lock() {
            Ok(script) => script,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Some(preset) = self.script.get(script.next) else {
            return Err(Error::new(
                "no enough presets",
                ErrorKind::RateLimitExceeded,
            ));
        };
        if let Some(failures) = preset.failures {
            script.attempts += 1;
            if failures == 0 || script.attempts <= failures {
                return Err(Error::new("preset failure", ErrorKind::Other));
            }
        }
        script.next += 1;
        script.attempts = 0;
        Ok(preset)
    }
}

impl Default for TestModelProvider {
    #[inline]
    fn default() -> Self {
        Self::new("test-model")
    }
}

impl Debug for TestModelProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestModelProvider")
            .field("model_id", &self.model_id)
            .field("script", &self.script.len())
            .finish_non_exhaustive()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    #[inline]
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        self.record(req);

        let result = self.next_preset().map(|preset| TestModelResponse {
            events: preset.events.clone(),
            event_idx: 0,
            delay: self.delay.unwrap_or(Duration::from_millis(1)),
            sleep: None,
        });
        ready(result)
    }
}
