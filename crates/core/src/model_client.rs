use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use agent_api_model::{
    ModelFinishReason, ModelProvider, ModelRequest, ModelResponse,
    ModelResponseEvent,
};
use futures_util::stream::{BoxStream, Stream, StreamExt};
use tracing::Instrument;

use crate::RunError;

pub type ModelEvents = BoxStream<'static, Result<ModelResponseEvent, RunError>>;
type SendRequestResult = Result<ModelEvents, RunError>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    model_id: Arc<str>,
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        let model_id = Arc::from(provider.model_id());
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    match fut.await {
                        Ok(resp) => {
                            let events: ModelEvents =
                                EventStream::<P::Response> {
                                    response: Box::pin(resp),
                                    finished: false,
                                }
                                .boxed();
                            Ok(events)
                        }
                        Err(err) => {
                            error!("got an error: {err:?}");
                            Err(RunError::new(err))
                        }
                    }
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self {
            model_id,
            handler_fn,
        }
    }

    #[inline]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Sends a request and returns the stream of response events.
    ///
    /// # Cancel safety
    ///
    /// Dropping the returned stream stops the response from streaming
    /// further events.
    #[inline]
    pub async fn send_request(
        &self,
        req: ModelRequest,
    ) -> Result<ModelEvents, RunError> {
        (self.handler_fn)(req).await
    }

    /// Sends a request and waits for the complete response.
    pub async fn send_request_and_collect(
        &self,
        req: ModelRequest,
    ) -> Result<ModelClientResponse, RunError> {
        let mut events = self.send_request(req).await?;

        let mut transcript = String::new();
        let mut reasoning: Option<String> = None;
        let mut finish_reason = None;

        trace!("start receiving events");
        while let Some(event) = events.next().await {
            let event = event.inspect_err(|err| error!("got an error: {err:?}"))?;
            trace!("got an event: {event:?}");
            match event {
                ModelResponseEvent::MessageDelta(msg) => {
                    transcript.push_str(&msg);
                }
                ModelResponseEvent::ReasoningDelta(msg) => {
                    reasoning.get_or_insert_default().push_str(&msg);
                }
                ModelResponseEvent::Completed(reason) => {
                    finish_reason = Some(reason);
                }
            }
        }
        trace!("finished a request");

        Ok(ModelClientResponse {
            transcript,
            reasoning,
            finish_reason,
        })
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug)]
pub struct ModelClientResponse {
    pub transcript: String,
    pub reasoning: Option<String>,
    pub finish_reason: Option<ModelFinishReason>,
}

struct EventStream<R> {
    response: Pin<Box<R>>,
    finished: bool,
}

impl<R: ModelResponse> Stream for EventStream<R> {
    type Item = Result<ModelResponseEvent, RunError>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match this.response.as_mut().poll_next_event(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(Some(event))) => Poll::Ready(Some(Ok(event))),
            Poll::Ready(Ok(None)) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Ready(Err(err)) => {
                this.finished = true;
                Poll::Ready(Some(Err(RunError::new(err))))
            }
        }
    }
}
