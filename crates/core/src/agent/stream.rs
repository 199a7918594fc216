use std::pin::Pin;
use std::task::{Context, Poll};

use agent_api_model::{ModelRequest, ModelResponseEvent};
use futures_util::stream::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span};

use crate::RunError;
use crate::model_client::ModelClient;

// Fragments the producer may run ahead of the consumer.
const CHANNEL_CAPACITY: usize = 32;

/// The answer of a streaming run, as a stream of text fragments.
///
/// The fragments are produced by a background task and delivered in
/// order. If the run fails, the stream yields the error and ends.
/// Dropping the stream aborts the background task.
pub struct RunStream {
    rx: mpsc::Receiver<Result<String, RunError>>,
    pub(super) task: JoinHandle<()>,
}

impl RunStream {
    pub(crate) fn spawn(
        model_client: ModelClient,
        request: ModelRequest,
        span: Span,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task =
            tokio::spawn(produce(model_client, request, tx).instrument(span));
        Self { rx, task }
    }
}

async fn produce(
    model_client: ModelClient,
    request: ModelRequest,
    tx: mpsc::Sender<Result<String, RunError>>,
) {
    let mut events = match model_client.send_request(request).await {
        Ok(events) => events,
        Err(err) => {
            tx.send(Err(err)).await.ok();
            return;
        }
    };

    let mut fragments = 0usize;
    while let Some(event) = events.next().await {
        match event {
            Ok(ModelResponseEvent::MessageDelta(delta)) => {
                fragments += 1;
                if tx.send(Ok(delta)).await.is_err() {
                    debug!("consumer has gone, stop streaming");
                    return;
                }
            }
            Ok(ModelResponseEvent::Completed(reason)) => {
                trace!("model completed: {reason:?}");
            }
            Ok(ModelResponseEvent::ReasoningDelta(_)) => {}
            Err(err) => {
                warn!("run failed after {fragments} fragments: {err}");
                tx.send(Err(err)).await.ok();
                return;
            }
        }
    }
    debug!("streamed {fragments} fragments");
}

impl Stream for RunStream {
    type Item = Result<String, RunError>;

    #[inline]
    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for RunStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}
