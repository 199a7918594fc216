use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use agent_api_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
};
use tokio::time::{Sleep, sleep};

#[derive(Debug)]
struct EchoModelProviderError(ErrorKind);

impl Display for EchoModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for EchoModelProviderError {}

impl ModelProviderError for EchoModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug)]
struct EchoModelResponse {
    words: VecDeque<String>,
    completed: bool,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl EchoModelResponse {
    fn new(input: &str) -> Self {
        let words = format!("You said {input}")
            .split(' ')
            .map(ToString::to_string)
            .collect();
        Self {
            words,
            completed: false,
            sleep: None,
        }
    }
}

impl ModelResponse for EchoModelResponse {
    type Error = EchoModelProviderError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };
        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;

            if let Some(mut word) = this.words.pop_front() {
                if !this.words.is_empty() {
                    word.push(' ');
                }
                return Poll::Ready(Ok(Some(
                    ModelResponseEvent::MessageDelta(word),
                )));
            }
            if !this.completed {
                this.completed = true;
                return Poll::Ready(Ok(Some(ModelResponseEvent::Completed(
                    ModelFinishReason::Stop,
                ))));
            }
            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(Duration::from_millis(1))));
        Pin::new(this).poll_next_event(cx)
    }
}

struct EchoModelProvider;

impl ModelProvider for EchoModelProvider {
    type Error = EchoModelProviderError;
    type Response = EchoModelResponse;

    fn model_id(&self) -> &str {
        "echo"
    }

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let result = 'blk: {
            let Some(last) = req.messages.last() else {
                break 'blk Err(EchoModelProviderError(ErrorKind::Other));
            };
            let ModelMessage::User(content) = last else {
                break 'blk Err(EchoModelProviderError(ErrorKind::Moderated));
            };
            Ok(EchoModelResponse::new(content))
        };
        ready(result)
    }
}

mod tests {
    use std::future::poll_fn;

    use super::*;

    #[tokio::test]
    async fn test_completion() {
        let provider = EchoModelProvider;
        let req = ModelRequest {
            messages: vec![
                ModelMessage::System("Be brief.".to_string()),
                ModelMessage::User("Good morning".to_string()),
            ],
            user: None,
        };
        let mut resp = provider.send_request(&req).await.unwrap();

        let mut resp_message = String::new();
        let mut finish_reason = None;
        loop {
            let resp_fut =
                poll_fn(|cx| Pin::new(&mut resp).poll_next_event(cx));
            match resp_fut.await {
                Ok(Some(event)) => match event {
                    ModelResponseEvent::MessageDelta(delta) => {
                        resp_message.push_str(&delta);
                    }
                    ModelResponseEvent::Completed(reason) => {
                        finish_reason = Some(reason);
                    }
                    _ => unreachable!("unexpected event: {event:?}"),
                },
                Ok(None) => break,
                Err(err) => unreachable!("unexpected error: {err:?}"),
            }
        }

        assert_eq!(resp_message, "You said Good morning");
        assert_eq!(finish_reason, Some(ModelFinishReason::Stop));
    }

    #[tokio::test]
    async fn test_error() {
        let provider = EchoModelProvider;
        let req = ModelRequest::default();
        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);

        let req = ModelRequest {
            messages: vec![ModelMessage::System("Hi".to_string())],
            user: None,
        };
        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Moderated);
    }
}
