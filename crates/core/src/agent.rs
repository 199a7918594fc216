mod builder;
mod stream;

use std::fmt::{self, Debug};

use agent_api_model::{ModelFinishReason, ModelMessage, ModelRequest};
use tracing::Instrument;

use crate::RunError;
use crate::model_client::ModelClient;
pub use builder::AgentBuilder;
pub use stream::RunStream;

/// An agent instance, which pairs a model provider with the instructions
/// that shape its answers.
///
/// The agent keeps no conversation state between runs. Every run sends
/// the instructions and the given message as a fresh conversation.
pub struct Agent {
    name: String,
    instructions: Option<String>,
    model_client: ModelClient,
    user_id: Option<String>,
    session_id: Option<String>,
    debug_mode: bool,
}

/// The complete result of a non-streaming run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResponse {
    /// The text answer.
    pub content: String,
    /// The reasoning the model produced before answering, if it exposes
    /// any.
    pub reasoning: Option<String>,
    /// Why the model stopped generating.
    pub finish_reason: Option<ModelFinishReason>,
}

impl Agent {
    /// Returns the name of the agent.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identifier of the model backing the agent.
    #[inline]
    pub fn model_id(&self) -> &str {
        self.model_client.model_id()
    }

    /// Returns the user this agent runs on behalf of.
    #[inline]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the session this agent belongs to.
    #[inline]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns whether debug logging is enabled for this agent.
    #[inline]
    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Runs the agent with the message and waits for the full answer.
    pub async fn run(&self, message: &str) -> Result<RunResponse, RunError> {
        let request = self.build_model_request(message);
        let span = self.run_span();
        async {
            if self.debug_mode {
                debug!("run request: {request:?}");
            }
            let resp =
                self.model_client.send_request_and_collect(request).await?;
            if self.debug_mode {
                debug!(
                    "run finished ({:?}): {} chars",
                    resp.finish_reason,
                    resp.transcript.len()
                );
            }
            Ok(RunResponse {
                content: resp.transcript,
                reasoning: resp.reasoning,
                finish_reason: resp.finish_reason,
            })
        }
        .instrument(span)
        .await
    }

    /// Runs the agent with the message, relaying the answer as it is
    /// generated.
    ///
    /// The returned stream yields the text fragments of the answer in the
    /// order the model produces them. Other outputs of the model, such as
    /// its reasoning, are not relayed. Dropping the stream cancels the run.
    ///
    /// This method must be called within a Tokio runtime.
    pub fn run_stream(&self, message: &str) -> RunStream {
        let request = self.build_model_request(message);
        if self.debug_mode {
            debug!(agent = %self.name, "run request (streaming): {request:?}");
        }
        RunStream::spawn(self.model_client.clone(), request, self.run_span())
    }

    fn build_model_request(&self, message: &str) -> ModelRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(instructions) = &self.instructions {
            messages.push(ModelMessage::System(instructions.clone()));
        }
        messages.push(ModelMessage::User(message.to_owned()));
        ModelRequest {
            messages,
            user: self.user_id.clone(),
        }
    }

    fn run_span(&self) -> tracing::Span {
        debug_span!(
            "agent run",
            agent = %self.name,
            model = %self.model_id(),
            session_id = self.session_id.as_deref(),
        )
    }
}

impl Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model_id", &self.model_id())
            .field("user_id", &self.user_id)
            .field("session_id", &self.session_id)
            .field("debug_mode", &self.debug_mode)
            .finish_non_exhaustive()
    }
}
