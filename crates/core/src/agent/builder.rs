use agent_api_model::ModelProvider;

use super::Agent;
use crate::model_client::ModelClient;

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    name: Option<String>,
    instructions: Option<String>,
    user_id: Option<String>,
    session_id: Option<String>,
    debug_mode: bool,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            name: None,
            instructions: None,
            user_id: None,
            session_id: None,
            debug_mode: false,
        }
    }

    /// Sets the display name of the agent.
    #[inline]
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the system instructions for the agent.
    #[inline]
    pub fn with_instructions<S: Into<String>>(
        mut self,
        instructions: S,
    ) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Sets the user the agent runs on behalf of.
    #[inline]
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Sets the session the agent belongs to.
    #[inline]
    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    /// Enables or disables debug logging of requests and responses.
    #[inline]
    pub fn debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        let AgentBuilder {
            model_client,
            name,
            instructions,
            user_id,
            session_id,
            debug_mode,
        } = self;

        Agent {
            name: name.unwrap_or_else(|| "agent".to_owned()),
            instructions,
            model_client,
            user_id,
            session_id,
            debug_mode,
        }
    }
}
