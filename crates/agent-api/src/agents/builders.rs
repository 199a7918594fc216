use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use agent_api_core::Agent;
use agent_api_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use reqwest::Client;

use super::{
    ModelProvider, build_sage_agent, build_scholar_agent, get_model_provider,
};
use crate::settings::Settings;

/// Parameters an agent is constructed with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentParams {
    /// The model backing the agent.
    pub model_id: String,
    /// The user the agent runs on behalf of.
    pub user_id: Option<String>,
    /// The session the agent belongs to.
    pub session_id: Option<String>,
    /// Whether the agent logs its requests and responses.
    pub debug_mode: bool,
}

/// Error returned when an agent cannot be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// No API key is configured for the provider serving the model.
    MissingCredentials {
        /// The provider lacking credentials.
        provider: ModelProvider,
    },
    /// The agent is unavailable for another reason.
    Unavailable(String),
}

impl Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingCredentials { provider } => {
                write!(f, "no API key configured for {provider}")
            }
            BuildError::Unavailable(message) => f.write_str(message),
        }
    }
}

impl StdError for BuildError {}

/// Constructs each kind of agent.
///
/// The factory picks the builder; implementations decide where the model
/// behind the agent comes from.
pub trait AgentBuilders: Send + Sync {
    /// Builds a Sage agent.
    fn build_sage(&self, params: AgentParams) -> Result<Agent, BuildError>;

    /// Builds a Scholar agent.
    fn build_scholar(&self, params: AgentParams) -> Result<Agent, BuildError>;
}

/// Builds agents backed by the configured OpenAI-compatible providers.
///
/// All agents send their requests through one HTTP client.
#[derive(Clone, Debug)]
pub struct ProviderBuilders {
    settings: Arc<Settings>,
    client: Client,
}

impl ProviderBuilders {
    /// Creates builders reading credentials from `settings`.
    #[inline]
    pub fn new(settings: Arc<Settings>) -> Self {
        Self::with_client(settings, Client::new())
    }

    /// Creates builders reading credentials from `settings` and sending
    /// requests through `client`.
    #[inline]
    pub fn with_client(settings: Arc<Settings>, client: Client) -> Self {
        Self { settings, client }
    }

    fn model_provider(
        &self,
        model_id: &str,
    ) -> Result<OpenAIProvider, BuildError> {
        let provider = get_model_provider(model_id);
        let provider_settings = self.settings.provider(provider);
        let Some(api_key) = provider_settings.api_key() else {
            warn!("cannot serve `{model_id}`: {provider} has no API key");
            return Err(BuildError::MissingCredentials { provider });
        };
        let config = OpenAIConfigBuilder::with_api_key(api_key)
            .with_model(model_id)
            .with_base_url(provider_settings.base_url())
            .build();
        debug!("using {provider} for `{model_id}`");
        Ok(OpenAIProvider::with_client(config, self.client.clone()))
    }
}

impl AgentBuilders for ProviderBuilders {
    fn build_sage(&self, params: AgentParams) -> Result<Agent, BuildError> {
        let provider = self.model_provider(&params.model_id)?;
        Ok(build_sage_agent(provider, params))
    }

    fn build_scholar(&self, params: AgentParams) -> Result<Agent, BuildError> {
        let provider = self.model_provider(&params.model_id)?;
        Ok(build_scholar_agent(provider, params))
    }
}
