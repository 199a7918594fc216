use agent_api_core::{Agent, AgentBuilder};

use super::AgentParams;

const NAME: &str = "Scholar";
const INSTRUCTIONS: &str = include_str!("./scholar_instructions.md");

/// Builds the Scholar agent on top of `provider`, which must serve the
/// model named by `params`.
pub fn build_scholar_agent<P>(provider: P, params: AgentParams) -> Agent
where
    P: agent_api_model::ModelProvider + 'static,
{
    AgentBuilder::with_model_provider(provider)
        .with_name(NAME)
        .with_instructions(INSTRUCTIONS.trim_end())
        .with_user_id(params.user_id)
        .with_session_id(params.session_id)
        .debug_mode(params.debug_mode)
        .build()
}
