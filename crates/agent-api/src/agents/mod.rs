//! Agent construction: the catalog of agents and models, and the factory
//! that turns a request into an [`Agent`].

mod builders;
mod catalog;
mod sage;
mod scholar;

use std::error::Error as StdError;
use std::fmt::{self, Display};

use agent_api_core::Agent;

pub use builders::{AgentBuilders, AgentParams, BuildError, ProviderBuilders};
pub use catalog::*;
pub use sage::build_sage_agent;
pub use scholar::build_scholar_agent;

/// Error returned by [`get_agent`] and [`get_agent_by_id`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactoryError {
    /// The agent identifier names no known agent type.
    UnknownAgent(String),
    /// The selected builder failed.
    Build(BuildError),
}

impl Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryError::UnknownAgent(id) => write!(f, "unknown agent `{id}`"),
            FactoryError::Build(err) => Display::fmt(err, f),
        }
    }
}

impl StdError for FactoryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            FactoryError::UnknownAgent(_) => None,
            FactoryError::Build(err) => Some(err),
        }
    }
}

impl From<BuildError> for FactoryError {
    #[inline]
    fn from(err: BuildError) -> Self {
        FactoryError::Build(err)
    }
}

/// Constructs an agent of the given type.
///
/// The parameters are forwarded unchanged to the builder of `agent_id`,
/// which is invoked exactly once. `model_id` is not checked against the
/// catalog.
pub fn get_agent<B>(
    builders: &B,
    model_id: &str,
    agent_id: AgentType,
    user_id: Option<String>,
    session_id: Option<String>,
    debug_mode: bool,
) -> Result<Agent, FactoryError>
where
    B: AgentBuilders + ?Sized,
{
    let params = AgentParams {
        model_id: model_id.to_owned(),
        user_id,
        session_id,
        debug_mode,
    };
    debug!("building {agent_id} agent: {params:?}");
    let agent = match agent_id {
        AgentType::Sage => builders.build_sage(params)?,
        AgentType::Scholar => builders.build_scholar(params)?,
    };
    Ok(agent)
}

/// Like [`get_agent`], but takes the agent identifier as a string.
///
/// Fails with [`FactoryError::UnknownAgent`] without invoking any builder
/// if `agent_id` names no agent type.
pub fn get_agent_by_id<B>(
    builders: &B,
    model_id: &str,
    agent_id: &str,
    user_id: Option<String>,
    session_id: Option<String>,
    debug_mode: bool,
) -> Result<Agent, FactoryError>
where
    B: AgentBuilders + ?Sized,
{
    let Ok(agent_type) = agent_id.parse::<AgentType>() else {
        warn!("refusing to build unknown agent `{agent_id}`");
        return Err(FactoryError::UnknownAgent(agent_id.to_owned()));
    };
    get_agent(
        builders, model_id, agent_type, user_id, session_id, debug_mode,
    )
}
