//! The HTTP interface.

mod agents;
mod error;
mod health;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::agents::AgentBuilders;
pub use agents::RunRequest;
pub use error::ApiError;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    builders: Arc<dyn AgentBuilders>,
    debug_mode: bool,
}

impl AppState {
    /// Creates the state from the agent builders and the debug flag agents
    /// are constructed with.
    #[inline]
    pub fn new(builders: Arc<dyn AgentBuilders>, debug_mode: bool) -> Self {
        Self {
            builders,
            debug_mode,
        }
    }
}

/// Creates the router serving the agent endpoints and the health check.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/agents", get(agents::list_agents))
        .route("/agents/models", get(agents::list_models))
        .route("/agents/:agent_id/runs", post(agents::run_agent))
        .route("/health", get(health::health))
        .with_state(state)
}
