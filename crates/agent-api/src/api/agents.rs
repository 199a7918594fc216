use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use mime::Mime;
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::agents::{
    AgentType, Model, ModelInfo, get_agent, get_available_agents,
    get_available_models,
};

/// Body of a run request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RunRequest {
    /// The message to send to the agent.
    pub message: String,
    /// Whether to stream the answer as it is generated.
    #[serde(default = "default_stream")]
    pub stream: bool,
    /// The model backing the agent.
    #[serde(default)]
    pub model: Model,
    /// The user the run is made on behalf of.
    #[serde(default)]
    pub user_id: Option<String>,
    /// The session the run belongs to.
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_stream() -> bool {
    true
}

pub(super) async fn list_agents() -> Json<Vec<&'static str>> {
    Json(get_available_agents())
}

pub(super) async fn list_models() -> Json<&'static [ModelInfo]> {
    Json(get_available_models())
}

pub(super) async fn run_agent(
    State(state): State<AppState>,
    agent_id: Result<Path<AgentType>, PathRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    // The path is checked first, so an unknown agent is rejected even if
    // the body is invalid too.
    let Path(agent_id) =
        agent_id.map_err(|err| ApiError::Validation(err.body_text()))?;
    let body = body.map_err(|err| ApiError::Validation(err.body_text()))?;
    let body = parse_run_request(&headers, &body)?;
    debug!("run request for {agent_id}: {body:?}");

    let agent = get_agent(
        state.builders.as_ref(),
        body.model.id(),
        agent_id,
        body.user_id,
        body.session_id,
        state.debug_mode,
    )
    .map_err(|err| ApiError::NotFound(format!("Agent not found: {err}")))?;

    if body.stream {
        let stream = agent.run_stream(&body.message);
        let headers = [(header::CONTENT_TYPE, "text/event-stream")];
        return Ok((headers, Body::from_stream(stream)).into_response());
    }

    let resp = agent
        .run(&body.message)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Json(resp.content).into_response())
}

/// Parses a run request body as JSON.
///
/// A body without a content type is still read as JSON. A body declaring
/// any other type than JSON is rejected.
fn parse_run_request(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<RunRequest, ApiError> {
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        let is_json = content_type
            .to_str()
            .ok()
            .and_then(|v| v.parse::<Mime>().ok())
            .is_some_and(|m| {
                m.type_() == mime::APPLICATION
                    && (m.subtype() == mime::JSON
                        || m.suffix() == Some(mime::JSON))
            });
        if !is_json {
            return Err(ApiError::Validation(
                "Expected request with `Content-Type: application/json`"
                    .to_owned(),
            ));
        }
    }
    let Json(req) = Json::<RunRequest>::from_bytes(body)
        .map_err(|err| ApiError::Validation(err.body_text()))?;
    Ok(req)
}
