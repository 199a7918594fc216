use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use agent_api::agents::{
    AgentBuilders, AgentParams, AgentType, BuildError, ModelProvider,
    build_sage_agent, build_scholar_agent,
};
use agent_api::api::{AppState, router};
use agent_api_core::Agent;
use agent_api_test_model::{PresetEvent, PresetResponse, TestModelProvider};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Builds agents on the fake model, answering every run with `preset`.
#[derive(Default)]
struct ScriptedBuilders {
    preset: PresetResponse,
    failure: Option<BuildError>,
    calls: Mutex<Vec<(AgentType, AgentParams)>>,
}

impl ScriptedBuilders {
    fn with_preset(preset: PresetResponse) -> Self {
        Self {
            preset,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(AgentType, AgentParams)> {
        self.calls.lock().unwrap().clone()
    }

    fn provider(
        &self,
        agent_type: AgentType,
        params: &AgentParams,
    ) -> Result<TestModelProvider, BuildError> {
        self.calls.lock().unwrap().push((agent_type, params.clone()));
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut provider = TestModelProvider::new(params.model_id.clone());
        provider.add_response(self.preset.clone());
        Ok(provider)
    }
}

impl AgentBuilders for ScriptedBuilders {
    fn build_sage(&self, params: AgentParams) -> Result<Agent, BuildError> {
        let provider = self.provider(AgentType::Sage, &params)?;
        Ok(build_sage_agent(provider, params))
    }

    fn build_scholar(&self, params: AgentParams) -> Result<Agent, BuildError> {
        let provider = self.provider(AgentType::Scholar, &params)?;
        Ok(build_scholar_agent(provider, params))
    }
}

async fn serve(builders: Arc<ScriptedBuilders>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(builders, false));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn post_run(
    addr: SocketAddr,
    agent: &str,
    body: Value,
) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/agents/{agent}/runs"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_list_agents() {
    let addr = serve(Arc::default()).await;
    let resp = reqwest::get(format!("http://{addr}/agents")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let agents: Value = resp.json().await.unwrap();
    assert_eq!(agents, json!(["sage", "scholar"]));
}

#[tokio::test]
async fn test_list_models() {
    let addr = serve(Arc::default()).await;
    let resp = reqwest::get(format!("http://{addr}/agents/models"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let models: Value = resp.json().await.unwrap();
    assert_eq!(
        models,
        json!([
            { "id": "gpt-4o", "provider": "openai" },
            { "id": "o3-mini", "provider": "openai" },
            { "id": "llama-3.3-70b-versatile", "provider": "groq" },
            { "id": "llama-3.3-8b-versatile", "provider": "groq" },
            { "id": "mixtral-8x7b-32768", "provider": "groq" },
        ])
    );
}

#[tokio::test]
async fn test_health() {
    let addr = serve(Arc::default()).await;
    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "status": "success" }));
}

#[tokio::test]
async fn test_run_without_streaming() {
    let builders = Arc::new(ScriptedBuilders::with_preset(
        PresetResponse::with_events([
            PresetEvent::ReasoningDelta("Greeting back.".to_owned()),
            PresetEvent::MessageDelta("Hello ".to_owned()),
            PresetEvent::MessageDelta("there!".to_owned()),
        ]),
    ));
    let addr = serve(builders.clone()).await;

    let resp = post_run(
        addr,
        "sage",
        json!({
            "message": "hello",
            "stream": false,
            "user_id": "user-1",
            "session_id": "session-1",
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content: Value = resp.json().await.unwrap();
    assert_eq!(content, json!("Hello there!"));

    assert_eq!(
        builders.calls(),
        vec![(
            AgentType::Sage,
            AgentParams {
                model_id: "gpt-4o".to_owned(),
                user_id: Some("user-1".to_owned()),
                session_id: Some("session-1".to_owned()),
                debug_mode: false,
            }
        )]
    );
}

#[tokio::test]
async fn test_run_with_streaming() {
    let fragments: Vec<String> = (0..200).map(|i| format!("{i};")).collect();
    let builders = Arc::new(ScriptedBuilders::with_preset(
        PresetResponse::with_deltas(fragments.iter().cloned()),
    ));
    let addr = serve(builders.clone()).await;

    let mut resp = post_run(
        addr,
        "scholar",
        json!({ "message": "count", "model": "llama-3.3-70b-versatile" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[reqwest::header::CONTENT_TYPE].clone();
    assert_eq!(content_type, "text/event-stream");

    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await.unwrap() {
        body.extend_from_slice(&chunk);
    }
    assert_eq!(String::from_utf8(body).unwrap(), fragments.concat());

    let calls = builders.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, AgentType::Scholar);
    assert_eq!(calls[0].1.model_id, "llama-3.3-70b-versatile");
}

#[tokio::test]
async fn test_unknown_agent_rejected() {
    let builders = Arc::new(ScriptedBuilders::default());
    let addr = serve(builders.clone()).await;

    let resp = post_run(addr, "bogus", json!({ "message": "hello" })).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].is_string());
    assert!(builders.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_body_rejected() {
    let builders = Arc::new(ScriptedBuilders::default());
    let addr = serve(builders.clone()).await;

    let resp = post_run(addr, "sage", json!({ "stream": false })).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = post_run(
        addr,
        "sage",
        json!({ "message": "hello", "model": "gpt-2" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].is_string());
    assert!(builders.calls().is_empty());
}

#[tokio::test]
async fn test_build_failure_is_not_found() {
    let builders = Arc::new(ScriptedBuilders {
        failure: Some(BuildError::MissingCredentials {
            provider: ModelProvider::OpenAI,
        }),
        ..Default::default()
    });
    let addr = serve(builders.clone()).await;

    let resp = post_run(addr, "sage", json!({ "message": "hello" })).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "detail": "Agent not found: no API key configured for openai" })
    );
    assert_eq!(builders.calls().len(), 1);
}

#[tokio::test]
async fn test_run_failure() {
    let builders = Arc::new(ScriptedBuilders::with_preset(
        PresetResponse::with_events([
            PresetEvent::MessageDelta("partial".to_owned()),
            PresetEvent::Failure("upstream went away".to_owned()),
        ]),
    ));
    let addr = serve(builders).await;

    let resp = post_run(
        addr,
        "scholar",
        json!({ "message": "hello", "stream": false }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "upstream went away (model error)");
}

#[tokio::test]
async fn test_stream_failure_breaks_body() {
    let builders = Arc::new(ScriptedBuilders::with_preset(
        PresetResponse::with_events([
            PresetEvent::MessageDelta("partial".to_owned()),
            PresetEvent::Failure("upstream went away".to_owned()),
        ]),
    ));
    let addr = serve(builders).await;

    let mut resp = post_run(addr, "sage", json!({ "message": "hello" })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let mut body = Vec::new();
    let mut broken = false;
    loop {
        match resp.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(_) => {
                broken = true;
                break;
            }
        }
    }
    assert_eq!(body, b"partial");
    assert!(broken, "body ended cleanly after a failed run");
}

#[tokio::test]
async fn test_body_without_content_type() {
    let builders = Arc::new(ScriptedBuilders::with_preset(
        PresetResponse::with_deltas(["Hi!"]),
    ));
    let addr = serve(builders.clone()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/agents/sage/runs");

    let resp = client
        .post(&url)
        .body(r#"{"message": "hello", "stream": false}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content: Value = resp.json().await.unwrap();
    assert_eq!(content, json!("Hi!"));

    let resp = client
        .post(&url)
        .header(reqwest::header::CONTENT_TYPE, "text/plain")
        .body(r#"{"message": "hello", "stream": false}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(builders.calls().len(), 1);
}
