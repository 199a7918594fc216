#[macro_use]
extern crate tracing;

use std::process::ExitCode;
use std::sync::Arc;

use agent_api::agents::{ProviderBuilders, verify_model_catalog};
use agent_api::api::{AppState, router};
use agent_api::settings::Settings;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(err) = verify_model_catalog() {
        error!("{err}");
        return ExitCode::FAILURE;
    }
    let settings = match Settings::from_env() {
        Ok(settings) => Arc::new(settings),
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    debug!("settings: {settings:?}");
    if settings.openai.api_key().is_none() {
        warn!("OPENAI_API_KEY is not set, OpenAI models are unavailable");
    }
    if settings.groq.api_key().is_none() {
        warn!("GROQ_API_KEY is not set, Groq models are unavailable");
    }

    let builders = Arc::new(ProviderBuilders::new(settings.clone()));
    let app = router(AppState::new(builders, settings.debug_mode));

    let listener = match TcpListener::bind(settings.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {err}", settings.addr);
            return ExitCode::FAILURE;
        }
    };
    info!("listening on {}", settings.addr);

    let serve = axum::serve(listener, app).with_graceful_shutdown(async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
        info!("shutting down");
    });
    if let Err(err) = serve.await {
        error!("server error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
