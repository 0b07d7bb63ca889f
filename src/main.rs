//! Family 100 - multi-answer trivia game for group chats
//!
//! Runs one game state machine per chat, judges free-text guesses with an
//! LLM answer oracle, and exposes the chat transport over HTTP.

mod api;
mod game;
mod llm;
mod oracle;
mod router;
mod runtime;
mod state_machine;
mod store;

use api::{create_router, AppState};
use game::QuestionBank;
use llm::LlmConfig;
use oracle::{LlmOracle, DEFAULT_ORACLE_TIMEOUT};
use router::CommandTokens;
use runtime::RuntimeManager;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use store::InMemorySessionStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "family100=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let oracle_timeout = std::env::var("ORACLE_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map_or(DEFAULT_ORACLE_TIMEOUT, Duration::from_secs);

    // Load question corpus
    let questions = match std::env::var("FAMILY100_QUESTIONS") {
        Ok(path) => {
            tracing::info!(path = %path, "Loading questions");
            QuestionBank::from_path(&path)?
        }
        Err(_) => QuestionBank::embedded()?,
    };
    tracing::info!(count = questions.len(), "Question bank ready");

    // Initialize answer oracle
    let llm_config = LlmConfig::from_env();
    let service = llm_config.build_service()?;
    tracing::info!(
        model = %service.model_id(),
        timeout_secs = oracle_timeout.as_secs(),
        "Answer oracle initialized"
    );
    let oracle = Arc::new(LlmOracle::new(service, oracle_timeout));

    let tokens = CommandTokens::from_env();
    tracing::info!(start = %tokens.start, resign = %tokens.resign, "Command tokens");

    let runtime = Arc::new(RuntimeManager::new(
        Arc::new(InMemorySessionStore::new()),
        oracle,
        Arc::new(questions),
        tokens,
    ));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(runtime))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Family 100 server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
