//! Demo HTTP server for project-forge.
//!
//! Run with: cargo run -p web-server-demo
//!
//! Set `FORGE_OLLAMA_URL=http://localhost:11434` to enable `/instruct`.

mod config;

use std::sync::Arc;

use project_forge_executor::LlmClient;
use project_forge_session::{ProjectService, storage::MemoryStorage};
use project_forge_transport::http::{AppState, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let service = Arc::new(ProjectService::new(MemoryStorage::new()));
    let mut state = AppState::new(service);
    if let Some(llm) = build_llm(&config)? {
        state = state.with_llm(llm);
    }

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "ollama")]
fn build_llm(config: &ServerConfig) -> anyhow::Result<Option<Arc<dyn LlmClient>>> {
    use project_forge_executor::llm::{OllamaClient, OllamaConfig};

    let Some(base_url) = config.ollama_url.clone() else {
        tracing::info!("No model configured, /instruct disabled");
        return Ok(None);
    };

    tracing::info!(url = %base_url, model = %config.model, "Using Ollama");
    let client: Arc<dyn LlmClient> = Arc::new(OllamaClient::new(OllamaConfig {
        base_url,
        model: config.model.clone(),
        ..OllamaConfig::default()
    })?);
    Ok(Some(client))
}

#[cfg(not(feature = "ollama"))]
fn build_llm(config: &ServerConfig) -> anyhow::Result<Option<Arc<dyn LlmClient>>> {
    if config.ollama_url.is_some() {
        tracing::warn!("FORGE_OLLAMA_URL is set but the ollama feature is disabled");
    }
    Ok(None)
}
