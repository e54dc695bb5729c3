mod analysis;
mod config;
mod errors;
mod llm_provider;
mod metrics;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::workflow::AnalysisWorkflow;
use crate::config::{Config, ProviderKind};
use crate::llm_provider::gemini::GeminiProvider;
use crate::llm_provider::ollama::OllamaProvider;
use crate::llm_provider::LlmProvider;
use crate::metrics::{LogMetricsSink, MetricsSink};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HR Filter API v{}", env!("CARGO_PKG_VERSION"));

    // Construct the LLM provider once from explicit config — no ambient
    // provider state anywhere else in the process.
    let provider = build_provider(&config)?;
    info!(
        "LLM provider initialized: {} (model: {})",
        provider.provider_name(),
        provider.model_name()
    );

    let metrics: Arc<dyn MetricsSink> = Arc::new(LogMetricsSink);
    let workflow = Arc::new(AnalysisWorkflow::new(provider, metrics));

    let state = AppState {
        workflow,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the configured LLM provider backend.
fn build_provider(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    Ok(match config.provider {
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(
            config.ollama_host.clone(),
            config.model.clone(),
        )),
        ProviderKind::Gemini => {
            let api_key = config.google_api_key.clone().ok_or_else(|| {
                anyhow::anyhow!("GOOGLE_API_KEY is required for the gemini provider")
            })?;
            Arc::new(GeminiProvider::new(api_key, config.model.clone()))
        }
    })
}
