use std::path::Path;
use std::sync::Arc;

use leadbot::config::EngineConfig;
use leadbot::engine::Engine;
use leadbot::llm::{LlmBackend, LlmConfig, create_provider};
use leadbot::routes::{ApiState, api_routes};
use leadbot::sink::{LeadSink, LibSqlLeadSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = EngineConfig::from_env()?;

    // Pick the backend from whichever API key is present.
    let (backend, api_key, default_model) = if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
        (LlmBackend::Anthropic, key, "claude-sonnet-4-20250514")
    } else if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        (LlmBackend::OpenAi, key, "gpt-4o")
    } else {
        eprintln!("Error: neither ANTHROPIC_API_KEY nor OPENAI_API_KEY is set");
        eprintln!("  export ANTHROPIC_API_KEY=sk-ant-...");
        std::process::exit(1);
    };

    let model = std::env::var("LEADBOT_MODEL").unwrap_or_else(|_| default_model.to_string());

    let port: u16 = std::env::var("LEADBOT_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let db_path =
        std::env::var("LEADBOT_DB_PATH").unwrap_or_else(|_| "./data/leadbot.db".to_string());

    eprintln!("🤖 Leadbot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", model);
    eprintln!("   Wizard API: http://0.0.0.0:{}/api/wizard/chat", port);
    eprintln!("   Demo API: http://0.0.0.0:{}/api/demo/chat", port);
    eprintln!("   Demo limit: {} messages/session", config.demo_message_limit);
    eprintln!("   Leads DB: {}\n", db_path);

    let llm = create_provider(&LlmConfig {
        backend,
        api_key: secrecy::SecretString::from(api_key),
        model,
        timeout: config.provider_timeout,
    })?;

    let sink: Arc<dyn LeadSink> = Arc::new(LibSqlLeadSink::new_local(Path::new(&db_path)).await?);

    let engine = Arc::new(Engine::new(llm, sink, config));
    let app = api_routes(ApiState { engine });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "lead engine listening");
    axum::serve(listener, app).await?;

    Ok(())
}
