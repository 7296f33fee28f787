use gemini_relay::config::Config;
use gemini_relay::conversation::ConversationStore;
use gemini_relay::gateway::LlmGateway;
use gemini_relay::llm::GeminiClient;
use gemini_relay::routes::configure_routes;
use gemini_relay::state::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    config.log_summary();

    let client = GeminiClient::new(
        config.gemini.api_key.expose(),
        config.gemini.model.clone(),
        config.gemini.base_url.clone(),
    )?;
    let gateway = LlmGateway::new(client)
        .with_config(config.gemini.generation.clone())
        .with_system(config.gemini.system_prompt.clone());

    let state = AppState::new(ConversationStore::new(config.eviction.clone()), gateway);
    let routes = configure_routes(state);

    let addr = config.bind_addr();
    info!("Starting server on http://{}", addr);
    warp::serve(routes).run(addr).await;

    Ok(())
}
