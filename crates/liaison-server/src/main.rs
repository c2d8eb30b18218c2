mod routes;
mod state;

use anyhow::Context;
use liaison::config::Settings;
use liaison::notify::notifier_from;
use liaison::persona::Persona;
use liaison::providers::factory::get_provider;
use liaison::systems::{LeadCaptureSystem, ToolRegistry};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new().context("Failed to load settings")?;
    let persona = Persona::from_settings(Settings::require(&settings.persona, "persona")?)
        .context("Failed to load persona documents")?;

    let notifier = notifier_from(settings.pushover.clone())?;
    let registry = ToolRegistry::new().with_system(LeadCaptureSystem::new(notifier))?;

    let model = settings.provider.model().to_string();
    let provider = get_provider(settings.provider.clone().into_config())?;
    let agent = persona
        .representative(provider, &model, registry)?
        .with_limits(settings.agent.limits());
    info!(persona = %persona.name, %model, "Representative ready");

    let state = state::AppState {
        agent: Arc::new(agent),
    };

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
