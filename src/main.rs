//! Multichat - multi-model AI chat sessions
//!
//! Serves one in-memory conversation session over HTTP. The session talks to a
//! single configured backend, lets the user switch between catalog models, and
//! keeps at most one request in flight.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod config;
mod conversation;
mod core;
mod providers;
mod routes;

#[cfg(test)]
mod testing;

use crate::catalog::ModelCatalog;
use crate::config::Config;
use crate::core::SessionController;
use crate::providers::{AiProviderClient, Provider, ProviderReadiness};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionController>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multichat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let catalog = match config.catalog_path {
        Some(ref path) => ModelCatalog::from_file(path)?,
        None => ModelCatalog::builtin()?,
    };
    tracing::info!("📚 Loaded {} model(s)", catalog.len());

    let provider = Arc::new(Provider::from_config(&config)?);
    tracing::info!("🔌 Using {} backend", provider.name());

    let readiness = ProviderReadiness::poll(provider.clone(), config.readiness_interval());
    readiness.on_ready(|| tracing::info!("🤖 AI is ready"));

    let session = SessionController::new(
        Arc::new(catalog),
        AiProviderClient::new(provider),
        readiness,
        &config.default_model,
    )
    .with_system_prompt(config.system_prompt.clone());

    tracing::info!(
        session = %session.id(),
        model = %session.selected_model().await.id,
        "Session started"
    );

    let state = AppState {
        config,
        session: Arc::new(session),
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("🔥 Multichat API running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
