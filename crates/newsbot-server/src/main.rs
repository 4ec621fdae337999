mod configuration;
mod error;
mod routes;
mod state;

use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::configuration::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A local .env file is optional
    dotenv::dotenv().ok();

    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr()?;
    let cors_origin: HeaderValue = settings.server.cors_origin.parse()?;
    info!(
        provider = %settings.provider.provider_type(),
        "starting newsbot server"
    );

    let state = AppState::from_settings(settings)?;

    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
