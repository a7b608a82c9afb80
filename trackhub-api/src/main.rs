//! # TrackHub API Server
//!
//! HTTP API for projects, their tasks and comment threads. Serves the task
//! view with per-request deadline urgency and two-tier access checks.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/trackhub JWT_SECRET=... cargo run -p trackhub-api
//! ```

use trackhub_api::{
    app::{build_router, AppState},
    config::Config,
};
use trackhub_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TrackHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    tracing::info!(
        utc_offset_minutes = config.deadline.utc_offset_minutes,
        production = config.api.production,
        "Configuration loaded"
    );

    let pool = create_pool(config.pool_config()).await?;
    run_migrations(&pool).await?;

    let address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
