use anyhow::Context;
use clap::Args;
use std::sync::Arc;

use crate::app::{app, AppState};
use crate::config;
use crate::database::{DatabaseManager, MemoryStore, PgStore};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep all data in process memory instead of PostgreSQL")]
    pub in_memory: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting Folio API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; bearer tokens will be rejected");
    }
    if config.security.shared_secret.is_none() {
        tracing::warn!("SHARED_SECRET is not set; shared-secret access is disabled");
    }
    if crate::is_production!() && config.security.jwt_secret.is_none() && config.security.shared_secret.is_none() {
        anyhow::bail!("refusing to start in production without JWT_SECRET or SHARED_SECRET");
    }

    let state = if args.in_memory {
        tracing::info!("Using in-memory storage; data is lost on exit");
        AppState::from_config(Arc::new(MemoryStore::new()), config)
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        DatabaseManager::init_schema(&pool).await.context("failed to apply schema")?;
        AppState::from_config(Arc::new(PgStore::new(pool)), config)
    };

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Folio API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
