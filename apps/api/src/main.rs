mod config;
mod content;
mod db;
mod errors;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::content::edit_mode::EditSession;
use crate::content::storage::{ContentStorage, MemoryStorage, PgContentStorage};
use crate::content::sync::{build_content_sync, ContentSync};
use crate::content::Portfolio;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Durable storage
    let storage: Arc<dyn ContentStorage> = match &config.database_url {
        Some(url) => Arc::new(PgContentStorage::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; content edits will not survive a restart");
            Arc::new(MemoryStorage::new())
        }
    };

    // Content sync (S3 / Redis / disabled)
    let sync: Arc<dyn ContentSync> = Arc::from(build_content_sync(&config.sync).await?);

    // Materialize every section from storage or defaults
    let portfolio = Portfolio::load(storage, sync).await;
    info!("Portfolio content loaded");

    let state = AppState {
        portfolio: Arc::new(portfolio),
        session: Arc::new(EditSession::new()),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the portfolio domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
