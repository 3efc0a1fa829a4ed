use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

mod auth;
mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod models;
mod routes;
mod services;

use auth::rate_limit::RateLimiter;
use config::Config;
use services::{analyzer::TrainingAnalyzer, coach::CoachClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub coach: CoachClient,
    pub analyzer: TrainingAnalyzer,
    pub rate_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trainlog_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::create_pool(&config).await?;
    db::run_migrations(&db).await?;
    tracing::info!("Database migrations applied");

    let rate_limiter = RateLimiter::new();
    auth::rate_limit::spawn_prune_worker(rate_limiter.clone());

    let state = AppState {
        db,
        coach: CoachClient::new(&config)?,
        analyzer: TrainingAnalyzer::new(&config)?,
        config: config.clone(),
        rate_limiter,
    };

    let app = routes::build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Starting server on {}", addr);

    // Client IPs feed the auth rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
