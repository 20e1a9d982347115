mod config;
mod security;

use std::net::SocketAddr;
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use travelog_api::storage::ImageStore;
use travelog_api::token::TokenService;
use travelog_api::{AppState, AppStateInner};
use travelog_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travelog_server=debug,travelog_api=debug,travelog_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting in {:?} mode", config.environment);

    // Init database and image storage
    let db = Database::open(&config.db_path)?;
    let images = ImageStore::new(config.uploads_dir.clone()).await?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        tokens: TokenService::new(&config.token_secret),
        images,
        public_url: config.public_url.clone(),
    });

    let mut app = travelog_api::router(state.clone())
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .nest_service("/assets", ServeDir::new(&config.assets_dir));

    for layer in security::layers(config.environment) {
        app = app.layer(layer);
    }

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Travelog backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router has been dropped, so this is normally the last reference
    match Arc::try_unwrap(state) {
        Ok(inner) => inner.db.close()?,
        Err(_) => warn!("Database still referenced at shutdown; skipping explicit close"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
