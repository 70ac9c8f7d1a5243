mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use wellness_api::{AppStateInner, AuthConfig};
use wellness_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wellness=debug,wellness_api=debug,wellness_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;

    let state = AppStateInner::new(
        db,
        AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
            token_ttl: config.token_ttl,
        },
    );

    let app = wellness_api::router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = config.bind().await?;
    info!("Wellness API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database");
    match Arc::try_unwrap(state) {
        Ok(state) => state.db.close()?,
        // Connection is closed when the last reference drops.
        Err(_) => warn!("Application state still shared after shutdown"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
