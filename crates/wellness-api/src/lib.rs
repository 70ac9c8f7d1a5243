pub mod auth;
pub mod challenges;
pub mod error;
pub mod extract;
pub mod health;
pub mod middleware;
pub mod moods;
pub mod progress;
pub mod stats;
pub mod users;

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tracing::error;

use wellness_db::Database;

use crate::middleware::require_auth;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
}

impl AppStateInner {
    pub fn new(db: Database, auth: AuthConfig) -> AppState {
        Arc::new(Self { db, auth })
    }
}

/// All API routes. CORS and tracing layers are added by the server binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/users", get(users::list_users))
        .route("/api/challenges", get(challenges::list_challenges))
        .route("/api/challenges/{challenge_id}", get(challenges::get_challenge));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/mood/save", post(moods::save_mood))
        .route("/api/mood/history", get(moods::mood_history))
        .route("/api/challenge/start", post(challenges::start_challenge))
        .route("/api/challenge/complete", post(challenges::complete_challenge))
        .route("/api/progress", get(progress::get_progress))
        .route("/api/stats", get(stats::get_stats))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Run a store call off the async runtime.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow!("store task failed: {}", e)
        })?
}
