use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::warn;

use wellness_types::api::{HealthResponse, MessageResponse};

use crate::{AppState, run_blocking};

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Daily Wellness API is running"))
}

/// Pings the store. A failed ping triggers one reconnect attempt before the
/// service is reported unhealthy.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let result = run_blocking(&state, |db| {
        if let Err(e) = db.ping() {
            warn!("Database ping failed, reconnecting: {:#}", e);
            db.reconnect()?;
            db.ping()?;
        }
        Ok(())
    })
    .await;

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".into(),
                database: "connected".into(),
                error: None,
                timestamp: Utc::now(),
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".into(),
                database: "disconnected".into(),
                error: Some(e.to_string()),
                timestamp: Utc::now(),
            }),
        ),
    }
}
