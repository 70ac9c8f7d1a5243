use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use wellness_db::format_timestamp;
use wellness_types::api::{ChallengeActionRequest, CompleteChallengeResponse, MessageResponse};
use wellness_types::catalog::{self, ChallengeDefinition};
use wellness_types::models::{POINTS_PER_CHALLENGE, UserProfile};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::{AppState, run_blocking};

pub async fn list_challenges() -> Json<&'static [ChallengeDefinition]> {
    Json(catalog::all())
}

pub async fn get_challenge(
    Path(challenge_id): Path<u32>,
) -> Result<Json<&'static ChallengeDefinition>, ApiError> {
    lookup(challenge_id).map(Json)
}

/// Open an attempt. A second start while one is still open is a conflict;
/// starting again after completing opens a fresh attempt.
pub async fn start_challenge(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
    JsonBody(req): JsonBody<ChallengeActionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let challenge = lookup(req.challenge_id)?;

    let id = Uuid::new_v4().to_string();
    let user_id = user.id.to_string();
    let challenge_id = i64::from(challenge.id);
    let started_at = format_timestamp(Utc::now());

    let started = run_blocking(&state, move |db| {
        db.start_challenge(&id, &user_id, challenge_id, &started_at)
    })
    .await?;

    if !started {
        return Err(ApiError::Conflict("Challenge already in progress".into()));
    }

    debug!(user_id = %user.id, challenge_id, "Challenge started");
    Ok(Json(MessageResponse::new("Challenge started successfully")))
}

/// Close the open attempt. Completing a challenge that was never started (or
/// is already completed) is rejected and changes nothing.
pub async fn complete_challenge(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
    JsonBody(req): JsonBody<ChallengeActionRequest>,
) -> Result<Json<CompleteChallengeResponse>, ApiError> {
    let challenge = lookup(req.challenge_id)?;

    let user_id = user.id.to_string();
    let challenge_id = i64::from(challenge.id);
    let completed_at = format_timestamp(Utc::now());

    let completed = run_blocking(&state, move |db| {
        db.complete_challenge(&user_id, challenge_id, &completed_at, POINTS_PER_CHALLENGE)
    })
    .await?;

    if !completed {
        return Err(ApiError::NotFound(
            "Challenge not found or already completed".into(),
        ));
    }

    debug!(user_id = %user.id, challenge_id, "Challenge completed");
    Ok(Json(CompleteChallengeResponse {
        message: "Challenge completed successfully".into(),
        points_earned: POINTS_PER_CHALLENGE,
    }))
}

fn lookup(challenge_id: u32) -> Result<&'static ChallengeDefinition, ApiError> {
    catalog::find(challenge_id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown challenge {challenge_id}")))
}
