use anyhow::{Context, anyhow};
use axum::{Extension, Json, extract::State};

use wellness_db::models::ProgressRow;
use wellness_db::parse_timestamp;
use wellness_types::api::{ActiveChallenge, CompletedChallenge, ProgressResponse};
use wellness_types::models::{ChallengeStatus, UserProfile};

use crate::error::ApiError;
use crate::{AppState, run_blocking};

const RECENT_COMPLETIONS: u32 = 5;

pub async fn get_progress(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let user_id = user.id.to_string();

    let (active, completed, (completed_count, total_points)) =
        run_blocking(&state, move |db| {
            Ok((
                db.get_active_challenges(&user_id)?,
                db.get_completed_challenges(&user_id, RECENT_COMPLETIONS)?,
                db.completion_totals(&user_id)?,
            ))
        })
        .await?;

    let current_challenges = active
        .into_iter()
        .map(active_challenge)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let recent_completions = completed
        .into_iter()
        .map(completed_challenge)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(ProgressResponse {
        total_points,
        completed_challenges: completed_count,
        current_challenges,
        recent_completions,
    }))
}

fn challenge_id(row: &ProgressRow) -> anyhow::Result<u32> {
    u32::try_from(row.challenge_id)
        .with_context(|| format!("Corrupt challenge_id {} on progress '{}'", row.challenge_id, row.id))
}

fn active_challenge(row: ProgressRow) -> anyhow::Result<ActiveChallenge> {
    let status = row.status.parse::<ChallengeStatus>().map_err(|e| anyhow!(e))?;
    Ok(ActiveChallenge {
        challenge_id: challenge_id(&row)?,
        status,
        started_at: parse_timestamp(&row.started_at)?,
    })
}

fn completed_challenge(row: ProgressRow) -> anyhow::Result<CompletedChallenge> {
    let completed_at = row
        .completed_at
        .as_deref()
        .ok_or_else(|| anyhow!("Completed progress '{}' has no completed_at", row.id))?;
    Ok(CompletedChallenge {
        challenge_id: challenge_id(&row)?,
        completed_at: parse_timestamp(completed_at)?,
        points: row.points,
    })
}
