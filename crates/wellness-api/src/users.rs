use anyhow::Context;
use axum::{Json, extract::State};

use wellness_db::models::UserRow;
use wellness_db::parse_timestamp;
use wellness_types::models::{UserProfile, UserSummary};

use crate::error::ApiError;
use crate::{AppState, run_blocking};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let rows = run_blocking(&state, |db| db.list_users()).await?;

    let users = rows
        .into_iter()
        .map(|row| user_profile(row).map(UserSummary::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(users))
}

pub(crate) fn user_profile(row: UserRow) -> Result<UserProfile, ApiError> {
    let id = row
        .id
        .parse()
        .with_context(|| format!("Corrupt user id '{}'", row.id))?;
    let created_at = parse_timestamp(&row.created_at)?;

    Ok(UserProfile {
        id,
        username: row.username,
        email: row.email,
        created_at,
    })
}
