use anyhow::Context;
use axum::{Extension, Json, extract::State};
use chrono::{Datelike, Utc};
use uuid::Uuid;

use wellness_db::{format_timestamp, parse_timestamp};
use wellness_types::api::{MessageResponse, SaveMoodRequest};
use wellness_types::models::{MOOD_MAX, MOOD_MIN, MoodEntry, UserProfile};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::{AppState, run_blocking};

/// History responses hold at most this many entries.
pub const HISTORY_LIMIT: u32 = 30;

/// Dates are stored as RFC 3339 text; only four-digit years keep text order
/// equal to time order.
const DATE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

pub async fn save_mood(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
    JsonBody(req): JsonBody<SaveMoodRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !(MOOD_MIN..=MOOD_MAX).contains(&req.mood) {
        return Err(ApiError::invalid_field(
            "mood",
            format!("Mood must be between {MOOD_MIN} and {MOOD_MAX}"),
        ));
    }

    if req.date.is_some_and(|d| !DATE_YEARS.contains(&d.year())) {
        return Err(ApiError::invalid_field(
            "date",
            "Date year must be between 0000 and 9999",
        ));
    }

    let now = Utc::now();
    let id = Uuid::new_v4().to_string();
    let user_id = user.id.to_string();
    let date = format_timestamp(req.date.unwrap_or(now));
    let created_at = format_timestamp(now);
    let mood = req.mood;

    run_blocking(&state, move |db| {
        db.insert_mood(&id, &user_id, mood, &date, &created_at)
    })
    .await?;

    Ok(Json(MessageResponse::new("Mood saved successfully")))
}

pub async fn mood_history(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
) -> Result<Json<Vec<MoodEntry>>, ApiError> {
    let user_id = user.id.to_string();
    let rows = run_blocking(&state, move |db| db.get_mood_history(&user_id, HISTORY_LIMIT)).await?;

    let entries = rows
        .into_iter()
        .map(|row| -> anyhow::Result<MoodEntry> {
            Ok(MoodEntry {
                id: row
                    .id
                    .parse()
                    .with_context(|| format!("Corrupt mood id '{}'", row.id))?,
                mood: row.mood,
                date: parse_timestamp(&row.date)?,
                created_at: parse_timestamp(&row.created_at)?,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(entries))
}
