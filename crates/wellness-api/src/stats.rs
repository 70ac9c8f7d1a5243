use axum::{Extension, Json, extract::State};
use chrono::{Days, NaiveDate, Utc};

use wellness_db::parse_timestamp;
use wellness_types::api::StatsResponse;
use wellness_types::models::UserProfile;

use crate::error::ApiError;
use crate::moods::HISTORY_LIMIT;
use crate::{AppState, run_blocking};

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<UserProfile>,
) -> Result<Json<StatsResponse>, ApiError> {
    let user_id = user.id.to_string();

    let (mood_entries, (completed_challenges, _points), recent) =
        run_blocking(&state, move |db| {
            Ok((
                db.count_moods(&user_id)?,
                db.completion_totals(&user_id)?,
                db.get_mood_history(&user_id, HISTORY_LIMIT)?,
            ))
        })
        .await?;

    let dates = recent
        .iter()
        .map(|row| parse_timestamp(&row.date).map(|ts| ts.date_naive()))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(StatsResponse {
        mood_entries,
        completed_challenges,
        current_streak: current_streak(&dates, Utc::now().date_naive()),
        member_since: user.created_at,
    }))
}

/// Number of consecutive days, ending `today`, that have at least one entry.
/// `dates` must be sorted newest first; repeated days count once.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut expected = today;

    for &date in dates {
        if date > expected {
            // Same day as the previous match, or dated in the future.
            continue;
        }
        if date != expected {
            break;
        }
        streak += 1;
        match expected.checked_sub_days(Days::new(1)) {
            Some(prev) => expected = prev,
            None => break,
        }
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(current_streak(&[], day(10)), 0);
    }

    #[test]
    fn consecutive_days_count() {
        let dates = [day(10), day(9), day(8)];
        assert_eq!(current_streak(&dates, day(10)), 3);
    }

    #[test]
    fn gap_ends_streak() {
        let dates = [day(10), day(9), day(7), day(6)];
        assert_eq!(current_streak(&dates, day(10)), 2);
    }

    #[test]
    fn streak_must_include_today() {
        let dates = [day(9), day(8)];
        assert_eq!(current_streak(&dates, day(10)), 0);
    }

    #[test]
    fn repeated_days_count_once() {
        let dates = [day(10), day(10), day(9), day(9), day(8)];
        assert_eq!(current_streak(&dates, day(10)), 3);
    }

    #[test]
    fn future_entries_are_skipped() {
        let dates = [day(12), day(10), day(9)];
        assert_eq!(current_streak(&dates, day(10)), 2);
    }
}
