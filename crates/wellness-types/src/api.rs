use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ChallengeStatus, UserSummary};

// -- JWT Claims --

/// JWT claims issued at login and checked by the API auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Generic --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// -- Auth --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

// -- Mood --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveMoodRequest {
    pub mood: i64,
    /// Defaults to the time the server receives the request.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

// -- Challenges --

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChallengeActionRequest {
    #[serde(rename = "challengeId")]
    pub challenge_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteChallengeResponse {
    pub message: String,
    pub points_earned: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveChallenge {
    pub challenge_id: u32,
    pub status: ChallengeStatus,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedChallenge {
    pub challenge_id: u32,
    pub completed_at: DateTime<Utc>,
    pub points: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub total_points: i64,
    pub completed_challenges: i64,
    pub current_challenges: Vec<ActiveChallenge>,
    pub recent_completions: Vec<CompletedChallenge>,
}

// -- Stats --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub mood_entries: i64,
    pub completed_challenges: i64,
    pub current_streak: u32,
    pub member_since: DateTime<Utc>,
}
