use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest and highest self-reported mood level.
pub const MOOD_MIN: i64 = 1;
pub const MOOD_MAX: i64 = 5;

/// Points awarded each time a challenge is completed.
pub const POINTS_PER_CHALLENGE: i64 = 10;

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserSummary {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            email: profile.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: Uuid,
    pub mood: i64,
    /// The moment the mood refers to.
    pub date: DateTime<Utc>,
    /// When the server stored the entry.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Started,
    Completed,
}

impl ChallengeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown challenge status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [ChallengeStatus::Started, ChallengeStatus::Completed] {
            assert_eq!(status.as_str().parse::<ChallengeStatus>().unwrap(), status);
        }
        assert!("paused".parse::<ChallengeStatus>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ChallengeStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
