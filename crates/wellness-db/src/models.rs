/// Database row types — these map directly to SQLite rows.
/// Distinct from wellness-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct MoodRow {
    pub id: String,
    pub user_id: String,
    pub mood: i64,
    pub date: String,
    pub created_at: String,
}

pub struct ProgressRow {
    pub id: String,
    pub user_id: String,
    pub challenge_id: i64,
    pub status: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub points: i64,
}
