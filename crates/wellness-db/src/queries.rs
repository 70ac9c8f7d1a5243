use crate::models::{MoodRow, ProgressRow, UserRow};
use crate::{Database, is_unique_sqlite_error};
use anyhow::Result;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "id, username, email, password, created_at";
const PROGRESS_COLUMNS: &str =
    "id, user_id, challenge_id, status, started_at, completed_at, points";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, username, email, password_hash, created_at),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, username ASC"
            ))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Moods --

    pub fn insert_mood(
        &self,
        id: &str,
        user_id: &str,
        mood: i64,
        date: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO moods (id, user_id, mood, date, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, user_id, mood, date, created_at],
            )?;
            Ok(())
        })
    }

    /// Newest first.
    pub fn get_mood_history(&self, user_id: &str, limit: u32) -> Result<Vec<MoodRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, mood, date, created_at
                 FROM moods
                 WHERE user_id = ?1
                 ORDER BY date DESC, created_at DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], |row| {
                    Ok(MoodRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        mood: row.get(2)?,
                        date: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_moods(&self, user_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM moods WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    // -- Challenge progress --

    /// Open a new attempt. Returns `false` if the user already has one in progress
    /// for this challenge.
    pub fn start_challenge(
        &self,
        id: &str,
        user_id: &str,
        challenge_id: i64,
        started_at: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let res = conn.execute(
                "INSERT INTO challenge_progress (id, user_id, challenge_id, status, started_at)
                 VALUES (?1, ?2, ?3, 'started', ?4)",
                rusqlite::params![id, user_id, challenge_id, started_at],
            );
            match res {
                Ok(_) => Ok(true),
                Err(e) if is_unique_sqlite_error(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Close the open attempt. Returns `false` if nothing was in progress.
    pub fn complete_challenge(
        &self,
        user_id: &str,
        challenge_id: i64,
        completed_at: &str,
        points: i64,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE challenge_progress
                 SET status = 'completed', completed_at = ?3, points = ?4
                 WHERE user_id = ?1 AND challenge_id = ?2 AND status = 'started'",
                rusqlite::params![user_id, challenge_id, completed_at, points],
            )?;
            Ok(changed == 1)
        })
    }

    pub fn get_active_challenges(&self, user_id: &str) -> Result<Vec<ProgressRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM challenge_progress
                 WHERE user_id = ?1 AND status = 'started'
                 ORDER BY started_at DESC"
            ))?;
            let rows = stmt
                .query_map([user_id], progress_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Most recent completions first.
    pub fn get_completed_challenges(&self, user_id: &str, limit: u32) -> Result<Vec<ProgressRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM challenge_progress
                 WHERE user_id = ?1 AND status = 'completed'
                 ORDER BY completed_at DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], progress_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// (completed count, total points)
    pub fn completion_totals(&self, user_id: &str) -> Result<(i64, i64)> {
        self.with_conn(|conn| {
            let totals = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(points), 0)
                 FROM challenge_progress
                 WHERE user_id = ?1 AND status = 'completed'",
                [user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(totals)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn progress_from_row(row: &Row<'_>) -> rusqlite::Result<ProgressRow> {
    Ok(ProgressRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        challenge_id: row.get(2)?,
        status: row.get(3)?,
        started_at: row.get(4)?,
        completed_at: row.get(5)?,
        points: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
