use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE moods (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                mood        INTEGER NOT NULL CHECK (mood BETWEEN 1 AND 5),
                date        TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_moods_user_date
                ON moods(user_id, date DESC);

            CREATE TABLE challenge_progress (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id),
                challenge_id    INTEGER NOT NULL,
                status          TEXT NOT NULL CHECK (status IN ('started', 'completed')),
                started_at      TEXT NOT NULL,
                completed_at    TEXT,
                points          INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_progress_user
                ON challenge_progress(user_id, status);

            -- One open attempt per (user, challenge)
            CREATE UNIQUE INDEX idx_progress_active
                ON challenge_progress(user_id, challenge_id)
                WHERE status = 'started';

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
