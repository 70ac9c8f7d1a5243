pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Owned handle to the wellness store.
///
/// One connection guarded by a mutex; callers on the async runtime should
/// wrap calls in `spawn_blocking`.
pub struct Database {
    conn: Mutex<Connection>,
    /// `None` for in-memory stores, which cannot be reopened.
    path: Option<PathBuf>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = open_connection(path)?;
        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Like `with_conn`, but runs `f` inside a transaction that commits on `Ok`.
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    pub fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }

    /// Replace the connection with a freshly opened one.
    pub fn reconnect(&self) -> Result<()> {
        let Some(path) = &self.path else {
            bail!("in-memory database cannot be reopened");
        };

        let fresh = open_connection(path)?;
        migrations::run(&fresh)?;

        let mut conn = self.conn.lock().map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        let stale = std::mem::replace(&mut *conn, fresh);
        if let Err((_, e)) = stale.close() {
            warn!("Closing stale connection failed: {}", e);
        }

        info!("Database reconnected at {}", path.display());
        Ok(())
    }

    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        conn.close().map_err(|(_, e)| e)?;
        info!("Database closed");
        Ok(())
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;

    // WAL mode for concurrent reads
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    Ok(conn)
}

/// True if `err` came from a UNIQUE constraint (including partial unique indexes).
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<rusqlite::Error>()
        .is_some_and(is_unique_sqlite_error)
}

pub(crate) fn is_unique_sqlite_error(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that
/// lexical order in SQL matches chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone; treat it as UTC.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| anyhow!("Corrupt timestamp '{}': {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert!(format_timestamp(early) < format_timestamp(late));
    }

    #[test]
    fn parse_accepts_rfc3339_and_sqlite_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(ts)).unwrap(), ts);
        assert_eq!(parse_timestamp("2024-03-05 12:00:00").unwrap(), ts);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn ping_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.ping().unwrap();
        assert!(db.reconnect().is_err());
        db.close().unwrap();
    }

    #[test]
    fn reconnect_file_database() {
        let path = std::env::temp_dir().join(format!(
            "wellness_db_reconnect_{}_{}.db",
            std::process::id(),
            uuid::Uuid::new_v4()
        ));
        let db = Database::open(&path).unwrap();
        db.create_user("u1", "ana", "ana@x.com", "hash", "2024-01-01T00:00:00.000000Z")
            .unwrap();

        db.reconnect().unwrap();
        db.ping().unwrap();
        assert!(db.get_user_by_username("ana").unwrap().is_some());

        db.close().unwrap();
        let _ = std::fs::remove_file(&path);
    }
}
