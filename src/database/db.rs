//! SQLite-backed store
//!
//! Persists each record as a JSON string in a single `app_state` table and
//! keeps an optional simulated calendar date for stepping through days by hand.

use super::Store;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

const CURRENT_DATE_KEY: &str = "current_date";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and its table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;
        Ok(Self { conn })
    }

    /// Simulated date, if one has been started.
    pub fn current_date(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.get(CURRENT_DATE_KEY)? else {
            return Ok(None);
        };
        let secs = raw
            .parse::<i64>()
            .map_err(|err| EngineError::malformed(CURRENT_DATE_KEY, err.to_string()))?;
        DateTime::from_timestamp(secs, 0)
            .map(Some)
            .ok_or_else(|| EngineError::malformed(CURRENT_DATE_KEY, "timestamp out of range"))
    }

    /// Starts the simulated calendar at `now` unless it is already running,
    /// and returns the simulated date.
    pub fn start_simulation(&mut self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        self.conn.execute(
            "INSERT OR IGNORE INTO app_state (key, value) VALUES (?1, ?2)",
            params![CURRENT_DATE_KEY, now.timestamp().to_string()],
        )?;
        Ok(self.current_date()?.unwrap_or(now))
    }

    /// Moves the simulated date forward by 24 hours.
    pub fn advance_day(&mut self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let current = self.start_simulation(now)?;
        let next_day = current + Duration::days(1);
        self.set(CURRENT_DATE_KEY, &next_day.timestamp().to_string())?;
        Ok(next_day)
    }
}

impl Store for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
