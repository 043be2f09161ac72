//! SQLite-backed feature history.
//!
//! RULE: only this module talks to the database. The engine never
//! writes here on the scoring path — the runner (or whichever
//! collaborator schedules refits) records extracted vectors and later
//! hands a window of them to `RiskEngine::refit`.

use crate::{
    error::ScoreResult,
    features::{FeatureVector, FEATURE_COUNT},
};
use chrono::Utc;
use rusqlite::{params, Connection};

pub struct FeatureHistory {
    conn: Connection,
}

impl FeatureHistory {
    /// Open (or create) the history database at `path`.
    pub fn open(path: &str) -> ScoreResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let history = Self { conn };
        history.migrate()?;
        Ok(history)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ScoreResult<Self> {
        let history = Self {
            conn: Connection::open_in_memory()?,
        };
        history.migrate()?;
        Ok(history)
    }

    fn migrate(&self) -> ScoreResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS feature_history (
                 id          INTEGER PRIMARY KEY AUTOINCREMENT,
                 recorded_at TEXT NOT NULL,
                 features    TEXT NOT NULL
             );",
        )?;
        Ok(())
    }

    pub fn record(&self, features: &FeatureVector) -> ScoreResult<()> {
        let payload = serde_json::to_string(&features.as_array())?;
        self.conn.execute(
            "INSERT INTO feature_history (recorded_at, features) VALUES (?1, ?2)",
            params![Utc::now().to_rfc3339(), payload],
        )?;
        Ok(())
    }

    /// The most recent `limit` feature vectors, oldest first.
    pub fn recent(&self, limit: usize) -> ScoreResult<Vec<[f64; FEATURE_COUNT]>> {
        let mut stmt = self.conn.prepare(
            "SELECT features FROM (
                 SELECT id, features FROM feature_history
                 ORDER BY id DESC LIMIT ?1
             ) ORDER BY id ASC",
        )?;
        let payloads = stmt
            .query_map(params![limit as i64], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut samples = Vec::with_capacity(payloads.len());
        for payload in payloads {
            samples.push(serde_json::from_str(&payload)?);
        }
        Ok(samples)
    }

    pub fn len(&self) -> ScoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM feature_history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> ScoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
