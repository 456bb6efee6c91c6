use crate::model::{AssessmentRecord, Direction, ParseDirectionError, StorageError};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

/// Assessment history and per-day notification bookkeeping.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database and its tables. `":memory:"` gives a
    /// throwaway in-memory store.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = if db_path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(db_path)?
        };

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS assessments (
                sid TEXT NOT NULL,
                trade_date TEXT NOT NULL,
                direction TEXT NOT NULL,
                reasons TEXT NOT NULL DEFAULT '',
                bias_ratio REAL NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (sid, trade_date)
            );

            CREATE TABLE IF NOT EXISTS notified (
                sid TEXT NOT NULL,
                trade_date TEXT NOT NULL,
                notified_at TEXT NOT NULL,
                PRIMARY KEY (sid, trade_date)
            );
            ",
        )?;

        debug!("Opened assessment store at {}", db_path);
        Ok(Self { conn })
    }

    /// Inserts or replaces the assessment for `(sid, trade_date)`.
    pub fn save_assessment(&self, record: &AssessmentRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO assessments (
                sid, trade_date, direction, reasons, bias_ratio, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &record.sid,
                &record.trade_date,
                record.direction.to_string(),
                &record.reasons,
                &record.bias_ratio,
                &record.created_at,
            ],
        )?;
        Ok(())
    }

    /// Most recent assessment stored for a security, by trade date.
    pub fn get_last_assessment(&self, sid: &str) -> Result<Option<AssessmentRecord>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT sid, trade_date, direction, reasons, bias_ratio, created_at
                 FROM assessments WHERE sid = ?1 ORDER BY trade_date DESC LIMIT 1",
                params![sid],
                Self::map_row,
            )
            .optional()?;

        match row {
            Some((record, direction)) => Ok(Some(AssessmentRecord {
                direction: direction
                    .parse()
                    .map_err(|e: ParseDirectionError| StorageError::InvalidRecord(e.to_string()))?,
                ..record
            })),
            None => Ok(None),
        }
    }

    pub fn is_notified(&self, sid: &str, trade_date: NaiveDate) -> Result<bool, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM notified WHERE sid = ?1 AND trade_date = ?2")?;
        let mut rows = stmt.query(params![sid, trade_date])?;
        Ok(rows.next()?.is_some())
    }

    pub fn mark_notified(&self, sid: &str, trade_date: NaiveDate) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO notified (sid, trade_date, notified_at) VALUES (?1, ?2, ?3)",
            params![sid, trade_date, Utc::now()],
        )?;
        Ok(())
    }

    // Direction comes back as raw text so a bad value surfaces as InvalidRecord
    // rather than a rusqlite conversion error.
    fn map_row(row: &Row) -> Result<(AssessmentRecord, String), rusqlite::Error> {
        let record = AssessmentRecord {
            sid: row.get(0)?,
            trade_date: row.get(1)?,
            direction: Direction::None,
            reasons: row.get(3)?,
            bias_ratio: row.get(4)?,
            created_at: row.get(5)?,
        };
        Ok((record, row.get(2)?))
    }
}
