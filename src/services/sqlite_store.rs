//! SQLite persistence for the prediction ledger.
//!
//! The store is opened once at startup and handed to the services that need
//! it. Each method scopes its own statement or transaction.

use crate::error::{AppError, Result};
use crate::types::{AccuracyStats, NewPrediction, PredictionRecord, StoreOutcome};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Columns added after the first ledger layout. Older files gain them on open.
const ADDED_COLUMNS: [(&str, &str); 2] = [("price", "REAL"), ("volume", "REAL")];

/// SQLite store for prediction records.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path and ensure its schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        // Other processes may hold the write lock briefly.
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        info!("SQLite store opened at {}", path.as_ref().display());
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("SQLite connection lock poisoned".into()))
    }

    /// Create the predictions table and its lookup index if absent, and add
    /// any missing quote columns to a table from an older layout. Idempotent.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                predicted_direction TEXT NOT NULL,
                actual_direction INTEGER,
                correct INTEGER NOT NULL DEFAULT 0,
                price REAL,
                volume REAL
            )",
            [],
        )?;

        let columns = {
            let mut stmt = conn.prepare("PRAGMA table_info(predictions)")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(1))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            names
        };
        for (column, sql_type) in ADDED_COLUMNS {
            if !columns.iter().any(|c| c == column) {
                conn.execute(
                    &format!("ALTER TABLE predictions ADD COLUMN {} {}", column, sql_type),
                    [],
                )?;
                info!("Added {} column to existing predictions table", column);
            }
        }

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_predictions_symbol_date
             ON predictions(symbol, date)",
            [],
        )?;

        debug!("SQLite schema ensured");
        Ok(())
    }

    /// Insert `prediction` unless a row for its symbol and date already exists.
    ///
    /// The existence check and the insert share one immediate transaction, so
    /// two writers cannot both pass the check.
    pub fn insert_if_absent(&self, prediction: &NewPrediction) -> Result<StoreOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let date = prediction.date.format(DATE_FORMAT).to_string();

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM predictions WHERE symbol = ?1 AND date = ?2 LIMIT 1",
                params![prediction.symbol, date],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            tx.commit()?;
            return Ok(StoreOutcome::Skipped);
        }

        tx.execute(
            "INSERT INTO predictions
             (symbol, date, predicted_direction, actual_direction, correct, price, volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                prediction.symbol,
                date,
                prediction.recommendation.as_str(),
                prediction.actual_direction,
                prediction.correct(),
                prediction.price,
                prediction.volume,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!("Stored prediction {} for {} on {}", id, prediction.symbol, date);
        Ok(StoreOutcome::Inserted(id))
    }

    /// Total and correct record counts for a symbol.
    pub fn accuracy_stats(&self, symbol: &str) -> Result<AccuracyStats> {
        let conn = self.conn()?;
        let stats = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(correct), 0) FROM predictions WHERE symbol = ?1",
            params![symbol],
            |row| {
                Ok(AccuracyStats {
                    total: row.get(0)?,
                    correct: row.get(1)?,
                })
            },
        )?;
        Ok(stats)
    }

    /// Records for a symbol, most recent first.
    pub fn predictions(&self, symbol: &str, limit: usize) -> Result<Vec<PredictionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, symbol, date, predicted_direction, actual_direction,
                    COALESCE(correct, 0), price, volume
             FROM predictions
             WHERE symbol = ?1
             ORDER BY date DESC, id DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![symbol, limit], parse_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Number of records for a symbol.
    pub fn prediction_count(&self, symbol: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM predictions WHERE symbol = ?1",
            params![symbol],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Close the underlying connection.
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| AppError::Internal("SQLite connection lock poisoned".into()))?;
        conn.close().map_err(|(_, e)| AppError::Database(e))?;
        info!("SQLite store closed");
        Ok(())
    }
}

fn parse_record(row: &Row<'_>) -> rusqlite::Result<PredictionRecord> {
    let date: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(PredictionRecord {
        id: row.get(0)?,
        symbol: row.get(1)?,
        date,
        predicted_direction: row.get(3)?,
        actual_direction: row.get(4)?,
        correct: row.get(5)?,
        price: row.get(6)?,
        volume: row.get(7)?,
    })
}
