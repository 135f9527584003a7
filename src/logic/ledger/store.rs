//! SQLite Ledger Store
//!
//! Write-ahead-log mode turns every append into a true end-of-store write:
//! SQLite serializes writers with its own locking, so two handles (even in
//! different processes) can append concurrently without a lost update. The
//! old read-whole-file / rewrite-whole-file scheme this replaces could drop
//! a writer's record whenever two rewrites raced.
//!
//! In-process sharing additionally serializes on a mutex around the
//! connection. Appends retry a bounded number of times on SQLITE_BUSY
//! before surfacing `LedgerError::Busy`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode};

use crate::logic::verdict::Label;

use super::{LedgerError, LogRecord, PredictionLedger};

/// Max attempts for an append hitting a busy store
const MAX_APPEND_RETRIES: u32 = 3;

/// Pause between busy retries
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Column order and names are the compatibility surface for downstream log
/// readers. `rowid` orders appends and is not part of the surface.
const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS predictions (
    timestamp  TEXT NOT NULL,
    features   TEXT NOT NULL,
    prediction TEXT NOT NULL
)";

const INSERT_SQL: &str =
    "INSERT INTO predictions (timestamp, features, prediction) VALUES (?1, ?2, ?3)";

/// SQLite-backed prediction ledger
pub struct SqliteLedger {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteLedger {
    /// Open (or create) the ledger at `path`.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| LedgerError::Io(e.to_string()))?;
            }
        }

        let conn = Connection::open(path).map_err(storage_err)?;
        apply_pragmas(&conn)?;
        conn.execute(CREATE_TABLE_SQL, []).map_err(storage_err)?;

        log::debug!("Ledger opened: {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// WAL mode, NORMAL sync, 5s busy_timeout.
fn apply_pragmas(conn: &Connection) -> Result<(), LedgerError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .map_err(storage_err)
}

fn storage_err(e: rusqlite::Error) -> LedgerError {
    LedgerError::Storage(e.to_string())
}

fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
    )
}

/// Run `op` with bounded retries on SQLITE_BUSY.
fn with_busy_retry<T>(
    mut op: impl FnMut() -> Result<T, rusqlite::Error>,
) -> Result<T, LedgerError> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_busy(&e) => {
                attempt += 1;
                if attempt >= MAX_APPEND_RETRIES {
                    log::warn!("Ledger append gave up after {} busy retries", attempt);
                    return Err(LedgerError::Busy);
                }
                std::thread::sleep(RETRY_BACKOFF);
            }
            Err(e) => return Err(storage_err(e)),
        }
    }
}

fn row_to_record(
    timestamp: String,
    features: String,
    prediction: String,
) -> Result<LogRecord, LedgerError> {
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| LedgerError::Corrupt(format!("bad timestamp {:?}: {}", timestamp, e)))?
        .with_timezone(&Utc);
    let prediction = Label::parse(&prediction)
        .ok_or_else(|| LedgerError::Corrupt(format!("unknown prediction {:?}", prediction)))?;

    Ok(LogRecord {
        timestamp,
        features,
        prediction,
    })
}

impl PredictionLedger for SqliteLedger {
    fn append(&self, record: &LogRecord) -> Result<(), LedgerError> {
        let conn = self.conn.lock();
        with_busy_retry(|| {
            conn.execute(
                INSERT_SQL,
                params![
                    record.timestamp.to_rfc3339(),
                    record.features,
                    record.prediction.as_str()
                ],
            )
            .map(|_| ())
        })
    }

    fn append_batch(&self, records: &[LogRecord]) -> Result<(), LedgerError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock();
        with_busy_retry(|| {
            // One transaction: all records land as a contiguous block or
            // none do.
            let tx = conn.transaction()?;
            for record in records {
                tx.execute(
                    INSERT_SQL,
                    params![
                        record.timestamp.to_rfc3339(),
                        record.features,
                        record.prediction.as_str()
                    ],
                )?;
            }
            tx.commit()
        })
    }

    fn read_all(&self) -> Result<Vec<LogRecord>, LedgerError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT timestamp, features, prediction FROM predictions ORDER BY rowid")
            .map_err(storage_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(storage_err)?;

        let mut records = Vec::new();
        for row in rows {
            let (timestamp, features, prediction) = row.map_err(storage_err)?;
            records.push(row_to_record(timestamp, features, prediction)?);
        }
        Ok(records)
    }

    fn len(&self) -> Result<u64, LedgerError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM predictions", [], |row| {
            row.get::<_, u64>(0)
        })
        .map_err(storage_err)
    }
}
