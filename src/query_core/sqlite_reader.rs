//! SQLite-backed series reader
//!
//! Every call opens its own read-only connection on tokio's blocking pool and
//! drops it before returning, on success and on error. Nothing is cached or
//! shared between requests.

use super::error::QueryError;
use super::store::{ReferenceTable, RowSet, SeriesQuery, SeriesStore};
use crate::sqlite_pragma::apply_read_only_pragmas;
use async_trait::async_trait;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, InterruptHandle, OpenFlags, Params, Statement};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Connection settings, resolved once at startup and passed in explicitly.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite database file (must already exist)
    pub db_path: PathBuf,

    /// How long SQLite waits on a locked database before failing
    pub busy_timeout: Duration,

    /// Upper bound on a single storage call; `None` waits indefinitely
    pub query_timeout: Option<Duration>,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: Duration::from_millis(5_000),
            query_timeout: None,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

/// Hands the worker's interrupt handle to the request side.
///
/// Whichever of `arm` and `cancel` runs second observes the other, so a
/// timed-out call either gets interrupted or never starts its statement.
#[derive(Default)]
struct CancelSlot {
    cancelled: AtomicBool,
    handle: Mutex<Option<InterruptHandle>>,
}

impl CancelSlot {
    /// Register the worker's connection. Returns false if already cancelled.
    fn arm(&self, handle: InterruptHandle) -> bool {
        if let Ok(mut slot) = self.handle.lock() {
            *slot = Some(handle);
        }
        !self.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Ok(slot) = self.handle.lock() {
            if let Some(handle) = slot.as_ref() {
                handle.interrupt();
            }
        }
    }
}

/// SQLite implementation of `SeriesStore`
pub struct SqliteSeriesReader {
    config: Arc<StoreConfig>,
}

impl SqliteSeriesReader {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn open(config: &StoreConfig) -> Result<Connection, QueryError> {
        let conn = Connection::open_with_flags(
            &config.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        apply_read_only_pragmas(&conn, config.busy_timeout)?;
        Ok(conn)
    }

    /// Run `op` against a fresh connection on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T, QueryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, QueryError> + Send + 'static,
    {
        let config = self.config.clone();
        let slot = Arc::new(CancelSlot::default());
        let worker_slot = slot.clone();

        let mut task = tokio::task::spawn_blocking(move || {
            let conn = Self::open(&config)?;
            if !worker_slot.arm(conn.get_interrupt_handle()) {
                return Err(QueryError::StorageUnavailable(
                    "Query cancelled before execution".to_string(),
                ));
            }
            op(&conn)
        });

        let Some(limit) = self.config.query_timeout else {
            return task.await?;
        };

        match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined?,
            Err(_) => {
                slot.cancel();
                log::warn!("⏱️  Storage call exceeded {}ms, interrupted", limit.as_millis());
                Err(QueryError::StorageUnavailable(format!(
                    "Query exceeded timeout of {}ms",
                    limit.as_millis()
                )))
            }
        }
    }
}

fn read_window(conn: &Connection, query: &SeriesQuery) -> Result<RowSet, QueryError> {
    let table = query.table.table_name();

    let (sql, params) = match query.asset_id {
        Some(asset_id) if query.table.supports_asset_filter() => (
            format!(
                "SELECT * FROM {} WHERE time <= ?1 AND asset_id = ?2 ORDER BY time DESC LIMIT ?3",
                table
            ),
            vec![query.end_time, asset_id, query.adjusted_limit],
        ),
        Some(_) => {
            return Err(QueryError::UnexpectedFailure(format!(
                "Table {} has no asset_id column",
                table
            )))
        }
        None => (
            format!(
                "SELECT * FROM {} WHERE time <= ?1 ORDER BY time DESC LIMIT ?2",
                table
            ),
            vec![query.end_time, query.adjusted_limit],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    collect_rows(&mut stmt, params_from_iter(params))
}

fn read_all(conn: &Connection, table: ReferenceTable) -> Result<RowSet, QueryError> {
    let sql = format!(
        "SELECT * FROM {} ORDER BY {} ASC",
        table.table_name(),
        table.order_column()
    );
    let mut stmt = conn.prepare(&sql)?;
    collect_rows(&mut stmt, [])
}

fn collect_rows<P: Params>(stmt: &mut Statement<'_>, params: P) -> Result<RowSet, QueryError> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|idx| owned_value(row.get_ref(idx)?, idx))
            .collect::<Result<Vec<Value>, QueryError>>()?;
        out.push(values);
    }

    Ok(RowSet { columns, rows: out })
}

/// Copy a cell out of SQLite without trusting TEXT to be valid UTF-8.
fn owned_value(cell: ValueRef<'_>, column: usize) -> Result<Value, QueryError> {
    Ok(match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::Text(text.to_owned()),
            Err(e) => {
                return Err(QueryError::UnexpectedFailure(format!(
                    "Column {} holds text that is not valid UTF-8: {}",
                    column, e
                )))
            }
        },
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

#[async_trait]
impl SeriesStore for SqliteSeriesReader {
    async fn fetch_window(&self, query: SeriesQuery) -> Result<RowSet, QueryError> {
        let rows = self.run(move |conn| read_window(conn, &query)).await?;
        log::debug!(
            "📥 {} rows from {} (end_time={}, asset_id={:?}, limit={})",
            rows.len(),
            query.table.table_name(),
            query.end_time,
            query.asset_id,
            query.adjusted_limit
        );
        Ok(rows)
    }

    async fn fetch_all(&self, table: ReferenceTable) -> Result<RowSet, QueryError> {
        let rows = self.run(move |conn| read_all(conn, table)).await?;
        log::debug!("📥 {} rows from {}", rows.len(), table.table_name());
        Ok(rows)
    }
}
