//! SQLite connection tuning for read-only query connections

use rusqlite::Connection;
use std::time::Duration;

/// Page cache size in KiB (negative value = KiB in SQLite)
const CACHE_SIZE_KIB: i64 = -16 * 1024;

/// Apply PRAGMAs for a short-lived reader connection.
///
/// Sets the busy timeout and page cache, keeps temp tables in memory, then
/// switches the connection to `query_only` so no statement can write.
pub fn apply_read_only_pragmas(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "cache_size", CACHE_SIZE_KIB)?;

    // Any INSERT/UPDATE/DELETE on this connection now fails
    conn.pragma_update(None, "query_only", true)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_query_only_blocks_writes() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let conn = Connection::open(&db_path).unwrap();
        conn.execute("CREATE TABLE t (time INTEGER NOT NULL)", []).unwrap();
        apply_read_only_pragmas(&conn, Duration::from_millis(100)).unwrap();

        let query_only: i64 = conn
            .query_row("PRAGMA query_only", [], |row| row.get(0))
            .unwrap();
        assert_eq!(query_only, 1);

        let result = conn.execute("INSERT INTO t (time) VALUES (1)", []);
        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
