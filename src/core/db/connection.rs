/// Connection Management Module
///
/// A batch runs against exactly one connection. `Database` owns that
/// connection and is passed explicitly to the executor; the underlying
/// SQLite handle is released when the `Database` is dropped or closed.

use crate::core::{BatchError, Result};
use rusqlite::Connection;
use tracing::{debug, info};

/// Target name for a private in-memory database.
pub const MEMORY_TARGET: &str = ":memory:";

/// An open SQLite connection plus the target it was opened from.
#[derive(Debug)]
pub struct Database {
    connection: Connection,
    target: String,
}

impl Database {
    /// Opens a connection to `target` (a file path or `:memory:`).
    ///
    /// Each entry of `pragmas` is applied as `PRAGMA <entry>;` right after
    /// opening, e.g. `"foreign_keys = ON"`.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Database` if the file cannot be opened or a pragma
    /// fails, and `BatchError::Config` if a pragma entry contains a `;`.
    pub fn open(target: &str, pragmas: &[String]) -> Result<Self> {
        let connection = if target == MEMORY_TARGET {
            Connection::open_in_memory()?
        } else {
            Connection::open(target)?
        };

        for pragma in pragmas {
            if pragma.contains(';') {
                return Err(BatchError::Config(format!(
                    "pragma '{}' must be a single assignment without ';'",
                    pragma
                )));
            }
            debug!(pragma = %pragma, "applying pragma");
            connection.execute_batch(&format!("PRAGMA {};", pragma))?;
        }

        info!(database = %target, "opened database");
        Ok(Database {
            connection,
            target: target.to_string(),
        })
    }

    /// Opens a private in-memory database with no pragmas.
    pub fn open_in_memory() -> Result<Self> {
        Database::open(MEMORY_TARGET, &[])
    }

    /// The target this database was opened from.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_in_memory(&self) -> bool {
        self.target == MEMORY_TARGET
    }

    /// Borrow the underlying connection for statement execution.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Closes the connection, surfacing any error SQLite reports on close.
    ///
    /// Dropping a `Database` also closes it, but silently.
    pub fn close(self) -> Result<()> {
        let target = self.target;
        self.connection
            .close()
            .map_err(|(_, e)| BatchError::Database(e))?;
        debug!(database = %target, "closed database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.is_in_memory());
        assert_eq!(db.target(), ":memory:");

        let one: i64 = db
            .connection()
            .query_row("SELECT 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(one, 1);
        db.close().unwrap();
    }

    #[test]
    fn test_pragmas_are_applied() {
        let db = Database::open(MEMORY_TARGET, &["foreign_keys = ON".to_string()]).unwrap();
        let enabled: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_pragma_with_semicolon_is_rejected() {
        let result = Database::open(
            MEMORY_TARGET,
            &["foreign_keys = ON; DROP TABLE x".to_string()],
        );
        match result {
            Err(BatchError::Config(msg)) => assert!(msg.contains("without ';'")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_file_database_persists_between_connections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::open(path, &[]).unwrap();
            assert!(!db.is_in_memory());
            db.connection()
                .execute_batch("CREATE TABLE t(x INT); INSERT INTO t VALUES (7);")
                .unwrap();
        }

        let db = Database::open(path, &[]).unwrap();
        let x: i64 = db
            .connection()
            .query_row("SELECT x FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(x, 7);
    }

    #[test]
    fn test_connection_error_handling() {
        let result = Database::open("/nonexistent/path/database.db", &[]);
        match result.unwrap_err() {
            BatchError::Database(_) => {}
            other => panic!("Expected Database error, got {:?}", other),
        }
    }
}
