/// Query Execution Module
///
/// Runs a single SQL statement and classifies what came back: a result set
/// (the statement described at least one column), a bare acknowledgment, or
/// a failure. Failures are returned as values so a caller looping over a
/// batch can report them and move on.

use crate::core::StatementExecutionError;
use rusqlite::{ffi, types::ValueRef, Connection};
use tracing::{debug, trace};

/// Represents the result of a SQL query execution
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as display strings
    pub rows: Vec<Vec<String>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }
}

/// What happened to one statement of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The statement described a column schema; every row was materialized.
    Tabular(QueryResult),
    /// The statement succeeded without a column schema (DDL, DML, ...).
    Acknowledged { rows_affected: usize },
    /// Preparing, executing, or materializing the statement failed.
    Failed(StatementExecutionError),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Rows of a tabular outcome, `None` for anything else.
    pub fn rows(&self) -> Option<&[Vec<String>]> {
        match self {
            Outcome::Tabular(result) => Some(result.rows.as_slice()),
            _ => None,
        }
    }
}

/// Query execution service that operates on a borrowed connection
pub struct QueryExecutor<'a> {
    connection: &'a Connection,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new QueryExecutor for the given connection
    pub fn new(connection: &'a Connection) -> Self {
        QueryExecutor { connection }
    }

    /// Executes one statement and classifies the result.
    ///
    /// `index` is the 1-based batch position carried into a failure.
    /// This never returns an error: every failure becomes `Outcome::Failed`.
    pub fn execute(&self, index: usize, sql: &str) -> Outcome {
        match self.try_execute(sql) {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Failed(StatementExecutionError::new(index, e.to_string())),
        }
    }

    fn try_execute(&self, sql: &str) -> rusqlite::Result<Outcome> {
        let mut stmt = self.connection.prepare(sql)?;
        let column_count = stmt.column_count();

        if column_count == 0 {
            let rows_affected = match stmt.execute([]) {
                Ok(rows_affected) => rows_affected,
                // A comment-only piece compiles to no statement; stepping it reports SQLITE_OK.
                Err(rusqlite::Error::SqliteFailure(e, _)) if e.extended_code == ffi::SQLITE_OK => {
                    debug!("empty statement, nothing to run");
                    0
                }
                Err(e) => return Err(e),
            };
            debug!(rows_affected, "statement acknowledged");
            return Ok(Outcome::Acknowledged { rows_affected });
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(format_value(row.get_ref(i)?));
                }
                Ok(values)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        trace!(columns = column_count, rows = rows.len(), "materialized result set");
        Ok(Outcome::Tabular(QueryResult::new(columns, rows)))
    }
}

/// Formats a SQLite value for display.
fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DatabaseFixture;

    #[test]
    fn test_select_one_is_tabular() {
        let fixture = DatabaseFixture::empty().unwrap();
        let executor = QueryExecutor::new(fixture.connection());

        match executor.execute(1, "SELECT 1") {
            Outcome::Tabular(result) => {
                assert_eq!(result.columns, vec!["1"]);
                assert_eq!(result.rows, vec![vec!["1".to_string()]]);
                assert_eq!(result.row_count, 1);
            }
            other => panic!("Expected tabular outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_ddl_is_acknowledged() {
        let fixture = DatabaseFixture::empty().unwrap();
        let executor = QueryExecutor::new(fixture.connection());

        let outcome = executor.execute(1, "CREATE TABLE t(x INT)");
        assert_eq!(outcome, Outcome::Acknowledged { rows_affected: 0 });
    }

    #[test]
    fn test_dml_reports_rows_affected() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let executor = QueryExecutor::new(fixture.connection());

        let outcome = executor.execute(2, "UPDATE transactions SET flagged = 1 WHERE amount > 500");
        assert_eq!(outcome, Outcome::Acknowledged { rows_affected: 2 });
    }

    #[test]
    fn test_syntax_error_is_failed_with_index() {
        let fixture = DatabaseFixture::empty().unwrap();
        let executor = QueryExecutor::new(fixture.connection());

        match executor.execute(4, "SELEKT bad syntax") {
            Outcome::Failed(err) => {
                assert_eq!(err.index, 4);
                assert!(err.message.contains("syntax error"), "message: {}", err.message);
            }
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_comment_only_statement_is_acknowledged() {
        let fixture = DatabaseFixture::empty().unwrap();
        let executor = QueryExecutor::new(fixture.connection());

        for sql in ["-- just a comment", "/* header */", "-- end of file\n"] {
            let outcome = executor.execute(1, sql);
            assert_eq!(outcome, Outcome::Acknowledged { rows_affected: 0 }, "sql: {:?}", sql);
        }
    }

    #[test]
    fn test_missing_table_is_failed() {
        let fixture = DatabaseFixture::empty().unwrap();
        let executor = QueryExecutor::new(fixture.connection());

        let outcome = executor.execute(1, "SELECT * FROM nowhere");
        assert!(outcome.is_failed());
        assert!(outcome.rows().is_none());
    }

    #[test]
    fn test_value_formatting() {
        let fixture = DatabaseFixture::empty().unwrap();
        let executor = QueryExecutor::new(fixture.connection());

        let outcome = executor.execute(1, "SELECT NULL, 42, 1.5, 'text', x'0102'");
        let rows = outcome.rows().unwrap();
        assert_eq!(
            rows[0],
            vec!["NULL", "42", "1.5", "text", "<BLOB: 2 bytes>"]
        );
    }

    #[test]
    fn test_empty_result_set_keeps_columns() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let executor = QueryExecutor::new(fixture.connection());

        match executor.execute(1, "SELECT id, amount FROM transactions WHERE 0") {
            Outcome::Tabular(result) => {
                assert_eq!(result.columns, vec!["id", "amount"]);
                assert!(result.rows.is_empty());
            }
            other => panic!("Expected tabular outcome, got {:?}", other),
        }
    }
}
