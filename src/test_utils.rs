/// # Test Utilities Module
///
/// Shared fixtures for unit tests: isolated in-memory databases, optionally
/// seeded with a small table of card transactions.

use crate::core::db::Database;
use crate::core::Result;
use rusqlite::Connection;

/// Seed data used by `DatabaseFixture::with_sample_data`.
pub const SAMPLE_SCHEMA: &str = "
    CREATE TABLE transactions (
        id INTEGER PRIMARY KEY,
        account TEXT NOT NULL,
        amount REAL NOT NULL,
        flagged INTEGER NOT NULL DEFAULT 0
    );
    INSERT INTO transactions (account, amount) VALUES ('acc-001', 12.50);
    INSERT INTO transactions (account, amount) VALUES ('acc-002', 830.00);
    INSERT INTO transactions (account, amount) VALUES ('acc-001', 45.99);
    INSERT INTO transactions (account, amount) VALUES ('acc-003', 1200.00);
";

/// An isolated in-memory database that disappears with the fixture.
pub struct DatabaseFixture {
    pub database: Database,
}

impl DatabaseFixture {
    /// A fresh database with no tables.
    pub fn empty() -> Result<Self> {
        Ok(DatabaseFixture {
            database: Database::open_in_memory()?,
        })
    }

    /// A fresh database holding `SAMPLE_SCHEMA`.
    pub fn with_sample_data() -> Result<Self> {
        let fixture = DatabaseFixture::empty()?;
        fixture.connection().execute_batch(SAMPLE_SCHEMA)?;
        Ok(fixture)
    }

    pub fn connection(&self) -> &Connection {
        self.database.connection()
    }

    /// Counts rows in `table`, panicking on any error.
    pub fn count_rows(&self, table: &str) -> i64 {
        self.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_fixture_is_seeded() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        assert_eq!(fixture.count_rows("transactions"), 4);
    }

    #[test]
    fn test_fixtures_are_isolated() {
        let a = DatabaseFixture::with_sample_data().unwrap();
        let b = DatabaseFixture::empty().unwrap();
        a.connection().execute("DELETE FROM transactions", []).unwrap();
        assert_eq!(a.count_rows("transactions"), 0);
        assert!(b.connection().prepare("SELECT * FROM transactions").is_err());
    }
}
