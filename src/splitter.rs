//! Statement splitting for SQL batch files.
//!
//! Splitting is deliberately naive: every `;` ends a statement, including
//! one that appears inside a string literal or a comment. A statement such
//! as `SELECT 'a;b'` is therefore cut in two and both halves will fail.
//! Files that need literal semicolons must be run some other way.

/// One statement of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based position among the non-empty statements of the batch.
    pub index: usize,
    /// The piece between delimiters, untrimmed.
    pub raw: String,
    /// `raw` with surrounding whitespace removed; what gets executed.
    pub text: String,
}

/// Splits `sql` on `;` into trimmed, non-empty statements numbered from 1.
///
/// Never fails. Empty or whitespace-only input yields an empty vector, and a
/// trailing delimiter does not produce an empty statement.
///
/// ```
/// let statements = sqlbatch::splitter::split_statements("SELECT 1; SELECT 2;");
/// assert_eq!(statements.len(), 2);
/// assert_eq!(statements[1].text, "SELECT 2");
/// ```
pub fn split_statements(sql: &str) -> Vec<Statement> {
    sql.split(';')
        .filter(|piece| !piece.trim().is_empty())
        .enumerate()
        .map(|(i, piece)| Statement {
            index: i + 1,
            raw: piece.to_string(),
            text: piece.trim().to_string(),
        })
        .collect()
}
