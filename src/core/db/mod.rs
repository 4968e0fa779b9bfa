/// Database Module
///
/// The database layer is split into two concerns:
/// - **Connection Management** (`connection.rs`): opening a scoped SQLite handle
/// - **Query Execution** (`query.rs`): running one statement and classifying its outcome
pub mod connection;
pub mod query;

pub use connection::*;
pub use query::*;
