//! Database repositories for the data access layer
//!
//! `pool` opens the SQLite database and applies migrations; `document` holds the
//! metadata store contract and its SQLite implementation.

pub mod document;
pub mod pool;

pub use document::{DocumentRow, DocumentStore, DocumentStream, SqliteDocumentStore, INSERT_FAILED};
pub use pool::Database;
