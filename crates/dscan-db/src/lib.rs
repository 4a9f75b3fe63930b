//! DScan database layer
//!
//! The metadata store for scanned documents: a single SQLite table with
//! insert/update/delete and one live query over all rows.

pub mod db;

pub use db::{
    Database, DocumentRow, DocumentStore, DocumentStream, SqliteDocumentStore, INSERT_FAILED,
};
