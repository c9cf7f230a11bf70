//! # nlsql-sqlite
//!
//! [`SqliteDatabase`] exposes a SQLite file (or an in-memory database) as an
//! [`nlsql_chain::DataStore`]: relation listing, schema text with sample rows,
//! and query execution with failures classified as fatal or recoverable.

pub mod classify;
pub mod database;
pub mod format;

pub use classify::{classify, to_store_error};
pub use database::{SqliteDatabase, SqliteOptions};
