//! `SQLite` backend on rusqlite.
//!
//! Values are bound as real statement parameters and columns are read with typed
//! accessors. Every call runs on tokio's blocking pool against a connection guarded by a
//! `tokio::sync::Mutex`; streaming cursors hold that lock from a blocking worker.

mod config;
mod cursor;
mod executor;
mod params;
mod query;

pub(crate) use config::SqliteBackend;
pub(crate) use cursor::SqliteCursor;
