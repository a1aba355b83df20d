//! Versioned SQLite access with one contract over two native execution styles.
//!
//! A [`Connection`] is opened against a schema version; migration scripts run when the
//! requested version is above the stored one. Rows come back through a deferred
//! [`ResultPipeline`] that can buffer, map, reduce, or stream them lazily, decoded into
//! `serde_json::Value`s in either record or positional shape.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), sqlite_access::SqliteAccessError> {
//! use serde_json::json;
//! use sqlite_access::prelude::*;
//!
//! let mut conn = OpenOptions::builder()
//!     .version(1)
//!     .create_scripts(["CREATE TABLE companies (_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)"])
//!     .open("app.db")
//!     .await?;
//!
//! let id = conn.insert("companies", &json!({"name": "Acme"})).await?;
//! conn.update("companies", &json!({"name": "NookBe"}), "_id = ?", &[json!(id)]).await?;
//! let names = conn
//!     .query(QuerySpec::table("companies"))
//!     .map(|row, _| row.get("name").cloned())
//!     .await?;
//! # let _ = names;
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```

#[cfg(not(any(feature = "sqlite", feature = "turso")))]
compile_error!("enable at least one backend feature: `sqlite` or `turso`");

mod backend;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod prelude;
pub mod query_builder;
pub mod results;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod substitution;
#[cfg(feature = "turso")]
mod turso;
pub mod types;

pub use config::{OpenOptions, OpenOptionsBuilder};
pub use connection::{Connection, UpsertKey};
pub use error::SqliteAccessError;
pub use query_builder::QuerySpec;
pub use results::{Collected, QuerySource, ResultPipeline, RowRecord, RowStream, Transform};
pub use types::{BackendKind, MEMORY_DB_NAME, OutputShape, StorageClass, Value};
