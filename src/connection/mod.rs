//! The versioned database connection.
//!
//! - core: state, accessors, close, statement execution helpers
//! - lifecycle: open and schema-version migration
//! - select: deferred queries
//! - tx: transaction control
//! - dml: insert/replace/update/delete/upsert

mod core;
mod dml;
mod lifecycle;
mod select;
mod tx;

pub use self::core::Connection;
pub use self::dml::UpsertKey;
