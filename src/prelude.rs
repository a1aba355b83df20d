//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::codec::{Literal, from_text, to_literal};
pub use crate::config::{OpenOptions, OpenOptionsBuilder};
pub use crate::connection::{Connection, UpsertKey};
pub use crate::error::SqliteAccessError;
pub use crate::query_builder::QuerySpec;
pub use crate::results::{Collected, ResultPipeline, RowRecord, RowStream, Transform};
pub use crate::substitution::substitute;
pub use crate::types::{BackendKind, MEMORY_DB_NAME, OutputShape};
