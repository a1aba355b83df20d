use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A value exactly as the engine stores it in a column.
///
/// Both backends translate their native column values into this enum before the
/// codec turns them into host values:
/// ```rust
/// use sqlite_access::types::{StorageClass, Value};
///
/// let v = Value::Integer(42);
/// assert_eq!(v.storage_class(), StorageClass::Integer);
/// assert_eq!(v.text_form().as_deref(), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Integer value (64-bit)
    Integer(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
}

impl Value {
    #[must_use]
    pub fn storage_class(&self) -> StorageClass {
        match self {
            Value::Null => StorageClass::Null,
            Value::Integer(_) => StorageClass::Integer,
            Value::Float(_) => StorageClass::Float,
            Value::Text(_) => StorageClass::Text,
            Value::Blob(_) => StorageClass::Blob,
        }
    }

    /// The column's text form, or `None` for NULL.
    ///
    /// Floats keep a fractional part (`1.0`, not `1`) so a REAL column decodes back to a
    /// float rather than an integer.
    #[must_use]
    pub fn text_form(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(format!("{f:?}")),
            Value::Text(s) => Some(s.clone()),
            Value::Blob(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// The engine's dynamic per-value type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Null,
    Integer,
    Float,
    Text,
    Blob,
}

/// Shape of every decoded row for one connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// Rows decode to `{ column: value }` records.
    #[default]
    Record,
    /// Rows decode to positional `[value, ...]` sequences.
    Positional,
}

/// The native execution surface behind a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// `SQLite` through rusqlite: bound parameters and typed column readers.
    #[cfg(feature = "sqlite")]
    Sqlite,
    /// Turso (SQLite-compatible, in-process): hand-built SQL text, columns read as text.
    #[cfg(feature = "turso")]
    Turso,
}

impl Default for BackendKind {
    fn default() -> Self {
        #[cfg(feature = "sqlite")]
        {
            BackendKind::Sqlite
        }
        #[cfg(all(not(feature = "sqlite"), feature = "turso"))]
        {
            BackendKind::Turso
        }
    }
}

/// Name that opens a private in-memory database instead of a file.
pub const MEMORY_DB_NAME: &str = ":memory:";
