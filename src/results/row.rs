use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::codec::TextDecoding;
use crate::error::SqliteAccessError;
use crate::types::OutputShape;

/// How a cursor turns native columns into a [`RowRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowFormat {
    pub(crate) shape: OutputShape,
    pub(crate) text: TextDecoding,
}

/// A row from a query result, in the connection's output shape.
///
/// Record rows keep the statement's column order; when two columns share a name the
/// later one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowRecord {
    /// `{ column: value }`
    Record(Map<String, JsonValue>),
    /// `[value, ...]` in column order
    Positional(Vec<JsonValue>),
}

impl RowRecord {
    pub(crate) fn from_columns(
        shape: OutputShape,
        column_names: &[String],
        values: Vec<JsonValue>,
    ) -> Self {
        match shape {
            OutputShape::Record => RowRecord::Record(
                column_names.iter().cloned().zip(values).collect(),
            ),
            OutputShape::Positional => RowRecord::Positional(values),
        }
    }

    /// Get a value by column name. Positional rows have no names.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&JsonValue> {
        match self {
            RowRecord::Record(map) => map.get(column_name),
            RowRecord::Positional(_) => None,
        }
    }

    /// Get a value by column position, for either shape.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&JsonValue> {
        match self {
            RowRecord::Record(map) => map.values().nth(index),
            RowRecord::Positional(values) => values.get(index),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            RowRecord::Record(map) => map.len(),
            RowRecord::Positional(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn into_json(self) -> JsonValue {
        match self {
            RowRecord::Record(map) => JsonValue::Object(map),
            RowRecord::Positional(values) => JsonValue::Array(values),
        }
    }

    /// Deserialize the row into `T` (a struct for record rows, a tuple for positional).
    ///
    /// # Errors
    /// Returns `SqliteAccessError::Serialization` if the row does not fit `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, SqliteAccessError> {
        Ok(serde_json::from_value(self.into_json())?)
    }
}

impl From<RowRecord> for JsonValue {
    fn from(row: RowRecord) -> Self {
        row.into_json()
    }
}
