use rusqlite::types::ValueRef;
use serde_json::Value as JsonValue;

use crate::codec::{self, TextDecoding};
use crate::error::SqliteAccessError;
use crate::results::{RowFormat, RowRecord};
use crate::types::StorageClass;

/// Read one column with the typed accessor matching its storage class.
///
/// Numbers come straight from the typed readers; text and blobs go through the codec so
/// stored JSON text decodes back into structured values.
pub(super) fn sqlite_extract_value(
    row: &rusqlite::Row<'_>,
    idx: usize,
    text: TextDecoding,
) -> Result<JsonValue, SqliteAccessError> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(JsonValue::Null),
        ValueRef::Integer(i) => Ok(JsonValue::from(i)),
        ValueRef::Real(f) => Ok(JsonValue::from(f)),
        ValueRef::Text(bytes) => codec::read_column_as(text, StorageClass::Text, idx, |_| {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }),
        ValueRef::Blob(bytes) => codec::read_column(StorageClass::Blob, idx, |_| {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }),
    }
}

pub(super) fn decode_row(
    row: &rusqlite::Row<'_>,
    column_names: &[String],
    format: RowFormat,
) -> Result<RowRecord, SqliteAccessError> {
    let values = (0..column_names.len())
        .map(|idx| sqlite_extract_value(row, idx, format.text))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RowRecord::from_columns(format.shape, column_names, values))
}
