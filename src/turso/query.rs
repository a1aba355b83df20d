use serde_json::Value as JsonValue;

use crate::codec::{self, TextDecoding};
use crate::error::SqliteAccessError;
use crate::results::{RowFormat, RowRecord};
use crate::types::Value;

fn turso_value(row: &turso::Row, idx: usize) -> Result<Value, SqliteAccessError> {
    let value = row.get_value(idx).map_err(|e| {
        SqliteAccessError::ExecutionError(format!("Turso value conversion error: {e}"))
    })?;
    Ok(match value {
        turso::Value::Null => Value::Null,
        turso::Value::Integer(i) => Value::Integer(i),
        turso::Value::Real(f) => Value::Float(f),
        turso::Value::Text(s) => Value::Text(s),
        turso::Value::Blob(b) => Value::Blob(b),
    })
}

/// Column `idx` in its text form, `None` for NULL.
pub(super) fn column_text(
    row: &turso::Row,
    idx: usize,
) -> Result<Option<String>, SqliteAccessError> {
    Ok(turso_value(row, idx)?.text_form())
}

/// Decode one column through its text form.
fn turso_extract_value(
    row: &turso::Row,
    idx: usize,
    text: TextDecoding,
) -> Result<JsonValue, SqliteAccessError> {
    let value = turso_value(row, idx)?;
    codec::read_column_as(text, value.storage_class(), idx, |idx| {
        value.text_form().ok_or_else(|| {
            SqliteAccessError::ExecutionError(format!("column {idx} has no text form"))
        })
    })
}

/// Cursor over an executing Turso statement.
///
/// `turso::Rows` owns the stepped statement; dropping the cursor finalizes it.
pub(crate) struct TursoCursor {
    rows: Option<turso::Rows>,
    column_names: Vec<String>,
    format: RowFormat,
}

impl TursoCursor {
    pub(super) fn new(rows: turso::Rows, column_names: Vec<String>, format: RowFormat) -> Self {
        Self {
            rows: Some(rows),
            column_names,
            format,
        }
    }

    /// Next decoded row, or `None` once the statement is exhausted.
    pub(crate) async fn next(&mut self) -> Option<Result<RowRecord, SqliteAccessError>> {
        let rows = self.rows.as_mut()?;
        let row = match rows.next().await {
            Ok(Some(row)) => row,
            Ok(None) => {
                self.rows = None;
                return None;
            }
            Err(e) => {
                self.rows = None;
                return Some(Err(SqliteAccessError::ExecutionError(format!(
                    "Turso row fetch error: {e}"
                ))));
            }
        };

        let values = match (0..self.column_names.len())
            .map(|idx| turso_extract_value(&row, idx, self.format.text))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(values) => values,
            Err(err) => return Some(Err(err)),
        };
        Some(Ok(RowRecord::from_columns(
            self.format.shape,
            &self.column_names,
            values,
        )))
    }

    pub(crate) fn finish(mut self) {
        drop(self.rows.take());
    }
}

impl std::fmt::Debug for TursoCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TursoCursor")
            .field("column_names", &self.column_names)
            .field("format", &self.format)
            .field("open", &self.rows.is_some())
            .finish()
    }
}
