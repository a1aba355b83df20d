use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::SqliteAccessError;
use crate::query_builder::{
    BindStyle, delete_statement, insert_statement, quote_ident, update_statement,
};
use crate::types::OutputShape;

use super::Connection;

/// Key of the row an [`upsert`](Connection::upsert) touched.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertKey {
    /// The single primary-key value; the new row id when the caller did not supply one.
    Single(JsonValue),
    /// Composite key values in primary-key order.
    Composite(Vec<JsonValue>),
}

impl UpsertKey {
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            UpsertKey::Single(value) => value.as_i64(),
            UpsertKey::Composite(_) => None,
        }
    }

    #[must_use]
    pub fn into_json(self) -> JsonValue {
        match self {
            UpsertKey::Single(value) => value,
            UpsertKey::Composite(values) => JsonValue::Array(values),
        }
    }
}

/// Column/value record for a CRUD call.
fn record_values<V: Serialize + ?Sized>(
    values: &V,
) -> Result<Map<String, JsonValue>, SqliteAccessError> {
    match serde_json::to_value(values)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(SqliteAccessError::InvalidArgument(format!(
            "expected a column/value record, got {other}"
        ))),
    }
}

impl Connection {
    /// Insert one row and return its row id.
    ///
    /// `values` is anything that serializes to a `{ column: value }` record: a
    /// `serde_json::json!({...})` object or a `#[derive(Serialize)]` struct. An empty
    /// record inserts `DEFAULT VALUES`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `values` is not a record, `ResourceMisuse` on a closed
    /// connection, or the engine's error.
    pub async fn insert<V: Serialize + ?Sized>(
        &mut self,
        table: &str,
        values: &V,
    ) -> Result<i64, SqliteAccessError> {
        let values = record_values(values)?;
        self.insert_record("INSERT", table, &values).await
    }

    /// Insert one row, first removing any row with the same primary key, and return the
    /// row id of the inserted row.
    ///
    /// The typed backend sends `REPLACE INTO`. The raw backend has no `REPLACE`, so the
    /// row holding the record's key is deleted and the record inserted, both inside one
    /// transaction. Other unique constraints are not consulted on that path.
    ///
    /// # Errors
    /// As for [`insert`](Self::insert).
    pub async fn replace<V: Serialize + ?Sized>(
        &mut self,
        table: &str,
        values: &V,
    ) -> Result<i64, SqliteAccessError> {
        let values = record_values(values)?;
        match self.bind_style()? {
            BindStyle::Bound => self.insert_record("REPLACE", table, &values).await,
            BindStyle::Inline => self.replace_by_key(table, &values).await,
        }
    }

    /// Update matching rows and return how many changed.
    ///
    /// An empty `where_clause` updates every row.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an empty record or missing placeholder values,
    /// `ResourceMisuse` on a closed connection, or the engine's error.
    pub async fn update<V: Serialize + ?Sized>(
        &mut self,
        table: &str,
        values: &V,
        where_clause: &str,
        where_args: &[JsonValue],
    ) -> Result<u64, SqliteAccessError> {
        let values = record_values(values)?;
        let statement =
            update_statement(self.bind_style()?, table, &values, where_clause, where_args)?;
        self.execute(statement).await
    }

    /// Delete matching rows, or every row without a clause, and return how many went.
    ///
    /// # Errors
    /// Returns `ResourceMisuse` on a closed connection, or the engine's error.
    pub async fn delete(
        &mut self,
        table: &str,
        where_clause: Option<&str>,
        where_args: Option<&[JsonValue]>,
    ) -> Result<u64, SqliteAccessError> {
        let statement = delete_statement(self.bind_style()?, table, where_clause, where_args)?;
        self.execute(statement).await
    }

    /// Update the row matching the record's primary key, or insert it when none matches.
    ///
    /// ```rust,no_run
    /// # async fn demo(conn: &mut sqlite_access::Connection) -> Result<(), sqlite_access::SqliteAccessError> {
    /// use serde_json::json;
    /// use sqlite_access::UpsertKey;
    ///
    /// let key = conn.upsert("persons", &json!({"_id": 1, "name": "Ann"})).await?;
    /// assert_eq!(key, UpsertKey::Single(json!(1)));
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// After an insert, key parts the record left out (a row id, a column default) are
    /// read back from the stored row.
    ///
    /// # Errors
    /// Returns `NoPrimaryKey` if the table has no primary-key columns, or any error from
    /// the update or insert.
    pub async fn upsert<V: Serialize + ?Sized>(
        &mut self,
        table: &str,
        values: &V,
    ) -> Result<UpsertKey, SqliteAccessError> {
        let values = record_values(values)?;
        let keys = self.primary_key_columns(table).await?;
        if keys.is_empty() {
            return Err(SqliteAccessError::NoPrimaryKey(table.to_owned()));
        }

        let key_values: Vec<JsonValue> = keys
            .iter()
            .map(|key| values.get(key).cloned().unwrap_or(JsonValue::Null))
            .collect();
        let where_clause = key_filter(&keys);

        let updated = self.update(table, &values, &where_clause, &key_values).await?;
        if updated > 0 {
            tracing::debug!(table, rows = updated, "upsert updated existing row");
            return Ok(key_of(key_values));
        }

        let rowid = self.insert_record("INSERT", table, &values).await?;
        tracing::debug!(table, rowid, "upsert inserted new row");
        if key_values.iter().all(|value| !value.is_null()) {
            return Ok(key_of(key_values));
        }
        if let Some(stored) = self.stored_key(table, &keys, rowid).await? {
            return Ok(key_of(stored));
        }
        match key_of(key_values) {
            UpsertKey::Single(JsonValue::Null) => Ok(UpsertKey::Single(JsonValue::from(rowid))),
            key => Ok(key),
        }
    }

    /// Primary-key column names of `table`, in key order.
    async fn primary_key_columns(&mut self, table: &str) -> Result<Vec<String>, SqliteAccessError> {
        let rows = self
            .select(format!("PRAGMA table_info({table})"), None)
            .with_shape(OutputShape::Record)
            .verbatim_text()
            .rows()
            .await?;

        let mut keys: Vec<(i64, String)> = rows
            .iter()
            .filter_map(|row| {
                let position = row.get("pk")?.as_i64().filter(|pk| *pk > 0)?;
                let name = row.get("name")?.as_str()?.to_owned();
                Some((position, name))
            })
            .collect();
        keys.sort_by_key(|(position, _)| *position);
        Ok(keys.into_iter().map(|(_, name)| name).collect())
    }

    /// Key values of the row at `rowid`, filled in by the engine where the caller left
    /// them out. `None` when the table has no addressable rowid.
    async fn stored_key(
        &mut self,
        table: &str,
        keys: &[String],
        rowid: i64,
    ) -> Result<Option<Vec<JsonValue>>, SqliteAccessError> {
        let columns = keys
            .iter()
            .map(|key| quote_ident(key))
            .collect::<Vec<_>>()
            .join(",");
        let row = self
            .select(
                format!("SELECT {columns} FROM {table} WHERE rowid = ?"),
                Some(vec![JsonValue::from(rowid)]),
            )
            .with_shape(OutputShape::Positional)
            .first()
            .await;
        match row {
            Ok(Some(row)) => match row.into_json() {
                JsonValue::Array(values) => Ok(Some(values)),
                _ => Ok(None),
            },
            Ok(None) => Ok(None),
            Err(err) if err.is_native_engine_error() => {
                tracing::debug!(table, error = %err, "stored key not readable by rowid");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn replace_by_key(
        &mut self,
        table: &str,
        values: &Map<String, JsonValue>,
    ) -> Result<i64, SqliteAccessError> {
        let keys = self.primary_key_columns(table).await?;
        let key_values: Option<Vec<JsonValue>> = keys
            .iter()
            .map(|key| values.get(key).filter(|value| !value.is_null()).cloned())
            .collect();
        let key_values = match key_values {
            Some(key_values) if !keys.is_empty() => key_values,
            _ => return self.insert_record("INSERT", table, values).await,
        };
        let where_clause = key_filter(&keys);

        if self.in_transaction {
            self.delete(table, Some(where_clause.as_str()), Some(key_values.as_slice()))
                .await?;
            return self.insert_record("INSERT", table, values).await;
        }
        self.with_transaction(async |tx: &mut Connection| -> Result<i64, SqliteAccessError> {
            tx.delete(table, Some(where_clause.as_str()), Some(key_values.as_slice()))
                .await?;
            tx.insert_record("INSERT", table, values).await
        })
        .await
    }

    async fn insert_record(
        &mut self,
        verb: &str,
        table: &str,
        values: &Map<String, JsonValue>,
    ) -> Result<i64, SqliteAccessError> {
        let statement = insert_statement(self.bind_style()?, verb, table, values)?;
        self.execute_insert(statement).await
    }
}

/// `"k1"=? AND "k2"=?` over the key columns.
fn key_filter(keys: &[String]) -> String {
    keys.iter()
        .map(|key| format!("{}=?", quote_ident(key)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn key_of(mut key_values: Vec<JsonValue>) -> UpsertKey {
    if key_values.len() == 1 {
        UpsertKey::Single(key_values.remove(0))
    } else {
        UpsertKey::Composite(key_values)
    }
}
