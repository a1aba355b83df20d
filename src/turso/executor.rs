use crate::error::SqliteAccessError;
use crate::query_builder::Statement;
use crate::results::RowFormat;

use super::config::TursoBackend;
use super::query::{TursoCursor, column_text};

impl TursoBackend {
    /// Execute a batch of SQL statements for Turso.
    pub(crate) async fn execute_batch(&self, sql: &str) -> Result<(), SqliteAccessError> {
        self.conn.execute_batch(sql).await.map_err(|e| {
            SqliteAccessError::ExecutionError(format!("Turso execute_batch error: {e}"))
        })
    }

    /// Execute a DML statement and return the affected row count.
    pub(crate) async fn execute(&self, statement: Statement) -> Result<u64, SqliteAccessError> {
        debug_assert!(
            statement.params.is_empty(),
            "raw statements carry their values inline"
        );
        self.conn
            .execute(&statement.sql, ())
            .await
            .map_err(|e| SqliteAccessError::ExecutionError(format!("Turso execute error: {e}")))
    }

    /// Execute an INSERT-like statement and return the row id it produced.
    pub(crate) async fn execute_insert(
        &self,
        statement: Statement,
    ) -> Result<i64, SqliteAccessError> {
        self.execute(statement).await?;
        let rowid = self.scalar("SELECT last_insert_rowid()").await?;
        rowid.parse::<i64>().map_err(|e| {
            SqliteAccessError::ExecutionError(format!("Turso last_insert_rowid error: {e}"))
        })
    }

    pub(crate) async fn user_version(&self) -> Result<u32, SqliteAccessError> {
        let version = self.scalar("PRAGMA user_version").await?;
        version.parse::<u32>().map_err(|e| {
            SqliteAccessError::ExecutionError(format!(
                "stored user_version {version} is out of range: {e}"
            ))
        })
    }

    pub(crate) async fn set_user_version(&self, version: u32) -> Result<(), SqliteAccessError> {
        self.execute_batch(&format!("PRAGMA user_version = {version}"))
            .await
    }

    pub(crate) async fn open_cursor(
        &self,
        statement: Statement,
        format: RowFormat,
    ) -> Result<TursoCursor, SqliteAccessError> {
        let mut stmt = self
            .conn
            .prepare(&statement.sql)
            .await
            .map_err(|e| SqliteAccessError::ExecutionError(format!("Turso prepare error: {e}")))?;
        let column_names: Vec<String> = stmt
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();
        let rows = stmt
            .query(())
            .await
            .map_err(|e| SqliteAccessError::ExecutionError(format!("Turso query error: {e}")))?;
        Ok(TursoCursor::new(rows, column_names, format))
    }

    /// Text form of the first column of the first row.
    async fn scalar(&self, sql: &str) -> Result<String, SqliteAccessError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .await
            .map_err(|e| SqliteAccessError::ExecutionError(format!("Turso prepare error: {e}")))?;
        let mut rows = stmt
            .query(())
            .await
            .map_err(|e| SqliteAccessError::ExecutionError(format!("Turso query error: {e}")))?;
        let row = rows
            .next()
            .await
            .map_err(|e| {
                SqliteAccessError::ExecutionError(format!("Turso row fetch error: {e}"))
            })?
            .ok_or_else(|| {
                SqliteAccessError::ExecutionError(format!("`{sql}` returned no rows"))
            })?;
        column_text(&row, 0)?.ok_or_else(|| {
            SqliteAccessError::ExecutionError(format!("`{sql}` returned NULL"))
        })
    }
}
