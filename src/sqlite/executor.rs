use crate::error::SqliteAccessError;
use crate::query_builder::Statement;
use crate::results::RowFormat;

use super::config::{SqliteBackend, run_blocking};
use super::cursor::SqliteCursor;
use super::params::Params;

impl SqliteBackend {
    /// Execute a batch of SQL statements using auto-commit.
    pub(crate) async fn execute_batch(&self, sql: &str) -> Result<(), SqliteAccessError> {
        let sql = sql.to_owned();
        run_blocking(self.handle(), move |conn| {
            conn.execute_batch(&sql)?;
            Ok(())
        })
        .await
    }

    /// Execute a DML statement and return the number of rows it changed.
    pub(crate) async fn execute(&self, statement: Statement) -> Result<u64, SqliteAccessError> {
        run_blocking(self.handle(), move |conn| {
            let params = Params::convert(&statement.params);
            let changed = conn
                .prepare_cached(&statement.sql)?
                .execute(&params.as_refs()[..])?;
            u64::try_from(changed).map_err(|e| {
                SqliteAccessError::ExecutionError(format!("Invalid rows affected count: {e}"))
            })
        })
        .await
    }

    /// Execute an INSERT-like statement and return the row id it produced.
    pub(crate) async fn execute_insert(
        &self,
        statement: Statement,
    ) -> Result<i64, SqliteAccessError> {
        run_blocking(self.handle(), move |conn| {
            let params = Params::convert(&statement.params);
            conn.prepare_cached(&statement.sql)?
                .execute(&params.as_refs()[..])?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub(crate) async fn user_version(&self) -> Result<u32, SqliteAccessError> {
        run_blocking(self.handle(), |conn| {
            let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
            u32::try_from(version).map_err(|_| {
                SqliteAccessError::ExecutionError(format!(
                    "stored user_version {version} is out of range"
                ))
            })
        })
        .await
    }

    pub(crate) async fn set_user_version(&self, version: u32) -> Result<(), SqliteAccessError> {
        self.execute_batch(&format!("PRAGMA user_version = {version}"))
            .await
    }

    pub(crate) fn open_cursor(&self, statement: Statement, format: RowFormat) -> SqliteCursor {
        SqliteCursor::spawn(self.handle(), statement, format)
    }
}
