use std::fmt;
use std::path::{Path, PathBuf};

use crate::backend::Backend;
use crate::error::SqliteAccessError;
use crate::query_builder::{BindStyle, Statement};
use crate::types::{BackendKind, OutputShape};

/// An open (or closed) versioned database.
///
/// Owns its native handle; any number of connections may coexist. Every operation on a
/// closed connection fails with `SqliteAccessError::ResourceMisuse`.
pub struct Connection {
    pub(super) backend: Option<Backend>,
    pub(super) name: String,
    pub(super) path: Option<PathBuf>,
    pub(super) version: u32,
    pub(super) shape: OutputShape,
    pub(super) kind: BackendKind,
    pub(super) in_transaction: bool,
}

impl Connection {
    pub(crate) fn backend(&self) -> Result<&Backend, SqliteAccessError> {
        self.backend.as_ref().ok_or_else(SqliteAccessError::closed)
    }

    pub(crate) fn bind_style(&self) -> Result<BindStyle, SqliteAccessError> {
        Ok(self.backend()?.bind_style())
    }

    pub(crate) async fn execute(&self, statement: Statement) -> Result<u64, SqliteAccessError> {
        let backend = self.backend()?;
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "executing statement");
        backend.execute(statement).await
    }

    pub(crate) async fn execute_insert(
        &self,
        statement: Statement,
    ) -> Result<i64, SqliteAccessError> {
        let backend = self.backend()?;
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "executing insert");
        backend.execute_insert(statement).await
    }

    /// Run one or more SQL statements, discarding any rows they produce.
    ///
    /// # Errors
    /// Returns `SqliteAccessError::ResourceMisuse` on a closed connection, or the engine's
    /// error if a statement fails.
    pub async fn exec_sql(&mut self, sql: &str) -> Result<(), SqliteAccessError> {
        let backend = self.backend()?;
        tracing::debug!(sql, "executing batch");
        backend.execute_batch(sql).await
    }

    /// Close the connection. Closing twice is a no-op.
    ///
    /// An open transaction is discarded by the engine.
    ///
    /// # Errors
    /// Returns the engine's error if the native handle fails to close; the connection is
    /// considered closed regardless.
    pub async fn close(&mut self) -> Result<(), SqliteAccessError> {
        let Some(backend) = self.backend.take() else {
            return Ok(());
        };
        self.in_transaction = false;
        tracing::debug!(name = %self.name, "closing database");
        backend.close().await
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    /// Schema version reconciled at open.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn output_shape(&self) -> OutputShape {
        self.shape
    }

    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    /// Database file, or `None` for an in-memory database.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name)
            .field("backend", &self.backend)
            .field("version", &self.version)
            .field("shape", &self.shape)
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}
