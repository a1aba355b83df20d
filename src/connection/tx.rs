use crate::error::SqliteAccessError;

use super::Connection;

impl Connection {
    /// Begin a transaction.
    ///
    /// # Errors
    /// Returns `SqliteAccessError::ResourceMisuse` if the connection is closed or a
    /// transaction is already open, or the engine's error if it refuses to begin.
    pub async fn begin(&mut self) -> Result<(), SqliteAccessError> {
        let backend = self.backend()?;
        if self.in_transaction {
            return Err(SqliteAccessError::ResourceMisuse(
                "transaction already in progress".into(),
            ));
        }
        backend.execute_batch("BEGIN TRANSACTION").await?;
        self.in_transaction = true;
        tracing::debug!(name = %self.name, "transaction started");
        Ok(())
    }

    /// Commit the open transaction.
    ///
    /// On failure the transaction stays open so the caller can roll it back.
    ///
    /// # Errors
    /// Returns `SqliteAccessError::ResourceMisuse` if no transaction is open, or the
    /// engine's error if the commit fails.
    pub async fn commit(&mut self) -> Result<(), SqliteAccessError> {
        let backend = self.backend()?;
        if !self.in_transaction {
            return Err(SqliteAccessError::ResourceMisuse(
                "transaction not active".into(),
            ));
        }
        backend.execute_batch("COMMIT TRANSACTION").await?;
        self.in_transaction = false;
        tracing::debug!(name = %self.name, "transaction committed");
        Ok(())
    }

    /// Roll back the open transaction.
    ///
    /// The connection leaves transactional mode even if the engine reports an error.
    ///
    /// # Errors
    /// Returns `SqliteAccessError::ResourceMisuse` if no transaction is open, or the
    /// engine's error if the rollback fails.
    pub async fn rollback(&mut self) -> Result<(), SqliteAccessError> {
        let backend = self.backend()?;
        if !self.in_transaction {
            return Err(SqliteAccessError::ResourceMisuse(
                "transaction not active".into(),
            ));
        }
        let result = backend.execute_batch("ROLLBACK TRANSACTION").await;
        self.in_transaction = false;
        tracing::debug!(name = %self.name, ok = result.is_ok(), "transaction rolled back");
        result
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Run `callback` inside a transaction.
    ///
    /// Commits and returns the callback's value when it succeeds. When it fails, the
    /// transaction is rolled back and the callback's error is returned unchanged. If the
    /// commit itself fails, a rollback is attempted and the commit error returned.
    /// A callback that ends the transaction itself is left alone.
    ///
    /// ```rust,no_run
    /// # async fn demo(conn: &mut sqlite_access::Connection) -> Result<(), sqlite_access::SqliteAccessError> {
    /// use serde_json::json;
    /// use sqlite_access::Connection;
    ///
    /// let id = conn
    ///     .with_transaction(async |tx: &mut Connection| {
    ///         tx.insert("persons", &json!({"name": "Ann"})).await
    ///     })
    ///     .await?;
    /// # let _ = id;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns the callback's error, the error from `begin`, or the commit error.
    pub async fn with_transaction<T, E, F>(&mut self, callback: F) -> Result<T, E>
    where
        F: AsyncFnOnce(&mut Connection) -> Result<T, E>,
        E: From<SqliteAccessError>,
    {
        self.begin().await?;
        match callback(&mut *self).await {
            Ok(value) => {
                if !self.in_transaction {
                    return Ok(value);
                }
                if let Err(err) = self.commit().await {
                    self.rollback_after_failure().await;
                    return Err(err.into());
                }
                Ok(value)
            }
            Err(err) => {
                self.rollback_after_failure().await;
                Err(err)
            }
        }
    }

    async fn rollback_after_failure(&mut self) {
        if !self.in_transaction {
            return;
        }
        if let Err(err) = self.rollback().await {
            tracing::warn!(name = %self.name, error = %err, "rollback after failure failed");
        }
    }
}
