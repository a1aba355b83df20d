use std::cmp::Ordering;

use crate::backend::Backend;
use crate::config::{OpenOptions, resolve_database_path};
use crate::error::SqliteAccessError;

use super::Connection;

impl Connection {
    /// Open (creating if absent) the database `name` and reconcile its schema version.
    ///
    /// `name` is a file name under `options.base_dir` (or the platform data directory),
    /// or `":memory:"`. When `options.version` is above the stored version, the stored
    /// version is raised and the drop scripts (only for an existing schema) then the
    /// create scripts run, all inside one transaction.
    ///
    /// ```rust,no_run
    /// # async fn demo() -> Result<(), sqlite_access::SqliteAccessError> {
    /// use sqlite_access::{Connection, OpenOptions};
    ///
    /// let opts = OpenOptions::builder()
    ///     .version(1)
    ///     .create_scripts(["CREATE TABLE persons (_id INTEGER PRIMARY KEY, name TEXT)"])
    ///     .finish();
    /// let mut conn = Connection::open("app.db", opts).await?;
    /// conn.close().await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// - `InvalidArgument` for an empty name or a version of 0;
    /// - `VersionConflict` when the stored version is above the requested one (the
    ///   connection is closed);
    /// - `MigrationFailure` when a script fails (the version is reverted and the
    ///   connection closed);
    /// - `Io` or an engine error if the file cannot be opened.
    pub async fn open(name: &str, options: OpenOptions) -> Result<Self, SqliteAccessError> {
        if name.is_empty() {
            return Err(SqliteAccessError::InvalidArgument(
                "Must specify a db name".into(),
            ));
        }
        if options.version == 0 {
            return Err(SqliteAccessError::InvalidArgument(
                "version must be at least 1".into(),
            ));
        }

        let path = resolve_database_path(name, options.base_dir.as_deref())?;
        tracing::debug!(name, path = ?path, backend = ?options.backend, "opening database");
        let backend = Backend::open(options.backend, path.as_deref()).await?;

        let mut conn = Connection {
            backend: Some(backend),
            name: name.to_owned(),
            path,
            version: 0,
            shape: options.output_shape,
            kind: options.backend,
            in_transaction: false,
        };

        let current = match conn.backend()?.user_version().await {
            Ok(current) => current,
            Err(err) => {
                conn.close_quietly().await;
                return Err(err);
            }
        };

        match options.version.cmp(&current) {
            Ordering::Greater => conn.migrate(current, &options).await?,
            Ordering::Less => {
                conn.close_quietly().await;
                return Err(SqliteAccessError::VersionConflict {
                    requested: options.version,
                    current,
                });
            }
            Ordering::Equal => tracing::debug!(version = current, "schema version is current"),
        }

        conn.version = options.version;
        Ok(conn)
    }

    async fn migrate(&mut self, current: u32, options: &OpenOptions) -> Result<(), SqliteAccessError> {
        let target = options.version;
        tracing::debug!(from = current, to = target, "migrating schema");

        let Err(err) = self.run_migration(current, options).await else {
            return Ok(());
        };

        tracing::warn!(from = current, to = target, error = %err, "migration failed; reverting version");
        if let Ok(backend) = self.backend() {
            if let Err(rollback_err) = backend.execute_batch("ROLLBACK").await {
                tracing::debug!(error = %rollback_err, "no migration transaction to roll back");
            }
            if let Err(revert_err) = backend.set_user_version(current).await {
                tracing::warn!(error = %revert_err, "failed to revert schema version");
            }
        }
        self.close_quietly().await;

        Err(SqliteAccessError::MigrationFailure {
            version: target,
            source: Box::new(err),
        })
    }

    async fn run_migration(&self, current: u32, options: &OpenOptions) -> Result<(), SqliteAccessError> {
        let backend = self.backend()?;
        backend.execute_batch("BEGIN").await?;
        backend.set_user_version(options.version).await?;

        if current > 0 {
            for script in &options.drop_scripts {
                tracing::debug!(script = %script, "running drop script");
                backend.execute_batch(script).await?;
            }
        }
        for script in &options.create_scripts {
            tracing::debug!(script = %script, "running create script");
            backend.execute_batch(script).await?;
        }

        backend.execute_batch("COMMIT").await
    }

    async fn close_quietly(&mut self) {
        if let Err(err) = self.close().await {
            tracing::warn!(name = %self.name, error = %err, "failed to close database");
        }
    }
}
