use std::fmt;
use std::path::Path;

use crate::error::SqliteAccessError;
use crate::types::MEMORY_DB_NAME;

/// Local (in-process) Turso database plus the one connection a `Connection` drives.
pub(crate) struct TursoBackend {
    // Keeps the database alive for as long as the connection is in use.
    _db: turso::Database,
    pub(super) conn: turso::Connection,
}

impl TursoBackend {
    /// Open the database file at `path` (created if absent), or an in-memory database.
    pub(crate) async fn open(path: Option<&Path>) -> Result<Self, SqliteAccessError> {
        let target = match path {
            Some(path) => path
                .to_str()
                .ok_or_else(|| {
                    SqliteAccessError::InvalidArgument(format!(
                        "database path {} is not valid UTF-8",
                        path.display()
                    ))
                })?
                .to_owned(),
            None => MEMORY_DB_NAME.to_owned(),
        };

        let db = turso::Builder::new_local(&target)
            .build()
            .await
            .map_err(|e| {
                SqliteAccessError::ExecutionError(format!("Failed to create Turso database: {e}"))
            })?;
        let conn = db.connect().map_err(|e| {
            SqliteAccessError::ExecutionError(format!("Failed to connect Turso database: {e}"))
        })?;

        Ok(Self { _db: db, conn })
    }
}

impl fmt::Debug for TursoBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TursoBackend").finish_non_exhaustive()
    }
}
