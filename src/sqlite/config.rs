use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::SqliteAccessError;

pub(crate) type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// Owned rusqlite connection for one `Connection`.
pub(crate) struct SqliteBackend {
    conn: SharedSqliteConnection,
}

impl SqliteBackend {
    /// Open the database file at `path` (created if absent), or a private in-memory
    /// database when `path` is `None`.
    pub(crate) async fn open(path: Option<&Path>) -> Result<Self, SqliteAccessError> {
        let path = path.map(Path::to_path_buf);
        let conn = tokio::task::spawn_blocking(move || match path {
            Some(path) => rusqlite::Connection::open(path),
            None => rusqlite::Connection::open_in_memory(),
        })
        .await
        .map_err(|e| SqliteAccessError::ExecutionError(format!("sqlite open join error: {e}")))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn handle(&self) -> SharedSqliteConnection {
        Arc::clone(&self.conn)
    }

    /// Close the native handle, surfacing the engine's close error.
    ///
    /// A cursor worker that is still winding down keeps its own handle; in that case the
    /// connection is released by whichever side drops last.
    pub(crate) async fn close(self) -> Result<(), SqliteAccessError> {
        let Ok(mutex) = Arc::try_unwrap(self.conn) else {
            tracing::debug!("sqlite handle still held by a cursor worker; deferring close");
            return Ok(());
        };
        let conn = mutex.into_inner();
        tokio::task::spawn_blocking(move || {
            conn.close()
                .map_err(|(_, err)| SqliteAccessError::SqliteError(err))
        })
        .await
        .map_err(|e| SqliteAccessError::ExecutionError(format!("sqlite close join error: {e}")))?
    }
}

impl fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("conn", &self.conn)
            .finish()
    }
}

pub(super) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqliteAccessError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqliteAccessError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| SqliteAccessError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}
