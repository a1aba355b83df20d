//! Dispatch over the native execution surfaces.
//!
//! Everything above this module is backend-independent: it builds a [`Statement`] in the
//! backend's [`BindStyle`] and hands it down here.

use std::path::Path;

use crate::error::SqliteAccessError;
use crate::query_builder::{BindStyle, Statement};
use crate::results::{RowFormat, RowRecord};
use crate::types::BackendKind;

#[cfg(feature = "sqlite")]
use crate::sqlite::{SqliteBackend, SqliteCursor};
#[cfg(feature = "turso")]
use crate::turso::{TursoBackend, TursoCursor};

pub(crate) enum Backend {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteBackend),
    #[cfg(feature = "turso")]
    Turso(TursoBackend),
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => f.debug_tuple("Sqlite").field(conn).finish(),
            #[cfg(feature = "turso")]
            Self::Turso(_) => f.debug_tuple("Turso").field(&"<Connection>").finish(),
        }
    }
}

impl Backend {
    pub(crate) async fn open(
        kind: BackendKind,
        path: Option<&Path>,
    ) -> Result<Self, SqliteAccessError> {
        match kind {
            #[cfg(feature = "sqlite")]
            BackendKind::Sqlite => Ok(Self::Sqlite(SqliteBackend::open(path).await?)),
            #[cfg(feature = "turso")]
            BackendKind::Turso => Ok(Self::Turso(TursoBackend::open(path).await?)),
        }
    }

    /// How values reach this backend's statements.
    pub(crate) fn bind_style(&self) -> BindStyle {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => BindStyle::Bound,
            #[cfg(feature = "turso")]
            Self::Turso(_) => BindStyle::Inline,
        }
    }

    pub(crate) async fn execute_batch(&self, sql: &str) -> Result<(), SqliteAccessError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => conn.execute_batch(sql).await,
            #[cfg(feature = "turso")]
            Self::Turso(conn) => conn.execute_batch(sql).await,
        }
    }

    pub(crate) async fn execute(&self, statement: Statement) -> Result<u64, SqliteAccessError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => conn.execute(statement).await,
            #[cfg(feature = "turso")]
            Self::Turso(conn) => conn.execute(statement).await,
        }
    }

    pub(crate) async fn execute_insert(
        &self,
        statement: Statement,
    ) -> Result<i64, SqliteAccessError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => conn.execute_insert(statement).await,
            #[cfg(feature = "turso")]
            Self::Turso(conn) => conn.execute_insert(statement).await,
        }
    }

    pub(crate) async fn user_version(&self) -> Result<u32, SqliteAccessError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => conn.user_version().await,
            #[cfg(feature = "turso")]
            Self::Turso(conn) => conn.user_version().await,
        }
    }

    pub(crate) async fn set_user_version(&self, version: u32) -> Result<(), SqliteAccessError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => conn.set_user_version(version).await,
            #[cfg(feature = "turso")]
            Self::Turso(conn) => conn.set_user_version(version).await,
        }
    }

    pub(crate) async fn open_cursor(
        &self,
        statement: Statement,
        format: RowFormat,
    ) -> Result<Cursor, SqliteAccessError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => Ok(Cursor::Sqlite(conn.open_cursor(statement, format))),
            #[cfg(feature = "turso")]
            Self::Turso(conn) => Ok(Cursor::Turso(conn.open_cursor(statement, format).await?)),
        }
    }

    pub(crate) async fn close(self) -> Result<(), SqliteAccessError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(conn) => conn.close().await,
            #[cfg(feature = "turso")]
            Self::Turso(conn) => {
                drop(conn);
                Ok(())
            }
        }
    }
}

/// An executing statement on either backend.
#[derive(Debug)]
pub(crate) enum Cursor {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteCursor),
    #[cfg(feature = "turso")]
    Turso(TursoCursor),
}

impl Cursor {
    pub(crate) async fn next(&mut self) -> Option<Result<RowRecord, SqliteAccessError>> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(cursor) => cursor.next().await,
            #[cfg(feature = "turso")]
            Self::Turso(cursor) => cursor.next().await,
        }
    }

    /// Finalize the statement, waiting for it to be released.
    pub(crate) async fn finish(self) -> Result<(), SqliteAccessError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(cursor) => cursor.finish().await,
            #[cfg(feature = "turso")]
            Self::Turso(cursor) => {
                cursor.finish();
                Ok(())
            }
        }
    }
}
