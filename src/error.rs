use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteAccessError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "turso")]
    #[error(transparent)]
    TursoError(#[from] turso::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "It is not possible to set the version {requested} to database, because is lower than current version {current}"
    )]
    VersionConflict { requested: u32, current: u32 },

    #[error("Migration to version {version} failed: {source}")]
    MigrationFailure {
        version: u32,
        #[source]
        source: Box<SqliteAccessError>,
    },

    #[error("{0} doesn't have primary key columns")]
    NoPrimaryKey(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Resource misuse: {0}")]
    ResourceMisuse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl SqliteAccessError {
    /// True for failures reported by the wrapped SQL engine itself.
    #[must_use]
    pub fn is_native_engine_error(&self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            Self::SqliteError(_) => true,
            #[cfg(feature = "turso")]
            Self::TursoError(_) => true,
            Self::ExecutionError(_) => true,
            _ => false,
        }
    }

    pub(crate) fn closed() -> Self {
        Self::ResourceMisuse("database connection is closed".into())
    }
}
