use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::error::SqliteAccessError;
use crate::types::{BackendKind, MEMORY_DB_NAME, OutputShape};

/// Directory under the platform data directory that holds databases by default.
pub const DEFAULT_DIR_NAME: &str = "sqlite-access";

/// Options for opening a versioned database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    /// Schema version the caller expects; at least 1.
    pub version: u32,
    /// Scripts run in order when the stored version is raised.
    pub create_scripts: Vec<String>,
    /// Scripts run in order before `create_scripts` when upgrading an existing schema.
    pub drop_scripts: Vec<String>,
    pub output_shape: OutputShape,
    pub backend: BackendKind,
    /// Directory for the database file; the platform data directory when `None`.
    pub base_dir: Option<PathBuf>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            version: 1,
            create_scripts: Vec::new(),
            drop_scripts: Vec::new(),
            output_shape: OutputShape::default(),
            backend: BackendKind::default(),
            base_dir: None,
        }
    }
}

impl OpenOptions {
    #[must_use]
    pub fn new(version: u32) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn builder() -> OpenOptionsBuilder {
        OpenOptionsBuilder::new()
    }

    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_output_shape(mut self, output_shape: OutputShape) -> Self {
        self.output_shape = output_shape;
        self
    }

    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }
}

/// Fluent builder for [`OpenOptions`].
#[derive(Debug, Clone, Default)]
pub struct OpenOptionsBuilder {
    opts: OpenOptions,
}

impl OpenOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.opts.version = version;
        self
    }

    #[must_use]
    pub fn create_scripts<I, S>(mut self, scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.create_scripts = scripts.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn drop_scripts<I, S>(mut self, scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.drop_scripts = scripts.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn output_shape(mut self, output_shape: OutputShape) -> Self {
        self.opts.output_shape = output_shape;
        self
    }

    #[must_use]
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.opts.backend = backend;
        self
    }

    #[must_use]
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.opts.base_dir = Some(base_dir.into());
        self
    }

    #[must_use]
    pub fn finish(self) -> OpenOptions {
        self.opts
    }

    /// Open `name` with these options.
    ///
    /// # Errors
    /// See [`Connection::open`].
    pub async fn open(self, name: &str) -> Result<Connection, SqliteAccessError> {
        Connection::open(name, self.finish()).await
    }
}

/// Where the database `name` lives; `None` for the in-memory database.
///
/// Missing parent directories are created.
///
/// # Errors
/// Returns `SqliteAccessError::Io` if a directory cannot be created, or
/// `SqliteAccessError::InvalidArgument` if no platform data directory exists and no
/// `base_dir` was given.
pub fn resolve_database_path(
    name: &str,
    base_dir: Option<&Path>,
) -> Result<Option<PathBuf>, SqliteAccessError> {
    if name == MEMORY_DB_NAME {
        return Ok(None);
    }

    let base = match base_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_local_dir()
            .ok_or_else(|| {
                SqliteAccessError::InvalidArgument(
                    "no platform data directory; set base_dir".into(),
                )
            })?
            .join(DEFAULT_DIR_NAME),
    };
    let path = base.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Some(path))
}
