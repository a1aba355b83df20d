use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::backend::Cursor;
use crate::codec::TextDecoding;
use crate::connection::Connection;
use crate::error::SqliteAccessError;
use crate::query_builder::{QuerySpec, Statement};
use crate::types::OutputShape;

use super::{RowFormat, RowRecord, RowStream};

type MapFn<'f> = Box<dyn FnMut(RowRecord, usize) -> JsonValue + Send + 'f>;
type ReduceFn<'f> = Box<dyn FnMut(JsonValue, RowRecord, usize) -> JsonValue + Send + 'f>;

/// Per-row transform applied by [`ResultPipeline::collect`].
#[derive(Default)]
pub enum Transform<'f> {
    /// Rows as decoded.
    #[default]
    None,
    /// `f(row, index)` for each row.
    Map(MapFn<'f>),
    /// Fold `f(acc, row, index)` starting from the seed.
    Reduce(ReduceFn<'f>, JsonValue),
}

impl<'f> Transform<'f> {
    pub fn map<F>(f: F) -> Self
    where
        F: FnMut(RowRecord, usize) -> JsonValue + Send + 'f,
    {
        Transform::Map(Box::new(f))
    }

    pub fn reduce<F>(seed: JsonValue, f: F) -> Self
    where
        F: FnMut(JsonValue, RowRecord, usize) -> JsonValue + Send + 'f,
    {
        Transform::Reduce(Box::new(f), seed)
    }
}

impl fmt::Debug for Transform<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::None => f.write_str("None"),
            Transform::Map(_) => f.write_str("Map(<fn>)"),
            Transform::Reduce(_, seed) => f.debug_tuple("Reduce").field(&"<fn>").field(seed).finish(),
        }
    }
}

/// Output of a buffered collection; the variant follows the [`Transform`] used.
#[derive(Debug, Clone, PartialEq)]
pub enum Collected {
    Rows(Vec<RowRecord>),
    Mapped(Vec<JsonValue>),
    Reduced(JsonValue),
}

impl Collected {
    #[must_use]
    pub fn into_json(self) -> JsonValue {
        match self {
            Collected::Rows(rows) => rows.into_iter().map(RowRecord::into_json).collect(),
            Collected::Mapped(values) => JsonValue::Array(values),
            Collected::Reduced(value) => value,
        }
    }
}

/// What a pipeline runs when it is terminated.
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySource {
    /// Raw SQL with optional positional arguments.
    Raw {
        sql: String,
        args: Option<Vec<JsonValue>>,
    },
    Structured(QuerySpec),
}

/// A deferred query.
///
/// Building one runs nothing; each terminal call (`collect`, `rows`, `map`, `reduce`,
/// `first`, `fetch_as`, `stream`, `stream_map`) executes the statement afresh.
pub struct ResultPipeline<'c> {
    conn: &'c mut Connection,
    source: QuerySource,
    shape: OutputShape,
    text: TextDecoding,
}

impl<'c> ResultPipeline<'c> {
    pub(crate) fn new(conn: &'c mut Connection, source: QuerySource) -> Self {
        let shape = conn.output_shape();
        Self {
            conn,
            source,
            shape,
            text: TextDecoding::default(),
        }
    }

    /// Decode this pipeline's rows in `shape` instead of the connection's.
    #[must_use]
    pub fn with_shape(mut self, shape: OutputShape) -> Self {
        self.shape = shape;
        self
    }

    /// Return TEXT columns exactly as stored, without JSON reinterpretation.
    #[must_use]
    pub(crate) fn verbatim_text(mut self) -> Self {
        self.text = TextDecoding::Verbatim;
        self
    }

    #[must_use]
    pub fn source(&self) -> &QuerySource {
        &self.source
    }

    async fn open(&mut self) -> Result<Cursor, SqliteAccessError> {
        let backend = self.conn.backend()?;
        let style = backend.bind_style();
        let statement = match &self.source {
            QuerySource::Raw { sql, .. } if sql.trim().is_empty() => {
                return Err(SqliteAccessError::InvalidArgument(
                    "query text must not be empty".into(),
                ));
            }
            QuerySource::Raw { sql, args } => Statement::from_template(style, sql, args.as_deref())?,
            QuerySource::Structured(spec) => spec.to_statement(style)?,
        };
        tracing::debug!(sql = %statement.sql, params = statement.params.len(), "executing query");
        let format = RowFormat {
            shape: self.shape,
            text: self.text,
        };
        backend.open_cursor(statement, format).await
    }

    /// Run the query and buffer every row through `transform`.
    ///
    /// # Errors
    /// Returns `SqliteAccessError` if the connection is closed or the statement fails.
    pub async fn collect(&mut self, transform: Transform<'_>) -> Result<Collected, SqliteAccessError> {
        match transform {
            Transform::None => Ok(Collected::Rows(self.rows().await?)),
            Transform::Map(f) => Ok(Collected::Mapped(self.map(f).await?)),
            Transform::Reduce(f, seed) => Ok(Collected::Reduced(self.reduce(seed, f).await?)),
        }
    }

    /// Run the query and buffer every decoded row.
    ///
    /// # Errors
    /// Returns `SqliteAccessError` if the connection is closed or the statement fails.
    pub async fn rows(&mut self) -> Result<Vec<RowRecord>, SqliteAccessError> {
        self.stream().await?.try_collect().await
    }

    /// Run the query and buffer `f(row, index)` for every row.
    ///
    /// # Errors
    /// Returns `SqliteAccessError` if the connection is closed or the statement fails.
    pub async fn map<T, F>(&mut self, mut f: F) -> Result<Vec<T>, SqliteAccessError>
    where
        F: FnMut(RowRecord, usize) -> T,
    {
        let mut stream = self.stream().await?;
        let mut mapped = Vec::new();
        while let Some(row) = stream.next().await {
            let index = mapped.len();
            mapped.push(f(row?, index));
        }
        Ok(mapped)
    }

    /// Run the query and fold every row into an accumulator.
    ///
    /// # Errors
    /// Returns `SqliteAccessError` if the connection is closed or the statement fails.
    pub async fn reduce<A, F>(&mut self, seed: A, mut f: F) -> Result<A, SqliteAccessError>
    where
        F: FnMut(A, RowRecord, usize) -> A,
    {
        let mut stream = self.stream().await?;
        let mut acc = seed;
        let mut index = 0;
        while let Some(row) = stream.next().await {
            acc = f(acc, row?, index);
            index += 1;
        }
        Ok(acc)
    }

    /// First row only; the statement is finalized without reading the rest.
    ///
    /// # Errors
    /// Returns `SqliteAccessError` if the connection is closed or the statement fails.
    pub async fn first(&mut self) -> Result<Option<RowRecord>, SqliteAccessError> {
        let mut stream = self.stream().await?;
        let first = stream.next().await.transpose()?;
        stream.close().await?;
        Ok(first)
    }

    /// Deserialize every row into `T`.
    ///
    /// # Errors
    /// Returns `SqliteAccessError::Serialization` if a row does not fit `T`, or any
    /// execution error.
    pub async fn fetch_as<T: DeserializeOwned>(&mut self) -> Result<Vec<T>, SqliteAccessError> {
        self.rows()
            .await?
            .into_iter()
            .map(RowRecord::into_typed)
            .collect()
    }

    /// Start a lazy, single-pass stream over the rows.
    ///
    /// # Errors
    /// Returns `SqliteAccessError` if the connection is closed or the statement cannot be
    /// prepared.
    pub async fn stream(&mut self) -> Result<RowStream<'_>, SqliteAccessError> {
        Ok(RowStream::new(self.open().await?))
    }

    /// Like [`stream`](Self::stream), yielding `f(row, index)` per row.
    ///
    /// # Errors
    /// Returns `SqliteAccessError` if the connection is closed or the statement cannot be
    /// prepared.
    pub async fn stream_map<'s, T, F>(
        &'s mut self,
        f: F,
    ) -> Result<RowStream<'s, T>, SqliteAccessError>
    where
        F: FnMut(RowRecord, usize) -> T + Send + 's,
    {
        Ok(RowStream::with_mapper(self.open().await?, Box::new(f)))
    }
}

impl fmt::Debug for ResultPipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultPipeline")
            .field("source", &self.source)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
