use std::fmt;
use std::marker::PhantomData;

use crate::backend::Cursor;
use crate::connection::Connection;
use crate::error::SqliteAccessError;

use super::RowRecord;

type RowMapper<'c, T> = Box<dyn FnMut(RowRecord, usize) -> T + Send + 'c>;

/// Lazy, single-pass sequence of decoded rows.
///
/// Each [`next`](Self::next) steps the native statement once. The statement is
/// finalized when the rows run out, when a row fails, on [`close`](Self::close), or when
/// the stream is dropped part-way through. The stream borrows its connection mutably, so
/// nothing else can run on that connection until it is gone.
pub struct RowStream<'c, T = RowRecord> {
    cursor: Option<Cursor>,
    mapper: RowMapper<'c, T>,
    index: usize,
    _conn: PhantomData<&'c mut Connection>,
}

impl<'c> RowStream<'c, RowRecord> {
    pub(crate) fn new(cursor: Cursor) -> Self {
        Self::with_mapper(cursor, Box::new(|row: RowRecord, _: usize| row))
    }
}

impl<'c, T> RowStream<'c, T> {
    pub(crate) fn with_mapper(cursor: Cursor, mapper: RowMapper<'c, T>) -> Self {
        Self {
            cursor: Some(cursor),
            mapper,
            index: 0,
            _conn: PhantomData,
        }
    }

    /// Decode the next row, or `None` once the statement is exhausted or closed.
    ///
    /// After an error the stream is finished and further calls return `None`.
    pub async fn next(&mut self) -> Option<Result<T, SqliteAccessError>> {
        let cursor = self.cursor.as_mut()?;
        match cursor.next().await {
            Some(Ok(row)) => {
                let index = self.index;
                self.index += 1;
                tracing::trace!(index, "row decoded");
                Some(Ok((self.mapper)(row, index)))
            }
            Some(Err(err)) => {
                self.release().await;
                Some(Err(err))
            }
            None => {
                self.release().await;
                None
            }
        }
    }

    /// Drain the remaining rows.
    ///
    /// # Errors
    /// Returns the first decoding or engine error; the statement is finalized either way.
    pub async fn try_collect(mut self) -> Result<Vec<T>, SqliteAccessError> {
        let mut out = Vec::new();
        while let Some(item) = self.next().await {
            out.push(item?);
        }
        Ok(out)
    }

    /// Abandon the stream and wait for the native statement to be finalized.
    ///
    /// # Errors
    /// Returns an error if the backend failed while winding the statement down.
    pub async fn close(mut self) -> Result<(), SqliteAccessError> {
        match self.cursor.take() {
            Some(cursor) => cursor.finish().await,
            None => Ok(()),
        }
    }

    /// Rows yielded so far.
    #[must_use]
    pub fn rows_read(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
    }

    async fn release(&mut self) {
        let Some(cursor) = self.cursor.take() else {
            return;
        };
        if let Err(err) = cursor.finish().await {
            tracing::warn!(error = %err, "failed to finalize statement");
        }
    }
}

impl<T> fmt::Debug for RowStream<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream")
            .field("cursor", &self.cursor)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
