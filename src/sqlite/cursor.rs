use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::SqliteAccessError;
use crate::query_builder::Statement;
use crate::results::{RowFormat, RowRecord};

use super::config::SharedSqliteConnection;
use super::params::Params;
use super::query::decode_row;

/// Rows decoded ahead of the consumer.
const CURSOR_BUFFER: usize = 32;

type RowMessage = Result<RowRecord, SqliteAccessError>;

/// Streaming cursor over one prepared rusqlite statement.
///
/// A blocking worker owns the connection lock and the statement for the cursor's whole
/// life; it steps the statement and pushes decoded rows into a bounded channel. Dropping
/// the receiver makes the worker's next send fail, at which point it finalizes the
/// statement and releases the lock.
#[derive(Debug)]
pub(crate) struct SqliteCursor {
    rows: Option<mpsc::Receiver<RowMessage>>,
    worker: Option<JoinHandle<()>>,
}

impl SqliteCursor {
    pub(super) fn spawn(
        conn: SharedSqliteConnection,
        statement: Statement,
        format: RowFormat,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CURSOR_BUFFER);
        let worker = tokio::task::spawn_blocking(move || {
            let guard = conn.blocking_lock();
            if let Err(err) = stream_rows(&guard, &statement, format, &tx) {
                // The consumer may already be gone; nothing else to report to.
                let _ = tx.blocking_send(Err(err));
            }
        });
        Self {
            rows: Some(rx),
            worker: Some(worker),
        }
    }

    /// Next decoded row, or `None` once the statement is exhausted.
    pub(crate) async fn next(&mut self) -> Option<RowMessage> {
        let rows = self.rows.as_mut()?;
        if let Some(message) = rows.recv().await {
            return Some(message);
        }
        self.rows = None;
        // Channel closed: the worker is done. Surface a panic instead of a silent end.
        match self.worker.take()?.await {
            Ok(()) => None,
            Err(e) => Some(Err(SqliteAccessError::ExecutionError(format!(
                "sqlite cursor worker failed: {e}"
            )))),
        }
    }

    /// Stop reading and wait until the worker has finalized the statement.
    pub(crate) async fn finish(mut self) -> Result<(), SqliteAccessError> {
        drop(self.rows.take());
        if let Some(worker) = self.worker.take() {
            worker.await.map_err(|e| {
                SqliteAccessError::ExecutionError(format!("sqlite cursor worker failed: {e}"))
            })?;
        }
        Ok(())
    }
}

fn stream_rows(
    conn: &rusqlite::Connection,
    statement: &Statement,
    format: RowFormat,
    tx: &mpsc::Sender<RowMessage>,
) -> Result<(), SqliteAccessError> {
    let mut prepared = conn.prepare(&statement.sql)?;
    let column_names: Vec<String> = prepared
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();

    let params = Params::convert(&statement.params);
    let mut rows = prepared.query(&params.as_refs()[..])?;
    while let Some(row) = rows.next()? {
        let record = decode_row(row, &column_names, format)?;
        if tx.blocking_send(Ok(record)).is_err() {
            tracing::trace!("cursor abandoned by consumer; finalizing statement");
            break;
        }
    }
    Ok(())
}
