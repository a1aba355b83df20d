//! Result pipeline: deferred queries, buffered collection, and lazy row streams.

mod pipeline;
mod row;
mod stream;

pub use pipeline::{Collected, QuerySource, ResultPipeline, Transform};
pub(crate) use row::RowFormat;
pub use row::RowRecord;
pub use stream::RowStream;
