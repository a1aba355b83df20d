use serde_json::Value as JsonValue;

use crate::query_builder::QuerySpec;
use crate::results::{QuerySource, ResultPipeline};

use super::Connection;

impl Connection {
    /// Deferred raw query; `?` markers in `sql` take `args` in order.
    ///
    /// Nothing runs until a terminal call on the returned pipeline. A closed connection is
    /// reported by that call.
    pub fn select(
        &mut self,
        sql: impl Into<String>,
        args: Option<Vec<JsonValue>>,
    ) -> ResultPipeline<'_> {
        ResultPipeline::new(
            self,
            QuerySource::Raw {
                sql: sql.into(),
                args,
            },
        )
    }

    /// Deferred structured query.
    pub fn query(&mut self, spec: QuerySpec) -> ResultPipeline<'_> {
        ResultPipeline::new(self, QuerySource::Structured(spec))
    }
}
