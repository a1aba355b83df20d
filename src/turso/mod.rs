// Turso module - the raw execution style
//
// Statements reach the engine as hand-built SQL text (values already substituted as
// literals) and every column is read back through its text form:
// - config: open/close of the in-process database
// - executor: statement, batch and user_version execution
// - query: column decoding and the row cursor

mod config;
mod executor;
mod query;

pub(crate) use config::TursoBackend;
pub(crate) use query::TursoCursor;
