use rusqlite::ToSql;
use rusqlite::types::Value;

use crate::codec::Literal;

/// Convert a single `Literal` to a rusqlite `Value`.
pub(super) fn literal_to_sqlite_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Integer(i) => Value::Integer(*i),
        Literal::Real(f) => Value::Real(*f),
        Literal::Text(s) => Value::Text(s.clone()),
    }
}

/// Owned parameter list for one rusqlite statement.
pub(super) struct Params(Vec<Value>);

impl Params {
    pub(super) fn convert(literals: &[Literal]) -> Self {
        Params(literals.iter().map(literal_to_sqlite_value).collect())
    }

    /// Build a borrowed params slice suitable for rusqlite execution.
    pub(super) fn as_refs(&self) -> Vec<&dyn ToSql> {
        self.0.iter().map(|v| v as &dyn ToSql).collect()
    }
}
