//! SQL text assembly for the two bind styles.
//!
//! Every statement the crate issues is built here: structured SELECTs from a
//! [`QuerySpec`], CRUD statements from a column/value record, and raw SQL with
//! positional arguments.

use serde_json::Value as JsonValue;

use crate::codec::Literal;
use crate::error::SqliteAccessError;
use crate::substitution::{expand, substitute};

mod dml;
mod select;

pub(crate) use dml::{delete_statement, insert_statement, quote_ident, update_statement};
pub use select::QuerySpec;

/// How values reach a backend's statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindStyle {
    /// `?` markers in the text, values bound as parameters.
    Bound,
    /// Values rendered into the text as SQL literals.
    Inline,
}

/// SQL text plus the parameters bound to its `?` markers, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub(crate) sql: String,
    pub(crate) params: Vec<Literal>,
}

impl Statement {
    /// Build a statement from raw SQL and optional positional arguments.
    pub(crate) fn from_template(
        style: BindStyle,
        template: &str,
        args: Option<&[JsonValue]>,
    ) -> Result<Self, SqliteAccessError> {
        let mut builder = StatementBuilder::new(style);
        builder.push_template(template, args)?;
        Ok(builder.finish())
    }
}

pub(crate) struct StatementBuilder {
    style: BindStyle,
    sql: String,
    params: Vec<Literal>,
}

impl StatementBuilder {
    pub(crate) fn new(style: BindStyle) -> Self {
        Self {
            style,
            sql: String::with_capacity(64),
            params: Vec::new(),
        }
    }

    pub(crate) fn push_sql(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append one value: a `?` marker or its rendered literal.
    pub(crate) fn push_value(&mut self, literal: Literal) -> &mut Self {
        match self.style {
            BindStyle::Bound => {
                self.sql.push('?');
                self.params.push(literal);
            }
            BindStyle::Inline => self.sql.push_str(&literal.to_sql()),
        }
        self
    }

    /// Append a caller-supplied fragment whose `?` markers take `args`.
    ///
    /// Without `args` the fragment is copied verbatim.
    pub(crate) fn push_template(
        &mut self,
        template: &str,
        args: Option<&[JsonValue]>,
    ) -> Result<&mut Self, SqliteAccessError> {
        let Some(args) = args else {
            self.sql.push_str(template);
            return Ok(self);
        };
        match self.style {
            BindStyle::Bound => {
                let (sql, params) = expand(template, args)?;
                self.sql.push_str(&sql);
                self.params.extend(params);
            }
            BindStyle::Inline => {
                if let Some(sql) = substitute(template, Some(args))? {
                    self.sql.push_str(&sql);
                }
            }
        }
        Ok(self)
    }

    pub(crate) fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

pub(crate) fn require_table(table: &str) -> Result<(), SqliteAccessError> {
    if table.trim().is_empty() {
        return Err(SqliteAccessError::InvalidArgument(
            "table name must not be empty".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn templates_follow_the_bind_style() {
        let args = [json!("O'Brien"), json!([1, 2])];
        let bound = Statement::from_template(
            BindStyle::Bound,
            "SELECT * FROM persons WHERE name = ? AND _id IN (?)",
            Some(&args[..]),
        )
        .unwrap();
        assert_eq!(
            bound.sql,
            "SELECT * FROM persons WHERE name = ? AND _id IN (?,?)"
        );
        assert_eq!(bound.params.len(), 3);

        let inline = Statement::from_template(
            BindStyle::Inline,
            "SELECT * FROM persons WHERE name = ? AND _id IN (?)",
            Some(&args[..]),
        )
        .unwrap();
        assert_eq!(
            inline.sql,
            "SELECT * FROM persons WHERE name = 'O''Brien' AND _id IN (1,2)"
        );
        assert!(inline.params.is_empty());
    }

    #[test]
    fn fragments_concatenate_in_order() {
        let mut builder = StatementBuilder::new(BindStyle::Bound);
        builder.push_sql("UPDATE t SET a=").push_value(Literal::Integer(1));
        builder
            .push_template(" WHERE b = ?2 AND c = ?1", Some(&[json!("c"), json!("b")][..]))
            .unwrap();
        let statement = builder.finish();
        assert_eq!(statement.sql, "UPDATE t SET a=? WHERE b = ? AND c = ?");
        assert_eq!(
            statement.params,
            vec![
                Literal::Integer(1),
                Literal::Text("b".into()),
                Literal::Text("c".into())
            ]
        );
    }

    #[test]
    fn missing_args_copy_the_fragment() {
        let statement =
            Statement::from_template(BindStyle::Inline, "SELECT ? AS q", None).unwrap();
        assert_eq!(statement.sql, "SELECT ? AS q");
    }
}
