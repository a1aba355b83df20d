use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::SqliteAccessError;

use super::{BindStyle, Statement, StatementBuilder, require_table};

/// Structured description of a single-table SELECT.
///
/// ```rust
/// use serde_json::json;
/// use sqlite_access::query_builder::QuerySpec;
///
/// let spec = QuerySpec::table("persons")
///     .columns(["name", "n"])
///     .selection("_id IN (?)", [json!([1, 2])])
///     .order_by("name DESC")
///     .limit(10);
/// assert_eq!(spec.table_name(), "persons");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    pub table: String,
    /// Columns to return; all columns when `None`.
    pub columns: Option<Vec<String>>,
    /// WHERE clause without the keyword; may contain `?` markers.
    pub selection: Option<String>,
    pub selection_args: Option<Vec<JsonValue>>,
    pub group_by: Option<String>,
    pub having: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<String>,
}

impl QuerySpec {
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn selection<I>(mut self, selection: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = JsonValue>,
    {
        self.selection = Some(selection.into());
        self.selection_args = Some(args.into_iter().collect());
        self
    }

    #[must_use]
    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    #[must_use]
    pub fn having(mut self, having: impl Into<String>) -> Self {
        self.having = Some(having.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: impl ToString) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub(crate) fn to_statement(&self, style: BindStyle) -> Result<Statement, SqliteAccessError> {
        require_table(&self.table)?;

        let mut builder = StatementBuilder::new(style);
        builder.push_sql("SELECT ");
        match self.columns.as_deref() {
            Some(columns) if !columns.is_empty() => builder.push_sql(&columns.join(",")),
            _ => builder.push_sql("*"),
        };
        builder.push_sql(" FROM ").push_sql(&self.table);

        if let Some(selection) = non_empty(self.selection.as_deref()) {
            builder.push_sql(" WHERE ");
            builder.push_template(selection, self.selection_args.as_deref())?;
        }
        if let Some(group_by) = non_empty(self.group_by.as_deref()) {
            builder.push_sql(" GROUP BY ").push_sql(group_by);
        }
        if let Some(having) = non_empty(self.having.as_deref()) {
            builder.push_sql(" HAVING ").push_sql(having);
        }
        if let Some(order_by) = non_empty(self.order_by.as_deref()) {
            builder.push_sql(" ORDER BY ").push_sql(order_by);
        }
        if let Some(limit) = non_empty(self.limit.as_deref()) {
            builder.push_sql(" LIMIT ").push_sql(limit);
        }

        Ok(builder.finish())
    }
}

fn non_empty(clause: Option<&str>) -> Option<&str> {
    clause.filter(|c| !c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_table_selects_everything() {
        let statement = QuerySpec::table("companies")
            .to_statement(BindStyle::Bound)
            .unwrap();
        assert_eq!(statement.sql, "SELECT * FROM companies");
        assert!(statement.params.is_empty());
    }

    #[test]
    fn clauses_appear_in_sql_order() {
        let spec = QuerySpec::table("persons")
            .columns(["name", "count(*) AS total"])
            .selection("i > ?", [json!(2)])
            .group_by("name")
            .having("count(*) > 1")
            .order_by("name")
            .limit(5);
        let statement = spec.to_statement(BindStyle::Inline).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT name,count(*) AS total FROM persons WHERE i > 2 GROUP BY name \
             HAVING count(*) > 1 ORDER BY name LIMIT 5"
        );
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = QuerySpec::default()
            .to_statement(BindStyle::Bound)
            .unwrap_err();
        assert!(matches!(err, SqliteAccessError::InvalidArgument(_)));
    }

    #[test]
    fn deserializes_from_a_partial_descriptor() {
        let spec: QuerySpec = serde_json::from_value(json!({
            "table": "persons",
            "selection": "_id = ?",
            "selection_args": [3]
        }))
        .unwrap();
        let statement = spec.to_statement(BindStyle::Bound).unwrap();
        assert_eq!(statement.sql, "SELECT * FROM persons WHERE _id = ?");
        assert_eq!(statement.params, vec![crate::codec::Literal::Integer(3)]);
    }
}
