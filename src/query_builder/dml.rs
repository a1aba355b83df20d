use serde_json::{Map, Value as JsonValue};

use crate::codec::to_literal;
use crate::error::SqliteAccessError;

use super::{BindStyle, Statement, StatementBuilder, require_table};

/// Double-quote a column name so digits or keywords in it stay an identifier.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `INSERT INTO` / `REPLACE INTO` one row; an empty record inserts `DEFAULT VALUES`.
pub(crate) fn insert_statement(
    style: BindStyle,
    verb: &str,
    table: &str,
    values: &Map<String, JsonValue>,
) -> Result<Statement, SqliteAccessError> {
    require_table(table)?;

    let mut builder = StatementBuilder::new(style);
    builder.push_sql(verb).push_sql(" INTO ").push_sql(table);
    if values.is_empty() {
        builder.push_sql(" DEFAULT VALUES");
        return Ok(builder.finish());
    }

    let columns = values
        .keys()
        .map(|column| quote_ident(column))
        .collect::<Vec<_>>();
    builder
        .push_sql(" (")
        .push_sql(&columns.join(","))
        .push_sql(") VALUES (");
    for (idx, value) in values.values().enumerate() {
        if idx > 0 {
            builder.push_sql(",");
        }
        builder.push_value(to_literal(value));
    }
    builder.push_sql(")");

    Ok(builder.finish())
}

/// `UPDATE table SET col=value, ... [WHERE clause]`.
pub(crate) fn update_statement(
    style: BindStyle,
    table: &str,
    values: &Map<String, JsonValue>,
    where_clause: &str,
    where_args: &[JsonValue],
) -> Result<Statement, SqliteAccessError> {
    require_table(table)?;
    if values.is_empty() {
        return Err(SqliteAccessError::InvalidArgument(format!(
            "update of {table} needs at least one column value"
        )));
    }

    let mut builder = StatementBuilder::new(style);
    builder.push_sql("UPDATE ").push_sql(table).push_sql(" SET ");
    for (idx, (column, value)) in values.iter().enumerate() {
        if idx > 0 {
            builder.push_sql(",");
        }
        builder
            .push_sql(&quote_ident(column))
            .push_sql("=")
            .push_value(to_literal(value));
    }
    push_where(&mut builder, Some(where_clause), Some(where_args))?;

    Ok(builder.finish())
}

/// `DELETE FROM table [WHERE clause]`.
pub(crate) fn delete_statement(
    style: BindStyle,
    table: &str,
    where_clause: Option<&str>,
    where_args: Option<&[JsonValue]>,
) -> Result<Statement, SqliteAccessError> {
    require_table(table)?;

    let mut builder = StatementBuilder::new(style);
    builder.push_sql("DELETE FROM ").push_sql(table);
    push_where(&mut builder, where_clause, where_args)?;

    Ok(builder.finish())
}

fn push_where(
    builder: &mut StatementBuilder,
    where_clause: Option<&str>,
    where_args: Option<&[JsonValue]>,
) -> Result<(), SqliteAccessError> {
    if let Some(clause) = where_clause.filter(|c| !c.trim().is_empty()) {
        builder.push_sql(" WHERE ");
        builder.push_template(clause, where_args)?;
    }
    Ok(())
}
