//! Conversion between host values (`serde_json::Value`) and SQL literals.
//!
//! Writing goes through [`to_literal`]; reading goes through [`read_column`], which hands
//! the column's text form to [`from_text`]. Both backends share these functions so a row
//! decodes identically whichever native surface produced it.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value as JsonValue;

use crate::types::StorageClass;

/// SQL literal form of a host value.
///
/// The raw backend renders it into statement text with [`Literal::to_sql`]; the typed
/// backend binds it as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Integer(i64),
    Real(f64),
    /// Unescaped text; quoting happens on render.
    Text(String),
}

impl Literal {
    /// Render as SQL source text: `NULL`, `42`, `1.5` or `'it''s'`.
    #[must_use]
    pub fn to_sql(&self) -> Cow<'_, str> {
        match self {
            Literal::Null => Cow::Borrowed("NULL"),
            Literal::Integer(i) => Cow::Owned(i.to_string()),
            Literal::Real(f) => Cow::Owned(format!("{f:?}")),
            Literal::Text(s) => Cow::Owned(quote(s)),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Convert a host value into its SQL literal.
///
/// ```rust
/// use serde_json::json;
/// use sqlite_access::codec::{Literal, to_literal};
///
/// assert_eq!(to_literal(&json!(0)), Literal::Integer(0));
/// assert_eq!(to_literal(&json!("")).to_sql(), "''");
/// assert_eq!(to_literal(&json!("12")), Literal::Integer(12));
/// assert_eq!(to_literal(&json!("it's")).to_sql(), "'it''s'");
/// assert_eq!(to_literal(&json!({"a": 1})).to_sql(), r#"'{"a":1}'"#);
/// ```
#[must_use]
pub fn to_literal(value: &JsonValue) -> Literal {
    match value {
        JsonValue::Null => Literal::Null,
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Literal::Integer(i)
            } else {
                // u64 beyond i64::MAX or a float
                Literal::Real(n.as_f64().unwrap_or_default())
            }
        }
        JsonValue::String(s) if s.is_empty() => Literal::Text(String::new()),
        JsonValue::String(s) => coerce_text(s.clone()),
        // Booleans and composites are stored as their JSON text so they read back intact.
        JsonValue::Bool(_) | JsonValue::Array(_) | JsonValue::Object(_) => {
            coerce_text(value.to_string())
        }
    }
}

fn coerce_text(text: String) -> Literal {
    match coerce_number(&text) {
        Some(number) => number,
        None => Literal::Text(text),
    }
}

/// Numeric text becomes a number only when it is finite and non-zero; `"0"` stays text.
fn coerce_number(text: &str) -> Option<Literal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return (i != 0).then_some(Literal::Integer(i));
    }
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f != 0.0 => Some(Literal::Real(f)),
        _ => None,
    }
}

/// Decode stored text back into a host value.
///
/// Text that parses as JSON is returned parsed, anything else is returned as-is. This
/// means a stored `"42"` or `"true"` reads back as a number or boolean.
#[must_use]
pub fn from_text(text: &str) -> JsonValue {
    serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_owned()))
}

/// How stored TEXT columns become host values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum TextDecoding {
    /// Text that parses as JSON comes back parsed.
    #[default]
    Reinterpret,
    /// Text comes back as the stored string.
    Verbatim,
}

/// Decode one column.
///
/// NULL columns never touch `text_accessor`; every other storage class is fetched as
/// text and decoded with [`from_text`].
///
/// # Errors
/// Propagates any error returned by `text_accessor`.
pub fn read_column<F, E>(
    storage_class: StorageClass,
    index: usize,
    text_accessor: F,
) -> Result<JsonValue, E>
where
    F: FnOnce(usize) -> Result<String, E>,
{
    read_column_as(TextDecoding::Reinterpret, storage_class, index, text_accessor)
}

/// [`read_column`] with a choice of TEXT decoding; other classes decode as usual.
pub(crate) fn read_column_as<F, E>(
    decoding: TextDecoding,
    storage_class: StorageClass,
    index: usize,
    text_accessor: F,
) -> Result<JsonValue, E>
where
    F: FnOnce(usize) -> Result<String, E>,
{
    if storage_class == StorageClass::Null {
        return Ok(JsonValue::Null);
    }
    let text = text_accessor(index)?;
    Ok(match (decoding, storage_class) {
        (TextDecoding::Verbatim, StorageClass::Text) => JsonValue::String(text),
        _ => from_text(&text),
    })
}
