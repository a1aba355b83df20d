//! Placeholder substitution.
//!
//! [`substitute`] inlines literal text for backends that take hand-built SQL;
//! [`expand`] produces positional bound parameters for backends that bind values. Both
//! share one quote/comment-aware scanner, so `?` inside string literals, quoted
//! identifiers, and comments is never treated as a placeholder.

use std::borrow::Cow;

use serde_json::Value as JsonValue;

use crate::codec::{Literal, to_literal};
use crate::error::SqliteAccessError;

mod scanner;

use scanner::find_placeholders;

fn value_for(values: &[JsonValue], index: usize) -> Result<&JsonValue, SqliteAccessError> {
    values.get(index).ok_or_else(|| {
        SqliteAccessError::InvalidArgument(format!(
            "no value supplied for placeholder {} ({} value(s) given)",
            index + 1,
            values.len()
        ))
    })
}

/// Replace placeholders in `template` with literal SQL text.
///
/// Returns `None` for an empty template and the template unchanged when `values` is
/// `None`. An array value expands to its elements joined by commas, so `IN (?)` works:
/// ```rust
/// use serde_json::json;
/// use sqlite_access::substitution::substitute;
///
/// let values = [json!([1, 2, 3]), json!("O'Brien")];
/// let sql = substitute("_id IN (?) AND name = ?", Some(&values[..])).unwrap().unwrap();
/// assert_eq!(sql, "_id IN (1,2,3) AND name = 'O''Brien'");
/// ```
///
/// # Errors
/// Returns `SqliteAccessError::InvalidArgument` if a placeholder has no matching value
/// or a numbered marker is `?0` or out of range. Surplus values are ignored.
pub fn substitute<'a>(
    template: &'a str,
    values: Option<&[JsonValue]>,
) -> Result<Option<Cow<'a, str>>, SqliteAccessError> {
    if template.is_empty() {
        return Ok(None);
    }
    let Some(values) = values else {
        return Ok(Some(Cow::Borrowed(template)));
    };

    let placeholders = find_placeholders(template)?;
    if placeholders.is_empty() {
        return Ok(Some(Cow::Borrowed(template)));
    }

    let mut out = String::with_capacity(template.len() + placeholders.len() * 8);
    let mut last = 0;
    for placeholder in placeholders {
        out.push_str(&template[last..placeholder.start]);
        match value_for(values, placeholder.value_index)? {
            JsonValue::Array(items) => {
                let joined = items
                    .iter()
                    .map(|item| to_literal(item).to_sql().into_owned())
                    .collect::<Vec<_>>()
                    .join(",");
                out.push_str(&joined);
            }
            value => out.push_str(&to_literal(value).to_sql()),
        }
        last = placeholder.end;
    }
    out.push_str(&template[last..]);

    Ok(Some(Cow::Owned(out)))
}

/// Rewrite placeholders as bare `?` markers with parameters in order of appearance.
///
/// Numbered markers are resolved here, so fragments produced by separate calls can be
/// concatenated into one statement. Array values expand into one parameter per element,
/// so the typed backend supports `IN (?)` without inlining any value into the SQL text.
///
/// # Errors
/// Returns `SqliteAccessError::InvalidArgument` if a placeholder has no matching value
/// or a numbered marker is `?0` or out of range.
pub fn expand(
    template: &str,
    values: &[JsonValue],
) -> Result<(String, Vec<Literal>), SqliteAccessError> {
    let placeholders = find_placeholders(template)?;
    let mut params = Vec::with_capacity(values.len());
    let mut out = String::with_capacity(template.len() + placeholders.len() * 4);
    let mut last = 0;

    for placeholder in placeholders {
        out.push_str(&template[last..placeholder.start]);
        match value_for(values, placeholder.value_index)? {
            JsonValue::Array(items) => {
                params.extend(items.iter().map(to_literal));
                out.push_str(&vec!["?"; items.len()].join(","));
            }
            value => {
                params.push(to_literal(value));
                out.push('?');
            }
        }
        last = placeholder.end;
    }
    out.push_str(&template[last..]);

    Ok((out, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_template_is_none() {
        assert!(substitute("", Some(&[json!(1)][..])).unwrap().is_none());
    }

    #[test]
    fn missing_values_leave_template_untouched() {
        let res = substitute("_id = ?", None).unwrap().unwrap();
        assert!(matches!(res, Cow::Borrowed(_)));
        assert_eq!(res, "_id = ?");
    }

    #[test]
    fn replaces_in_order() {
        let values = [json!(1), json!("B"), json!(null), json!(0)];
        let res = substitute("a=? AND b=? AND c IS ? AND d=?", Some(&values[..]))
            .unwrap()
            .unwrap();
        assert_eq!(res, "a=1 AND b='B' AND c IS NULL AND d=0");
    }

    #[test]
    fn literal_question_marks_are_kept() {
        let values = [json!(5)];
        let res = substitute("note = 'why?' AND _id = ?", Some(&values[..]))
            .unwrap()
            .unwrap();
        assert_eq!(res, "note = 'why?' AND _id = 5");
    }

    #[test]
    fn non_ascii_text_survives() {
        let values = [json!("é")];
        let res = substitute("name = ? -- ünïcödé ?", Some(&values[..]))
            .unwrap()
            .unwrap();
        assert_eq!(res, "name = 'é' -- ünïcödé ?");
    }

    #[test]
    fn too_few_values_is_an_error() {
        let err = substitute("a=? AND b=?", Some(&[json!(1)][..])).unwrap_err();
        assert!(matches!(err, SqliteAccessError::InvalidArgument(_)));
        assert!(format!("{err}").contains("placeholder 2"));
    }

    #[test]
    fn zero_numbered_marker_fails_instead_of_splicing() {
        let values = [json!(5)];
        let err = substitute("x = ?0", Some(&values[..])).unwrap_err();
        assert!(matches!(err, SqliteAccessError::InvalidArgument(_)));
        assert!(format!("{err}").contains("?0"));

        let err = expand("x = ?0", &values).unwrap_err();
        assert!(matches!(err, SqliteAccessError::InvalidArgument(_)));
        let err = expand("x = ?99999999999999999999999", &values).unwrap_err();
        assert!(matches!(err, SqliteAccessError::InvalidArgument(_)));
    }

    #[test]
    fn expand_flattens_arrays() {
        let values = [json!([3, 4]), json!("x")];
        let (sql, params) = expand("_id IN (?) AND name = ?", &values).unwrap();
        assert_eq!(sql, "_id IN (?,?) AND name = ?");
        assert_eq!(
            params,
            vec![
                Literal::Integer(3),
                Literal::Integer(4),
                Literal::Text("x".into())
            ]
        );
    }

    #[test]
    fn expand_resolves_numbered_markers_in_appearance_order() {
        let values = [json!("a"), json!("b")];
        let (sql, params) = expand("x = ?2 OR y = ?1 OR z = ?2", &values).unwrap();
        assert_eq!(sql, "x = ? OR y = ? OR z = ?");
        assert_eq!(
            params,
            vec![
                Literal::Text("b".into()),
                Literal::Text("a".into()),
                Literal::Text("b".into())
            ]
        );
    }

    #[test]
    fn expand_without_placeholders_binds_nothing() {
        let (sql, params) = expand("SELECT 1", &[json!(1)]).unwrap();
        assert_eq!(sql, "SELECT 1");
        assert!(params.is_empty());
    }
}
