#![cfg(feature = "sqlite")]

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlite_access::prelude::*;
use tempfile::TempDir;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS companies (_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)",
    "CREATE TABLE IF NOT EXISTS persons (_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, n REAL, i INTEGER)",
    "CREATE TABLE IF NOT EXISTS extras (name TEXT, value TEXT)",
];

async fn open_fixture() -> Result<(TempDir, Connection), SqliteAccessError> {
    let dir = tempfile::tempdir()?;
    let conn = OpenOptions::builder()
        .version(1)
        .create_scripts(SCHEMA)
        .base_dir(dir.path())
        .open("crud.db")
        .await?;
    Ok((dir, conn))
}

async fn count(conn: &mut Connection, table: &str) -> Result<i64, SqliteAccessError> {
    let row = conn
        .select(format!("SELECT count(*) AS total FROM {table}"), None)
        .first()
        .await?;
    Ok(row
        .and_then(|row| row.get("total").and_then(serde_json::Value::as_i64))
        .unwrap_or_default())
}

#[tokio::test]
async fn insert_update_then_query() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_fixture().await?;

    let id = conn.insert("companies", &json!({"name": "Acme"})).await?;
    assert!(id > 0);

    let changed = conn
        .update("companies", &json!({"name": "NookBe"}), "_id = ?", &[json!(id)])
        .await?;
    assert_eq!(changed, 1);

    let rows = conn.query(QuerySpec::table("companies")).rows().await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("_id"), Some(&json!(id)));
    assert_eq!(rows[0].get("name"), Some(&json!("NookBe")));

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn zero_empty_text_and_json_values_survive() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_fixture().await?;

    let id = conn
        .insert("persons", &json!({"name": "", "n": 2.5, "i": 0}))
        .await?;
    let row = conn
        .select("SELECT name, n, i FROM persons WHERE _id = ?", Some(vec![json!(id)]))
        .first()
        .await?
        .ok_or("row missing")?;
    assert_eq!(row.into_json(), json!({"name": "", "n": 2.5, "i": 0}));

    let nested = json!({"tags": ["a", "b"], "active": true});
    let id = conn
        .insert("persons", &json!({"name": nested.clone()}))
        .await?;
    let name = conn
        .select("SELECT name FROM persons WHERE _id = ?", Some(vec![json!(id)]))
        .first()
        .await?
        .and_then(|row| row.get("name").cloned());
    assert_eq!(name, Some(nested));

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn quotes_are_data_not_sql() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_fixture().await?;
    let hostile = "O'Brien'); DROP TABLE persons; --";

    let id = conn.insert("persons", &json!({"name": hostile})).await?;
    let found = conn
        .select("SELECT _id FROM persons WHERE name = ?", Some(vec![json!(hostile)]))
        .map(|row, _| row.get("_id").cloned())
        .await?;
    assert_eq!(found, vec![Some(json!(id))]);
    assert_eq!(count(&mut conn, "persons").await?, 1);

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn empty_record_inserts_default_values() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_fixture().await?;

    let first = conn.insert("persons", &json!({})).await?;
    let second = conn.insert("persons", &json!({})).await?;
    assert_eq!(second, first + 1);

    let row = conn
        .select("SELECT name FROM persons WHERE _id = ?", Some(vec![json!(first)]))
        .first()
        .await?
        .ok_or("row missing")?;
    assert_eq!(row.get("name"), Some(&json!(null)));

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn replace_overwrites_by_key() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_fixture().await?;

    conn.insert("companies", &json!({"_id": 5, "name": "Old"})).await?;
    let id = conn
        .replace("companies", &json!({"_id": 5, "name": "New"}))
        .await?;
    assert_eq!(id, 5);
    assert_eq!(count(&mut conn, "companies").await?, 1);

    let names = conn
        .query(QuerySpec::table("companies").columns(["name"]))
        .map(|row, _| row.get("name").cloned())
        .await?;
    assert_eq!(names, vec![Some(json!("New"))]);

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn delete_filtered_then_everything() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_fixture().await?;
    for name in ["a", "b", "c"] {
        conn.insert("extras", &json!({"name": name, "value": "v"})).await?;
    }

    let removed = conn
        .delete("extras", Some("name IN (?)"), Some(&[json!(["a", "b"])][..]))
        .await?;
    assert_eq!(removed, 2);

    let removed = conn.delete("extras", None, None).await?;
    assert_eq!(removed, 1);
    assert_eq!(count(&mut conn, "extras").await?, 0);

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn update_without_clause_touches_every_row() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_fixture().await?;
    conn.insert("persons", &json!({"name": "a", "i": 1})).await?;
    conn.insert("persons", &json!({"name": "b", "i": 2})).await?;

    let changed = conn.update("persons", &json!({"i": 9}), "", &[]).await?;
    assert_eq!(changed, 2);

    conn.close().await?;
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Person {
    name: String,
    i: i64,
}

#[tokio::test]
async fn structs_serialize_in_and_out() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_fixture().await?;
    let ann = Person {
        name: "Ann".into(),
        i: 3,
    };
    conn.insert("persons", &ann).await?;

    let people: Vec<Person> = conn
        .select("SELECT name, i FROM persons", None)
        .fetch_as()
        .await?;
    assert_eq!(people, vec![ann]);

    let err = conn.insert("persons", &json!([1, 2])).await.unwrap_err();
    assert!(matches!(err, SqliteAccessError::InvalidArgument(_)));

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn engine_errors_surface() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_fixture().await?;

    let err = conn
        .insert("no_such_table", &json!({"name": "x"}))
        .await
        .unwrap_err();
    assert!(err.is_native_engine_error());

    let err = conn.exec_sql("NOT SQL AT ALL").await.unwrap_err();
    assert!(err.is_native_engine_error());

    conn.close().await?;
    Ok(())
}
