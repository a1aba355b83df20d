#![cfg(feature = "sqlite")]

use serde_json::{Value, json};
use sqlite_access::prelude::*;
use tempfile::TempDir;

const PERSONS: &str =
    "CREATE TABLE IF NOT EXISTS persons (_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, n REAL, i INTEGER)";

async fn open_with(shape: OutputShape, rows: i64) -> Result<(TempDir, Connection), SqliteAccessError> {
    let dir = tempfile::tempdir()?;
    let mut conn = OpenOptions::builder()
        .create_scripts([PERSONS])
        .output_shape(shape)
        .base_dir(dir.path())
        .open("pipeline.db")
        .await?;
    for i in 1..=rows {
        conn.insert("persons", &json!({"name": format!("p{i}"), "i": i}))
            .await?;
    }
    Ok((dir, conn))
}

#[tokio::test]
async fn collect_follows_the_transform() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_with(OutputShape::Record, 4).await?;
    let mut pipeline = conn.select("SELECT name, i FROM persons ORDER BY i", None);

    match pipeline.collect(Transform::None).await? {
        Collected::Rows(rows) => assert_eq!(rows.len(), 4),
        other => panic!("expected rows, got {other:?}"),
    }

    let mapped = pipeline
        .collect(Transform::map(|row, index| json!([index, row.get("name")])))
        .await?;
    assert_eq!(
        mapped.into_json(),
        json!([[0, "p1"], [1, "p2"], [2, "p3"], [3, "p4"]])
    );

    let total = pipeline
        .collect(Transform::reduce(json!(0), |acc, row, _| {
            let i = row.get("i").and_then(Value::as_i64).unwrap_or_default();
            json!(acc.as_i64().unwrap_or_default() + i)
        }))
        .await?;
    assert_eq!(total, Collected::Reduced(json!(10)));

    drop(pipeline);
    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn typed_map_and_reduce() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_with(OutputShape::Record, 3).await?;

    let names: Vec<String> = conn
        .query(QuerySpec::table("persons").order_by("i DESC"))
        .map(|row, _| row.get("name").and_then(Value::as_str).unwrap_or_default().to_owned())
        .await?;
    assert_eq!(names, vec!["p3", "p2", "p1"]);

    let (sum, seen) = conn
        .select("SELECT i FROM persons", None)
        .reduce((0, 0), |(sum, seen), row, index| {
            assert_eq!(index, seen);
            (sum + row.get("i").and_then(Value::as_i64).unwrap_or_default(), seen + 1)
        })
        .await?;
    assert_eq!((sum, seen), (6, 3));

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn structured_queries_filter_and_limit() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_with(OutputShape::Record, 6).await?;

    let spec = QuerySpec::table("persons")
        .columns(["name"])
        .selection("i IN (?) AND name <> ?", [json!([2, 4, 6]), json!("p6")])
        .order_by("i")
        .limit(1);
    let rows = conn.query(spec).rows().await?;
    assert_eq!(
        rows.into_iter().map(RowRecord::into_json).collect::<Vec<_>>(),
        vec![json!({"name": "p2"})]
    );

    let grouped = conn
        .query(
            QuerySpec::table("persons")
                .columns(["i % 2 AS parity", "count(*) AS total"])
                .group_by("parity")
                .having("count(*) > 2")
                .order_by("parity"),
        )
        .rows()
        .await?;
    assert_eq!(
        grouped.into_iter().map(RowRecord::into_json).collect::<Vec<_>>(),
        vec![json!({"parity": 0, "total": 3}), json!({"parity": 1, "total": 3})]
    );

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn positional_shape_returns_sequences() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_with(OutputShape::Positional, 2).await?;

    let rows = conn
        .select("SELECT _id, name FROM persons ORDER BY _id", None)
        .rows()
        .await?;
    assert_eq!(
        rows.into_iter().map(RowRecord::into_json).collect::<Vec<_>>(),
        vec![json!([1, "p1"]), json!([2, "p2"])]
    );

    let records = conn
        .select("SELECT name FROM persons WHERE _id = ?", Some(vec![json!(1)]))
        .with_shape(OutputShape::Record)
        .first()
        .await?;
    assert_eq!(records.and_then(|row| row.get("name").cloned()), Some(json!("p1")));

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn streams_decode_lazily_and_release_on_abandon() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_with(OutputShape::Record, 100).await?;

    {
        let mut pipeline = conn.select("SELECT _id, name FROM persons ORDER BY _id", None);
        let mut stream = pipeline.stream().await?;
        for expected in 1..=3 {
            let row = stream.next().await.ok_or("stream ended early")??;
            assert_eq!(row.get("_id"), Some(&json!(expected)));
        }
        assert_eq!(stream.rows_read(), 3);
        assert!(!stream.is_finished());
        // Abandoned here with 97 rows unread.
    }

    // The statement was released: the connection accepts writes again.
    conn.insert("persons", &json!({"name": "after"})).await?;
    let total = conn
        .select("SELECT count(*) AS total FROM persons", None)
        .first()
        .await?
        .and_then(|row| row.get("total").cloned());
    assert_eq!(total, Some(json!(101)));

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn stream_map_and_explicit_close() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_with(OutputShape::Record, 5).await?;

    let mut pipeline = conn.select("SELECT name FROM persons ORDER BY _id", None);
    let mut stream = pipeline
        .stream_map(|row, index| {
            let name = row.get("name").and_then(Value::as_str).unwrap_or("?");
            format!("{index}:{name}")
        })
        .await?;
    assert_eq!(stream.next().await.transpose()?, Some("0:p1".to_string()));
    assert_eq!(stream.next().await.transpose()?, Some("1:p2".to_string()));
    stream.close().await?;

    let rest = pipeline.stream().await?.try_collect().await?;
    assert_eq!(rest.len(), 5, "a second terminal call runs the statement again");

    let mut stream = pipeline.stream().await?;
    while stream.next().await.transpose()?.is_some() {}
    assert!(stream.is_finished());
    assert!(stream.next().await.is_none());

    drop(stream);
    drop(pipeline);
    conn.exec_sql("DELETE FROM persons").await?;
    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn first_on_empty_results_is_none() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_with(OutputShape::Record, 0).await?;
    assert!(conn.query(QuerySpec::table("persons")).first().await?.is_none());
    assert!(conn.query(QuerySpec::table("persons")).rows().await?.is_empty());
    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn bad_queries_fail_at_the_terminal_call() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut conn) = open_with(OutputShape::Record, 1).await?;

    let err = conn
        .select("SELECT * FROM persons WHERE _id = ? AND name = ?", Some(vec![json!(1)]))
        .rows()
        .await
        .unwrap_err();
    assert!(matches!(err, SqliteAccessError::InvalidArgument(_)));

    let err = conn.select("   ", None).rows().await.unwrap_err();
    assert!(matches!(err, SqliteAccessError::InvalidArgument(_)));

    let err = conn
        .select("SELECT * FROM nowhere", None)
        .rows()
        .await
        .unwrap_err();
    assert!(err.is_native_engine_error());

    conn.close().await?;
    Ok(())
}
