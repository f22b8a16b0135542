//! Connection tests against real SQLite databases (memory and file).

use std::time::{Duration, Instant};

use profile_db::{absolutize_sqlite_dsn, ConnectOpts, DbEngine, DbError, DbHandle, RetryPolicy};
use sea_orm::{ConnectionTrait, Statement};
use tempfile::TempDir;

#[tokio::test]
async fn connects_to_in_memory_sqlite() {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("in-memory sqlite should connect");
    assert_eq!(db.engine(), DbEngine::Sqlite);

    let conn = db.sea();
    conn.execute_unprepared("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
        .await
        .unwrap();
    conn.execute_unprepared("INSERT INTO t (id, name) VALUES (1, 'a')")
        .await
        .unwrap();

    // A second clone must see the same in-memory database.
    let other = db.sea();
    let row = other
        .query_one(Statement::from_string(
            other.get_database_backend(),
            "SELECT COUNT(*) AS n FROM t".to_owned(),
        ))
        .await
        .unwrap()
        .unwrap();
    let n: i64 = row.try_get("", "n").unwrap();
    assert_eq!(n, 1);

    db.close().await.unwrap();
}

#[tokio::test]
async fn creates_sqlite_file_and_parent_dirs() {
    let tmp = TempDir::new().unwrap();
    let dsn = absolutize_sqlite_dsn("sqlite://nested/dir/profiles.db", tmp.path(), false).unwrap();

    let db = DbHandle::connect(&dsn, ConnectOpts::default())
        .await
        .expect("file sqlite should connect");
    assert_eq!(db.dsn(), dsn);
    assert!(tmp.path().join("nested/dir/profiles.db").exists());
}

#[tokio::test]
async fn unknown_scheme_fails_without_retrying() {
    let started = Instant::now();
    let err = DbHandle::connect_with_retry(
        "mysql://root:pw@localhost/db",
        ConnectOpts::default(),
        RetryPolicy::new(5, Duration::from_secs(30)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DbError::UnknownDsn(_)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn retry_wrapper_connects_first_time() {
    let db = DbHandle::connect_with_retry(
        "sqlite::memory:",
        ConnectOpts::default(),
        RetryPolicy::none(),
    )
    .await
    .unwrap();
    assert_eq!(db.engine(), DbEngine::Sqlite);
}
