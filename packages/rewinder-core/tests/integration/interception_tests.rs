//! Interception properties across entry points and call conventions.

use rewinder_core::{Args, Connection, EntryPoint, RewindError, RewinderConfig};
use serde_json::json;

use super::helpers::{
    legacy_family, modern_family, named_handler, tables, FakeDriver, FakeDriverError, Harness,
};

#[test]
fn test_every_entry_point_records() {
    let harness = Harness::new();
    let postgres = harness.define(modern_family("postgresql"));
    let mut conn = Connection::open(&postgres, FakeDriver::default());

    conn.execute("INSERT INTO a VALUES (1)", &Args::new()).unwrap();
    conn.exec_query("INSERT INTO b VALUES ($1)", &Args::new().bind(1))
        .unwrap();
    conn.raw_execute("INSERT INTO c VALUES (1)", &Args::new()).unwrap();

    assert_eq!(harness.recorder().snapshot(conn.id()), tables(&["a", "b", "c"]));
    let entry_points: Vec<EntryPoint> = conn.driver().calls.iter().map(|c| c.entry_point).collect();
    assert_eq!(entry_points, EntryPoint::ALL.to_vec());
}

#[test]
fn test_non_insertions_never_record() {
    let harness = Harness::new();
    let postgres = harness.define(modern_family("postgresql"));
    let mut conn = Connection::open(&postgres, FakeDriver::default());

    for sql in [
        "SELECT * FROM users",
        "UPDATE users SET name = 'x' WHERE id = 1",
        "DELETE FROM users",
        "CREATE TABLE widgets (id INT)",
        "ALTER TABLE widgets ADD COLUMN name TEXT",
        "TRUNCATE users",
    ] {
        conn.execute(sql, &Args::new()).unwrap();
    }

    assert!(harness.recorder().snapshot(conn.id()).is_empty());
    assert!(harness.recorder().is_empty());
    assert_eq!(conn.driver().calls.len(), 6);
}

#[test]
fn test_repeated_insert_records_once_but_delegates_each_call() {
    let harness = Harness::new();
    let sqlite = harness.define(legacy_family("sqlite3"));
    let mut conn = Connection::open(&sqlite, FakeDriver::default());

    conn.execute("INSERT INTO users VALUES (1)", &Args::new()).unwrap();
    conn.execute("INSERT INTO users VALUES (2)", &Args::new()).unwrap();

    assert_eq!(harness.recorder().snapshot(conn.id()), tables(&["users"]));
    assert_eq!(conn.driver().calls.len(), 2);
}

#[test]
fn test_arguments_reach_driver_unchanged() {
    let harness = Harness::new();
    let postgres = harness.define(modern_family("postgresql"));
    let sqlite = harness.define(legacy_family("sqlite3"));

    let args = Args::new()
        .bind(7)
        .bind("seven")
        .option("name", "SQL")
        .option("async", false);

    let mut modern = Connection::open(&postgres, FakeDriver::default());
    modern.exec_query("INSERT INTO t VALUES ($1, $2)", &args).unwrap();
    let call = &modern.driver().calls[0];
    assert_eq!(call.binds, vec![json!(7), json!("seven")]);
    assert_eq!(call.named.as_ref(), Some(&args.named));

    // The legacy convention takes named options as one trailing bind.
    let mut legacy = Connection::open(&sqlite, FakeDriver::default());
    legacy.exec_query("INSERT INTO t VALUES (?, ?)", &args).unwrap();
    let call = &legacy.driver().calls[0];
    assert_eq!(
        call.binds,
        vec![json!(7), json!("seven"), json!({"name": "SQL", "async": false})]
    );
    assert_eq!(call.named, None);

    assert!(harness.recorder().contains(modern.id(), "t"));
    assert!(harness.recorder().contains(legacy.id(), "t"));
}

#[test]
fn test_driver_errors_pass_through_unchanged() {
    let harness = Harness::new();
    let postgres = harness.define(modern_family("postgresql"));
    let mut conn = Connection::open(&postgres, FakeDriver::default());

    let sql = "INSERT INTO accounts VALUES (1) -- VIOLATE";
    let err = conn.execute(sql, &Args::new()).unwrap_err();

    assert_eq!(err, FakeDriverError::Constraint(sql.to_string()));
    assert_eq!(err.to_string(), format!("constraint violation: {}", sql));
    // The statement reached classification before the driver rejected it.
    assert!(harness.recorder().contains(conn.id(), "accounts"));
}

#[test]
fn test_malformed_statements_complete_normally() {
    let harness = Harness::new();
    let sqlite = harness.define(legacy_family("sqlite3"));
    let mut conn = Connection::open(&sqlite, FakeDriver::default());

    for sql in ["", "INSERT", "INSERT INTO", "INSERT INTO (", "/* open", "'''", "\u{0}\u{1}"] {
        conn.execute(sql, &Args::new()).unwrap();
    }

    assert!(harness.recorder().snapshot(conn.id()).is_empty());
    assert_eq!(conn.driver().calls.len(), 7);
}

#[test]
fn test_batches_record_each_insert() {
    let harness = Harness::new();
    let sqlite = harness.define(legacy_family("sqlite3"));
    let mut conn = Connection::open(&sqlite, FakeDriver::default());

    conn.execute(
        "INSERT INTO users VALUES (1); SELECT 1; INSERT INTO `tags` VALUES ('a;b')",
        &Args::new(),
    )
    .unwrap();

    assert_eq!(harness.recorder().snapshot(conn.id()), tables(&["users", "tags"]));
    assert_eq!(conn.driver().calls.len(), 1);
}

#[test]
fn test_batches_without_splitting_record_first_statement() {
    let harness = Harness::with_config(RewinderConfig {
        split_statements: false,
        ..Default::default()
    });
    let sqlite = harness.define(legacy_family("sqlite3"));
    let mut conn = Connection::open(&sqlite, FakeDriver::default());

    conn.execute("INSERT INTO users VALUES (1); INSERT INTO tags VALUES (1)", &Args::new())
        .unwrap();

    assert_eq!(harness.recorder().snapshot(conn.id()), tables(&["users"]));
}

#[test]
fn test_unsupported_entry_point_surfaces_through_driver_error() {
    let harness = Harness::new();
    let sqlite = harness.define(legacy_family("sqlite3"));
    let mut conn = Connection::open(&sqlite, FakeDriver::default());

    let err = conn
        .raw_execute("INSERT INTO users VALUES (1)", &Args::new())
        .unwrap_err();

    assert_eq!(
        err,
        FakeDriverError::Rewind(RewindError::UnsupportedEntryPoint {
            type_name: "sqlite3".to_string(),
            entry_point: EntryPoint::RawExecute,
        })
    );
    assert!(harness.recorder().snapshot(conn.id()).is_empty());
}

#[test]
fn test_derived_type_redeclaring_entry_point_is_intercepted_once() {
    let harness = Harness::new();
    let mysql = harness.define(modern_family("abstract_mysql"));
    let mysql2 = harness.define(
        rewinder_core::ConnectionType::builder("mysql2")
            .inherit(&mysql)
            .handler(EntryPoint::Execute, named_handler(EntryPoint::Execute)),
    );

    assert_eq!(mysql2.parent(), Some("abstract_mysql"));
    for entry_point in EntryPoint::ALL {
        assert!(mysql2.handler(entry_point).unwrap().is_intercepted());
    }

    let mut conn = Connection::open(&mysql2, FakeDriver::default());
    conn.execute("INSERT INTO a VALUES (1)", &Args::new()).unwrap();
    conn.exec_query("INSERT INTO b VALUES (1)", &Args::new()).unwrap();
    assert_eq!(harness.recorder().snapshot(conn.id()), tables(&["a", "b"]));
    assert_eq!(conn.driver().calls.len(), 2);
}
