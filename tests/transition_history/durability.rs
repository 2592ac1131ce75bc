//! On-disk persistence and metadata encodings

use crate::*;
use serde_json::json;
use waymark::{Error, Waymark, SORT_KEY_STEP};

#[test]
fn test_reopened_database_keeps_history() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.db");
    let meta = common::metadata(&[("total", json!(129.5)), ("items", json!(["a", "b"]))]);

    {
        let marks = Waymark::open(&path).unwrap();
        let mut order = marks.history("order", 42).unwrap();
        order.create(None, "pending", None).unwrap();
        order.create(Some("pending"), "paid", Some(meta.clone())).unwrap();
    }

    let marks = Waymark::open(&path).unwrap();
    assert_eq!(marks.path(), Some(path.as_path()));
    let mut order = marks.history("order", 42).unwrap();
    let last = order.last().unwrap().unwrap();

    assert_eq!(last.from_state(), Some("pending"));
    assert_eq!(last.to_state(), "paid");
    assert_eq!(last.metadata(), &meta);
    assert_eq!(order.history().unwrap().len(), 2);
}

#[test]
fn test_sqlite_sort_keys_step_per_owner() {
    let marks = Waymark::ephemeral().unwrap();
    let mut first = marks.history("order", 1).unwrap();
    let mut second = marks.history("order", 2).unwrap();

    let a = first.create(None, "a", None).unwrap();
    let b = second.create(None, "a", None).unwrap();
    let c = first.create(Some("a"), "b", None).unwrap();

    assert_eq!(a.sort_key().as_u64(), SORT_KEY_STEP as u64);
    assert_eq!(b.sort_key().as_u64(), SORT_KEY_STEP as u64);
    assert_eq!(c.sort_key().as_u64(), 2 * SORT_KEY_STEP as u64);
}

#[test]
fn test_messagepack_metadata_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("packed.db");
    let meta = common::metadata(&[
        ("nested", json!({"depth": 2, "tags": ["x", "y"]})),
        ("flag", json!(true)),
        ("nothing", json!(null)),
    ]);

    let open = || {
        Waymark::builder()
            .path(&path)
            .metadata_sql_type("BLOB")
            .serialize_metadata(SerializationFormat::MessagePack)
            .open()
            .unwrap()
    };

    open()
        .history("job", 7)
        .unwrap()
        .create(Some("queued"), "running", Some(meta.clone()))
        .unwrap();

    let last = open().history("job", 7).unwrap().last().unwrap().unwrap();
    assert_eq!(last.metadata(), &meta);
}

#[test]
fn test_native_json_column_round_trip() {
    let marks = Waymark::builder()
        .metadata_sql_type("json")
        .no_serialization()
        .open()
        .unwrap();
    let meta = common::metadata(&[("note", json!("it's \"quoted\""))]);

    marks
        .history("order", 1)
        .unwrap()
        .create(None, "open", Some(meta.clone()))
        .unwrap();

    let last = marks.history("order", 1).unwrap().last().unwrap().unwrap();
    assert_eq!(last.metadata(), &meta);
}

#[test]
fn test_memory_backed_facade() {
    let marks = Waymark::builder().open_memory().unwrap();
    assert!(marks.is_ephemeral());

    let mut order = marks.history("order", 1).unwrap();
    order.create(None, "a", None).unwrap();

    let mut again = marks.clone().history("order", 1).unwrap();
    assert_eq!(again.current_state().unwrap().as_deref(), Some("a"));
}

#[test]
fn test_reopen_uses_stored_metadata_type() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.db");

    let native = Waymark::builder()
        .path(&path)
        .metadata_sql_type("json")
        .no_serialization()
        .open()
        .unwrap();
    native.history("order", 1).unwrap().create(None, "open", None).unwrap();
    drop(native);

    // Declared BLOB, but the table on disk still says json
    let marks = Waymark::builder()
        .path(&path)
        .metadata_sql_type("BLOB")
        .serialize_metadata(SerializationFormat::MessagePack)
        .open()
        .unwrap();
    assert_eq!(marks.schema().metadata_sql_type(), Some("json"));

    let err = marks.history("order", 1).unwrap_err();
    assert!(matches!(
        err,
        Error::IncompatibleSerialization { ref sql_type, .. } if sql_type == "json"
    ));
}

#[test]
fn test_reopen_plain_table_without_serialization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.db");

    Waymark::open(&path).unwrap().history("order", 1).unwrap();

    let marks = Waymark::builder()
        .path(&path)
        .metadata_sql_type("jsonb")
        .no_serialization()
        .open()
        .unwrap();
    assert_eq!(marks.schema().metadata_sql_type(), Some("TEXT"));

    let err = marks.history("order", 1).unwrap_err();
    assert!(matches!(
        err,
        Error::UnserializedMetadata { ref sql_type, .. } if sql_type == "TEXT"
    ));
}
