use jsonql::storage::{self, StoreError};
use jsonql::{run_query, Store, Value};
use std::fs;
use tempfile::TempDir;

#[test]
fn missing_file_loads_as_empty_store() {
    let dir = TempDir::new().unwrap();
    let store = storage::load(&dir.path().join("absent.json")).unwrap();
    assert_eq!(store, Store::new());
}

#[test]
fn save_then_load_preserves_tables_fields_and_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");

    let mut store = Store::new();
    run_query("CREATE TABLE zeta", &mut store).unwrap();
    run_query(
        "INSERT INTO alpha VALUES {\"z\": \"last\", \"a\": 1, \"m\": 2.5}",
        &mut store,
    )
    .unwrap();
    run_query("SELECT x FROM alpha", &mut store).unwrap();

    storage::save(&path, &store).unwrap();
    let loaded = storage::load(&path).unwrap();

    assert_eq!(loaded, store);
    assert_eq!(loaded.table_names(), vec!["zeta", "alpha"]);
    let row = &loaded.get("alpha").unwrap()[0];
    let fields: Vec<&str> = row.iter().map(|(name, _)| name).collect();
    assert_eq!(fields, vec!["z", "a", "m"]);
    assert_eq!(row.get("a"), Some(&Value::Integer(1)));
    assert_eq!(row.get("m"), Some(&Value::Float(2.5)));
}

#[test]
fn saved_document_is_pretty_printed_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");

    let mut store = Store::new();
    run_query("INSERT INTO users VALUES {\"name\": \"Bob\", \"age\": 25}", &mut store).unwrap();
    storage::save(&path, &store).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let expected = "{\n  \"users\": [\n    {\n      \"name\": \"Bob\",\n      \"age\": 25\n    }\n  ]\n}";
    assert_eq!(text, expected);
}

#[test]
fn large_document_loads_every_table_in_order() {
    let tables: Vec<String> = (0..500)
        .map(|i| format!(r#""t{}": [{{"id": {}, "name": "row{}"}}]"#, i, i, i))
        .collect();
    let document = format!("{{{}}}", tables.join(","));

    let store = storage::from_json_str(&document).unwrap();

    let names = store.table_names();
    assert_eq!(names.len(), 500);
    assert_eq!(names[0], "t0");
    assert_eq!(names[499], "t499");
    let row = &store.get("t250").unwrap()[0];
    assert_eq!(row.get("id"), Some(&Value::Integer(250)));

    let saved = storage::to_json_string(&store).unwrap();
    assert_eq!(storage::from_json_str(&saved).unwrap(), store);
}

#[test]
fn null_fields_load_as_null() {
    let store = storage::from_json_str(r#"{"t": [{"a": null}]}"#).unwrap();
    assert_eq!(store.get("t").unwrap()[0].get("a"), Some(&Value::Null));
}

#[test]
fn invalid_json_is_reported() {
    let error = storage::from_json_str("{not json").unwrap_err();
    assert!(matches!(error, StoreError::Json(_)));
}

#[test]
fn unsupported_shapes_are_rejected() {
    let cases = [
        r#"[]"#,
        r#"{"t": {}}"#,
        r#"{"t": [1]}"#,
        r#"{"t": [{"flag": true}]}"#,
        r#"{"t": [{"list": [1, 2]}]}"#,
        r#"{"t": [{"nested": {"a": 1}}]}"#,
    ];

    for case in cases {
        let error = storage::from_json_str(case).unwrap_err();
        assert!(
            matches!(error, StoreError::Unsupported(_)),
            "{} gave {:?}",
            case,
            error
        );
    }
}

#[test]
fn unreadable_path_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    // A directory cannot be read as a file
    let error = storage::load(dir.path()).unwrap_err();
    assert!(matches!(error, StoreError::Io { .. }));
}
