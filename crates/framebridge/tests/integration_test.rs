//! Integration tests for framebridge.

use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tempfile::NamedTempFile;

use framebridge::{
    BridgeError, CheckKind, ColumnSpec, Constraint, CsvReader, DataType, FieldBridge,
    FieldErrorKind, FieldType, ModelSpec, SchemaDefinition, SchemaRegistry, Validated, Value,
    dataframe_model,
};

dataframe_model! {
    /// Users with positive ids and unique names.
    pub struct UserSchema => SchemaDefinition::builder("UserSchema")
        .column(ColumnSpec::new("user_id", DataType::Int).ge(1.0))
        .column(ColumnSpec::new("username", DataType::Str).unique())
        .build();
}

dataframe_model! {
    pub struct OrderSchema => SchemaDefinition::builder("OrderSchema")
        .column(ColumnSpec::new("order_id", DataType::Int).unique())
        .column(ColumnSpec::new("amount", DataType::Float).coerce().gt(0.0))
        .build();
}

#[derive(Debug, Serialize, Deserialize)]
struct AppData {
    users: Validated<UserSchema>,
    app_version: String,
}

#[derive(Debug, Deserialize)]
struct Shop {
    users: Validated<UserSchema>,
    orders: Validated<OrderSchema>,
}

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn users_json() -> serde_json::Value {
    json!({"user_id": [1, 2, 3], "username": ["alice", "bob", "carol"]})
}

// =============================================================================
// Wrapper scenarios
// =============================================================================

#[test]
fn test_valid_users() {
    let data: AppData = serde_json::from_value(json!({
        "users": users_json(),
        "app_version": "1.0.0"
    }))
    .expect("valid data");

    assert_eq!(data.users.len(), 3);
    assert_eq!(data.users["username"][2], Value::from("carol"));
    assert_eq!(data.app_version, "1.0.0");
}

#[test]
fn test_duplicate_username_rejected() {
    let result = Validated::<UserSchema>::new(
        json!({"user_id": [1, 2, 3], "username": ["alice", "bob", "bob"]}),
    );

    let Err(BridgeError::SchemaViolation(violation)) = result else {
        panic!("expected a schema violation");
    };
    assert_eq!(violation.column, "username");
    assert!(violation.check.is_uniqueness());
    assert!(violation.to_string().contains("field_uniqueness"));
}

#[test]
fn test_negative_user_id_rejected() {
    let result =
        Validated::<UserSchema>::new(json!({"user_id": [1, 2, -1], "username": ["a", "b", "c"]}));

    let Err(BridgeError::SchemaViolation(violation)) = result else {
        panic!("expected a schema violation");
    };
    assert_eq!(violation.column, "user_id");
    assert_eq!(
        violation.check,
        CheckKind::Constraint {
            constraint: Constraint::Range {
                min: Some(1.0),
                max: None
            }
        }
    );
    assert_eq!(violation.failure_cases[0].row, Some(2));
    assert_eq!(violation.failure_cases[0].value, Value::Int(-1));
}

#[test]
fn test_serde_error_names_failure() {
    let err = serde_json::from_value::<AppData>(json!({
        "users": {"user_id": [1, 2], "username": ["bob", "bob"]},
        "app_version": "1.0.0"
    }))
    .unwrap_err();
    assert!(err.to_string().contains("UserSchema"));
}

#[test]
fn test_round_trip() {
    let data: AppData = serde_json::from_value(json!({
        "users": users_json(),
        "app_version": "2.0"
    }))
    .unwrap();

    let text = serde_json::to_string(&data).unwrap();
    let back: AppData = serde_json::from_str(&text).unwrap();
    assert_eq!(back.users, data.users);
    assert_eq!(back.users.to_dict(), data.users.to_dict());
}

#[test]
fn test_two_wrapped_fields_only_second_invalid() {
    let err = serde_json::from_value::<Shop>(json!({
        "users": users_json(),
        "orders": {"order_id": [1, 1], "amount": [9.5, 3.0]}
    }))
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("OrderSchema"));
    assert!(!message.contains("UserSchema"));
}

#[test]
fn test_wrapper_not_equal_to_plain_values() {
    let users = Validated::<UserSchema>::new(users_json()).unwrap();
    let table = users.table().cloned().unwrap();
    assert!(users != table);
    assert!(users != users_json());
    assert_eq!(users, Validated::<UserSchema>::new(table).unwrap());
}

#[test]
fn test_csv_file_into_wrapper() {
    let file = create_test_file("user_id,username\n1,alice\n2,bob\n");
    let table = CsvReader::new().read_path(file.path()).unwrap();
    let users = Validated::<UserSchema>::new(table).unwrap();
    assert_eq!(users.shape(), (2, 2));

    let file = create_test_file("user_id\tusername\n1\talice\n0\tbob\n");
    let table = CsvReader::new().read_path(file.path()).unwrap();
    assert!(Validated::<UserSchema>::new(table).is_err());
}

// =============================================================================
// Field bridge scenarios
// =============================================================================

fn bridged_shop(registry: &mut SchemaRegistry) -> ModelSpec {
    let spec = ModelSpec::builder("Shop")
        .field("users", FieldType::table::<UserSchema>())
        .field("orders", FieldType::table::<OrderSchema>())
        .field("name", FieldType::Str)
        .build();
    FieldBridge::new(registry).apply(spec)
}

#[test]
fn test_bridged_model_reports_only_second_field() {
    let mut registry = SchemaRegistry::new();
    let spec = bridged_shop(&mut registry);

    let err = spec
        .validate_json(&json!({
            "users": users_json(),
            "orders": {"order_id": [1, 2], "amount": [9.5, -3.0]},
            "name": "corner shop"
        }))
        .unwrap_err();

    assert_eq!(err.fields(), vec!["orders"]);
    let error = err.error_for("orders").unwrap();
    assert_eq!(error.kind, FieldErrorKind::Value);
    assert_eq!(error.violation.as_ref().unwrap().column, "amount");
}

#[test]
fn test_bridged_model_aggregates_errors() {
    let mut registry = SchemaRegistry::new();
    let spec = bridged_shop(&mut registry);

    let err = spec
        .validate_json(&json!({
            "users": "not a table",
            "orders": null
        }))
        .unwrap_err();

    assert_eq!(err.fields(), vec!["users", "orders", "name"]);
    assert!(err.errors[0].message.contains("got string"));
    assert!(err.errors[1].message.contains("Value cannot be null"));
    assert_eq!(err.errors[2].kind, FieldErrorKind::Missing);
}

#[test]
fn test_bridged_model_accepts_wrappers_and_tables() {
    let mut registry = SchemaRegistry::new();
    let spec = bridged_shop(&mut registry);
    let users = Validated::<UserSchema>::new(users_json()).unwrap();

    let mut input = indexmap::IndexMap::new();
    input.insert("users".to_string(), (&users).into());
    input.insert(
        "orders".to_string(),
        json!([{"order_id": 7, "amount": 12}]).into(),
    );
    input.insert("name".to_string(), json!("shop").into());

    let instance = spec.validate(input).unwrap();
    assert_eq!(instance.table("users"), users.table());
    assert_eq!(
        instance.table("orders").unwrap().get(0, "amount"),
        Some(&Value::Float(12.0))
    );
    assert_eq!(
        instance.to_json()["orders"],
        json!({"order_id": [7], "amount": [12.0]})
    );
}
