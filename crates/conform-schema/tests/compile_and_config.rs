//! Integration tests: malformed schema definitions and option documents.

use conform_schema::{
    compile, extra, optional, remove, required, Def, ExtraKeys, MarkerKind, Messages, Schema,
    SchemaError, SchemaOptions, Value, ValueKind,
};

#[test]
fn test_conflicting_markers() {
    let err = Schema::new(Def::mapping([(remove(optional("a")), ValueKind::Int.into())]))
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::ConflictingMarkers {
            outer: MarkerKind::Remove,
            inner: MarkerKind::Optional,
        }
    ));
    assert_eq!(err.to_string(), "conflicting markers: Remove cannot wrap Optional");
}

#[test]
fn test_duplicate_type_keys() {
    let err = Schema::new(Def::mapping([
        (ValueKind::Str.into(), ValueKind::Int.into()),
        (optional(ValueKind::Str), ValueKind::Str.into()),
    ]))
    .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateKey { ref key } if key == "String"));
}

#[test]
fn test_literal_and_type_keys_are_distinct() {
    assert!(Schema::new(Def::mapping([
        ("1".into(), ValueKind::Int.into()),
        (Def::from(1), ValueKind::Int.into()),
        (ValueKind::Str.into(), ValueKind::Int.into()),
    ]))
    .is_ok());
}

#[test]
fn test_multiple_extra() {
    let err = Schema::new(Def::mapping([
        (extra(), ValueKind::Int.into()),
        (extra(), ValueKind::Str.into()),
    ]))
    .unwrap_err();
    assert!(matches!(err, SchemaError::MultipleExtra));
}

#[test]
fn test_bare_required_anywhere() {
    assert!(matches!(
        Schema::new(Def::bare(MarkerKind::Required)),
        Err(SchemaError::BareMarker { kind: MarkerKind::Required, .. })
    ));
    assert!(matches!(
        Schema::new(Def::list([Def::bare(MarkerKind::Optional)])),
        Err(SchemaError::BareMarker { .. })
    ));
    assert!(matches!(
        Schema::new(Def::bare(MarkerKind::Reject)),
        Err(SchemaError::BareMarker { kind: MarkerKind::Reject, .. })
    ));
}

#[test]
fn test_extra_keys_schema_with_bare_required() {
    let err = compile(
        Def::mapping([("a".into(), ValueKind::Int.into())]),
        MarkerKind::Required,
        Def::bare(MarkerKind::Required),
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::BareMarker { .. }));
}

#[test]
fn test_extra_keys_from_marker_kind() {
    assert!(matches!(
        ExtraKeys::from_marker(MarkerKind::Optional),
        Err(SchemaError::InvalidOption { option: "extra_keys", .. })
    ));
    assert!(matches!(ExtraKeys::from_marker(MarkerKind::Remove), Ok(ExtraKeys::Remove)));
}

#[test]
fn test_nested_marker_of_same_kind_collapses() {
    let schema = Schema::new(Def::mapping([(required(required("a")), ValueKind::Int.into())]))
        .unwrap();
    assert!(schema.validate(&Value::map([("a", 1)])).is_ok());
}

#[test]
fn test_yaml_options_drive_validation() {
    let options = SchemaOptions::from_yaml_str(
        "default_keys: optional\n\
         extra_keys: remove\n\
         messages:\n  wrong_type: bad type\n  type_names:\n    int: Integer\n",
    )
    .unwrap();
    let schema = Schema::with_options(
        Def::mapping([("a".into(), ValueKind::Int.into())]),
        options,
    )
    .unwrap();

    assert_eq!(schema.validate(&Value::empty_map()).unwrap(), Value::empty_map());
    assert_eq!(
        schema.validate(&Value::map([("a", 1), ("b", 2)])).unwrap(),
        Value::map([("a", 1)])
    );

    let err = schema.validate(&Value::map([("a", "x")])).unwrap_err();
    let first = err.first().unwrap();
    assert_eq!(first.message, "bad type");
    assert_eq!(first.expected.as_deref(), Some("Integer"));
}

#[test]
fn test_json_options() {
    let options = SchemaOptions::from_json_str(r#"{"messages": {"required_key": "missing"}}"#).unwrap();
    let schema = Schema::with_options(Def::mapping([("a".into(), ValueKind::Int.into())]), options)
        .unwrap();
    let err = schema.validate(&Value::empty_map()).unwrap_err();
    assert_eq!(err.first().unwrap().message, "missing");
}

#[test]
fn test_nested_schema_keeps_its_own_messages() {
    let mut messages = Messages::default();
    messages.wrong_type = "inner says no".into();
    let inner = Schema::with_options(ValueKind::Int, SchemaOptions::default().messages(messages))
        .unwrap();
    let outer = Schema::new(Def::mapping([("a".into(), inner.into())])).unwrap();
    let err = outer.validate(&Value::map([("a", "x")])).unwrap_err();
    assert_eq!(err.first().unwrap().message, "inner says no");
}

#[test]
fn test_malformed_document() {
    assert!(matches!(
        SchemaOptions::from_yaml_str("default_keys: [1, 2]\n"),
        Err(SchemaError::Config(_))
    ));
}
