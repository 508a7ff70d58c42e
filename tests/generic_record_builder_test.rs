//! Building records: schema-bound, clone-based and schema-less builders.

mod common;

use common::{init_logger, person_schema, point_schema};
use fold_compact::{
    FieldDescriptor, FieldKind, FieldValue, GenericRecord, GenericRecordBuilder, Schema,
    SchemaError,
};
use std::collections::BTreeMap;
use std::sync::Arc;

fn point(x: i32, y: i32) -> GenericRecord {
    GenericRecordBuilder::schema_bound(point_schema())
        .set_int32("x", x)
        .and_then(|b| b.set_int32("y", y))
        .and_then(GenericRecordBuilder::build)
        .unwrap()
}

#[test]
fn test_clone_without_changes_round_trips() {
    init_logger();

    let original = point(3, 4);
    let copy = original.new_builder_with_clone().build().unwrap();
    assert_eq!(copy, original);
    assert_eq!(copy.schema().schema_id(), original.schema().schema_id());
}

#[test]
fn test_clone_of_record_holding_nan_is_equal() {
    let original = GenericRecordBuilder::compact("Reading")
        .set_float64("value", f64::NAN)
        .and_then(|b| b.set_array_of_nullable_float32("samples", Some(vec![Some(f32::NAN), None])))
        .and_then(GenericRecordBuilder::build)
        .unwrap();

    let copy = original.new_builder_with_clone().build().unwrap();
    assert_eq!(copy, original);
    assert!(copy.get_float64("value").unwrap().is_nan());
}

#[test]
fn test_clone_partial_update() {
    let original = point(3, 4);
    let moved = original
        .new_builder_with_clone()
        .set_int32("x", 10)
        .and_then(GenericRecordBuilder::build)
        .unwrap();

    assert_eq!(moved.get_int32("x").unwrap(), 10);
    assert_eq!(moved.get_int32("y").unwrap(), 4);
    // The source record is untouched.
    assert_eq!(original.get_int32("x").unwrap(), 3);
    assert_ne!(moved, original);
}

#[test]
fn test_clone_rejects_second_override_and_wrong_kind() {
    let original = point(3, 4);

    let twice = original
        .new_builder_with_clone()
        .set_int32("x", 1)
        .and_then(|b| b.set_int32("x", 2));
    assert!(matches!(twice, Err(SchemaError::InvalidField(_))));

    let wrong_kind = original.new_builder_with_clone().set_int64("x", 1);
    assert!(matches!(wrong_kind, Err(SchemaError::KindMismatch { .. })));

    let unknown = original.new_builder_with_clone().set_int32("z", 1);
    assert!(matches!(unknown, Err(SchemaError::FieldNotFound { .. })));
}

#[test]
fn test_schema_bound_builder_requires_fixed_size_fields() {
    let missing_y = point_schema_builder().set_int32("x", 1).and_then(GenericRecordBuilder::build);
    assert_eq!(
        missing_y.unwrap_err(),
        SchemaError::MissingField {
            field: "y".to_string(),
            schema: point_schema().to_string(),
        }
    );

    // Nullable and variable-size fields default to null.
    let person = GenericRecordBuilder::schema_bound(person_schema())
        .set_boolean("active", false)
        .and_then(GenericRecordBuilder::build)
        .unwrap();
    assert_eq!(person.get_string("name").unwrap(), None);
    assert_eq!(person.get_nullable_int32("age").unwrap(), None);
}

fn point_schema_builder() -> GenericRecordBuilder {
    point(0, 0).new_builder()
}

#[test]
fn test_new_builder_starts_empty() {
    let fresh = point(3, 4)
        .new_builder()
        .set_int32("x", 7)
        .and_then(|b| b.set_int32("y", 8))
        .and_then(GenericRecordBuilder::build)
        .unwrap();
    assert_eq!(fresh.get_int32("x").unwrap(), 7);
    assert_eq!(fresh.get_int32("y").unwrap(), 8);
}

#[test]
fn test_schema_bound_setter_kind_must_match_exactly() {
    let result = GenericRecordBuilder::schema_bound(person_schema()).set_int32("age", 3);
    match result {
        Err(SchemaError::KindMismatch { allowed, found, .. }) => {
            assert_eq!(allowed, vec![FieldKind::Int32]);
            assert_eq!(found, FieldKind::NullableInt32);
        }
        other => panic!("expected kind mismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_array_coercion_is_idempotent() {
    let record = GenericRecordBuilder::schema_bound(person_schema())
        .set_array_of_nullable_int64("scores", Some(vec![Some(1), Some(2), Some(3)]))
        .and_then(|b| b.set_boolean("active", true))
        .and_then(GenericRecordBuilder::build)
        .unwrap();

    let plain = record.get_array_of_int64("scores").unwrap();
    assert_eq!(plain, Some(vec![1, 2, 3]));
    assert_eq!(record.get_array_of_int64("scores").unwrap(), plain);

    let nullable = record.get_array_of_nullable_int64("scores").unwrap();
    assert_eq!(nullable, Some(vec![Some(1), Some(2), Some(3)]));
    assert_eq!(record.get_array_of_nullable_int64("scores").unwrap(), nullable);
}

#[test]
fn test_plain_array_is_readable_as_nullable() {
    let record = GenericRecordBuilder::compact("Samples")
        .set_array_of_float64("values", Some(vec![0.5, 1.5]))
        .and_then(GenericRecordBuilder::build)
        .unwrap();
    assert_eq!(
        record.get_array_of_nullable_float64("values").unwrap(),
        Some(vec![Some(0.5), Some(1.5)])
    );
    assert_eq!(record.get_nullable_float64_from_array("values", 1).unwrap(), Some(1.5));
}

#[test]
fn test_compact_builder_derives_schema() {
    init_logger();

    let record = GenericRecordBuilder::compact("Point")
        .set_int32("y", 4)
        .and_then(|b| b.set_int32("x", 3))
        .and_then(GenericRecordBuilder::build)
        .unwrap();

    // Same structure, same id as the explicitly declared schema.
    assert_eq!(record.schema().schema_id(), point_schema().schema_id());
    assert_eq!(**record.schema(), *point_schema());
    assert_eq!(record, point(3, 4));
    assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["x", "y"]);

    let twice = GenericRecordBuilder::compact("Point")
        .set_int32("x", 3)
        .and_then(|b| b.set_string("x", None));
    assert!(matches!(twice, Err(SchemaError::InvalidField(_))));
}

#[test]
fn test_from_values_validates_materialized_data() {
    let schema: Arc<Schema> = point_schema();

    let mut values = BTreeMap::new();
    values.insert("x".to_string(), FieldValue::Int32(1));
    values.insert("y".to_string(), FieldValue::Int32(2));
    let record = GenericRecord::from_values(schema.clone(), values.clone()).unwrap();
    assert_eq!(record, point(1, 2));
    assert_eq!(record.value("x"), Some(&FieldValue::Int32(1)));

    let mut null_y = values.clone();
    null_y.insert("y".to_string(), FieldValue::Null);
    assert!(matches!(
        GenericRecord::from_values(schema.clone(), null_y),
        Err(SchemaError::InvalidData(_))
    ));

    let mut extra = values.clone();
    extra.insert("z".to_string(), FieldValue::Int32(0));
    assert!(matches!(
        GenericRecord::from_values(schema.clone(), extra),
        Err(SchemaError::FieldNotFound { .. })
    ));

    values.remove("y");
    assert!(matches!(
        GenericRecord::from_values(schema, values),
        Err(SchemaError::MissingField { .. })
    ));
}

#[test]
fn test_declared_field_descriptors() {
    let schema = Schema::new(
        "Flags",
        vec![
            FieldDescriptor::new("on", FieldKind::Boolean),
            FieldDescriptor::new("label", FieldKind::String),
        ],
    )
    .unwrap();
    let record = GenericRecordBuilder::schema_bound(Arc::new(schema))
        .set_boolean("on", true)
        .and_then(GenericRecordBuilder::build)
        .unwrap();

    assert_eq!(record.field_descriptor("on").unwrap().kind(), FieldKind::Boolean);
    assert!(matches!(
        record.field_descriptor("off"),
        Err(SchemaError::FieldNotFound { .. })
    ));
    assert!(record.has_field("label"));
    assert!(!record.has_field("off"));
}
