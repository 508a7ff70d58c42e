#![allow(dead_code)]

use fold_compact::{FieldDescriptor, FieldKind, Schema};
use std::sync::Arc;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn point_schema() -> Arc<Schema> {
    Arc::new(
        Schema::new(
            "Point",
            vec![
                FieldDescriptor::new("x", FieldKind::Int32),
                FieldDescriptor::new("y", FieldKind::Int32),
            ],
        )
        .expect("Failed to create Point schema"),
    )
}

pub fn person_schema() -> Arc<Schema> {
    Arc::new(
        Schema::new(
            "Person",
            vec![
                FieldDescriptor::new("name", FieldKind::String),
                FieldDescriptor::new("age", FieldKind::NullableInt32),
                FieldDescriptor::new("scores", FieldKind::ArrayOfNullableInt64),
                FieldDescriptor::new("tags", FieldKind::ArrayOfString),
                FieldDescriptor::new("active", FieldKind::Boolean),
            ],
        )
        .expect("Failed to create Person schema"),
    )
}
