use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::generic_record::GenericRecord;
use super::value::{FieldValue, Primitive, VarSized};
use crate::schema::types::{FieldDescriptor, FieldKind, Schema, SchemaError};

#[derive(Debug)]
enum BuilderMode {
    /// No schema yet; one is derived from the fields set
    Compact {
        type_name: String,
        kinds: BTreeMap<String, FieldKind>,
    },
    /// Every field must be declared by the schema
    SchemaBound { schema: Arc<Schema> },
    /// Starts from an existing record's values
    Cloned { schema: Arc<Schema> },
}

/// Builds [`GenericRecord`]s.
///
/// Setters consume the builder and hand it back, so calls chain with `?`:
///
/// ```
/// use fold_compact::GenericRecordBuilder;
///
/// # fn main() -> Result<(), fold_compact::SchemaError> {
/// let point = GenericRecordBuilder::compact("Point")
///     .set_int32("x", 3)?
///     .set_int32("y", 4)?
///     .build()?;
/// assert_eq!(point.get_int32("x")?, 3);
/// # Ok(())
/// # }
/// ```
///
/// A field can be set once per builder. `build` consumes the builder.
#[derive(Debug)]
pub struct GenericRecordBuilder {
    mode: BuilderMode,
    values: BTreeMap<String, FieldValue>,
    written: BTreeSet<String>,
}

impl GenericRecordBuilder {
    /// Schema-less builder; the schema is derived at `build` from the
    /// names and setter kinds used.
    #[must_use]
    pub fn compact(type_name: impl Into<String>) -> Self {
        Self {
            mode: BuilderMode::Compact {
                type_name: type_name.into(),
                kinds: BTreeMap::new(),
            },
            values: BTreeMap::new(),
            written: BTreeSet::new(),
        }
    }

    /// Builder for records of an existing schema.
    #[must_use]
    pub fn schema_bound(schema: Arc<Schema>) -> Self {
        Self {
            mode: BuilderMode::SchemaBound { schema },
            values: BTreeMap::new(),
            written: BTreeSet::new(),
        }
    }

    pub(crate) fn cloned(schema: Arc<Schema>, values: BTreeMap<String, FieldValue>) -> Self {
        Self {
            mode: BuilderMode::Cloned { schema },
            values,
            written: BTreeSet::new(),
        }
    }

    /// Finishes the record.
    ///
    /// # Errors
    /// `MissingField` when a schema-bound builder left a non-nullable field
    /// unset; `InvalidField` when a compact builder produced an invalid schema.
    pub fn build(self) -> Result<GenericRecord, SchemaError> {
        let Self { mode, mut values, .. } = self;
        match mode {
            BuilderMode::Compact { type_name, kinds } => {
                let descriptors = kinds
                    .into_iter()
                    .map(|(name, kind)| FieldDescriptor::new(name, kind));
                let schema = Schema::new(type_name, descriptors)?;
                GenericRecord::from_values(Arc::new(schema), values)
            }
            BuilderMode::SchemaBound { schema } => {
                for descriptor in schema.fields() {
                    if values.contains_key(descriptor.name()) {
                        continue;
                    }
                    if !descriptor.kind().accepts_null() {
                        return Err(SchemaError::MissingField {
                            field: descriptor.name().to_string(),
                            schema: schema.to_string(),
                        });
                    }
                    values.insert(descriptor.name().to_string(), FieldValue::Null);
                }
                GenericRecord::from_values(schema, values)
            }
            BuilderMode::Cloned { schema } => GenericRecord::from_values(schema, values),
        }
    }

    pub fn set<T: Primitive>(self, name: &str, value: T) -> Result<Self, SchemaError> {
        self.write(name, T::KIND, value.into_value())
    }

    pub fn set_nullable<T: Primitive>(
        self,
        name: &str,
        value: Option<T>,
    ) -> Result<Self, SchemaError> {
        let value = value.map_or(FieldValue::Null, Primitive::into_value);
        self.write(name, T::NULLABLE_KIND, value)
    }

    pub fn set_array_of<T: Primitive>(
        self,
        name: &str,
        value: Option<Vec<T>>,
    ) -> Result<Self, SchemaError> {
        let value = value.map_or(FieldValue::Null, |items| {
            FieldValue::Array(items.into_iter().map(Primitive::into_value).collect())
        });
        self.write(name, T::ARRAY_KIND, value)
    }

    pub fn set_array_of_nullable<T: Primitive>(
        self,
        name: &str,
        value: Option<Vec<Option<T>>>,
    ) -> Result<Self, SchemaError> {
        let value = value.map_or(FieldValue::Null, |items| {
            FieldValue::Array(
                items
                    .into_iter()
                    .map(|item| item.map_or(FieldValue::Null, Primitive::into_value))
                    .collect(),
            )
        });
        self.write(name, T::ARRAY_OF_NULLABLE_KIND, value)
    }

    pub fn set_var<T: VarSized>(self, name: &str, value: Option<T>) -> Result<Self, SchemaError> {
        let value = value.map_or(FieldValue::Null, VarSized::into_value);
        self.write(name, T::KIND, value)
    }

    pub fn set_array_of_var<T: VarSized>(
        self,
        name: &str,
        value: Option<Vec<Option<T>>>,
    ) -> Result<Self, SchemaError> {
        let value = value.map_or(FieldValue::Null, |items| {
            FieldValue::Array(
                items
                    .into_iter()
                    .map(|item| item.map_or(FieldValue::Null, VarSized::into_value))
                    .collect(),
            )
        });
        self.write(name, T::ARRAY_KIND, value)
    }

    fn write(
        mut self,
        name: &str,
        kind: FieldKind,
        value: FieldValue,
    ) -> Result<Self, SchemaError> {
        if self.written.contains(name) {
            return Err(SchemaError::InvalidField(format!(
                "It is illegal to set the field '{}' twice",
                name
            )));
        }
        match &mut self.mode {
            BuilderMode::Compact { kinds, .. } => {
                kinds.insert(name.to_string(), kind);
            }
            BuilderMode::SchemaBound { schema } | BuilderMode::Cloned { schema } => {
                let descriptor = schema.field(name).ok_or_else(|| SchemaError::FieldNotFound {
                    field: name.to_string(),
                    schema: schema.to_string(),
                })?;
                if descriptor.kind() != kind {
                    return Err(SchemaError::KindMismatch {
                        field: name.to_string(),
                        schema: schema.to_string(),
                        allowed: vec![kind],
                        found: descriptor.kind(),
                    });
                }
            }
        }
        self.written.insert(name.to_string());
        self.values.insert(name.to_string(), value);
        Ok(self)
    }
}

macro_rules! primitive_setters {
    (
        $ty:ty,
        $set:ident,
        $set_nullable:ident,
        $set_array:ident,
        $set_array_nullable:ident $(,)?
    ) => {
        pub fn $set(self, name: &str, value: $ty) -> Result<Self, SchemaError> {
            self.set::<$ty>(name, value)
        }

        pub fn $set_nullable(self, name: &str, value: Option<$ty>) -> Result<Self, SchemaError> {
            self.set_nullable::<$ty>(name, value)
        }

        pub fn $set_array(self, name: &str, value: Option<Vec<$ty>>) -> Result<Self, SchemaError> {
            self.set_array_of::<$ty>(name, value)
        }

        pub fn $set_array_nullable(
            self,
            name: &str,
            value: Option<Vec<Option<$ty>>>,
        ) -> Result<Self, SchemaError> {
            self.set_array_of_nullable::<$ty>(name, value)
        }
    };
}

macro_rules! var_sized_setters {
    ($ty:ty, $set:ident, $set_array:ident $(,)?) => {
        pub fn $set(self, name: &str, value: Option<$ty>) -> Result<Self, SchemaError> {
            self.set_var::<$ty>(name, value)
        }

        pub fn $set_array(
            self,
            name: &str,
            value: Option<Vec<Option<$ty>>>,
        ) -> Result<Self, SchemaError> {
            self.set_array_of_var::<$ty>(name, value)
        }
    };
}

impl GenericRecordBuilder {
    primitive_setters!(
        bool,
        set_boolean,
        set_nullable_boolean,
        set_array_of_boolean,
        set_array_of_nullable_boolean,
    );
    primitive_setters!(
        i8,
        set_int8,
        set_nullable_int8,
        set_array_of_int8,
        set_array_of_nullable_int8,
    );
    primitive_setters!(
        i16,
        set_int16,
        set_nullable_int16,
        set_array_of_int16,
        set_array_of_nullable_int16,
    );
    primitive_setters!(
        i32,
        set_int32,
        set_nullable_int32,
        set_array_of_int32,
        set_array_of_nullable_int32,
    );
    primitive_setters!(
        i64,
        set_int64,
        set_nullable_int64,
        set_array_of_int64,
        set_array_of_nullable_int64,
    );
    primitive_setters!(
        f32,
        set_float32,
        set_nullable_float32,
        set_array_of_float32,
        set_array_of_nullable_float32,
    );
    primitive_setters!(
        f64,
        set_float64,
        set_nullable_float64,
        set_array_of_float64,
        set_array_of_nullable_float64,
    );

    var_sized_setters!(String, set_string, set_array_of_string);
    var_sized_setters!(Decimal, set_decimal, set_array_of_decimal);
    var_sized_setters!(NaiveTime, set_time, set_array_of_time);
    var_sized_setters!(NaiveDate, set_date, set_array_of_date);
    var_sized_setters!(NaiveDateTime, set_timestamp, set_array_of_timestamp);
    var_sized_setters!(
        DateTime<FixedOffset>,
        set_timestamp_with_timezone,
        set_array_of_timestamp_with_timezone,
    );
    var_sized_setters!(GenericRecord, set_generic_record, set_array_of_generic_record);
}
