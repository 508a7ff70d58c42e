use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::builder::GenericRecordBuilder;
use super::value::{FieldValue, Primitive, VarSized};
use crate::schema::types::{FieldDescriptor, FieldKind, Schema, SchemaError};

static NULL_VALUE: FieldValue = FieldValue::Null;

/// Schema-bound record whose fields are read by name.
///
/// A GenericRecord gives access to compact data without the class that wrote
/// it. Every accessor validates the field's declared kind before reading, so a
/// record can be inspected safely by code that only knows the field names.
///
/// Records are immutable. The only way to "change" one is
/// [`GenericRecord::new_builder_with_clone`], which produces a new instance.
/// Cloning a record is cheap: the schema and the values are shared.
#[derive(Debug, Clone)]
pub struct GenericRecord {
    inner: Arc<RecordInner>,
}

#[derive(Debug)]
struct RecordInner {
    schema: Arc<Schema>,
    values: BTreeMap<String, FieldValue>,
}

impl GenericRecord {
    /// Materializes a record from fully decoded values.
    ///
    /// Every schema field must be present and every value must conform to the
    /// declared kind; this is the entry point used by decoders.
    ///
    /// # Errors
    /// Returns `FieldNotFound` for a value the schema does not declare,
    /// `MissingField` for a declared field without value and `InvalidData`
    /// for a value that does not fit its kind.
    pub fn from_values(
        schema: Arc<Schema>,
        values: BTreeMap<String, FieldValue>,
    ) -> Result<Self, SchemaError> {
        for (name, value) in &values {
            let descriptor = schema.field(name).ok_or_else(|| SchemaError::FieldNotFound {
                field: name.clone(),
                schema: schema.to_string(),
            })?;
            if !descriptor.kind().accepts(value) {
                return Err(SchemaError::InvalidData(format!(
                    "Value {:?} can not be stored in field '{}' of kind {}",
                    value,
                    name,
                    descriptor.kind()
                )));
            }
        }
        if let Some(missing) = schema.fields().find(|fd| !values.contains_key(fd.name())) {
            return Err(SchemaError::MissingField {
                field: missing.name().to_string(),
                schema: schema.to_string(),
            });
        }

        Ok(Self {
            inner: Arc::new(RecordInner { schema, values }),
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.inner.schema
    }

    /// Builder bound to this record's schema, with no values set.
    pub fn new_builder(&self) -> GenericRecordBuilder {
        GenericRecordBuilder::schema_bound(Arc::clone(&self.inner.schema))
    }

    /// Builder pre-populated with every value of this record. Overridden fields
    /// are validated against the schema exactly like a fresh build.
    pub fn new_builder_with_clone(&self) -> GenericRecordBuilder {
        GenericRecordBuilder::cloned(Arc::clone(&self.inner.schema), self.inner.values.clone())
    }

    /// Declared kind of the field, or `NOT_AVAILABLE` when the schema has no
    /// such field. Never fails.
    pub fn get_field_kind(&self, name: &str) -> FieldKind {
        self.inner
            .schema
            .field(name)
            .map_or(FieldKind::NotAvailable, FieldDescriptor::kind)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.inner.values.contains_key(name)
    }

    /// Field names in name order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.inner.values.keys().map(String::as_str)
    }

    pub fn field_descriptor(&self, name: &str) -> Result<&FieldDescriptor, SchemaError> {
        self.inner.schema.field(name).ok_or_else(|| self.field_not_found(name))
    }

    /// Raw materialized value; `None` for a name the record does not hold.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.inner.values.get(name)
    }

    pub(crate) fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.inner.values
    }

    /// Reads a primitive declared as `T` or nullable `T`.
    ///
    /// # Errors
    /// `FieldNotFound`, `KindMismatch`, or `NullValue` when a nullable field holds null.
    pub fn get<T: Primitive>(&self, name: &str) -> Result<T, SchemaError> {
        self.check(name, &[T::KIND, T::NULLABLE_KIND])?;
        T::from_value(self.stored(name)).ok_or_else(|| SchemaError::NullValue {
            field: name.to_string(),
            accessor: format!("get_{}", T::NAME),
        })
    }

    /// Reads a primitive declared as `T` or nullable `T`, mapping null to `None`.
    pub fn get_nullable<T: Primitive>(&self, name: &str) -> Result<Option<T>, SchemaError> {
        self.check(name, &[T::KIND, T::NULLABLE_KIND])?;
        Ok(T::from_value(self.stored(name)))
    }

    /// Reads an array of `T` or of nullable `T` as plain values.
    ///
    /// # Errors
    /// `NullInArray` if a nullable array contains a null element.
    pub fn get_array_of<T: Primitive>(&self, name: &str) -> Result<Option<Vec<T>>, SchemaError> {
        self.check(name, &[T::ARRAY_KIND, T::ARRAY_OF_NULLABLE_KIND])?;
        let items = match self.stored(name) {
            FieldValue::Array(items) => items,
            _ => return Ok(None),
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                T::from_value(item).ok_or_else(|| Self::null_in_array::<T>(name, index))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Reads an array of `T` or of nullable `T`, promoting plain elements to `Some`.
    pub fn get_array_of_nullable<T: Primitive>(
        &self,
        name: &str,
    ) -> Result<Option<Vec<Option<T>>>, SchemaError> {
        self.check(name, &[T::ARRAY_KIND, T::ARRAY_OF_NULLABLE_KIND])?;
        Ok(match self.stored(name) {
            FieldValue::Array(items) => Some(items.iter().map(T::from_value).collect()),
            _ => None,
        })
    }

    /// Reads one element of an array of `T` or of nullable `T`.
    ///
    /// Returns `Ok(None)` when the schema lacks the field, the array is null or
    /// `index` is past its end, so readers of shorter historical arrays never fail.
    ///
    /// # Errors
    /// `KindMismatch` for a declared field of another kind, `NullInArray` if
    /// the element at `index` is null.
    pub fn get_from_array<T: Primitive>(
        &self,
        name: &str,
        index: usize,
    ) -> Result<Option<T>, SchemaError> {
        match self.array_element(name, index, &[T::ARRAY_KIND, T::ARRAY_OF_NULLABLE_KIND])? {
            Some(item) => T::from_value(item)
                .map(Some)
                .ok_or_else(|| Self::null_in_array::<T>(name, index)),
            None => Ok(None),
        }
    }

    /// Like [`GenericRecord::get_from_array`], mapping a null element to `None`.
    pub fn get_nullable_from_array<T: Primitive>(
        &self,
        name: &str,
        index: usize,
    ) -> Result<Option<T>, SchemaError> {
        Ok(self
            .array_element(name, index, &[T::ARRAY_KIND, T::ARRAY_OF_NULLABLE_KIND])?
            .and_then(T::from_value))
    }

    /// Reads a variable-size value (string, decimal, temporal or nested record).
    pub fn get_var<T: VarSized>(&self, name: &str) -> Result<Option<T>, SchemaError> {
        self.check(name, &[T::KIND])?;
        Ok(T::from_value(self.stored(name)))
    }

    pub fn get_array_of_var<T: VarSized>(
        &self,
        name: &str,
    ) -> Result<Option<Vec<Option<T>>>, SchemaError> {
        self.check(name, &[T::ARRAY_KIND])?;
        Ok(match self.stored(name) {
            FieldValue::Array(items) => Some(items.iter().map(T::from_value).collect()),
            _ => None,
        })
    }

    /// Element of a variable-size array; same tolerance as [`GenericRecord::get_from_array`].
    pub fn get_var_from_array<T: VarSized>(
        &self,
        name: &str,
        index: usize,
    ) -> Result<Option<T>, SchemaError> {
        Ok(self
            .array_element(name, index, &[T::ARRAY_KIND])?
            .and_then(T::from_value))
    }

    pub fn get_char(&self, _name: &str) -> Result<char, SchemaError> {
        Err(Self::char_unsupported())
    }

    pub fn get_array_of_char(&self, _name: &str) -> Result<Option<Vec<char>>, SchemaError> {
        Err(Self::char_unsupported())
    }

    pub fn get_char_from_array(
        &self,
        _name: &str,
        _index: usize,
    ) -> Result<Option<char>, SchemaError> {
        Err(Self::char_unsupported())
    }

    fn char_unsupported() -> SchemaError {
        SchemaError::UnsupportedOperation(
            "Compact format does not support reading a char field".to_string(),
        )
    }

    fn check(&self, name: &str, kinds: &[FieldKind]) -> Result<FieldKind, SchemaError> {
        let kind = self.field_descriptor(name)?.kind();
        if kinds.contains(&kind) {
            Ok(kind)
        } else {
            Err(SchemaError::KindMismatch {
                field: name.to_string(),
                schema: self.inner.schema.to_string(),
                allowed: kinds.to_vec(),
                found: kind,
            })
        }
    }

    fn array_element(
        &self,
        name: &str,
        index: usize,
        kinds: &[FieldKind],
    ) -> Result<Option<&FieldValue>, SchemaError> {
        if !self.inner.schema.has_field(name) {
            return Ok(None);
        }
        self.check(name, kinds)?;
        Ok(match self.stored(name) {
            FieldValue::Array(items) => items.get(index),
            _ => None,
        })
    }

    fn stored(&self, name: &str) -> &FieldValue {
        self.inner.values.get(name).unwrap_or(&NULL_VALUE)
    }

    fn field_not_found(&self, name: &str) -> SchemaError {
        SchemaError::FieldNotFound {
            field: name.to_string(),
            schema: self.inner.schema.to_string(),
        }
    }

    fn null_in_array<T: Primitive>(name: &str, index: usize) -> SchemaError {
        SchemaError::NullInArray {
            field: name.to_string(),
            accessor: format!("get_array_of_{}", T::NAME),
            index,
        }
    }
}

macro_rules! primitive_accessors {
    (
        $ty:ty,
        $get:ident,
        $get_nullable:ident,
        $get_array:ident,
        $get_array_nullable:ident,
        $from_array:ident,
        $nullable_from_array:ident $(,)?
    ) => {
        pub fn $get(&self, name: &str) -> Result<$ty, SchemaError> {
            self.get::<$ty>(name)
        }

        pub fn $get_nullable(&self, name: &str) -> Result<Option<$ty>, SchemaError> {
            self.get_nullable::<$ty>(name)
        }

        pub fn $get_array(&self, name: &str) -> Result<Option<Vec<$ty>>, SchemaError> {
            self.get_array_of::<$ty>(name)
        }

        pub fn $get_array_nullable(
            &self,
            name: &str,
        ) -> Result<Option<Vec<Option<$ty>>>, SchemaError> {
            self.get_array_of_nullable::<$ty>(name)
        }

        pub fn $from_array(&self, name: &str, index: usize) -> Result<Option<$ty>, SchemaError> {
            self.get_from_array::<$ty>(name, index)
        }

        pub fn $nullable_from_array(
            &self,
            name: &str,
            index: usize,
        ) -> Result<Option<$ty>, SchemaError> {
            self.get_nullable_from_array::<$ty>(name, index)
        }
    };
}

macro_rules! var_sized_accessors {
    ($ty:ty, $get:ident, $get_array:ident, $from_array:ident $(,)?) => {
        pub fn $get(&self, name: &str) -> Result<Option<$ty>, SchemaError> {
            self.get_var::<$ty>(name)
        }

        pub fn $get_array(&self, name: &str) -> Result<Option<Vec<Option<$ty>>>, SchemaError> {
            self.get_array_of_var::<$ty>(name)
        }

        pub fn $from_array(&self, name: &str, index: usize) -> Result<Option<$ty>, SchemaError> {
            self.get_var_from_array::<$ty>(name, index)
        }
    };
}

/// Named accessors, one set per field family.
impl GenericRecord {
    primitive_accessors!(
        bool,
        get_boolean,
        get_nullable_boolean,
        get_array_of_boolean,
        get_array_of_nullable_boolean,
        get_boolean_from_array,
        get_nullable_boolean_from_array,
    );
    primitive_accessors!(
        i8,
        get_int8,
        get_nullable_int8,
        get_array_of_int8,
        get_array_of_nullable_int8,
        get_int8_from_array,
        get_nullable_int8_from_array,
    );
    primitive_accessors!(
        i16,
        get_int16,
        get_nullable_int16,
        get_array_of_int16,
        get_array_of_nullable_int16,
        get_int16_from_array,
        get_nullable_int16_from_array,
    );
    primitive_accessors!(
        i32,
        get_int32,
        get_nullable_int32,
        get_array_of_int32,
        get_array_of_nullable_int32,
        get_int32_from_array,
        get_nullable_int32_from_array,
    );
    primitive_accessors!(
        i64,
        get_int64,
        get_nullable_int64,
        get_array_of_int64,
        get_array_of_nullable_int64,
        get_int64_from_array,
        get_nullable_int64_from_array,
    );
    primitive_accessors!(
        f32,
        get_float32,
        get_nullable_float32,
        get_array_of_float32,
        get_array_of_nullable_float32,
        get_float32_from_array,
        get_nullable_float32_from_array,
    );
    primitive_accessors!(
        f64,
        get_float64,
        get_nullable_float64,
        get_array_of_float64,
        get_array_of_nullable_float64,
        get_float64_from_array,
        get_nullable_float64_from_array,
    );

    var_sized_accessors!(String, get_string, get_array_of_string, get_string_from_array);
    var_sized_accessors!(Decimal, get_decimal, get_array_of_decimal, get_decimal_from_array);
    var_sized_accessors!(NaiveTime, get_time, get_array_of_time, get_time_from_array);
    var_sized_accessors!(NaiveDate, get_date, get_array_of_date, get_date_from_array);
    var_sized_accessors!(
        NaiveDateTime,
        get_timestamp,
        get_array_of_timestamp,
        get_timestamp_from_array,
    );
    var_sized_accessors!(
        DateTime<FixedOffset>,
        get_timestamp_with_timezone,
        get_array_of_timestamp_with_timezone,
        get_timestamp_with_timezone_from_array,
    );
    var_sized_accessors!(
        GenericRecord,
        get_generic_record,
        get_array_of_generic_record,
        get_generic_record_from_array,
    );
}

impl PartialEq for GenericRecord {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.schema == other.inner.schema && self.inner.values == other.inner.values)
    }
}
