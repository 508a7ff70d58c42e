use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use super::generic_record::GenericRecord;
use crate::schema::types::FieldKind;

/// A materialized field value.
///
/// The value itself carries no nullability or array-element kind; those come
/// from the field's declared [`FieldKind`], which every record checks with
/// [`FieldKind::accepts`] when it is built.
///
/// Floats compare by bit pattern with every NaN equal to itself, so a record
/// holding NaN still equals its own copy.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Decimal(Decimal),
    Time(NaiveTime),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampWithTimezone(DateTime<FixedOffset>),
    Compact(GenericRecord),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Non-nullable scalar kind of this value, `None` for null and arrays.
    pub fn scalar_kind(&self) -> Option<FieldKind> {
        let kind = match self {
            Self::Null | Self::Array(_) => return None,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::Int8(_) => FieldKind::Int8,
            Self::Int16(_) => FieldKind::Int16,
            Self::Int32(_) => FieldKind::Int32,
            Self::Int64(_) => FieldKind::Int64,
            Self::Float32(_) => FieldKind::Float32,
            Self::Float64(_) => FieldKind::Float64,
            Self::String(_) => FieldKind::String,
            Self::Decimal(_) => FieldKind::Decimal,
            Self::Time(_) => FieldKind::Time,
            Self::Date(_) => FieldKind::Date,
            Self::Timestamp(_) => FieldKind::Timestamp,
            Self::TimestampWithTimezone(_) => FieldKind::TimestampWithTimezone,
            Self::Compact(_) => FieldKind::Compact,
        };
        Some(kind)
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Int8(a), Self::Int8(b)) => a == b,
            (Self::Int16(a), Self::Int16(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Float32(a), Self::Float32(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            (Self::Float64(a), Self::Float64(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::TimestampWithTimezone(a), Self::TimestampWithTimezone(b)) => a == b,
            (Self::Compact(a), Self::Compact(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            _ => false,
        }
    }
}

/// Fixed-size primitive types and the four kinds of their family.
pub trait Primitive: Copy {
    /// Accessor suffix used in error messages, e.g. `int32`
    const NAME: &'static str;
    const KIND: FieldKind;
    const NULLABLE_KIND: FieldKind;
    const ARRAY_KIND: FieldKind;
    const ARRAY_OF_NULLABLE_KIND: FieldKind;

    /// `None` for null or a value of another type.
    fn from_value(value: &FieldValue) -> Option<Self>;
    fn into_value(self) -> FieldValue;
}

/// Variable-size types: they are nullable themselves and have a single array kind.
pub trait VarSized: Clone {
    const NAME: &'static str;
    const KIND: FieldKind;
    const ARRAY_KIND: FieldKind;

    fn from_value(value: &FieldValue) -> Option<Self>;
    fn into_value(self) -> FieldValue;
}

macro_rules! impl_primitive {
    (
        $ty:ty,
        $variant:ident,
        $name:literal,
        $kind:ident,
        $nullable:ident,
        $array:ident,
        $nullable_array:ident $(,)?
    ) => {
        impl Primitive for $ty {
            const NAME: &'static str = $name;
            const KIND: FieldKind = FieldKind::$kind;
            const NULLABLE_KIND: FieldKind = FieldKind::$nullable;
            const ARRAY_KIND: FieldKind = FieldKind::$array;
            const ARRAY_OF_NULLABLE_KIND: FieldKind = FieldKind::$nullable_array;

            fn from_value(value: &FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn into_value(self) -> FieldValue {
                FieldValue::$variant(self)
            }
        }
    };
}

impl_primitive!(
    bool,
    Boolean,
    "boolean",
    Boolean,
    NullableBoolean,
    ArrayOfBoolean,
    ArrayOfNullableBoolean,
);
impl_primitive!(i8, Int8, "int8", Int8, NullableInt8, ArrayOfInt8, ArrayOfNullableInt8);
impl_primitive!(i16, Int16, "int16", Int16, NullableInt16, ArrayOfInt16, ArrayOfNullableInt16);
impl_primitive!(i32, Int32, "int32", Int32, NullableInt32, ArrayOfInt32, ArrayOfNullableInt32);
impl_primitive!(i64, Int64, "int64", Int64, NullableInt64, ArrayOfInt64, ArrayOfNullableInt64);
impl_primitive!(
    f32,
    Float32,
    "float32",
    Float32,
    NullableFloat32,
    ArrayOfFloat32,
    ArrayOfNullableFloat32,
);
impl_primitive!(
    f64,
    Float64,
    "float64",
    Float64,
    NullableFloat64,
    ArrayOfFloat64,
    ArrayOfNullableFloat64,
);

macro_rules! impl_var_sized {
    ($ty:ty, $variant:ident, $name:literal, $kind:ident, $array:ident $(,)?) => {
        impl VarSized for $ty {
            const NAME: &'static str = $name;
            const KIND: FieldKind = FieldKind::$kind;
            const ARRAY_KIND: FieldKind = FieldKind::$array;

            fn from_value(value: &FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self) -> FieldValue {
                FieldValue::$variant(self)
            }
        }
    };
}

impl_var_sized!(String, String, "string", String, ArrayOfString);
impl_var_sized!(Decimal, Decimal, "decimal", Decimal, ArrayOfDecimal);
impl_var_sized!(NaiveTime, Time, "time", Time, ArrayOfTime);
impl_var_sized!(NaiveDate, Date, "date", Date, ArrayOfDate);
impl_var_sized!(NaiveDateTime, Timestamp, "timestamp", Timestamp, ArrayOfTimestamp);
impl_var_sized!(
    DateTime<FixedOffset>,
    TimestampWithTimezone,
    "timestamp_with_timezone",
    TimestampWithTimezone,
    ArrayOfTimestampWithTimezone
);
impl_var_sized!(GenericRecord, Compact, "generic_record", Compact, ArrayOfCompact);
