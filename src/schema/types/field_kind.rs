use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::FieldValue;

/// Closed catalog of the field kinds a compact record can carry.
///
/// Every kind has a stable numeric id that takes part in schema fingerprinting,
/// so the ids must never be renumbered. Ids 5, 6 (char) and 31, 32 (portable)
/// are reserved and have no compact representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    /// Returned for a field name the schema does not declare
    NotAvailable,
    Boolean,
    ArrayOfBoolean,
    Int8,
    ArrayOfInt8,
    Int16,
    ArrayOfInt16,
    Int32,
    ArrayOfInt32,
    Int64,
    ArrayOfInt64,
    Float32,
    ArrayOfFloat32,
    Float64,
    ArrayOfFloat64,
    String,
    ArrayOfString,
    Decimal,
    ArrayOfDecimal,
    Time,
    ArrayOfTime,
    Date,
    ArrayOfDate,
    Timestamp,
    ArrayOfTimestamp,
    TimestampWithTimezone,
    ArrayOfTimestampWithTimezone,
    Compact,
    ArrayOfCompact,
    NullableBoolean,
    ArrayOfNullableBoolean,
    NullableInt8,
    ArrayOfNullableInt8,
    NullableInt16,
    ArrayOfNullableInt16,
    NullableInt32,
    ArrayOfNullableInt32,
    NullableInt64,
    ArrayOfNullableInt64,
    NullableFloat32,
    ArrayOfNullableFloat32,
    NullableFloat64,
    ArrayOfNullableFloat64,
}

impl FieldKind {
    /// All kinds that may appear in a schema, in id order.
    pub const ALL: [FieldKind; 42] = [
        FieldKind::Boolean,
        FieldKind::ArrayOfBoolean,
        FieldKind::Int8,
        FieldKind::ArrayOfInt8,
        FieldKind::Int16,
        FieldKind::ArrayOfInt16,
        FieldKind::Int32,
        FieldKind::ArrayOfInt32,
        FieldKind::Int64,
        FieldKind::ArrayOfInt64,
        FieldKind::Float32,
        FieldKind::ArrayOfFloat32,
        FieldKind::Float64,
        FieldKind::ArrayOfFloat64,
        FieldKind::String,
        FieldKind::ArrayOfString,
        FieldKind::Decimal,
        FieldKind::ArrayOfDecimal,
        FieldKind::Time,
        FieldKind::ArrayOfTime,
        FieldKind::Date,
        FieldKind::ArrayOfDate,
        FieldKind::Timestamp,
        FieldKind::ArrayOfTimestamp,
        FieldKind::TimestampWithTimezone,
        FieldKind::ArrayOfTimestampWithTimezone,
        FieldKind::Compact,
        FieldKind::ArrayOfCompact,
        FieldKind::NullableBoolean,
        FieldKind::ArrayOfNullableBoolean,
        FieldKind::NullableInt8,
        FieldKind::ArrayOfNullableInt8,
        FieldKind::NullableInt16,
        FieldKind::ArrayOfNullableInt16,
        FieldKind::NullableInt32,
        FieldKind::ArrayOfNullableInt32,
        FieldKind::NullableInt64,
        FieldKind::ArrayOfNullableInt64,
        FieldKind::NullableFloat32,
        FieldKind::ArrayOfNullableFloat32,
        FieldKind::NullableFloat64,
        FieldKind::ArrayOfNullableFloat64,
    ];

    /// Stable numeric id of this kind.
    pub fn id(self) -> i32 {
        match self {
            Self::NotAvailable => 0,
            Self::Boolean => 1,
            Self::ArrayOfBoolean => 2,
            Self::Int8 => 3,
            Self::ArrayOfInt8 => 4,
            Self::Int16 => 7,
            Self::ArrayOfInt16 => 8,
            Self::Int32 => 9,
            Self::ArrayOfInt32 => 10,
            Self::Int64 => 11,
            Self::ArrayOfInt64 => 12,
            Self::Float32 => 13,
            Self::ArrayOfFloat32 => 14,
            Self::Float64 => 15,
            Self::ArrayOfFloat64 => 16,
            Self::String => 17,
            Self::ArrayOfString => 18,
            Self::Decimal => 19,
            Self::ArrayOfDecimal => 20,
            Self::Time => 21,
            Self::ArrayOfTime => 22,
            Self::Date => 23,
            Self::ArrayOfDate => 24,
            Self::Timestamp => 25,
            Self::ArrayOfTimestamp => 26,
            Self::TimestampWithTimezone => 27,
            Self::ArrayOfTimestampWithTimezone => 28,
            Self::Compact => 29,
            Self::ArrayOfCompact => 30,
            Self::NullableBoolean => 33,
            Self::ArrayOfNullableBoolean => 34,
            Self::NullableInt8 => 35,
            Self::ArrayOfNullableInt8 => 36,
            Self::NullableInt16 => 37,
            Self::ArrayOfNullableInt16 => 38,
            Self::NullableInt32 => 39,
            Self::ArrayOfNullableInt32 => 40,
            Self::NullableInt64 => 41,
            Self::ArrayOfNullableInt64 => 42,
            Self::NullableFloat32 => 43,
            Self::ArrayOfNullableFloat32 => 44,
            Self::NullableFloat64 => 45,
            Self::ArrayOfNullableFloat64 => 46,
        }
    }

    /// Looks a kind up by its numeric id. Reserved ids yield `None`.
    pub fn from_id(id: i32) -> Option<Self> {
        if id == 0 {
            return Some(Self::NotAvailable);
        }
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    /// Size in bytes of a fixed-size kind. Booleans report one byte here even
    /// though the layout packs them as bits.
    pub fn fixed_size_in_bytes(self) -> Option<usize> {
        match self {
            Self::Boolean | Self::Int8 => Some(1),
            Self::Int16 => Some(2),
            Self::Int32 | Self::Float32 => Some(4),
            Self::Int64 | Self::Float64 => Some(8),
            _ => None,
        }
    }

    pub fn is_fixed_size(self) -> bool {
        self.fixed_size_in_bytes().is_some()
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::ArrayOfBoolean
                | Self::ArrayOfInt8
                | Self::ArrayOfInt16
                | Self::ArrayOfInt32
                | Self::ArrayOfInt64
                | Self::ArrayOfFloat32
                | Self::ArrayOfFloat64
                | Self::ArrayOfString
                | Self::ArrayOfDecimal
                | Self::ArrayOfTime
                | Self::ArrayOfDate
                | Self::ArrayOfTimestamp
                | Self::ArrayOfTimestampWithTimezone
                | Self::ArrayOfCompact
                | Self::ArrayOfNullableBoolean
                | Self::ArrayOfNullableInt8
                | Self::ArrayOfNullableInt16
                | Self::ArrayOfNullableInt32
                | Self::ArrayOfNullableInt64
                | Self::ArrayOfNullableFloat32
                | Self::ArrayOfNullableFloat64
        )
    }

    pub fn is_nullable_primitive(self) -> bool {
        matches!(
            self,
            Self::NullableBoolean
                | Self::NullableInt8
                | Self::NullableInt16
                | Self::NullableInt32
                | Self::NullableInt64
                | Self::NullableFloat32
                | Self::NullableFloat64
        )
    }

    /// Whether a field of this kind may hold null. Only the fixed-size
    /// primitives are non-nullable.
    pub fn accepts_null(self) -> bool {
        self != Self::NotAvailable && !self.is_fixed_size()
    }

    /// Element kind of an array kind, `None` for scalar kinds.
    pub fn element_kind(self) -> Option<FieldKind> {
        let element = match self {
            Self::ArrayOfBoolean => Self::Boolean,
            Self::ArrayOfInt8 => Self::Int8,
            Self::ArrayOfInt16 => Self::Int16,
            Self::ArrayOfInt32 => Self::Int32,
            Self::ArrayOfInt64 => Self::Int64,
            Self::ArrayOfFloat32 => Self::Float32,
            Self::ArrayOfFloat64 => Self::Float64,
            Self::ArrayOfString => Self::String,
            Self::ArrayOfDecimal => Self::Decimal,
            Self::ArrayOfTime => Self::Time,
            Self::ArrayOfDate => Self::Date,
            Self::ArrayOfTimestamp => Self::Timestamp,
            Self::ArrayOfTimestampWithTimezone => Self::TimestampWithTimezone,
            Self::ArrayOfCompact => Self::Compact,
            Self::ArrayOfNullableBoolean => Self::NullableBoolean,
            Self::ArrayOfNullableInt8 => Self::NullableInt8,
            Self::ArrayOfNullableInt16 => Self::NullableInt16,
            Self::ArrayOfNullableInt32 => Self::NullableInt32,
            Self::ArrayOfNullableInt64 => Self::NullableInt64,
            Self::ArrayOfNullableFloat32 => Self::NullableFloat32,
            Self::ArrayOfNullableFloat64 => Self::NullableFloat64,
            _ => return None,
        };
        Some(element)
    }

    /// Checks that `value` is a legal materialized value for a field of this kind.
    pub fn accepts(self, value: &FieldValue) -> bool {
        if let Some(element) = self.element_kind() {
            return match value {
                FieldValue::Null => true,
                FieldValue::Array(items) => items.iter().all(|item| element.accepts(item)),
                _ => false,
            };
        }
        if value.is_null() {
            return self.accepts_null();
        }
        value.scalar_kind() == Some(self.non_nullable())
    }

    /// Maps a nullable primitive kind onto its plain counterpart; every other
    /// kind maps onto itself.
    fn non_nullable(self) -> FieldKind {
        match self {
            Self::NullableBoolean => Self::Boolean,
            Self::NullableInt8 => Self::Int8,
            Self::NullableInt16 => Self::Int16,
            Self::NullableInt32 => Self::Int32,
            Self::NullableInt64 => Self::Int64,
            Self::NullableFloat32 => Self::Float32,
            Self::NullableFloat64 => Self::Float64,
            other => other,
        }
    }

    /// Upper snake case name, e.g. `ARRAY_OF_NULLABLE_INT32`.
    pub fn name(self) -> &'static str {
        match self {
            Self::NotAvailable => "NOT_AVAILABLE",
            Self::Boolean => "BOOLEAN",
            Self::ArrayOfBoolean => "ARRAY_OF_BOOLEAN",
            Self::Int8 => "INT8",
            Self::ArrayOfInt8 => "ARRAY_OF_INT8",
            Self::Int16 => "INT16",
            Self::ArrayOfInt16 => "ARRAY_OF_INT16",
            Self::Int32 => "INT32",
            Self::ArrayOfInt32 => "ARRAY_OF_INT32",
            Self::Int64 => "INT64",
            Self::ArrayOfInt64 => "ARRAY_OF_INT64",
            Self::Float32 => "FLOAT32",
            Self::ArrayOfFloat32 => "ARRAY_OF_FLOAT32",
            Self::Float64 => "FLOAT64",
            Self::ArrayOfFloat64 => "ARRAY_OF_FLOAT64",
            Self::String => "STRING",
            Self::ArrayOfString => "ARRAY_OF_STRING",
            Self::Decimal => "DECIMAL",
            Self::ArrayOfDecimal => "ARRAY_OF_DECIMAL",
            Self::Time => "TIME",
            Self::ArrayOfTime => "ARRAY_OF_TIME",
            Self::Date => "DATE",
            Self::ArrayOfDate => "ARRAY_OF_DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::ArrayOfTimestamp => "ARRAY_OF_TIMESTAMP",
            Self::TimestampWithTimezone => "TIMESTAMP_WITH_TIMEZONE",
            Self::ArrayOfTimestampWithTimezone => "ARRAY_OF_TIMESTAMP_WITH_TIMEZONE",
            Self::Compact => "COMPACT",
            Self::ArrayOfCompact => "ARRAY_OF_COMPACT",
            Self::NullableBoolean => "NULLABLE_BOOLEAN",
            Self::ArrayOfNullableBoolean => "ARRAY_OF_NULLABLE_BOOLEAN",
            Self::NullableInt8 => "NULLABLE_INT8",
            Self::ArrayOfNullableInt8 => "ARRAY_OF_NULLABLE_INT8",
            Self::NullableInt16 => "NULLABLE_INT16",
            Self::ArrayOfNullableInt16 => "ARRAY_OF_NULLABLE_INT16",
            Self::NullableInt32 => "NULLABLE_INT32",
            Self::ArrayOfNullableInt32 => "ARRAY_OF_NULLABLE_INT32",
            Self::NullableInt64 => "NULLABLE_INT64",
            Self::ArrayOfNullableInt64 => "ARRAY_OF_NULLABLE_INT64",
            Self::NullableFloat32 => "NULLABLE_FLOAT32",
            Self::ArrayOfNullableFloat32 => "ARRAY_OF_NULLABLE_FLOAT32",
            Self::NullableFloat64 => "NULLABLE_FLOAT64",
            Self::ArrayOfNullableFloat64 => "ARRAY_OF_NULLABLE_FLOAT64",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
