use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use super::generic_record::GenericRecord;
use super::value::FieldValue;

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::Int8(v) => serializer.serialize_i8(*v),
            Self::Int16(v) => serializer.serialize_i16(*v),
            Self::Int32(v) => serializer.serialize_i32(*v),
            Self::Int64(v) => serializer.serialize_i64(*v),
            Self::Float32(v) => serializer.serialize_f32(*v),
            Self::Float64(v) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            // Decimals go out as strings so no precision is lost to f64.
            Self::Decimal(v) => serializer.collect_str(v),
            Self::Time(v) => serializer.collect_str(v),
            Self::Date(v) => serializer.collect_str(v),
            Self::Timestamp(v) => serializer.collect_str(&v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::TimestampWithTimezone(v) => serializer.serialize_str(&v.to_rfc3339()),
            Self::Compact(record) => record.serialize(serializer),
            Self::Array(items) => serializer.collect_seq(items),
        }
    }
}

/// Serializes as `{ "<type name>": { "<field>": <value>, ... } }`.
impl Serialize for GenericRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.schema().type_name(), self.values())?;
        map.end()
    }
}

impl GenericRecord {
    /// JSON view of the record, mostly useful for logging and debugging.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl fmt::Display for GenericRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
