use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::errors::SchemaError;
use super::field::{FieldDescriptor, FieldLayout};
use super::field_kind::FieldKind;
use crate::schema::fingerprint::SchemaFingerprint;

/// Describes the layout of one logical record type.
///
/// A Schema is the contract between the writer and every reader of a compact
/// record. It holds:
/// - the type name identifying the logical record type
/// - the field descriptors, ordered by field name
/// - the schema id, a fingerprint of the type name and every (name, kind) pair
///
/// Schemas are immutable once built and are shared behind an `Arc` by every
/// record and registry entry that refers to them.
#[derive(Debug, Clone)]
pub struct Schema {
    type_name: String,
    fields: BTreeMap<String, FieldDescriptor>,
    schema_id: i64,
    fixed_size_fields_length: usize,
    number_of_var_size_fields: usize,
}

impl Schema {
    /// Builds a schema, computing the field layout and the schema id.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidField` if the type name is empty, a field
    /// name repeats, or a field is declared as `NOT_AVAILABLE`.
    pub fn new(
        type_name: impl Into<String>,
        descriptors: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let type_name = type_name.into();
        if type_name.is_empty() {
            return Err(SchemaError::InvalidField(
                "Schema type name must not be empty".to_string(),
            ));
        }

        let mut fields = BTreeMap::new();
        for descriptor in descriptors {
            if descriptor.kind() == FieldKind::NotAvailable {
                return Err(SchemaError::InvalidField(format!(
                    "Field '{}' of '{}' can not be declared as {}",
                    descriptor.name(),
                    type_name,
                    FieldKind::NotAvailable
                )));
            }
            let name = descriptor.name().to_string();
            if fields.insert(name.clone(), descriptor).is_some() {
                return Err(SchemaError::InvalidField(format!(
                    "Field '{}' is declared more than once in '{}'",
                    name, type_name
                )));
            }
        }

        let schema_id = SchemaFingerprint::compute(&type_name, fields.values());
        let mut schema = Self {
            type_name,
            fields,
            schema_id,
            fixed_size_fields_length: 0,
            number_of_var_size_fields: 0,
        };
        schema.assign_layout();
        Ok(schema)
    }

    /// Places fixed-size fields largest first, packs booleans as bits after
    /// them and numbers the variable-size fields in name order.
    fn assign_layout(&mut self) {
        let mut fixed: Vec<(String, usize)> = Vec::new();
        let mut booleans: Vec<String> = Vec::new();
        let mut variable: Vec<String> = Vec::new();

        for descriptor in self.fields.values() {
            match descriptor.kind() {
                FieldKind::Boolean => booleans.push(descriptor.name().to_string()),
                kind => match kind.fixed_size_in_bytes() {
                    Some(size) => fixed.push((descriptor.name().to_string(), size)),
                    None => variable.push(descriptor.name().to_string()),
                },
            }
        }

        // Stable sort keeps name order between fields of equal size.
        fixed.sort_by(|a, b| b.1.cmp(&a.1));

        let mut offset = 0;
        for (name, size) in fixed {
            self.set_layout(&name, FieldLayout::Fixed { offset });
            offset += size;
        }

        let mut bit_offset = 0usize;
        for name in booleans {
            self.set_layout(
                &name,
                FieldLayout::Bit {
                    offset,
                    bit: (bit_offset % 8) as u8,
                },
            );
            bit_offset += 1;
            if bit_offset % 8 == 0 {
                offset += 1;
            }
        }
        if bit_offset % 8 != 0 {
            offset += 1;
        }
        self.fixed_size_fields_length = offset;

        self.number_of_var_size_fields = variable.len();
        for (index, name) in variable.into_iter().enumerate() {
            self.set_layout(&name, FieldLayout::Variable { index });
        }
    }

    fn set_layout(&mut self, name: &str, layout: FieldLayout) {
        if let Some(descriptor) = self.fields.get_mut(name) {
            descriptor.set_layout(layout);
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn schema_id(&self) -> i64 {
        self.schema_id
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field descriptors in name order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Length in bytes of the fixed-size section, booleans included.
    pub fn fixed_size_fields_length(&self) -> usize {
        self.fixed_size_fields_length
    }

    pub fn number_of_var_size_fields(&self) -> usize {
        self.number_of_var_size_fields
    }

    /// Forces an id, to simulate a fingerprint collision.
    #[cfg(test)]
    pub(crate) fn with_schema_id(mut self, schema_id: i64) -> Self {
        self.schema_id = schema_id;
        self
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.schema_id == other.schema_id
            && self.type_name == other.type_name
            && self.fields == other.fields
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Schema {{ type_name: {}, schema_id: {}, fields: [",
            self.type_name, self.schema_id
        )?;
        for (i, descriptor) in self.fields.values().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", descriptor.name(), descriptor.kind())?;
        }
        f.write_str("] }")
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Helper<'a> {
            type_name: &'a str,
            fields: Vec<&'a FieldDescriptor>,
        }

        Helper {
            type_name: &self.type_name,
            fields: self.fields.values().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            type_name: String,
            fields: Vec<FieldDescriptor>,
        }

        let helper = Helper::deserialize(deserializer)?;
        Schema::new(helper.type_name, helper.fields).map_err(serde::de::Error::custom)
    }
}
