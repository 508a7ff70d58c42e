use serde::{Deserialize, Serialize};

use super::field_kind::FieldKind;

/// Where a field lives inside the encoded record, computed once per schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// Not yet placed; only seen on descriptors outside a schema
    Unassigned,
    /// Byte offset inside the fixed-size section
    Fixed { offset: usize },
    /// Boolean packed as a bit inside the fixed-size section
    Bit { offset: usize, bit: u8 },
    /// Position in the variable-size offset table
    Variable { index: usize },
}

/// Name and kind of a single schema field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    #[serde(skip, default = "unassigned")]
    layout: FieldLayout,
}

fn unassigned() -> FieldLayout {
    FieldLayout::Unassigned
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            layout: FieldLayout::Unassigned,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn layout(&self) -> FieldLayout {
        self.layout
    }

    pub(crate) fn set_layout(&mut self, layout: FieldLayout) {
        self.layout = layout;
    }
}

/// Layout is derived data; two descriptors are the same field when name and kind match.
impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for FieldDescriptor {}
