pub mod fingerprint;
pub mod types;

pub use fingerprint::SchemaFingerprint;

// Re-export all types at the schema module level
pub use types::{FieldDescriptor, FieldKind, FieldLayout, Schema, SchemaError};
