pub mod errors;
pub mod field;
pub mod field_kind;
pub mod schema;

pub use errors::SchemaError;
pub use field::{FieldDescriptor, FieldLayout};
pub use field_kind::FieldKind;
pub use schema::Schema;
