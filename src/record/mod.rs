//! Generic, schema-bound records and their builders.

pub mod builder;
pub mod generic_record;
pub mod json;
pub mod value;

pub use builder::GenericRecordBuilder;
pub use generic_record::GenericRecord;
pub use value::{FieldValue, Primitive, VarSized};
