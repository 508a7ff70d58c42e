//! # Fold Compact
//!
//! Schema registry and schema-bound generic records for the compact
//! serialization format.
//!
//! ## Core Components
//!
//! * `schema` - Field kinds, schemas and the schema id fingerprint
//! * `record` - Immutable generic records, their values and builders
//! * `service` - Schema registry with pluggable cluster replication
//! * `config` - Schema service configuration
//! * `error` - Crate-level error type
//!
//! ## Architecture
//!
//! A writer builds or obtains a [`Schema`] and creates [`GenericRecord`]s
//! against it. Before any data written with a schema becomes visible, the
//! schema is registered through [`SchemaService::put`], which waits until the
//! cluster can resolve it. Readers map the schema id found in the data back to
//! the schema with [`SchemaService::resolve`] and access fields by name
//! through the typed accessors of [`GenericRecord`].
//!
//! ```
//! use fold_compact::{FieldKind, GenericRecordBuilder};
//!
//! let point = GenericRecordBuilder::compact("Point")
//!     .set_int32("x", 3)
//!     .and_then(|b| b.set_int32("y", 4))
//!     .and_then(GenericRecordBuilder::build)
//!     .unwrap();
//!
//! assert_eq!(point.get_int32("x").unwrap(), 3);
//! assert_eq!(point.get_field_kind("z"), FieldKind::NotAvailable);
//! ```

pub mod config;
pub mod error;
pub mod record;
pub mod schema;
pub mod service;

// Re-export main types for convenience
pub use config::SchemaServiceConfig;
pub use error::{CompactError, CompactResult};
pub use record::{FieldValue, GenericRecord, GenericRecordBuilder, Primitive, VarSized};
pub use schema::types::{FieldDescriptor, FieldKind, FieldLayout, Schema, SchemaError};
pub use schema::SchemaFingerprint;
pub use service::{
    LocalReplicator, MajorityReplicator, SchemaPeer, SchemaReplicator, SchemaService,
};
