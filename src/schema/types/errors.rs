use thiserror::Error;

use super::field_kind::FieldKind;

/// Errors raised by schema construction, record access and schema registration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Invalid field kind: '{field}' for {schema}, valid field kinds: {}, found: {found}", format_kinds(.allowed))]
    KindMismatch {
        field: String,
        schema: String,
        allowed: Vec<FieldKind>,
        found: FieldKind,
    },

    #[error("Error while reading {field}: null value can not be read via {accessor}, use the nullable accessor instead")]
    NullValue { field: String, accessor: String },

    #[error("Error while reading {field}: null element at index {index} can not be read via {accessor}, use the array of nullable accessor instead")]
    NullInArray {
        field: String,
        accessor: String,
        index: usize,
    },

    #[error("Invalid field name: '{field}' for {schema}")]
    FieldNotFound { field: String, schema: String },

    #[error("Found an unset field '{field}'. All non-nullable fields must be set before build() for {schema}")]
    MissingField { field: String, schema: String },

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Schema with schema id {schema_id} already exists. existing schema: {existing}, new schema: {incoming}")]
    SchemaConflict {
        schema_id: i64,
        existing: String,
        incoming: String,
    },

    #[error("Schema with schema id {0} is not known by the cluster")]
    SchemaUnresolved(i64),

    #[error("Schema replication failed: {0}")]
    Replication(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl SchemaError {
    /// Whether the caller may retry after taking corrective action. Kind, null
    /// and field errors require the request itself to change; a conflict is fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SchemaUnresolved(_) | Self::Replication(_))
    }
}

fn format_kinds(kinds: &[FieldKind]) -> String {
    let names: Vec<&str> = kinds.iter().map(|kind| kind.name()).collect();
    format!("[{}]", names.join(", "))
}
