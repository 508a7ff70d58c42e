use crate::schema::types::SchemaError;
use std::fmt;
use std::io;

/// Crate-wide error type.
///
/// Record and registry operations report [`SchemaError`] directly; this type
/// wraps it together with the failures of the surrounding plumbing (config
/// files, IO, serialization) for callers that want a single error type.
#[derive(Debug)]
pub enum CompactError {
    /// Errors raised by schemas, records and the schema service
    Schema(SchemaError),

    /// Errors related to configuration
    Config(String),

    /// Errors related to IO operations
    Io(io::Error),

    /// Errors related to serialization/deserialization
    Serialization(String),
}

impl CompactError {
    /// Whether retrying the failed operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Schema(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl fmt::Display for CompactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "Schema error: {}", err),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for CompactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Conversion from SchemaError to CompactError
impl From<SchemaError> for CompactError {
    fn from(error: SchemaError) -> Self {
        CompactError::Schema(error)
    }
}

/// Conversion from io::Error to CompactError
impl From<io::Error> for CompactError {
    fn from(error: io::Error) -> Self {
        CompactError::Io(error)
    }
}

/// Conversion from serde_json::Error to CompactError
impl From<serde_json::Error> for CompactError {
    fn from(error: serde_json::Error) -> Self {
        CompactError::Serialization(error.to_string())
    }
}

/// Result type alias for operations that can result in a CompactError
pub type CompactResult<T> = Result<T, CompactError>;
