//! Schema construction errors.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building a type descriptor.
///
/// All of these are construction-time failures: a type that produces one can
/// never be encoded or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields in the type or its ancestors share an id.
    #[error("type {type_name} declares field id {id} twice ({first} and {second})")]
    DuplicateFieldId {
        type_name: &'static str,
        id: u16,
        first: &'static str,
        second: &'static str,
    },

    /// A field's declared type cannot be carried by the format.
    #[error("declared type {declared} has no semantic mapping")]
    UnsupportedType { declared: String },

    /// The type has no zero-argument construction path.
    #[error("type {type_name} has no registered constructor")]
    NotConstructible { type_name: &'static str },

    /// A field uses id 0 or the id reserved for the size escape.
    #[error("field {field} of {type_name} uses the reserved id {id:#06X}")]
    ReservedFieldId {
        type_name: &'static str,
        field: &'static str,
        id: u16,
    },
}
