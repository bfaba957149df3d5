//! Error types for codec operations.

use cursor::CursorError;
use schema::SchemaError;
use thiserror::Error;
use wire::{CorruptionError, LimitKind, WireError};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// A failure confined to one field.
///
/// The decoder skips a field that fails this way and the encoder omits it;
/// sibling fields are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// A fixed-width payload had the wrong size.
    #[error("expected a {expected}-byte payload, found {found} bytes")]
    SizeMismatch { expected: usize, found: usize },

    /// A null marker arrived for a value that cannot hold one.
    #[error("null value for a field that cannot hold one")]
    UnexpectedNull,

    /// A generic value had a different kind than the field needs.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// No proxy factory is registered for an interface.
    #[error("no factory registered for interface {descriptor}")]
    MissingFactory { descriptor: &'static str },

    /// A decode limit was exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A bundle did not start with the bundle magic.
    #[error("invalid bundle magic 0x{found:08X}")]
    InvalidBundle { found: u32 },

    /// The value kind cannot travel in this position.
    #[error("{what} cannot be carried here")]
    Unsupported { what: &'static str },

    /// A primitive read or write failed.
    #[error(transparent)]
    Cursor(#[from] CursorError),

    /// Framing inside the field failed.
    #[error(transparent)]
    Wire(WireError),
}

impl From<WireError> for FieldError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Cursor(inner) => Self::Cursor(inner),
            WireError::LimitsExceeded {
                kind,
                limit,
                actual,
            } => Self::LimitsExceeded {
                kind,
                limit,
                actual,
            },
            other => Self::Wire(other),
        }
    }
}

/// Errors returned by encode and decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The type's descriptor could not be built.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The object's framing is corrupt.
    #[error("corrupt parcel: {0}")]
    Corruption(#[from] CorruptionError),

    /// A single field failed.
    #[error("field error: {0}")]
    Field(#[from] FieldError),

    /// A non-nullable field had no value at encode time.
    #[error("{type_name}.{field} is not nullable but has no value")]
    MissingRequiredField {
        type_name: &'static str,
        field: &'static str,
    },

    /// Objects are nested deeper than the configured limit.
    #[error("nesting depth {depth} exceeds limit {limit}")]
    DepthExceeded { depth: usize, limit: usize },
}

impl CodecError {
    /// Returns `true` for errors that abort the whole encode or decode.
    ///
    /// Two classes abort: schema and registration problems
    /// (`Schema`, `MissingRequiredField`), and the object nesting guard
    /// (`DepthExceeded`), which unwinds every enclosing object.
    ///
    /// Everything else raised while handling a field is local to that field,
    /// including corruption inside a nested object. The same errors raised
    /// for the outermost object (corrupt framing, an object larger than
    /// `Limits::max_object_bytes`) still fail the call, because there is no
    /// enclosing field to skip.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Schema(_) | Self::MissingRequiredField { .. } | Self::DepthExceeded { .. }
        )
    }
}

impl From<WireError> for CodecError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Corruption(inner) => Self::Corruption(inner),
            other => Self::Field(other.into()),
        }
    }
}

impl From<CursorError> for CodecError {
    fn from(err: CursorError) -> Self {
        Self::Field(FieldError::Cursor(err))
    }
}
