//! Error types for wire format operations.

use std::fmt;

use cursor::CursorError;
use thiserror::Error;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, WireError>;

/// Framing damage that makes the rest of an object untrustworthy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptionError {
    /// A declared extent runs past the enclosing boundary, or the buffer
    /// ends before the framing it promised.
    #[error("declared extent ends at {end}, past the enclosing limit {limit}")]
    Overread { end: usize, limit: usize },

    /// The first header word of an object does not carry the object magic.
    #[error("expected object header, found 0x{found:08X}")]
    InvalidObjectHeader { found: u32 },
}

/// Errors raised while framing or scanning parcels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WireError {
    /// A primitive read or write failed.
    #[error(transparent)]
    Cursor(#[from] CursorError),

    /// The framing is corrupt.
    #[error(transparent)]
    Corruption(#[from] CorruptionError),

    /// A configured limit was exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A generic value carried a tag outside the known set.
    #[error("unknown value tag: {tag}")]
    UnknownValueTag { tag: i32 },
}

/// Specific limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Depth,
    Elements,
    ObjectBytes,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Depth => "nesting depth",
            Self::Elements => "element count",
            Self::ObjectBytes => "object bytes",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corruption_display_invalid_header() {
        let err = CorruptionError::InvalidObjectHeader { found: 0xDEAD_BEEF };
        let msg = err.to_string();
        assert!(msg.contains("DEADBEEF"));
    }

    #[test]
    fn corruption_display_overread() {
        let err = CorruptionError::Overread { end: 40, limit: 32 };
        let msg = err.to_string();
        assert!(msg.contains("40"));
        assert!(msg.contains("32"));
    }

    #[test]
    fn wire_error_display_limits_exceeded() {
        let err = WireError::LimitsExceeded {
            kind: LimitKind::Elements,
            limit: 4,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("element count"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn wire_error_from_cursor_is_transparent() {
        let inner = CursorError::InvalidLength { length: -3 };
        let err = WireError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
    }
}
