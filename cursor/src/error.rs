//! Error types for cursor operations.

use thiserror::Error;

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors that can occur while reading or writing parcel primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Attempted to read past the current limit.
    #[error("attempted to read {requested} bytes but only {available} bytes available")]
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available before the limit.
        available: usize,
    },

    /// A nested limit would extend past the enclosing one.
    #[error("limit {requested} exceeds enclosing limit {limit}")]
    LimitExceeded {
        /// The requested end offset.
        requested: usize,
        /// The currently active limit.
        limit: usize,
    },

    /// Attempted to move the cursor outside of `0..=limit`.
    #[error("position {position} is outside the readable range (limit {limit})")]
    PositionOutOfBounds { position: usize, limit: usize },

    /// A length prefix was negative (other than the null marker) or absurd.
    #[error("invalid length prefix {length}")]
    InvalidLength { length: i32 },

    /// A string payload was not valid UTF-16.
    #[error("string payload is not valid UTF-16")]
    InvalidUtf16,

    /// A value is too large to be described by a 32-bit length.
    #[error("length {length} does not fit in a 32-bit length prefix")]
    LengthOverflow { length: usize },

    /// A backpatch slot does not point inside the written buffer.
    #[error("backpatch slot at {offset} is outside the written buffer ({len} bytes)")]
    InvalidSlot { offset: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unexpected_eof() {
        let err = CursorError::UnexpectedEof {
            requested: 8,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("8 bytes"), "should mention requested bytes");
        assert!(msg.contains("3 bytes"), "should mention available bytes");
        assert!(msg.contains("read"), "should mention read operation");
    }

    #[test]
    fn error_display_limit_exceeded() {
        let err = CursorError::LimitExceeded {
            requested: 100,
            limit: 64,
        };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("64"));
    }

    #[test]
    fn error_display_invalid_length() {
        let err = CursorError::InvalidLength { length: -7 };
        assert!(err.to_string().contains("-7"));
    }

    #[test]
    fn error_equality() {
        let err1 = CursorError::UnexpectedEof {
            requested: 8,
            available: 3,
        };
        let err2 = CursorError::UnexpectedEof {
            requested: 8,
            available: 3,
        };
        let err3 = CursorError::UnexpectedEof {
            requested: 8,
            available: 4,
        };
        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<CursorError>();
    }
}
