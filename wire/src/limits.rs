//! Configurable limits for bounded decoding.

/// Limits applied while decoding untrusted parcels.
///
/// These limits are enforced during decoding to prevent resource exhaustion
/// and keep memory use bounded. They never change how valid data is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting depth of objects, lists, maps and bundles.
    pub max_depth: usize,

    /// Maximum number of elements in one array, list, map or bundle.
    pub max_elements: usize,

    /// Maximum size of one encoded object in bytes.
    pub max_object_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Service payloads rarely nest more than a handful of levels
            max_depth: 32,
            max_elements: 64 * 1024,

            // Matches the platform's one megabyte transaction buffer
            max_object_bytes: 1024 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_depth: 8,
            max_elements: 256,
            max_object_bytes: 4096,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_elements: usize::MAX,
            max_object_bytes: usize::MAX,
        }
    }
}
