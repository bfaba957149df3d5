//! The closed set of value kinds the format can carry.

use std::fmt;

/// Wire-level kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SemanticType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    ByteArray,
    ByteArrayArray,
    IntArray,
    FloatArray,
    StringArray,
    /// A nested described object.
    Object,
    /// A nullable-element array of described objects.
    ObjectArray,
    /// A list of described objects.
    ObjectList,
    StringList,
    IntList,
    BoolList,
    LongList,
    FloatList,
    DoubleList,
    /// A list of tagged generic values.
    List,
    /// Generic key/value pairs.
    Map,
    /// A self-framed heterogeneous key/value blob.
    Bundle,
    /// An opaque capability handle.
    Binder,
    /// A capability handle converted to a typed proxy.
    Interface,
}

impl SemanticType {
    /// Payload width for fixed-width kinds, `None` for delimited ones.
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Byte | Self::Short | Self::Int | Self::Float => Some(4),
            Self::Long | Self::Double => Some(8),
            _ => None,
        }
    }

    /// Returns `true` for kinds whose header packs the payload size.
    #[must_use]
    pub const fn is_fixed(self) -> bool {
        self.fixed_size().is_some()
    }

    /// Returns `true` for integer kinds that can carry a version gate.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
    }

    /// Stable numeric code used for fingerprints.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::ByteArray => "byte-array",
            Self::ByteArrayArray => "byte-array-array",
            Self::IntArray => "int-array",
            Self::FloatArray => "float-array",
            Self::StringArray => "string-array",
            Self::Object => "object",
            Self::ObjectArray => "object-array",
            Self::ObjectList => "object-list",
            Self::StringList => "string-list",
            Self::IntList => "int-list",
            Self::BoolList => "bool-list",
            Self::LongList => "long-list",
            Self::FloatList => "float-list",
            Self::DoubleList => "double-list",
            Self::List => "list",
            Self::Map => "map",
            Self::Bundle => "bundle",
            Self::Binder => "binder",
            Self::Interface => "interface",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_widths() {
        assert_eq!(SemanticType::Bool.fixed_size(), Some(4));
        assert_eq!(SemanticType::Byte.fixed_size(), Some(4));
        assert_eq!(SemanticType::Long.fixed_size(), Some(8));
        assert_eq!(SemanticType::Double.fixed_size(), Some(8));
        assert_eq!(SemanticType::String.fixed_size(), None);
        assert!(!SemanticType::Bundle.is_fixed());
    }

    #[test]
    fn integer_kinds() {
        assert!(SemanticType::Int.is_integer());
        assert!(SemanticType::Long.is_integer());
        assert!(!SemanticType::Float.is_integer());
        assert!(!SemanticType::IntList.is_integer());
    }

    #[test]
    fn codes_are_distinct() {
        let all = [
            SemanticType::Bool,
            SemanticType::Int,
            SemanticType::List,
            SemanticType::Interface,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(SemanticType::ObjectList.to_string(), "object-list");
    }
}
