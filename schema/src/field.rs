//! Field descriptors and per-field options.

use crate::declared::{resolve, DeclaredType, TypeRef};
use crate::error::SchemaResult;
use crate::semantic::SemanticType;

/// Encoding options a field declares alongside its type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldOptions {
    /// An absent value is legal and travels as a null marker.
    pub nullable: bool,
    /// Elements use generic tagged values instead of framed objects or strings.
    pub direct_encoding: bool,
    /// Numeric and boolean lists use the compact homogeneous layout.
    pub direct_list: bool,
    /// Largest integer value this consumer understands.
    pub version_gate: Option<i64>,
}

/// Compiled metadata for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldDescriptor {
    pub id: u16,
    pub name: &'static str,
    pub semantic: SemanticType,
    pub declared: DeclaredType,
    /// Described type of the value or its elements, if any.
    pub element_hint: Option<TypeRef>,
    pub options: FieldOptions,
}

impl FieldDescriptor {
    /// Builds a descriptor, resolving the semantic type from the declaration.
    pub fn new(
        id: u16,
        name: &'static str,
        declared: DeclaredType,
        options: FieldOptions,
    ) -> SchemaResult<Self> {
        let semantic = resolve(&declared, &options)?;
        Ok(Self {
            id,
            name,
            semantic,
            element_hint: declared.element_hint(),
            declared,
            options,
        })
    }

    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.options.nullable
    }

    #[must_use]
    pub const fn version_gate(&self) -> Option<i64> {
        self.options.version_gate
    }

    /// Returns `true` if `value` exceeds this field's version gate.
    #[must_use]
    pub fn exceeds_gate(&self, value: i64) -> bool {
        self.semantic.is_integer() && self.options.version_gate.is_some_and(|gate| value > gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_resolves_semantic() {
        let field = FieldDescriptor::new(
            3,
            "names",
            DeclaredType::list(DeclaredType::String),
            FieldOptions::default(),
        )
        .unwrap();
        assert_eq!(field.semantic, SemanticType::StringList);
        assert_eq!(field.element_hint, None);
        assert!(!field.nullable());
    }

    #[test]
    fn descriptor_rejects_unsupported() {
        let result = FieldDescriptor::new(
            1,
            "count",
            DeclaredType::Unsupported("u32"),
            FieldOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn version_gate_applies_to_integers_only() {
        let options = FieldOptions {
            version_gate: Some(10),
            ..FieldOptions::default()
        };
        let int = FieldDescriptor::new(1, "x", DeclaredType::Int, options).unwrap();
        assert!(int.exceeds_gate(42));
        assert!(!int.exceeds_gate(10));

        let float = FieldDescriptor::new(2, "f", DeclaredType::Float, options).unwrap();
        assert!(!float.exceeds_gate(42));
    }
}
