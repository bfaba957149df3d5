//! Type descriptors and their validation.

use std::any::TypeId;
use std::collections::BTreeMap;

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldDescriptor;

/// Field id that collides with the size escape and can never be used.
pub const RESERVED_FIELD_ID: u16 = 0xFFFF;

/// Field ids start at one; zero never names a field.
const FIRST_FIELD_ID: u16 = 1;

/// The compiled schema of one concrete type, ancestors included.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeDescriptor {
    name: &'static str,
    #[cfg_attr(feature = "serde", serde(skip))]
    type_id: TypeId,
    fields: BTreeMap<u16, FieldDescriptor>,
    default_constructible: bool,
}

impl TypeDescriptor {
    /// Creates a descriptor builder.
    #[must_use]
    pub fn builder(name: &'static str, type_id: TypeId) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(name, type_id)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub const fn is_default_constructible(&self) -> bool {
        self.default_constructible
    }

    /// Looks up a field by id.
    #[must_use]
    pub fn field(&self, id: u16) -> Option<&FieldDescriptor> {
        self.fields.get(&id)
    }

    /// Fields in ascending id order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`TypeDescriptor`].
///
/// Fields may be added in any order; ids are validated in [`build`](Self::build).
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: &'static str,
    type_id: TypeId,
    fields: Vec<FieldDescriptor>,
    default_constructible: bool,
}

impl TypeDescriptorBuilder {
    #[must_use]
    pub fn new(name: &'static str, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            fields: Vec::new(),
            default_constructible: false,
        }
    }

    /// Adds an own field.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds every field of an ancestor.
    #[must_use]
    pub fn inherit(mut self, ancestor: &TypeDescriptor) -> Self {
        self.fields.extend(ancestor.fields().cloned());
        self
    }

    /// Marks whether the type can be constructed without arguments.
    #[must_use]
    pub const fn constructible(mut self, constructible: bool) -> Self {
        self.default_constructible = constructible;
        self
    }

    /// Builds the descriptor after validation.
    pub fn build(self) -> SchemaResult<TypeDescriptor> {
        let mut fields: BTreeMap<u16, FieldDescriptor> = BTreeMap::new();
        for field in self.fields {
            if field.id < FIRST_FIELD_ID || field.id == RESERVED_FIELD_ID {
                return Err(SchemaError::ReservedFieldId {
                    type_name: self.name,
                    field: field.name,
                    id: field.id,
                });
            }
            if let Some(existing) = fields.get(&field.id) {
                return Err(SchemaError::DuplicateFieldId {
                    type_name: self.name,
                    id: field.id,
                    first: existing.name,
                    second: field.name,
                });
            }
            fields.insert(field.id, field);
        }
        Ok(TypeDescriptor {
            name: self.name,
            type_id: self.type_id,
            fields,
            default_constructible: self.default_constructible,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeclaredType, FieldOptions};

    struct Base;
    struct Derived;

    fn int(id: u16, name: &'static str) -> FieldDescriptor {
        FieldDescriptor::new(id, name, DeclaredType::Int, FieldOptions::default()).unwrap()
    }

    #[test]
    fn builder_orders_fields_by_id() {
        let descriptor = TypeDescriptor::builder("Point", TypeId::of::<Base>())
            .field(int(2, "y"))
            .field(int(1, "x"))
            .constructible(true)
            .build()
            .unwrap();
        let ids: Vec<u16> = descriptor.fields().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(descriptor.is_default_constructible());
        assert_eq!(descriptor.field(2).map(|f| f.name), Some("y"));
    }

    #[test]
    fn builder_rejects_duplicate_ids() {
        let err = TypeDescriptor::builder("Twice", TypeId::of::<Base>())
            .field(int(5, "a"))
            .field(int(5, "b"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateFieldId {
                type_name: "Twice",
                id: 5,
                first: "a",
                second: "b",
            }
        );
    }

    #[test]
    fn builder_rejects_inherited_duplicate() {
        let base = TypeDescriptor::builder("Base", TypeId::of::<Base>())
            .field(int(5, "base_field"))
            .build()
            .unwrap();
        let err = TypeDescriptor::builder("Derived", TypeId::of::<Derived>())
            .inherit(&base)
            .field(int(5, "own_field"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFieldId { id: 5, .. }));
    }

    #[test]
    fn builder_merges_ancestor_fields() {
        let base = TypeDescriptor::builder("Base", TypeId::of::<Base>())
            .field(int(1, "id"))
            .build()
            .unwrap();
        let derived = TypeDescriptor::builder("Derived", TypeId::of::<Derived>())
            .inherit(&base)
            .field(int(2, "extra"))
            .build()
            .unwrap();
        assert_eq!(derived.len(), 2);
        assert_eq!(derived.type_id(), TypeId::of::<Derived>());
    }

    #[test]
    fn builder_rejects_reserved_id() {
        let err = TypeDescriptor::builder("Bad", TypeId::of::<Base>())
            .field(int(RESERVED_FIELD_ID, "escape"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::ReservedFieldId { .. }));
    }

    #[test]
    fn builder_rejects_id_zero() {
        let err = TypeDescriptor::builder("Bad", TypeId::of::<Base>())
            .field(int(0, "zero"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::ReservedFieldId {
                type_name: "Bad",
                field: "zero",
                id: 0,
            }
        );
        assert!(err.to_string().contains("0x0000"));
    }
}
