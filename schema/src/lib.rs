//! Type descriptors and semantic field types for the safeparcel codec.
//!
//! This crate defines how a Rust type is described to the codec:
//! - The closed set of wire-level value kinds ([`SemanticType`])
//! - Declared field shapes and the rules that map them to wire kinds
//! - Field and type descriptors with id validation
//! - Deterministic descriptor fingerprints
//!
//! # Design Principles
//!
//! - **Explicit schemas** - No reflection; every field is registered by the type itself.
//! - **Fail at construction** - Duplicate ids and unmappable types never reach the wire.
//! - **Deterministic hashing** - A fingerprint is stable given the same definition.

mod declared;
mod error;
mod field;
mod hash;
mod schema;
mod semantic;

pub use declared::{resolve, DeclaredType, TypeRef};
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldDescriptor, FieldOptions};
pub use hash::fingerprint;
pub use schema::{TypeDescriptor, TypeDescriptorBuilder, RESERVED_FIELD_ID};
pub use semantic::SemanticType;

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    #[test]
    fn public_api_exports() {
        let _ = SemanticType::Int;
        let _ = DeclaredType::Bundle;
        let _ = FieldOptions::default();
        let _ = RESERVED_FIELD_ID;

        let _: SchemaResult<()> = Ok(());
    }

    #[test]
    fn descriptor_basic_usage() {
        struct Point;
        let descriptor = TypeDescriptor::builder("Point", TypeId::of::<Point>())
            .field(FieldDescriptor::new(1, "x", DeclaredType::Int, FieldOptions::default()).unwrap())
            .constructible(true)
            .build()
            .unwrap();
        assert_eq!(descriptor.field(1).map(|f| f.semantic), Some(SemanticType::Int));
        assert_ne!(fingerprint(&descriptor), 0);
    }
}
