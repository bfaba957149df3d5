//! Deterministic descriptor fingerprints.

use blake3::Hasher;

use crate::{FieldDescriptor, TypeDescriptor};

/// Computes a deterministic fingerprint of a descriptor.
///
/// The fingerprint covers the type name and every field's id, name, semantic
/// type and options, in ascending id order. Two builds of the same type
/// always produce the same value.
#[must_use]
pub fn fingerprint(descriptor: &TypeDescriptor) -> u64 {
    let mut hasher = Hasher::new();
    write_str(&mut hasher, descriptor.name());
    write_u32(&mut hasher, u32::try_from(descriptor.len()).unwrap_or(u32::MAX));

    for field in descriptor.fields() {
        write_field(&mut hasher, field);
    }

    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(head)
}

fn write_field(hasher: &mut Hasher, field: &FieldDescriptor) {
    write_u16(hasher, field.id);
    write_str(hasher, field.name);
    write_u8(hasher, field.semantic.code());
    let options = field.options;
    write_u8(
        hasher,
        u8::from(options.nullable) | u8::from(options.direct_encoding) << 1 | u8::from(options.direct_list) << 2,
    );
    match options.version_gate {
        Some(gate) => {
            write_u8(hasher, 1);
            write_i64(hasher, gate);
        }
        None => write_u8(hasher, 0),
    }
    match field.element_hint {
        Some(hint) => {
            write_u8(hasher, 1);
            write_str(hasher, hint.name());
        }
        None => write_u8(hasher, 0),
    }
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_u32(hasher, u32::try_from(value.len()).unwrap_or(u32::MAX));
    hasher.update(value.as_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u16(hasher: &mut Hasher, value: u16) {
    hasher.update(&value.to_le_bytes());
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}

fn write_i64(hasher: &mut Hasher, value: i64) {
    hasher.update(&value.to_le_bytes());
}
