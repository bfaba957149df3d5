//! Field headers and object framing for the safeparcel format.
//!
//! This crate handles the tagged-field layout that sits on top of the parcel
//! primitives: field header words, object frames with backpatched sizes,
//! generic value tags, decode limits and a schema-free structural scan. It
//! does not know about concrete types, only the shape of objects.
//!
//! # Design Principles
//!
//! - **Stable wire format** - The layout is fixed by the platform and never versioned here.
//! - **Bounded decoding** - Every declared extent is checked against its enclosing frame.
//! - **No domain knowledge** - This crate handles framing, not field semantics.

mod error;
mod header;
mod limits;
mod scan;
mod value_tag;

pub use error::{CorruptionError, LimitKind, WireError, WireResult};
pub use header::{
    begin_field, begin_object, finish_field, finish_object, read_field_header,
    read_object_header, skip_field, write_field_header, write_null_field, FieldFormat,
    FieldHeader, FieldMark, ObjectMark, MAX_FIELD_ID, OBJECT_MAGIC, SIZE_ESCAPE,
};
pub use limits::Limits;
pub use scan::{scan_object, FieldLayout, ObjectLayout};
pub use value_tag::{ValueTag, BUNDLE_MAGIC};
