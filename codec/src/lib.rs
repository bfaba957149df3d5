//! Tagged-field object encoding and decoding for the safeparcel codec.
//!
//! This is the main codec crate that ties together cursor, wire, and schema
//! to encode described Rust types as length-delimited, id-tagged objects and
//! to decode them back, tolerating fields the consumer does not know.
//!
//! # Features
//!
//! - Explicit per-type registration through [`Parcelable`] and [`SchemaBuilder`]
//! - Lazily built, process-wide schema cache
//! - Forward-compatible decoding (unknown and failing fields are skipped)
//! - Generic values, bundles, opaque handles and typed interface proxies
//! - Per-call diagnostics reports
//!
//! # Design Principles
//!
//! - **Explicit schemas** - No reflection; every field is registered once.
//! - **Field isolation** - A bad field never takes its siblings down with it.
//! - **Bounded decoding** - Nesting, element counts and object sizes are limited.
//! - **Deterministic** - Fields are always written in ascending id order.
//!
//! # Example
//!
//! ```
//! use codec::{Parcelable, SchemaBuilder};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Account {
//!     name: Option<String>,
//!     uid: i32,
//! }
//!
//! impl Parcelable for Account {
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema.constructor(Self::default);
//!         schema.field(1, "name", |a| &a.name, |a| &mut a.name).nullable();
//!         schema.field(2, "uid", |a| &a.uid, |a| &mut a.uid);
//!     }
//! }
//!
//! let account = Account { name: Some("alice".into()), uid: 10_001 };
//! let bytes = codec::to_bytes(&account).unwrap();
//! assert_eq!(codec::from_bytes::<Account>(&bytes).unwrap(), account);
//! ```

mod binder;
mod bundle;
mod context;
mod decoder;
mod diagnostics;
mod dispatch;
mod encoder;
mod error;
mod interface;
mod parcelable;
mod registry;
mod roundtrip;
mod value;

pub use binder::{BinderHandle, BINDER_SIZE};
pub use bundle::Bundle;
pub use context::{DecodeContext, EncodeContext};
pub use decoder::{decode, decode_with_report};
pub use diagnostics::{DecodeReport, Diagnostic, EncodeReport, Report};
pub use dispatch::{ListElement, ParcelValue};
pub use encoder::{encode, encode_with_report};
pub use error::{CodecError, CodecResult, FieldError};
pub use interface::{register_interface, Interface, InterfaceProxy, InterfaceRegistry};
pub use parcelable::{FieldSpec, Parcelable, SchemaBuilder};
pub use registry::{descriptor_of, schema_of, ParcelSchema};
pub use roundtrip::{from_bytes, to_bytes};
pub use value::Value;
pub use wire::Limits;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Account {
        name: Option<String>,
        uid: i32,
    }

    impl Parcelable for Account {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.constructor(Self::default);
            schema.field(1, "name", |a| &a.name, |a| &mut a.name).nullable();
            schema.field(2, "uid", |a| &a.uid, |a| &mut a.uid);
        }
    }

    #[test]
    fn public_api_exports() {
        let _ = Limits::default();
        let _ = Bundle::new();
        let _ = Value::Null;
        let _ = BinderHandle::default();
        let _ = Report::new();
        let _: CodecResult<()> = Ok(());
    }

    #[test]
    fn doc_example() {
        let account = Account {
            name: Some("alice".into()),
            uid: 10_001,
        };
        let bytes = to_bytes(&account).unwrap();
        assert_eq!(from_bytes::<Account>(&bytes).unwrap(), account);
    }

    #[test]
    fn absent_nullable_string_is_a_null_field() {
        let bytes = to_bytes(&Account { name: None, uid: 1 }).unwrap();
        // object header (8) + null marker for id 1 (4) + uid (8)
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[8..12], &1u32.to_le_bytes());
        assert_eq!(from_bytes::<Account>(&bytes).unwrap().name, None);
    }

    #[test]
    fn limits_reexported() {
        let limits = Limits::for_testing();
        assert!(limits.max_depth > 0);
    }
}
