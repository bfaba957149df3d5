//! Process-wide cache of compiled schemas.
//!
//! A schema is built the first time its type is encoded, decoded or
//! inherited, and then shared for the rest of the process. Two threads that
//! race on the first use may both build it; the first insert wins and every
//! caller observes an equivalent schema.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use schema::{fingerprint, FieldDescriptor, SchemaError, SchemaResult, TypeDescriptor};

use crate::parcelable::{FieldBinding, Parcelable, SchemaBuilder};

type Erased = Arc<dyn Any + Send + Sync>;

static SCHEMAS: Lazy<DashMap<TypeId, Erased>> = Lazy::new(DashMap::new);

/// The compiled schema of `T`: its descriptor plus one binding per field.
pub struct ParcelSchema<T> {
    descriptor: TypeDescriptor,
    bindings: BTreeMap<u16, Arc<dyn FieldBinding<T>>>,
    constructor: Option<fn() -> T>,
}

impl<T: Parcelable> ParcelSchema<T> {
    pub(crate) fn new(
        descriptor: TypeDescriptor,
        bindings: BTreeMap<u16, Arc<dyn FieldBinding<T>>>,
        constructor: Option<fn() -> T>,
    ) -> Self {
        Self {
            descriptor,
            bindings,
            constructor,
        }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.descriptor.name()
    }

    /// Deterministic hash of the descriptor.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        fingerprint(&self.descriptor)
    }

    /// Fields in ascending id order with their bindings.
    pub(crate) fn entries(
        &self,
    ) -> impl Iterator<Item = (&FieldDescriptor, &Arc<dyn FieldBinding<T>>)> {
        self.descriptor
            .fields()
            .filter_map(|field| self.bindings.get(&field.id).map(|binding| (field, binding)))
    }

    pub(crate) fn entry(&self, id: u16) -> Option<(&FieldDescriptor, &Arc<dyn FieldBinding<T>>)> {
        Some((self.descriptor.field(id)?, self.bindings.get(&id)?))
    }

    /// Creates a fresh instance for the decoder to fill.
    pub(crate) fn construct(&self) -> SchemaResult<T> {
        self.constructor
            .map(|constructor| constructor())
            .ok_or(SchemaError::NotConstructible {
                type_name: self.name(),
            })
    }
}

impl<T> fmt::Debug for ParcelSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParcelSchema")
            .field("descriptor", &self.descriptor)
            .field("constructible", &self.constructor.is_some())
            .finish_non_exhaustive()
    }
}

fn build<T: Parcelable>() -> SchemaResult<ParcelSchema<T>> {
    let mut builder = SchemaBuilder::new();
    T::describe(&mut builder);
    builder.finish()
}

/// Returns the cached schema of `T`, building it on first use.
///
/// Build failures are not cached; every call reports the same error.
pub fn schema_of<T: Parcelable>() -> SchemaResult<Arc<ParcelSchema<T>>> {
    let key = TypeId::of::<T>();
    // The shard guard must be released before building: describing `T` may
    // look up its ancestors in the same map.
    let cached = SCHEMAS.get(&key).map(|entry| Arc::clone(entry.value()));
    let erased = match cached {
        Some(erased) => erased,
        None => {
            let built: Erased = Arc::new(build::<T>()?);
            Arc::clone(SCHEMAS.entry(key).or_insert(built).value())
        }
    };
    match erased.downcast::<ParcelSchema<T>>() {
        Ok(schema) => Ok(schema),
        Err(_) => build::<T>().map(Arc::new),
    }
}

/// Returns a copy of the descriptor of `T`.
pub fn descriptor_of<T: Parcelable>() -> SchemaResult<TypeDescriptor> {
    schema_of::<T>().map(|schema| schema.descriptor().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, Default)]
    struct Cached {
        value: i64,
    }

    impl Parcelable for Cached {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.constructor(Self::default);
            schema.field(7, "value", |c| &c.value, |c| &mut c.value);
        }
    }

    struct Broken {
        a: i32,
        b: i32,
    }

    impl Parcelable for Broken {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.field(1, "a", |s| &s.a, |s| &mut s.a);
            schema.field(1, "b", |s| &s.b, |s| &mut s.b);
        }
    }

    #[test]
    fn schema_is_built_once_and_shared() {
        let first = schema_of::<Cached>().unwrap();
        let second = schema_of::<Cached>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "Cached");
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn concurrent_first_use_agrees() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| descriptor_of::<Cached>().unwrap()))
            .collect();
        let descriptors: Vec<TypeDescriptor> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(descriptors.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn failed_build_is_reported_every_time() {
        for _ in 0..2 {
            let err = schema_of::<Broken>().unwrap_err();
            assert!(matches!(err, SchemaError::DuplicateFieldId { id: 1, .. }));
        }
    }

    struct EncodeOnly {
        tag: i32,
    }

    impl Parcelable for EncodeOnly {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.field(1, "tag", |s| &s.tag, |s| &mut s.tag);
        }
    }

    #[test]
    fn construct_requires_a_constructor() {
        let schema = schema_of::<EncodeOnly>().unwrap();
        assert!(!schema.descriptor().is_default_constructible());
        assert!(matches!(
            schema.construct(),
            Err(SchemaError::NotConstructible {
                type_name: "EncodeOnly"
            })
        ));
        assert!(schema_of::<Cached>().unwrap().construct().is_ok());
    }
}
