//! Explicit field registration for described types.

use std::any::type_name;
use std::collections::BTreeMap;
use std::sync::Arc;

use schema::{
    DeclaredType, FieldDescriptor, FieldOptions, SchemaError, SchemaResult, SemanticType,
    TypeDescriptor, TypeRef,
};
use tracing::debug;
use wire::{begin_field, finish_field, write_field_header, write_null_field, FieldHeader};

use crate::binder::BinderHandle;
use crate::context::{capacity_hint, DecodeContext, EncodeContext};
use crate::decoder::decode_object;
use crate::diagnostics::Diagnostic;
use crate::dispatch::{read_list, read_map, write_list, write_map, ListElement, ParcelValue};
use crate::encoder::encode_object;
use crate::error::{CodecError, CodecResult, FieldError};
use crate::interface::{Interface, InterfaceProxy, InterfaceRegistry};
use crate::registry::{schema_of, ParcelSchema};
use crate::value::{read_value, write_value};

/// A type that can be encoded as a tagged-field object.
///
/// Implementations list their fields once; the resulting schema is built on
/// first use and cached for the rest of the process.
///
/// ```
/// use codec::{Parcelable, SchemaBuilder};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Parcelable for Point {
///     fn describe(schema: &mut SchemaBuilder<Self>) {
///         schema.constructor(Self::default);
///         schema.field(1, "x", |p| &p.x, |p| &mut p.x);
///         schema.field(2, "y", |p| &p.y, |p| &mut p.y);
///     }
/// }
///
/// let bytes = codec::to_bytes(&Point { x: 3, y: -4 }).unwrap();
/// let point: Point = codec::from_bytes(&bytes).unwrap();
/// assert_eq!(point, Point { x: 3, y: -4 });
/// ```
pub trait Parcelable: Sized + Send + Sync + 'static {
    /// Registers the type's fields, ancestors and constructor.
    fn describe(schema: &mut SchemaBuilder<Self>);
}

/// Encodes and decodes one field of `T`.
pub(crate) trait FieldBinding<T>: Send + Sync {
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()>;

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()>;
}

struct Entry<T> {
    id: u16,
    name: &'static str,
    declared: DeclaredType,
    options: FieldOptions,
    binding: Arc<dyn FieldBinding<T>>,
}

/// Collects the registration of one type.
pub struct SchemaBuilder<T> {
    name: &'static str,
    constructor: Option<fn() -> T>,
    ancestors: Vec<TypeDescriptor>,
    inherited: Vec<(u16, Arc<dyn FieldBinding<T>>)>,
    entries: Vec<Entry<T>>,
    error: Option<SchemaError>,
}

/// Options for a field just registered with a [`SchemaBuilder`].
pub struct FieldSpec<'b> {
    options: &'b mut FieldOptions,
}

impl FieldSpec<'_> {
    /// An absent value is legal and travels as a null marker.
    pub fn nullable(self) -> Self {
        self.options.nullable = true;
        self
    }

    /// Elements travel as tagged generic values.
    pub fn direct_encoding(self) -> Self {
        self.options.direct_encoding = true;
        self
    }

    /// Numeric, boolean and string lists use the compact layout.
    pub fn direct_list(self) -> Self {
        self.options.direct_list = true;
        self
    }

    /// Reports decoded integers above `gate` as newer than supported.
    pub fn version_gate(self, gate: i64) -> Self {
        self.options.version_gate = Some(gate);
        self
    }
}

impl<T: Parcelable> SchemaBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            name: short_name(type_name::<T>()),
            constructor: None,
            ancestors: Vec::new(),
            inherited: Vec::new(),
            entries: Vec::new(),
            error: None,
        }
    }

    /// Overrides the name used in diagnostics and errors.
    pub fn name(&mut self, name: &'static str) -> &mut Self {
        self.name = name;
        self
    }

    /// Registers how the decoder creates a fresh instance.
    ///
    /// Types without a constructor can be encoded but not decoded.
    pub fn constructor(&mut self, constructor: fn() -> T) -> &mut Self {
        self.constructor = Some(constructor);
        self
    }

    /// Adds every field of the ancestor `B`, reached through `get`/`get_mut`.
    pub fn inherit<B: Parcelable>(
        &mut self,
        get: fn(&T) -> &B,
        get_mut: fn(&mut T) -> &mut B,
    ) -> &mut Self {
        match schema_of::<B>() {
            Ok(base) => {
                for (field, binding) in base.entries() {
                    let projected: Arc<dyn FieldBinding<T>> = Arc::new(Inherited {
                        get,
                        get_mut,
                        inner: Arc::clone(binding),
                    });
                    self.inherited.push((field.id, projected));
                }
                self.ancestors.push(base.descriptor().clone());
            }
            Err(err) => self.fail(err),
        }
        self
    }

    /// Registers a single-valued field.
    pub fn field<V: ParcelValue>(
        &mut self,
        id: u16,
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> FieldSpec<'_> {
        self.push(id, name, V::declared(), ValueBinding { get, get_mut })
    }

    /// Registers a typed list.
    pub fn list<E: ListElement>(
        &mut self,
        id: u16,
        name: &'static str,
        get: fn(&T) -> &Vec<E>,
        get_mut: fn(&mut T) -> &mut Vec<E>,
    ) -> FieldSpec<'_> {
        self.push(
            id,
            name,
            DeclaredType::list(E::declared()),
            ListBinding { get, get_mut },
        )
    }

    /// Registers a map of generic keys and values.
    pub fn map<K, V>(
        &mut self,
        id: u16,
        name: &'static str,
        get: fn(&T) -> &BTreeMap<K, V>,
        get_mut: fn(&mut T) -> &mut BTreeMap<K, V>,
    ) -> FieldSpec<'_>
    where
        K: ListElement + Ord,
        V: ListElement,
    {
        self.push(
            id,
            name,
            DeclaredType::map(K::declared(), V::declared()),
            MapBinding { get, get_mut },
        )
    }

    /// Registers a map whose values are described objects.
    ///
    /// Keys travel as generic values, values as tagged parcelables.
    pub fn map_objects<K, U>(
        &mut self,
        id: u16,
        name: &'static str,
        get: fn(&T) -> &BTreeMap<K, U>,
        get_mut: fn(&mut T) -> &mut BTreeMap<K, U>,
    ) -> FieldSpec<'_>
    where
        K: ListElement + Ord,
        U: Parcelable,
    {
        self.push(
            id,
            name,
            DeclaredType::map(K::declared(), DeclaredType::Object(TypeRef::of::<U>())),
            ObjectMapBinding { get, get_mut },
        )
    }

    /// Registers a nested described object.
    pub fn object<U: Parcelable>(
        &mut self,
        id: u16,
        name: &'static str,
        get: fn(&T) -> &Option<U>,
        get_mut: fn(&mut T) -> &mut Option<U>,
    ) -> FieldSpec<'_> {
        self.push(
            id,
            name,
            DeclaredType::Object(TypeRef::of::<U>()),
            ObjectBinding { get, get_mut },
        )
    }

    /// Registers an array of described objects with nullable elements.
    pub fn object_array<U: Parcelable>(
        &mut self,
        id: u16,
        name: &'static str,
        get: fn(&T) -> &Vec<Option<U>>,
        get_mut: fn(&mut T) -> &mut Vec<Option<U>>,
    ) -> FieldSpec<'_> {
        self.push(
            id,
            name,
            DeclaredType::array(DeclaredType::Object(TypeRef::of::<U>())),
            ObjectArrayBinding { get, get_mut },
        )
    }

    /// Registers a list of described objects.
    pub fn object_list<U: Parcelable>(
        &mut self,
        id: u16,
        name: &'static str,
        get: fn(&T) -> &Vec<U>,
        get_mut: fn(&mut T) -> &mut Vec<U>,
    ) -> FieldSpec<'_> {
        self.push(
            id,
            name,
            DeclaredType::list(DeclaredType::Object(TypeRef::of::<U>())),
            ObjectListBinding { get, get_mut },
        )
    }

    /// Registers a capability handle decoded into a typed proxy.
    pub fn interface<P: InterfaceProxy>(
        &mut self,
        id: u16,
        name: &'static str,
        get: fn(&T) -> &Option<Interface<P>>,
        get_mut: fn(&mut T) -> &mut Option<Interface<P>>,
    ) -> FieldSpec<'_> {
        self.push(
            id,
            name,
            DeclaredType::Interface(P::DESCRIPTOR),
            InterfaceBinding { get, get_mut },
        )
    }

    fn push(
        &mut self,
        id: u16,
        name: &'static str,
        declared: DeclaredType,
        binding: impl FieldBinding<T> + 'static,
    ) -> FieldSpec<'_> {
        let index = self.entries.len();
        self.entries.push(Entry {
            id,
            name,
            declared,
            options: FieldOptions::default(),
            binding: Arc::new(binding),
        });
        FieldSpec {
            options: &mut self.entries[index].options,
        }
    }

    fn fail(&mut self, err: SchemaError) {
        self.error.get_or_insert(err);
    }

    /// Validates the registration and compiles the schema.
    ///
    /// Id collisions between own and inherited fields surface here.
    pub(crate) fn finish(self) -> SchemaResult<ParcelSchema<T>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut builder = TypeDescriptor::builder(self.name, std::any::TypeId::of::<T>());
        for ancestor in &self.ancestors {
            builder = builder.inherit(ancestor);
        }
        let mut bindings: BTreeMap<u16, Arc<dyn FieldBinding<T>>> =
            self.inherited.into_iter().collect();
        for entry in self.entries {
            let field = FieldDescriptor::new(entry.id, entry.name, entry.declared, entry.options)?;
            builder = builder.field(field);
            bindings.insert(entry.id, entry.binding);
        }
        let descriptor = builder.constructible(self.constructor.is_some()).build()?;
        Ok(ParcelSchema::new(descriptor, bindings, self.constructor))
    }
}

/// Last path segment of a type name, generics dropped.
fn short_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn write_absent(field: &FieldDescriptor, ctx: &mut EncodeContext<'_>) -> CodecResult<()> {
    if !field.nullable() {
        return Err(CodecError::MissingRequiredField {
            type_name: ctx.type_name(),
            field: field.name,
        });
    }
    if !field.semantic.is_fixed() {
        write_null_field(ctx.writer, field.id);
    }
    Ok(())
}

fn read_field_value<V: ParcelValue>(
    header: &FieldHeader,
    field: &FieldDescriptor,
    ctx: &mut DecodeContext<'_, '_>,
) -> Result<V, FieldError> {
    if header.is_null() {
        return V::null().ok_or(FieldError::UnexpectedNull);
    }
    if let Some(expected) = field.semantic.fixed_size() {
        if header.size != expected {
            return Err(FieldError::SizeMismatch {
                expected,
                found: header.size,
            });
        }
    }
    match V::read_payload(ctx)? {
        Some(value) => Ok(value),
        None => V::null().ok_or(FieldError::UnexpectedNull),
    }
}

struct ValueBinding<T, V> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T: 'static, V: ParcelValue> FieldBinding<T> for ValueBinding<T, V> {
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()> {
        let value = (self.get)(value);
        if value.is_absent() {
            return write_absent(field, ctx);
        }
        if let Some(size) = field.semantic.fixed_size() {
            write_field_header(ctx.writer, field.id, size)?;
            value.write_payload(ctx)?;
        } else {
            let mark = begin_field(ctx.writer, field.id);
            value.write_payload(ctx)?;
            finish_field(ctx.writer, mark)?;
        }
        Ok(())
    }

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()> {
        let value: V = read_field_value(header, field, ctx)?;
        if let (Some(found), Some(gate)) = (value.gate_value(), field.version_gate()) {
            if field.exceeds_gate(found) {
                debug!(
                    type_name = ctx.type_name(),
                    field = field.name,
                    gate,
                    found,
                    "value is newer than this consumer supports"
                );
                ctx.push(Diagnostic::VersionGate {
                    type_name: ctx.type_name(),
                    field: field.name,
                    gate,
                    found,
                });
            }
        }
        *(self.get_mut)(target) = value;
        Ok(())
    }
}

struct ListBinding<T, E> {
    get: fn(&T) -> &Vec<E>,
    get_mut: fn(&mut T) -> &mut Vec<E>,
}

impl<T: 'static, E: ListElement> FieldBinding<T> for ListBinding<T, E> {
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()> {
        let mark = begin_field(ctx.writer, field.id);
        write_list((self.get)(value), field.semantic, ctx)?;
        finish_field(ctx.writer, mark)?;
        Ok(())
    }

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()> {
        let items = if header.is_null() {
            Vec::new()
        } else {
            read_list(field.semantic, ctx)?
        };
        *(self.get_mut)(target) = items;
        Ok(())
    }
}

struct MapBinding<T, K, V> {
    get: fn(&T) -> &BTreeMap<K, V>,
    get_mut: fn(&mut T) -> &mut BTreeMap<K, V>,
}

impl<T, K, V> FieldBinding<T> for MapBinding<T, K, V>
where
    T: 'static,
    K: ListElement + Ord,
    V: ListElement,
{
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()> {
        let mark = begin_field(ctx.writer, field.id);
        write_map((self.get)(value).iter(), ctx)?;
        finish_field(ctx.writer, mark)?;
        Ok(())
    }

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        _field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()> {
        let entries = if header.is_null() {
            BTreeMap::new()
        } else {
            read_map::<K, V>(ctx)?.into_iter().collect()
        };
        *(self.get_mut)(target) = entries;
        Ok(())
    }
}

struct ObjectBinding<T, U> {
    get: fn(&T) -> &Option<U>,
    get_mut: fn(&mut T) -> &mut Option<U>,
}

impl<T: 'static, U: Parcelable> FieldBinding<T> for ObjectBinding<T, U> {
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()> {
        let Some(object) = (self.get)(value) else {
            return write_absent(field, ctx);
        };
        let mark = begin_field(ctx.writer, field.id);
        encode_object(object, ctx)?;
        finish_field(ctx.writer, mark)?;
        Ok(())
    }

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        _field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()> {
        let object = if header.is_null() {
            None
        } else {
            Some(decode_object::<U>(ctx)?)
        };
        *(self.get_mut)(target) = object;
        Ok(())
    }
}

/// Writes one framed array element: a size word followed by the object.
fn write_element<U: Parcelable>(object: &U, ctx: &mut EncodeContext<'_>) -> CodecResult<()> {
    let slot = ctx.writer.reserve_u32();
    encode_object(object, ctx)?;
    let size = ctx.writer.position() - slot.end();
    let size = u32::try_from(size).map_err(|_| cursor::CursorError::LengthOverflow { length: size })?;
    ctx.writer.patch_u32(slot, size)?;
    Ok(())
}

/// Reads one framed array element; a zero size word is a null element.
fn read_element<U: Parcelable>(ctx: &mut DecodeContext<'_, '_>) -> CodecResult<Option<U>> {
    let size = ctx.reader.read_u32()? as usize;
    if size == 0 {
        return Ok(None);
    }
    let end = ctx.reader.position().saturating_add(size);
    let object = ctx.within(end, decode_object::<U>)?;
    ctx.reader.set_position(end)?;
    Ok(Some(object))
}

struct ObjectArrayBinding<T, U> {
    get: fn(&T) -> &Vec<Option<U>>,
    get_mut: fn(&mut T) -> &mut Vec<Option<U>>,
}

impl<T: 'static, U: Parcelable> FieldBinding<T> for ObjectArrayBinding<T, U> {
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()> {
        let items = (self.get)(value);
        let mark = begin_field(ctx.writer, field.id);
        ctx.writer.write_len(items.len())?;
        for item in items {
            match item {
                Some(object) => write_element(object, ctx)?,
                None => ctx.writer.write_i32(0),
            }
        }
        finish_field(ctx.writer, mark)?;
        Ok(())
    }

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        _field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()> {
        let mut items = Vec::new();
        if !header.is_null() {
            if let Some(count) = ctx.read_count()? {
                items.reserve(capacity_hint(count, ctx.reader.remaining(), 4));
                for _ in 0..count {
                    items.push(read_element::<U>(ctx)?);
                }
            }
        }
        *(self.get_mut)(target) = items;
        Ok(())
    }
}

struct ObjectListBinding<T, U> {
    get: fn(&T) -> &Vec<U>,
    get_mut: fn(&mut T) -> &mut Vec<U>,
}

impl<T: 'static, U: Parcelable> FieldBinding<T> for ObjectListBinding<T, U> {
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()> {
        let items = (self.get)(value);
        let mark = begin_field(ctx.writer, field.id);
        ctx.writer.write_len(items.len())?;
        if field.semantic == SemanticType::List {
            let name = schema_of::<U>()?.name();
            for item in items {
                write_tagged_object(item, name, ctx)?;
            }
        } else {
            for item in items {
                write_element(item, ctx)?;
            }
        }
        finish_field(ctx.writer, mark)?;
        Ok(())
    }

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()> {
        let mut items = Vec::new();
        if !header.is_null() {
            if let Some(count) = ctx.read_count()? {
                items.reserve(capacity_hint(count, ctx.reader.remaining(), 4));
                for _ in 0..count {
                    let item = if field.semantic == SemanticType::List {
                        read_tagged_object::<U>(ctx)?
                    } else {
                        read_element::<U>(ctx)?
                    };
                    items.push(item.ok_or(FieldError::UnexpectedNull)?);
                }
            }
        }
        *(self.get_mut)(target) = items;
        Ok(())
    }
}

struct ObjectMapBinding<T, K, U> {
    get: fn(&T) -> &BTreeMap<K, U>,
    get_mut: fn(&mut T) -> &mut BTreeMap<K, U>,
}

impl<T, K, U> FieldBinding<T> for ObjectMapBinding<T, K, U>
where
    T: 'static,
    K: ListElement + Ord,
    U: Parcelable,
{
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()> {
        let entries = (self.get)(value);
        let name = schema_of::<U>()?.name();
        let mark = begin_field(ctx.writer, field.id);
        ctx.writer.write_len(entries.len())?;
        for (key, item) in entries {
            write_value(&key.to_value(), ctx.writer, 0, ctx.max_depth)?;
            write_tagged_object(item, name, ctx)?;
        }
        finish_field(ctx.writer, mark)?;
        Ok(())
    }

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        _field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()> {
        let mut entries = BTreeMap::new();
        if !header.is_null() {
            if let Some(count) = ctx.read_count()? {
                for _ in 0..count {
                    let key = K::from_value(read_value(ctx.reader, ctx.limits, 0)?)?;
                    let item = read_tagged_object::<U>(ctx)?.ok_or(FieldError::UnexpectedNull)?;
                    entries.insert(key, item);
                }
            }
        }
        *(self.get_mut)(target) = entries;
        Ok(())
    }
}

/// Writes a described object as a generic value: tag, type name, frame.
fn write_tagged_object<U: Parcelable>(
    item: &U,
    name: &'static str,
    ctx: &mut EncodeContext<'_>,
) -> CodecResult<()> {
    ctx.writer.write_i32(wire::ValueTag::Parcelable.raw());
    ctx.writer.write_string16(Some(name))?;
    encode_object(item, ctx)
}

/// Reads a described object written as a generic value.
fn read_tagged_object<U: Parcelable>(ctx: &mut DecodeContext<'_, '_>) -> CodecResult<Option<U>> {
    let tag = wire::ValueTag::parse(ctx.reader.read_i32()?)?;
    match tag {
        wire::ValueTag::Null => Ok(None),
        wire::ValueTag::Parcelable => {
            // The producer's type name is informational; the element type is fixed.
            let _ = ctx.reader.read_string16()?;
            decode_object::<U>(ctx).map(Some)
        }
        _ => Err(FieldError::Unsupported {
            what: "a non-parcelable value where an object was expected",
        }
        .into()),
    }
}

struct InterfaceBinding<T, P> {
    get: fn(&T) -> &Option<Interface<P>>,
    get_mut: fn(&mut T) -> &mut Option<Interface<P>>,
}

impl<T: 'static, P: InterfaceProxy> FieldBinding<T> for InterfaceBinding<T, P> {
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()> {
        let Some(interface) = (self.get)(value) else {
            return write_absent(field, ctx);
        };
        let mark = begin_field(ctx.writer, field.id);
        interface.binder().write(ctx.writer);
        finish_field(ctx.writer, mark)?;
        Ok(())
    }

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        _field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()> {
        let interface = if header.is_null() {
            None
        } else {
            let binder = BinderHandle::read(ctx.reader)?;
            let proxy = InterfaceRegistry::global()
                .resolve::<P>(binder)
                .ok_or(FieldError::MissingFactory {
                    descriptor: P::DESCRIPTOR,
                })?;
            Some(Interface::new(proxy))
        };
        *(self.get_mut)(target) = interface;
        Ok(())
    }
}

/// A field of an ancestor, reached through the descendant.
struct Inherited<T, B> {
    get: fn(&T) -> &B,
    get_mut: fn(&mut T) -> &mut B,
    inner: Arc<dyn FieldBinding<B>>,
}

impl<T: 'static, B: 'static> FieldBinding<T> for Inherited<T, B> {
    fn encode(
        &self,
        value: &T,
        field: &FieldDescriptor,
        ctx: &mut EncodeContext<'_>,
    ) -> CodecResult<()> {
        self.inner.encode((self.get)(value), field, ctx)
    }

    fn decode(
        &self,
        target: &mut T,
        header: &FieldHeader,
        field: &FieldDescriptor,
        ctx: &mut DecodeContext<'_, '_>,
    ) -> CodecResult<()> {
        self.inner.decode((self.get_mut)(target), header, field, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Sample {
        count: i32,
        label: Option<String>,
    }

    impl Parcelable for Sample {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.constructor(Self::default);
            schema.field(1, "count", |s| &s.count, |s| &mut s.count).version_gate(3);
            schema.field(2, "label", |s| &s.label, |s| &mut s.label).nullable();
        }
    }

    #[test]
    fn short_name_drops_path_and_generics() {
        assert_eq!(short_name("a::b::Point"), "Point");
        assert_eq!(short_name("a::Wrapper<b::Inner>"), "Wrapper");
        assert_eq!(short_name("Plain"), "Plain");
    }

    #[test]
    fn builder_records_options() {
        let mut builder = SchemaBuilder::<Sample>::new();
        Sample::describe(&mut builder);
        let schema = builder.finish().unwrap();
        let descriptor = schema.descriptor();
        assert_eq!(descriptor.name(), "Sample");
        assert!(descriptor.is_default_constructible());
        let count = descriptor.field(1).unwrap();
        assert_eq!(count.version_gate(), Some(3));
        assert!(!count.nullable());
        let label = descriptor.field(2).unwrap();
        assert!(label.nullable());
        assert_eq!(label.semantic, SemanticType::String);
    }

    #[test]
    fn builder_rejects_unmappable_field() {
        #[derive(Default)]
        struct Bad {
            raw: u32,
        }
        impl Parcelable for Bad {
            fn describe(schema: &mut SchemaBuilder<Self>) {
                schema.field(1, "raw", |b| &b.raw, |b| &mut b.raw);
            }
        }
        let mut builder = SchemaBuilder::<Bad>::new();
        Bad::describe(&mut builder);
        let err = builder.finish().err().unwrap();
        assert!(matches!(err, SchemaError::UnsupportedType { .. }));
    }
}
