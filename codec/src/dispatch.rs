//! Payload writers and readers for every semantic type.
//!
//! [`ParcelValue`] covers single-valued fields (scalars, arrays, strings,
//! bundles, handles). [`ListElement`] covers the elements of typed lists and
//! maps, which travel either as tagged generic values or, for the compact
//! list kinds, as raw homogeneous payloads.

use cursor::ParcelReader;
use schema::{DeclaredType, SemanticType};

use crate::binder::BinderHandle;
use crate::bundle::Bundle;
use crate::context::{capacity_hint, DecodeContext, EncodeContext};
use crate::error::FieldError;
use crate::value::{
    narrow_i16, narrow_i8, read_int_array, read_string_array, read_value, write_int_array,
    write_string_array, write_value, Value,
};

/// A Rust type that can be stored in a single field.
pub trait ParcelValue: Sized + Send + Sync + 'static {
    /// Shape used to resolve the field's semantic type.
    fn declared() -> DeclaredType;

    /// Returns `true` when the value has nothing to write.
    fn is_absent(&self) -> bool {
        false
    }

    /// The in-memory value of a wire null, if this type can hold one.
    fn null() -> Option<Self> {
        None
    }

    /// Integer view of the value, compared against a field's version gate.
    fn gate_value(&self) -> Option<i64> {
        None
    }

    /// Writes the payload without a field header.
    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError>;

    /// Reads a payload. `None` means the payload itself was a null marker.
    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError>;
}

impl ParcelValue for bool {
    fn declared() -> DeclaredType {
        DeclaredType::Bool
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_bool(*self);
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(Some(ctx.reader.read_bool()?))
    }
}

impl ParcelValue for i8 {
    fn declared() -> DeclaredType {
        DeclaredType::Byte
    }

    fn gate_value(&self) -> Option<i64> {
        Some(i64::from(*self))
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_i32(i32::from(*self));
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(Some(narrow_i8(ctx.reader.read_i32()?)))
    }
}

impl ParcelValue for i16 {
    fn declared() -> DeclaredType {
        DeclaredType::Short
    }

    fn gate_value(&self) -> Option<i64> {
        Some(i64::from(*self))
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_i32(i32::from(*self));
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(Some(narrow_i16(ctx.reader.read_i32()?)))
    }
}

impl ParcelValue for i32 {
    fn declared() -> DeclaredType {
        DeclaredType::Int
    }

    fn gate_value(&self) -> Option<i64> {
        Some(i64::from(*self))
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_i32(*self);
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(Some(ctx.reader.read_i32()?))
    }
}

impl ParcelValue for i64 {
    fn declared() -> DeclaredType {
        DeclaredType::Long
    }

    fn gate_value(&self) -> Option<i64> {
        Some(*self)
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_i64(*self);
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(Some(ctx.reader.read_i64()?))
    }
}

impl ParcelValue for f32 {
    fn declared() -> DeclaredType {
        DeclaredType::Float
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_f32(*self);
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(Some(ctx.reader.read_f32()?))
    }
}

impl ParcelValue for f64 {
    fn declared() -> DeclaredType {
        DeclaredType::Double
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_f64(*self);
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(Some(ctx.reader.read_f64()?))
    }
}

impl ParcelValue for String {
    fn declared() -> DeclaredType {
        DeclaredType::String
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_string16(Some(self.as_str()))?;
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(ctx.reader.read_string16()?)
    }
}

impl ParcelValue for Vec<u8> {
    fn declared() -> DeclaredType {
        DeclaredType::array(DeclaredType::Byte)
    }

    fn null() -> Option<Self> {
        Some(Self::new())
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_byte_array(Some(self.as_slice()))?;
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(ctx.reader.read_byte_array()?)
    }
}

impl ParcelValue for Vec<Vec<u8>> {
    fn declared() -> DeclaredType {
        DeclaredType::array(DeclaredType::array(DeclaredType::Byte))
    }

    fn null() -> Option<Self> {
        Some(Self::new())
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_len(self.len())?;
        for item in self {
            ctx.writer.write_byte_array(Some(item.as_slice()))?;
        }
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        let Some(count) = ctx.read_count()? else {
            return Ok(None);
        };
        let mut items = Vec::with_capacity(capacity_hint(count, ctx.reader.remaining(), 4));
        for _ in 0..count {
            items.push(ctx.reader.read_byte_array()?.ok_or(FieldError::UnexpectedNull)?);
        }
        Ok(Some(items))
    }
}

impl ParcelValue for Vec<i32> {
    fn declared() -> DeclaredType {
        DeclaredType::array(DeclaredType::Int)
    }

    fn null() -> Option<Self> {
        Some(Self::new())
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        write_int_array(ctx.writer, self)
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        read_int_array(ctx.reader, ctx.limits)
    }
}

impl ParcelValue for Vec<f32> {
    fn declared() -> DeclaredType {
        DeclaredType::array(DeclaredType::Float)
    }

    fn null() -> Option<Self> {
        Some(Self::new())
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        ctx.writer.write_len(self.len())?;
        for item in self {
            ctx.writer.write_f32(*item);
        }
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        let Some(count) = ctx.read_count()? else {
            return Ok(None);
        };
        let mut items = Vec::with_capacity(capacity_hint(count, ctx.reader.remaining(), 4));
        for _ in 0..count {
            items.push(ctx.reader.read_f32()?);
        }
        Ok(Some(items))
    }
}

impl ParcelValue for Vec<String> {
    fn declared() -> DeclaredType {
        DeclaredType::array(DeclaredType::String)
    }

    fn null() -> Option<Self> {
        Some(Self::new())
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        write_string_array(ctx.writer, self)
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        read_string_array(ctx.reader, ctx.limits)
    }
}

impl ParcelValue for Bundle {
    fn declared() -> DeclaredType {
        DeclaredType::Bundle
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        self.write(ctx.writer, 0, ctx.max_depth)
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Self::read(ctx.reader, ctx.limits, 0)
    }
}

impl ParcelValue for BinderHandle {
    fn declared() -> DeclaredType {
        DeclaredType::Binder
    }

    fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        self.write(ctx.writer);
        Ok(())
    }

    fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Ok(Some(Self::read(ctx.reader)?))
    }
}

// Rust types with no wire representation. Describing a field of one of
// these fails with `SchemaError::UnsupportedType`, so the payload methods
// are never reached through a built schema.
impl ParcelValue for Vec<i64> {
    fn declared() -> DeclaredType {
        DeclaredType::array(DeclaredType::Long)
    }

    fn write_payload(&self, _ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        Err(FieldError::Unsupported { what: "array<long>" })
    }

    fn read_payload(_ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Err(FieldError::Unsupported { what: "array<long>" })
    }
}

impl ParcelValue for u32 {
    fn declared() -> DeclaredType {
        DeclaredType::Unsupported("u32")
    }

    fn write_payload(&self, _ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
        Err(FieldError::Unsupported { what: "u32" })
    }

    fn read_payload(_ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
        Err(FieldError::Unsupported { what: "u32" })
    }
}

macro_rules! nullable_value {
    ($($ty:ty),* $(,)?) => {$(
        impl ParcelValue for Option<$ty> {
            fn declared() -> DeclaredType {
                <$ty as ParcelValue>::declared()
            }

            fn is_absent(&self) -> bool {
                self.is_none()
            }

            fn null() -> Option<Self> {
                Some(None)
            }

            fn gate_value(&self) -> Option<i64> {
                self.as_ref().and_then(|value| value.gate_value())
            }

            fn write_payload(&self, ctx: &mut EncodeContext<'_>) -> Result<(), FieldError> {
                self.as_ref()
                    .ok_or(FieldError::UnexpectedNull)?
                    .write_payload(ctx)
            }

            fn read_payload(ctx: &mut DecodeContext<'_, '_>) -> Result<Option<Self>, FieldError> {
                Ok(<$ty as ParcelValue>::read_payload(ctx)?.map(Some))
            }
        }
    )*};
}

nullable_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    Vec<u8>,
    Vec<Vec<u8>>,
    Vec<i32>,
    Vec<f32>,
    Vec<String>,
    Bundle,
    BinderHandle,
    Vec<i64>,
    u32,
);

/// A Rust type that can be an element of a typed list or map.
pub trait ListElement: Sized + Send + Sync + 'static {
    /// Shape of one element.
    fn declared() -> DeclaredType;

    /// The element as a generic value.
    fn to_value(&self) -> Value;

    /// Converts a decoded generic value back into the element type.
    fn from_value(value: Value) -> Result<Self, FieldError>;
}

macro_rules! list_element {
    ($ty:ty, $declared:expr, $variant:ident, $expected:literal) => {
        impl ListElement for $ty {
            fn declared() -> DeclaredType {
                $declared
            }

            fn to_value(&self) -> Value {
                Value::$variant(Clone::clone(self))
            }

            fn from_value(value: Value) -> Result<Self, FieldError> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    Value::Null => Err(FieldError::UnexpectedNull),
                    other => Err(FieldError::TypeMismatch {
                        expected: $expected,
                        found: other.kind_name(),
                    }),
                }
            }
        }
    };
}

list_element!(bool, DeclaredType::Bool, Bool, "bool");
list_element!(i8, DeclaredType::Byte, Byte, "byte");
list_element!(i16, DeclaredType::Short, Short, "short");
list_element!(i32, DeclaredType::Int, Int, "int");
list_element!(i64, DeclaredType::Long, Long, "long");
list_element!(f32, DeclaredType::Float, Float, "float");
list_element!(f64, DeclaredType::Double, Double, "double");
list_element!(String, DeclaredType::String, String, "string");
list_element!(Vec<u8>, DeclaredType::array(DeclaredType::Byte), ByteArray, "byte array");
list_element!(Vec<i32>, DeclaredType::array(DeclaredType::Int), IntArray, "int array");
list_element!(Vec<i64>, DeclaredType::array(DeclaredType::Long), LongArray, "long array");
list_element!(Vec<String>, DeclaredType::array(DeclaredType::String), StringArray, "string array");
list_element!(Bundle, DeclaredType::Bundle, Bundle, "bundle");
list_element!(BinderHandle, DeclaredType::Binder, Binder, "binder");

impl ListElement for Value {
    fn declared() -> DeclaredType {
        DeclaredType::Value
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self, FieldError> {
        Ok(value)
    }
}

/// Writes a list payload in the layout `kind` selects.
pub(crate) fn write_list<E: ListElement>(
    items: &[E],
    kind: SemanticType,
    ctx: &mut EncodeContext<'_>,
) -> Result<(), FieldError> {
    ctx.writer.write_len(items.len())?;
    for item in items {
        let value = item.to_value();
        if kind == SemanticType::List {
            write_value(&value, ctx.writer, 0, ctx.max_depth)?;
        } else {
            write_compact(kind, &value, ctx)?;
        }
    }
    Ok(())
}

/// Reads a list payload; a null list reads as empty.
pub(crate) fn read_list<E: ListElement>(
    kind: SemanticType,
    ctx: &mut DecodeContext<'_, '_>,
) -> Result<Vec<E>, FieldError> {
    let Some(count) = ctx.read_count()? else {
        return Ok(Vec::new());
    };
    let mut items = Vec::with_capacity(capacity_hint(count, ctx.reader.remaining(), 4));
    for _ in 0..count {
        let value = if kind == SemanticType::List {
            read_value(ctx.reader, ctx.limits, 0)?
        } else {
            read_compact(kind, ctx.reader)?
        };
        items.push(E::from_value(value)?);
    }
    Ok(items)
}

/// Writes a map payload: a count, then tagged keys and values.
pub(crate) fn write_map<'m, K, V>(
    entries: impl ExactSizeIterator<Item = (&'m K, &'m V)>,
    ctx: &mut EncodeContext<'_>,
) -> Result<(), FieldError>
where
    K: ListElement,
    V: ListElement,
{
    ctx.writer.write_len(entries.len())?;
    for (key, value) in entries {
        write_value(&key.to_value(), ctx.writer, 0, ctx.max_depth)?;
        write_value(&value.to_value(), ctx.writer, 0, ctx.max_depth)?;
    }
    Ok(())
}

/// Reads a map payload; a null map reads as empty and later keys win.
pub(crate) fn read_map<K, V>(ctx: &mut DecodeContext<'_, '_>) -> Result<Vec<(K, V)>, FieldError>
where
    K: ListElement,
    V: ListElement,
{
    let Some(count) = ctx.read_count()? else {
        return Ok(Vec::new());
    };
    let mut entries = Vec::with_capacity(capacity_hint(count, ctx.reader.remaining(), 8));
    for _ in 0..count {
        let key = K::from_value(read_value(ctx.reader, ctx.limits, 0)?)?;
        let value = V::from_value(read_value(ctx.reader, ctx.limits, 0)?)?;
        entries.push((key, value));
    }
    Ok(entries)
}

fn write_compact(
    kind: SemanticType,
    value: &Value,
    ctx: &mut EncodeContext<'_>,
) -> Result<(), FieldError> {
    match (kind, value) {
        (SemanticType::IntList, Value::Int(v)) => ctx.writer.write_i32(*v),
        (SemanticType::BoolList, Value::Bool(v)) => ctx.writer.write_bool(*v),
        (SemanticType::LongList, Value::Long(v)) => ctx.writer.write_i64(*v),
        (SemanticType::FloatList, Value::Float(v)) => ctx.writer.write_f32(*v),
        (SemanticType::DoubleList, Value::Double(v)) => ctx.writer.write_f64(*v),
        (SemanticType::StringList, Value::String(v)) => {
            ctx.writer.write_string16(Some(v.as_str()))?;
        }
        (kind, other) => {
            return Err(FieldError::TypeMismatch {
                expected: kind.name(),
                found: other.kind_name(),
            })
        }
    }
    Ok(())
}

fn read_compact(kind: SemanticType, reader: &mut ParcelReader<'_>) -> Result<Value, FieldError> {
    let value = match kind {
        SemanticType::IntList => Value::Int(reader.read_i32()?),
        SemanticType::BoolList => Value::Bool(reader.read_bool()?),
        SemanticType::LongList => Value::Long(reader.read_i64()?),
        SemanticType::FloatList => Value::Float(reader.read_f32()?),
        SemanticType::DoubleList => Value::Double(reader.read_f64()?),
        SemanticType::StringList => {
            Value::String(reader.read_string16()?.ok_or(FieldError::UnexpectedNull)?)
        }
        other => return Err(FieldError::Unsupported { what: other.name() }),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Report;
    use cursor::ParcelWriter;
    use wire::Limits;

    fn encode_with(f: impl FnOnce(&mut EncodeContext<'_>)) -> Vec<u8> {
        let mut writer = ParcelWriter::new();
        let mut report = Report::new();
        let mut ctx = EncodeContext::new(&mut writer, &mut report, 8);
        f(&mut ctx);
        writer.finish()
    }

    fn decode_with<R>(bytes: &[u8], f: impl FnOnce(&mut DecodeContext<'_, '_>) -> R) -> R {
        let mut reader = ParcelReader::new(bytes);
        let limits = Limits::for_testing();
        let mut report = Report::new();
        let mut ctx = DecodeContext::new(&mut reader, &limits, &mut report);
        f(&mut ctx)
    }

    #[test]
    fn byte_travels_as_a_word() {
        let bytes = encode_with(|ctx| (-3i8).write_payload(ctx).unwrap());
        assert_eq!(bytes, (-3i32).to_le_bytes().to_vec());
        let decoded = decode_with(&bytes, |ctx| i8::read_payload(ctx).unwrap());
        assert_eq!(decoded, Some(-3));
    }

    #[test]
    fn null_string_reads_as_none() {
        let bytes = (-1i32).to_le_bytes();
        let decoded = decode_with(&bytes, |ctx| String::read_payload(ctx).unwrap());
        assert_eq!(decoded, None);
        assert_eq!(<Option<String> as ParcelValue>::null(), Some(None));
        assert_eq!(<String as ParcelValue>::null(), None);
    }

    #[test]
    fn option_delegates_to_inner() {
        let value: Option<i32> = Some(42);
        assert!(!value.is_absent());
        assert_eq!(value.gate_value(), Some(42));
        assert!(None::<i32>.is_absent());
        let bytes = encode_with(|ctx| value.write_payload(ctx).unwrap());
        let decoded = decode_with(&bytes, |ctx| Option::<i32>::read_payload(ctx).unwrap());
        assert_eq!(decoded, Some(Some(42)));
    }

    #[test]
    fn compact_int_list_has_no_tags() {
        let items = vec![1i32, 2, 3];
        let bytes = encode_with(|ctx| write_list(&items, SemanticType::IntList, ctx).unwrap());
        assert_eq!(bytes.len(), 16);
        let decoded: Vec<i32> =
            decode_with(&bytes, |ctx| read_list(SemanticType::IntList, ctx).unwrap());
        assert_eq!(decoded, items);
    }

    #[test]
    fn generic_list_is_tagged() {
        let items = vec![1i32, 2];
        let bytes = encode_with(|ctx| write_list(&items, SemanticType::List, ctx).unwrap());
        // count + 2 * (tag + value)
        assert_eq!(bytes.len(), 20);
    }

    #[test]
    fn null_list_reads_as_empty() {
        let bytes = (-1i32).to_le_bytes();
        let decoded: Vec<String> =
            decode_with(&bytes, |ctx| read_list(SemanticType::StringList, ctx).unwrap());
        assert!(decoded.is_empty());
    }

    #[test]
    fn null_array_reads_as_empty() {
        let bytes = (-1i32).to_le_bytes();
        let ints = decode_with(&bytes, |ctx| Vec::<i32>::read_payload(ctx).unwrap());
        assert_eq!(ints, None);
        assert_eq!(<Vec<i32> as ParcelValue>::null(), Some(Vec::new()));
        assert_eq!(<Vec<u8> as ParcelValue>::null(), Some(Vec::new()));
        assert_eq!(<Vec<f32> as ParcelValue>::null(), Some(Vec::new()));
        assert_eq!(<Vec<String> as ParcelValue>::null(), Some(Vec::new()));
        assert_eq!(<Vec<Vec<u8>> as ParcelValue>::null(), Some(Vec::new()));
        assert_eq!(<Option<Vec<u8>> as ParcelValue>::null(), Some(None));
    }

    #[test]
    fn element_kind_mismatch_is_reported() {
        let err = i32::from_value(Value::from("nope")).unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                expected: "int",
                found: "string",
            }
        );
        assert_eq!(String::from_value(Value::Null), Err(FieldError::UnexpectedNull));
    }

    #[test]
    fn map_roundtrip_keeps_pairs() {
        let entries = std::collections::BTreeMap::from([
            ("a".to_string(), 1i64),
            ("b".to_string(), 2i64),
        ]);
        let bytes = encode_with(|ctx| write_map(entries.iter(), ctx).unwrap());
        let decoded: Vec<(String, i64)> = decode_with(&bytes, |ctx| read_map(ctx).unwrap());
        assert_eq!(decoded, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn unsupported_types_declare_themselves() {
        assert_eq!(<u32 as ParcelValue>::declared(), DeclaredType::Unsupported("u32"));
        assert_eq!(
            <Vec<i64> as ParcelValue>::declared(),
            DeclaredType::array(DeclaredType::Long)
        );
    }
}
