//! Heterogeneous values carried by generic lists, maps and bundles.
//!
//! Every value is written as an i32 [`ValueTag`] followed by its payload.
//! Containers recurse; nesting is bounded by [`Limits::max_depth`].

use cursor::{ParcelReader, ParcelWriter};
use wire::{LimitKind, Limits, ValueTag};

use crate::binder::BinderHandle;
use crate::bundle::Bundle;
use crate::context::{capacity_hint, check_elements};
use crate::error::FieldError;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Int(i32),
    Map(Vec<(Value, Value)>),
    Bundle(Bundle),
    Short(i16),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    List(Vec<Value>),
    ByteArray(Vec<u8>),
    StringArray(Vec<String>),
    Binder(BinderHandle),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    Byte(i8),
}

impl Value {
    /// The tag written before this value.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Null => ValueTag::Null,
            Self::String(_) => ValueTag::String,
            Self::Int(_) => ValueTag::Int,
            Self::Map(_) => ValueTag::Map,
            Self::Bundle(_) => ValueTag::Bundle,
            Self::Short(_) => ValueTag::Short,
            Self::Long(_) => ValueTag::Long,
            Self::Float(_) => ValueTag::Float,
            Self::Double(_) => ValueTag::Double,
            Self::Bool(_) => ValueTag::Bool,
            Self::List(_) => ValueTag::List,
            Self::ByteArray(_) => ValueTag::ByteArray,
            Self::StringArray(_) => ValueTag::StringArray,
            Self::Binder(_) => ValueTag::Binder,
            Self::IntArray(_) => ValueTag::IntArray,
            Self::LongArray(_) => ValueTag::LongArray,
            Self::Byte(_) => ValueTag::Byte,
        }
    }

    /// Short name of the value kind, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Map(_) => "map",
            Self::Bundle(_) => "bundle",
            Self::Short(_) => "short",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::List(_) => "list",
            Self::ByteArray(_) => "byte array",
            Self::StringArray(_) => "string array",
            Self::Binder(_) => "binder",
            Self::IntArray(_) => "int array",
            Self::LongArray(_) => "long array",
            Self::Byte(_) => "byte",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<Bundle> for Value {
    fn from(value: Bundle) -> Self {
        Self::Bundle(value)
    }
}

pub(crate) fn enter(level: usize, max_depth: usize) -> Result<usize, FieldError> {
    let next = level + 1;
    if next > max_depth {
        return Err(FieldError::LimitsExceeded {
            kind: LimitKind::Depth,
            limit: max_depth,
            actual: next,
        });
    }
    Ok(next)
}

/// Writes a tagged value.
pub(crate) fn write_value(
    value: &Value,
    writer: &mut ParcelWriter,
    level: usize,
    max_depth: usize,
) -> Result<(), FieldError> {
    writer.write_i32(value.tag().raw());
    match value {
        Value::Null => {}
        Value::String(text) => writer.write_string16(Some(text.as_str()))?,
        Value::Int(v) => writer.write_i32(*v),
        Value::Map(entries) => {
            let level = enter(level, max_depth)?;
            writer.write_len(entries.len())?;
            for (key, item) in entries {
                write_value(key, writer, level, max_depth)?;
                write_value(item, writer, level, max_depth)?;
            }
        }
        Value::Bundle(bundle) => bundle.write(writer, enter(level, max_depth)?, max_depth)?,
        Value::Short(v) => writer.write_i32(i32::from(*v)),
        Value::Long(v) => writer.write_i64(*v),
        Value::Float(v) => writer.write_f32(*v),
        Value::Double(v) => writer.write_f64(*v),
        Value::Bool(v) => writer.write_bool(*v),
        Value::List(items) => {
            let level = enter(level, max_depth)?;
            writer.write_len(items.len())?;
            for item in items {
                write_value(item, writer, level, max_depth)?;
            }
        }
        Value::ByteArray(bytes) => writer.write_byte_array(Some(bytes.as_slice()))?,
        Value::StringArray(items) => write_string_array(writer, items)?,
        Value::Binder(handle) => handle.write(writer),
        Value::IntArray(items) => write_int_array(writer, items)?,
        Value::LongArray(items) => {
            writer.write_len(items.len())?;
            for item in items {
                writer.write_i64(*item);
            }
        }
        Value::Byte(v) => writer.write_i32(i32::from(*v)),
    }
    Ok(())
}

/// Reads a tagged value.
pub(crate) fn read_value(
    reader: &mut ParcelReader<'_>,
    limits: &Limits,
    level: usize,
) -> Result<Value, FieldError> {
    let tag = ValueTag::parse(reader.read_i32()?)?;
    let value = match tag {
        ValueTag::Null => Value::Null,
        ValueTag::String => Value::String(
            reader
                .read_string16()?
                .ok_or(FieldError::UnexpectedNull)?,
        ),
        ValueTag::Int => Value::Int(reader.read_i32()?),
        ValueTag::Map => {
            let level = enter(level, limits.max_depth)?;
            let count = read_count(reader, limits)?;
            let mut entries = Vec::with_capacity(capacity_hint(count, reader.remaining(), 8));
            for _ in 0..count {
                let key = read_value(reader, limits, level)?;
                let item = read_value(reader, limits, level)?;
                entries.push((key, item));
            }
            Value::Map(entries)
        }
        ValueTag::Bundle => {
            let level = enter(level, limits.max_depth)?;
            Bundle::read(reader, limits, level)?.map_or(Value::Null, Value::Bundle)
        }
        ValueTag::Parcelable => {
            return Err(FieldError::Unsupported {
                what: "a parcelable inside a generic value",
            })
        }
        ValueTag::Short => Value::Short(narrow_i16(reader.read_i32()?)),
        ValueTag::Long => Value::Long(reader.read_i64()?),
        ValueTag::Float => Value::Float(reader.read_f32()?),
        ValueTag::Double => Value::Double(reader.read_f64()?),
        ValueTag::Bool => Value::Bool(reader.read_bool()?),
        ValueTag::List => {
            let level = enter(level, limits.max_depth)?;
            let count = read_count(reader, limits)?;
            let mut items = Vec::with_capacity(capacity_hint(count, reader.remaining(), 4));
            for _ in 0..count {
                items.push(read_value(reader, limits, level)?);
            }
            Value::List(items)
        }
        ValueTag::ByteArray => reader.read_byte_array()?.map_or(Value::Null, Value::ByteArray),
        ValueTag::StringArray => read_string_array(reader, limits)?.map_or(Value::Null, Value::StringArray),
        ValueTag::Binder => Value::Binder(BinderHandle::read(reader)?),
        ValueTag::IntArray => read_int_array(reader, limits)?.map_or(Value::Null, Value::IntArray),
        ValueTag::LongArray => match reader.read_len()? {
            None => Value::Null,
            Some(count) => {
                check_elements(limits, count)?;
                let mut items = Vec::with_capacity(capacity_hint(count, reader.remaining(), 8));
                for _ in 0..count {
                    items.push(reader.read_i64()?);
                }
                Value::LongArray(items)
            }
        },
        ValueTag::Byte => Value::Byte(narrow_i8(reader.read_i32()?)),
        _ => {
            return Err(FieldError::Unsupported {
                what: "an unrecognised value tag",
            })
        }
    };
    Ok(value)
}

/// Reads a container count; a null container reads as empty.
fn read_count(reader: &mut ParcelReader<'_>, limits: &Limits) -> Result<usize, FieldError> {
    let count = reader.read_len()?.unwrap_or(0);
    check_elements(limits, count)?;
    Ok(count)
}

pub(crate) fn write_string_array(writer: &mut ParcelWriter, items: &[String]) -> Result<(), FieldError> {
    writer.write_len(items.len())?;
    for item in items {
        writer.write_string16(Some(item.as_str()))?;
    }
    Ok(())
}

pub(crate) fn read_string_array(
    reader: &mut ParcelReader<'_>,
    limits: &Limits,
) -> Result<Option<Vec<String>>, FieldError> {
    let Some(count) = reader.read_len()? else {
        return Ok(None);
    };
    check_elements(limits, count)?;
    let mut items = Vec::with_capacity(capacity_hint(count, reader.remaining(), 4));
    for _ in 0..count {
        items.push(reader.read_string16()?.ok_or(FieldError::UnexpectedNull)?);
    }
    Ok(Some(items))
}

pub(crate) fn write_int_array(writer: &mut ParcelWriter, items: &[i32]) -> Result<(), FieldError> {
    writer.write_len(items.len())?;
    for item in items {
        writer.write_i32(*item);
    }
    Ok(())
}

pub(crate) fn read_int_array(
    reader: &mut ParcelReader<'_>,
    limits: &Limits,
) -> Result<Option<Vec<i32>>, FieldError> {
    let Some(count) = reader.read_len()? else {
        return Ok(None);
    };
    check_elements(limits, count)?;
    let mut items = Vec::with_capacity(capacity_hint(count, reader.remaining(), 4));
    for _ in 0..count {
        items.push(reader.read_i32()?);
    }
    Ok(Some(items))
}

// Short and byte values travel widened to 32 bits; the platform narrows them
// by truncation on the way back.
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn narrow_i16(value: i32) -> i16 {
    value as i16
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn narrow_i8(value: i32) -> i8 {
    value as i8
}
