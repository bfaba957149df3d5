//! Declared field shapes and their mapping to semantic types.

use std::any::{type_name, TypeId};
use std::fmt;

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldOptions;
use crate::semantic::SemanticType;

/// Identity of a described type.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeRef {
    #[cfg_attr(feature = "serde", serde(skip))]
    type_id: TypeId,
    name: &'static str,
}

impl TypeRef {
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeRef {}

impl std::hash::Hash for TypeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

/// The shape a Rust field declares, before it is mapped to a wire kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DeclaredType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Array(Box<DeclaredType>),
    List(Box<DeclaredType>),
    Map(Box<DeclaredType>, Box<DeclaredType>),
    Object(TypeRef),
    Bundle,
    Binder,
    /// An interface proxy identified by its descriptor string.
    Interface(&'static str),
    /// A heterogeneous value resolved at run time.
    Value,
    /// A Rust type with no representation in the format.
    Unsupported(&'static str),
}

impl DeclaredType {
    #[must_use]
    pub fn array(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// The described type nested anywhere inside this shape, if any.
    #[must_use]
    pub fn element_hint(&self) -> Option<TypeRef> {
        match self {
            Self::Object(ty) => Some(*ty),
            Self::Array(inner) | Self::List(inner) => inner.element_hint(),
            Self::Map(_, value) => value.element_hint(),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Byte => f.write_str("byte"),
            Self::Short => f.write_str("short"),
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::String => f.write_str("string"),
            Self::Array(inner) => write!(f, "array<{inner}>"),
            Self::List(inner) => write!(f, "list<{inner}>"),
            Self::Map(key, value) => write!(f, "map<{key}, {value}>"),
            Self::Object(ty) => f.write_str(ty.name()),
            Self::Bundle => f.write_str("bundle"),
            Self::Binder => f.write_str("binder"),
            Self::Interface(descriptor) => write!(f, "interface {descriptor}"),
            Self::Value => f.write_str("value"),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}

/// Maps a declared shape plus its field options to a semantic type.
///
/// Arrays of byte, byte array, int, float, string and objects have dedicated
/// kinds. Lists of strings and of objects use their framed kinds unless the
/// field asks for generic value encoding; lists of numbers and booleans use
/// the compact kinds only when the field opts into direct lists. Every other
/// list is a generic value list.
pub fn resolve(declared: &DeclaredType, options: &FieldOptions) -> SchemaResult<SemanticType> {
    let semantic = match declared {
        DeclaredType::Bool => SemanticType::Bool,
        DeclaredType::Byte => SemanticType::Byte,
        DeclaredType::Short => SemanticType::Short,
        DeclaredType::Int => SemanticType::Int,
        DeclaredType::Long => SemanticType::Long,
        DeclaredType::Float => SemanticType::Float,
        DeclaredType::Double => SemanticType::Double,
        DeclaredType::String => SemanticType::String,
        DeclaredType::Object(_) => SemanticType::Object,
        DeclaredType::Bundle => SemanticType::Bundle,
        DeclaredType::Binder => SemanticType::Binder,
        DeclaredType::Interface(_) => SemanticType::Interface,
        DeclaredType::Map(key, value) => {
            check_generic(key)?;
            if !matches!(value.as_ref(), DeclaredType::Object(_)) {
                check_generic(value)?;
            }
            SemanticType::Map
        }
        DeclaredType::Array(element) => match element.as_ref() {
            DeclaredType::Byte => SemanticType::ByteArray,
            DeclaredType::Array(inner) if **inner == DeclaredType::Byte => {
                SemanticType::ByteArrayArray
            }
            DeclaredType::Int => SemanticType::IntArray,
            DeclaredType::Float => SemanticType::FloatArray,
            DeclaredType::String => SemanticType::StringArray,
            DeclaredType::Object(_) => SemanticType::ObjectArray,
            _ => return Err(unsupported(declared)),
        },
        DeclaredType::List(element) => resolve_list(declared, element, options)?,
        DeclaredType::Value | DeclaredType::Unsupported(_) => return Err(unsupported(declared)),
    };
    Ok(semantic)
}

fn resolve_list(
    declared: &DeclaredType,
    element: &DeclaredType,
    options: &FieldOptions,
) -> SchemaResult<SemanticType> {
    if options.direct_list {
        let compact = match element {
            DeclaredType::Int => Some(SemanticType::IntList),
            DeclaredType::Bool => Some(SemanticType::BoolList),
            DeclaredType::Long => Some(SemanticType::LongList),
            DeclaredType::Float => Some(SemanticType::FloatList),
            DeclaredType::Double => Some(SemanticType::DoubleList),
            DeclaredType::String => Some(SemanticType::StringList),
            _ => None,
        };
        if let Some(kind) = compact {
            return Ok(kind);
        }
    }
    match element {
        DeclaredType::Object(_) if !options.direct_encoding => Ok(SemanticType::ObjectList),
        DeclaredType::Object(_) => Ok(SemanticType::List),
        DeclaredType::String if !options.direct_encoding => Ok(SemanticType::StringList),
        other => {
            check_generic(other).map_err(|_| unsupported(declared))?;
            Ok(SemanticType::List)
        }
    }
}

/// Checks that a shape can travel as a tagged generic value.
fn check_generic(declared: &DeclaredType) -> SchemaResult<()> {
    match declared {
        DeclaredType::Bool
        | DeclaredType::Byte
        | DeclaredType::Short
        | DeclaredType::Int
        | DeclaredType::Long
        | DeclaredType::Float
        | DeclaredType::Double
        | DeclaredType::String
        | DeclaredType::Bundle
        | DeclaredType::Binder
        | DeclaredType::Value => Ok(()),
        DeclaredType::Array(element) => match element.as_ref() {
            DeclaredType::Byte | DeclaredType::Int | DeclaredType::Long | DeclaredType::String => {
                Ok(())
            }
            _ => Err(unsupported(declared)),
        },
        DeclaredType::List(element) => check_generic(element),
        DeclaredType::Map(key, value) => {
            check_generic(key)?;
            check_generic(value)
        }
        DeclaredType::Object(_) | DeclaredType::Interface(_) | DeclaredType::Unsupported(_) => {
            Err(unsupported(declared))
        }
    }
}

fn unsupported(declared: &DeclaredType) -> SchemaError {
    SchemaError::UnsupportedType {
        declared: declared.to_string(),
    }
}
