//! Tags for heterogeneous values in generic lists, maps and bundles.

use crate::error::{WireError, WireResult};

/// Magic word following a bundle's length prefix (`"BNDL"`).
pub const BUNDLE_MAGIC: u32 = 0x4C44_4E42;

/// Type tag written before every generic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(i32)]
pub enum ValueTag {
    Null = -1,
    String = 0,
    Int = 1,
    Map = 2,
    Bundle = 3,
    Parcelable = 4,
    Short = 5,
    Long = 6,
    Float = 7,
    Double = 8,
    Bool = 9,
    List = 11,
    ByteArray = 13,
    StringArray = 14,
    Binder = 15,
    IntArray = 18,
    LongArray = 19,
    Byte = 20,
}

impl ValueTag {
    /// Parses a tag from its wire value.
    pub fn parse(tag: i32) -> WireResult<Self> {
        match tag {
            -1 => Ok(Self::Null),
            0 => Ok(Self::String),
            1 => Ok(Self::Int),
            2 => Ok(Self::Map),
            3 => Ok(Self::Bundle),
            4 => Ok(Self::Parcelable),
            5 => Ok(Self::Short),
            6 => Ok(Self::Long),
            7 => Ok(Self::Float),
            8 => Ok(Self::Double),
            9 => Ok(Self::Bool),
            11 => Ok(Self::List),
            13 => Ok(Self::ByteArray),
            14 => Ok(Self::StringArray),
            15 => Ok(Self::Binder),
            18 => Ok(Self::IntArray),
            19 => Ok(Self::LongArray),
            20 => Ok(Self::Byte),
            _ => Err(WireError::UnknownValueTag { tag }),
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self as i32
    }
}
