//! Whole-buffer helpers.

use cursor::{ParcelReader, ParcelWriter};

use crate::decoder::decode;
use crate::encoder::encode;
use crate::error::CodecResult;
use crate::parcelable::Parcelable;

/// Encodes `value` into a new buffer.
pub fn to_bytes<T: Parcelable>(value: &T) -> CodecResult<Vec<u8>> {
    let mut writer = ParcelWriter::new();
    encode(value, &mut writer)?;
    Ok(writer.finish())
}

/// Decodes one object of type `T` from the start of `bytes`.
pub fn from_bytes<T: Parcelable>(bytes: &[u8]) -> CodecResult<T> {
    let mut reader = ParcelReader::new(bytes);
    decode(&mut reader)
}
