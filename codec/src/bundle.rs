//! String-keyed heterogeneous key/value blobs.

use std::collections::BTreeMap;

use cursor::{ParcelReader, ParcelWriter};
use wire::{Limits, BUNDLE_MAGIC};

use crate::context::check_elements;
use crate::error::FieldError;
use crate::value::{read_value, write_value, Value};

/// An ordered map from string keys to [`Value`]s.
///
/// On the wire a bundle frames itself:
/// `[i32 length][BNDL magic][i32 count][(string key, tagged value)...]`,
/// where `length` counts the bytes after the magic. The outer decoder treats
/// it as one atomic payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    entries: BTreeMap<String, Value>,
}

impl Bundle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous one for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub(crate) fn write(
        &self,
        writer: &mut ParcelWriter,
        level: usize,
        max_depth: usize,
    ) -> Result<(), FieldError> {
        let slot = writer.reserve_u32();
        writer.write_u32(BUNDLE_MAGIC);
        let start = writer.position();
        writer.write_len(self.entries.len())?;
        for (key, value) in &self.entries {
            writer.write_string16(Some(key.as_str()))?;
            write_value(value, writer, level, max_depth)?;
        }
        let length = writer.position() - start;
        let length = u32::try_from(length).map_err(|_| cursor::CursorError::LengthOverflow { length })?;
        writer.patch_u32(slot, length)?;
        Ok(())
    }

    /// Reads a bundle; a negative length is the null bundle.
    pub(crate) fn read(
        reader: &mut ParcelReader<'_>,
        limits: &Limits,
        level: usize,
    ) -> Result<Option<Self>, FieldError> {
        let Some(length) = reader.read_len()? else {
            return Ok(None);
        };
        let magic = reader.read_u32()?;
        if magic != BUNDLE_MAGIC {
            return Err(FieldError::InvalidBundle { found: magic });
        }
        let end = reader
            .position()
            .checked_add(length)
            .ok_or(cursor::CursorError::LengthOverflow { length })?;
        let entries = reader.with_limit(end, |reader| {
            let count = reader.read_len()?.unwrap_or(0);
            check_elements(limits, count)?;
            let mut entries = BTreeMap::new();
            for _ in 0..count {
                let key = reader.read_string16()?.ok_or(FieldError::UnexpectedNull)?;
                let value = read_value(reader, limits, level)?;
                entries.insert(key, value);
            }
            Ok::<_, FieldError>(entries)
        })?;
        reader.set_position(end)?;
        Ok(Some(Self { entries }))
    }
}

impl FromIterator<(String, Value)> for Bundle {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bundle {
        let mut bundle = Bundle::new();
        bundle.insert("account", "user@example.com");
        bundle.insert("count", 3);
        bundle.insert("enabled", true);
        bundle
    }

    #[test]
    fn bundle_layout_starts_with_length_and_magic() {
        let mut writer = ParcelWriter::new();
        sample().write(&mut writer, 1, 8).unwrap();
        let bytes = writer.finish();

        let length = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        assert_eq!(&bytes[4..8], b"BNDL");
        assert_eq!(length, bytes.len() - 8);
    }

    #[test]
    fn bundle_roundtrip() {
        let mut writer = ParcelWriter::new();
        let bundle = sample();
        bundle.write(&mut writer, 1, 8).unwrap();
        let bytes = writer.finish();

        let mut reader = ParcelReader::new(&bytes);
        let decoded = Bundle::read(&mut reader, &Limits::for_testing(), 1)
            .unwrap()
            .unwrap();
        assert_eq!(decoded, bundle);
        assert_eq!(decoded.get("count"), Some(&Value::Int(3)));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn null_bundle() {
        let bytes = (-1i32).to_le_bytes();
        let mut reader = ParcelReader::new(&bytes);
        assert_eq!(
            Bundle::read(&mut reader, &Limits::for_testing(), 1).unwrap(),
            None
        );
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut writer = ParcelWriter::new();
        writer.write_i32(4);
        writer.write_u32(0x1234_5678);
        writer.write_i32(0);
        let bytes = writer.finish();
        let mut reader = ParcelReader::new(&bytes);
        let err = Bundle::read(&mut reader, &Limits::for_testing(), 1).unwrap_err();
        assert_eq!(err, FieldError::InvalidBundle { found: 0x1234_5678 });
    }

    #[test]
    fn iteration_is_key_ordered() {
        let bundle = sample();
        let keys: Vec<&str> = bundle.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["account", "count", "enabled"]);
    }
}
