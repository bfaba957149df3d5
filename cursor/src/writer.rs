//! Parcel writer with backpatchable length slots.

use crate::error::{CursorError, CursorResult};
use crate::{pad4, NULL_LENGTH};

/// A reserved 32-bit word that is filled in after the data it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    offset: usize,
}

impl Slot {
    /// Byte offset of the reserved word.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Offset of the first byte after the reserved word.
    #[must_use]
    pub const fn end(self) -> usize {
        self.offset + 4
    }
}

/// A growable writer for parcel primitives.
///
/// All values are little-endian and every primitive occupies a multiple of
/// four bytes, so the write position stays 4-byte aligned.
#[derive(Debug, Default, Clone)]
pub struct ParcelWriter {
    buf: Vec<u8>,
}

impl ParcelWriter {
    /// Creates a new empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new writer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
        }
    }

    /// Returns the current write position (number of bytes written).
    #[must_use]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a boolean as a 32-bit `0` or `1`.
    pub fn write_bool(&mut self, value: bool) {
        self.write_i32(i32::from(value));
    }

    /// Writes a length prefix, failing if `len` does not fit in an `i32`.
    pub fn write_len(&mut self, len: usize) -> CursorResult<()> {
        let len = i32::try_from(len).map_err(|_| CursorError::LengthOverflow { length: len })?;
        self.write_i32(len);
        Ok(())
    }

    /// Writes a length-prefixed byte array, padded to four bytes.
    ///
    /// `None` is written as the null marker `-1`.
    pub fn write_byte_array(&mut self, value: Option<&[u8]>) -> CursorResult<()> {
        let Some(bytes) = value else {
            self.write_i32(NULL_LENGTH);
            return Ok(());
        };
        self.write_len(bytes.len())?;
        self.write_padded(bytes);
        Ok(())
    }

    /// Writes a string as UTF-16LE code units with a NUL terminator.
    ///
    /// Layout: `[i32 units][units * u16][u16 0][padding to 4]`. `None` is
    /// written as the null marker `-1`.
    pub fn write_string16(&mut self, value: Option<&str>) -> CursorResult<()> {
        let Some(text) = value else {
            self.write_i32(NULL_LENGTH);
            return Ok(());
        };
        let units: Vec<u16> = text.encode_utf16().collect();
        self.write_len(units.len())?;
        let mut raw = Vec::with_capacity((units.len() + 1) * 2);
        for unit in units.iter().copied().chain(std::iter::once(0)) {
            raw.extend_from_slice(&unit.to_le_bytes());
        }
        self.write_padded(&raw);
        Ok(())
    }

    /// Appends raw bytes without a length prefix or padding.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Reserves a 32-bit word to be patched later.
    pub fn reserve_u32(&mut self) -> Slot {
        let offset = self.buf.len();
        self.write_u32(0);
        Slot { offset }
    }

    /// Fills a previously reserved word.
    pub fn patch_u32(&mut self, slot: Slot, value: u32) -> CursorResult<()> {
        let len = self.buf.len();
        let target = self
            .buf
            .get_mut(slot.offset..slot.end())
            .ok_or(CursorError::InvalidSlot {
                offset: slot.offset,
                len,
            })?;
        target.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Discards everything written after `position`.
    ///
    /// Used to roll back a partially written entry.
    pub fn truncate(&mut self, position: usize) {
        self.buf.truncate(position);
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Finishes writing and appends to the provided buffer.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        buf.append(&mut self.buf);
    }

    fn write_padded(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        let padding = pad4(bytes.len()) - bytes.len();
        self.buf.resize(self.buf.len() + padding, 0);
    }
}
