//! Parcel reader with bounded, limit-aware operations.

use crate::error::{CursorError, CursorResult};
use crate::{pad4, NULL_LENGTH};

/// A reader for parcel primitives.
///
/// The reader tracks a `position` and a `limit`; `position <= limit` always
/// holds and no read ever advances past the limit. Nested regions narrow the
/// limit with [`with_limit`](Self::with_limit). The reader never panics on
/// malformed input.
#[derive(Debug)]
pub struct ParcelReader<'a> {
    data: &'a [u8],
    pos: usize,
    limit: usize,
}

impl<'a> ParcelReader<'a> {
    /// Creates a new `ParcelReader` over a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            limit: data.len(),
        }
    }

    /// Returns the total length of the underlying buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the current read position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the active limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of bytes left before the limit.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.pos)
    }

    /// Moves the cursor to an absolute position within `0..=limit`.
    pub fn set_position(&mut self, position: usize) -> CursorResult<()> {
        if position > self.limit {
            return Err(CursorError::PositionOutOfBounds {
                position,
                limit: self.limit,
            });
        }
        self.pos = position;
        Ok(())
    }

    /// Advances the cursor by `bytes`.
    pub fn skip(&mut self, bytes: usize) -> CursorResult<()> {
        self.ensure(bytes)?;
        self.pos += bytes;
        Ok(())
    }

    /// Runs `f` with the limit narrowed to `end`, restoring it afterwards.
    ///
    /// Fails if `end` lies outside `position..=limit`.
    pub fn with_limit<R, E, F>(&mut self, end: usize, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Self) -> Result<R, E>,
        E: From<CursorError>,
    {
        if end > self.limit {
            return Err(CursorError::LimitExceeded {
                requested: end,
                limit: self.limit,
            }
            .into());
        }
        if end < self.pos {
            return Err(CursorError::PositionOutOfBounds {
                position: self.pos,
                limit: end,
            }
            .into());
        }
        let saved = self.limit;
        self.limit = end;
        let result = f(self);
        self.limit = saved;
        result
    }

    pub fn read_i32(&mut self) -> CursorResult<i32> {
        Ok(i32::from_le_bytes(self.read_array::<4>()?))
    }

    pub fn read_u32(&mut self) -> CursorResult<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    pub fn read_i64(&mut self) -> CursorResult<i64> {
        Ok(i64::from_le_bytes(self.read_array::<8>()?))
    }

    pub fn read_u64(&mut self) -> CursorResult<u64> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    pub fn read_f32(&mut self) -> CursorResult<f32> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    pub fn read_f64(&mut self) -> CursorResult<f64> {
        Ok(f64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a 32-bit boolean; any non-zero value is `true`.
    pub fn read_bool(&mut self) -> CursorResult<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// Reads a length prefix; the null marker `-1` yields `None`.
    pub fn read_len(&mut self) -> CursorResult<Option<usize>> {
        let length = self.read_i32()?;
        if length == NULL_LENGTH {
            return Ok(None);
        }
        usize::try_from(length)
            .map(Some)
            .map_err(|_| CursorError::InvalidLength { length })
    }

    /// Reads a length-prefixed, padded byte array.
    pub fn read_byte_array(&mut self) -> CursorResult<Option<Vec<u8>>> {
        let Some(len) = self.read_len()? else {
            return Ok(None);
        };
        let bytes = self.read_padded(len)?;
        Ok(Some(bytes.to_vec()))
    }

    /// Reads a UTF-16 string written by
    /// [`ParcelWriter::write_string16`](crate::ParcelWriter::write_string16).
    pub fn read_string16(&mut self) -> CursorResult<Option<String>> {
        let Some(units) = self.read_len()? else {
            return Ok(None);
        };
        let byte_len = units
            .checked_add(1)
            .and_then(|n| n.checked_mul(2))
            .ok_or(CursorError::LengthOverflow { length: units })?;
        let raw = self.read_padded(byte_len)?;
        let decoded: Vec<u16> = raw[..units * 2]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&decoded)
            .map(Some)
            .map_err(|_| CursorError::InvalidUtf16)
    }

    /// Returns the next `len` bytes without interpretation.
    pub fn read_raw(&mut self, len: usize) -> CursorResult<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_padded(&mut self, len: usize) -> CursorResult<&'a [u8]> {
        let padded = pad4(len);
        self.ensure(padded)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += padded;
        Ok(bytes)
    }

    fn ensure(&self, bytes: usize) -> CursorResult<()> {
        let available = self.remaining();
        if bytes > available {
            return Err(CursorError::UnexpectedEof {
                requested: bytes,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> CursorResult<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}
