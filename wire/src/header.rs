//! Field headers and object framing.
//!
//! Every field starts with a 32-bit header word: the low half is the field
//! id, the high half is either the payload size or the escape `0xFFFF`, in
//! which case an explicit u32 size follows. Objects are framed by a header
//! whose id is [`OBJECT_MAGIC`], followed by the size of the field region.

use cursor::{CursorError, ParcelReader, ParcelWriter, Slot};

use crate::error::{CorruptionError, WireResult};

/// Id carried by the header word that opens every object.
pub const OBJECT_MAGIC: u16 = 0x4F45;

/// High-half marker meaning "an explicit u32 size follows".
pub const SIZE_ESCAPE: u16 = 0xFFFF;

/// Largest usable field id. `0xFFFF` collides with the size escape.
pub const MAX_FIELD_ID: u16 = 0xFFFE;

const ESCAPE_MASK: u32 = 0xFFFF_0000;

/// How a field's payload length is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldFormat {
    /// The size is packed into the header word (scalars and null markers).
    Fixed,
    /// The size follows the header word as an explicit u32.
    Delimited,
}

/// A decoded field header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHeader {
    /// Raw header word as read from the wire.
    pub word: u32,
    /// Field id.
    pub id: u16,
    /// Payload size in bytes.
    pub size: usize,
    /// Size encoding used by the producer.
    pub format: FieldFormat,
    /// Offset of the first payload byte.
    pub payload_start: usize,
}

impl FieldHeader {
    /// Offset of the first byte after the payload.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.payload_start.saturating_add(self.size)
    }

    /// Returns `true` for the size-0 marker used by absent nullable values.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.size == 0
    }
}

/// An open delimited field awaiting its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an open field must be closed with finish_field"]
pub struct FieldMark {
    id: u16,
    slot: Slot,
}

impl FieldMark {
    #[must_use]
    pub const fn id(self) -> u16 {
        self.id
    }

    /// Offset of the first payload byte.
    #[must_use]
    pub const fn payload_start(self) -> usize {
        self.slot.end()
    }
}

/// An open object awaiting its total size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an open object must be closed with finish_object"]
pub struct ObjectMark {
    start: usize,
    slot: Slot,
}

impl ObjectMark {
    /// Offset of the object header word.
    #[must_use]
    pub const fn start(self) -> usize {
        self.start
    }
}

/// Writes a header for a payload of known size.
pub fn write_field_header(writer: &mut ParcelWriter, id: u16, size: usize) -> WireResult<()> {
    let size32 = u32::try_from(size).map_err(|_| CursorError::LengthOverflow { length: size })?;
    if size32 < u32::from(SIZE_ESCAPE) {
        writer.write_u32((size32 << 16) | u32::from(id));
    } else {
        writer.write_u32(ESCAPE_MASK | u32::from(id));
        writer.write_u32(size32);
    }
    Ok(())
}

/// Writes the size-0 header that marks an absent nullable value.
pub fn write_null_field(writer: &mut ParcelWriter, id: u16) {
    writer.write_u32(u32::from(id));
}

/// Opens a delimited field whose size is patched by [`finish_field`].
pub fn begin_field(writer: &mut ParcelWriter, id: u16) -> FieldMark {
    writer.write_u32(ESCAPE_MASK | u32::from(id));
    let slot = writer.reserve_u32();
    FieldMark { id, slot }
}

/// Closes a delimited field, patching the payload size.
pub fn finish_field(writer: &mut ParcelWriter, mark: FieldMark) -> WireResult<()> {
    patch_extent(writer, mark.slot)
}

/// Opens an object frame whose size is patched by [`finish_object`].
pub fn begin_object(writer: &mut ParcelWriter) -> ObjectMark {
    let start = writer.position();
    writer.write_u32(ESCAPE_MASK | u32::from(OBJECT_MAGIC));
    let slot = writer.reserve_u32();
    ObjectMark { start, slot }
}

/// Closes an object frame, patching the size of its field region.
pub fn finish_object(writer: &mut ParcelWriter, mark: ObjectMark) -> WireResult<()> {
    patch_extent(writer, mark.slot)
}

fn patch_extent(writer: &mut ParcelWriter, slot: Slot) -> WireResult<()> {
    let size = writer.position().saturating_sub(slot.end());
    let size = u32::try_from(size).map_err(|_| CursorError::LengthOverflow { length: size })?;
    writer.patch_u32(slot, size)?;
    Ok(())
}

/// Reads a field header.
///
/// A buffer that ends inside the header is reported as
/// [`CorruptionError::Overread`]: the enclosing frame promised more bytes.
pub fn read_field_header(reader: &mut ParcelReader<'_>) -> WireResult<FieldHeader> {
    let word = reader.read_u32().map_err(|err| truncated(reader, err))?;
    let id = (word & 0xFFFF) as u16;
    let high = (word >> 16) as u16;
    let (size, format) = if high == SIZE_ESCAPE {
        let size = reader.read_u32().map_err(|err| truncated(reader, err))?;
        (size as usize, FieldFormat::Delimited)
    } else {
        (usize::from(high), FieldFormat::Fixed)
    };
    Ok(FieldHeader {
        word,
        id,
        size,
        format,
        payload_start: reader.position(),
    })
}

/// Reads an object header and returns the offset where its field region ends.
pub fn read_object_header(reader: &mut ParcelReader<'_>) -> WireResult<usize> {
    let header = read_field_header(reader)?;
    if header.id != OBJECT_MAGIC {
        return Err(CorruptionError::InvalidObjectHeader { found: header.word }.into());
    }
    let end = header.end();
    if end > reader.limit() {
        return Err(CorruptionError::Overread {
            end,
            limit: reader.limit(),
        }
        .into());
    }
    Ok(end)
}

/// Skips a field's payload.
pub fn skip_field(reader: &mut ParcelReader<'_>, header: &FieldHeader) -> WireResult<()> {
    let end = header.end();
    if end > reader.limit() {
        return Err(CorruptionError::Overread {
            end,
            limit: reader.limit(),
        }
        .into());
    }
    reader.set_position(end)?;
    Ok(())
}

fn truncated(reader: &ParcelReader<'_>, err: CursorError) -> crate::WireError {
    match err {
        CursorError::UnexpectedEof { requested, .. } => CorruptionError::Overread {
            end: reader.position() + requested,
            limit: reader.limit(),
        }
        .into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WireError;

    #[test]
    fn small_header_packs_size() {
        let mut writer = ParcelWriter::new();
        write_field_header(&mut writer, 2, 4).unwrap();
        assert_eq!(writer.finish(), 0x0004_0002u32.to_le_bytes().to_vec());
    }

    #[test]
    fn large_header_uses_escape() {
        let mut writer = ParcelWriter::new();
        write_field_header(&mut writer, 7, 0x1_0000).unwrap();
        let bytes = writer.finish();
        assert_eq!(&bytes[..4], &0xFFFF_0007u32.to_le_bytes());
        assert_eq!(&bytes[4..], &0x1_0000u32.to_le_bytes());

        let mut reader = ParcelReader::new(&bytes);
        let header = read_field_header(&mut reader).unwrap();
        assert_eq!(header.id, 7);
        assert_eq!(header.size, 0x1_0000);
        assert_eq!(header.format, FieldFormat::Delimited);
    }

    #[test]
    fn size_at_escape_boundary_is_delimited() {
        let mut writer = ParcelWriter::new();
        write_field_header(&mut writer, 1, 0xFFFF).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn null_field_has_zero_size() {
        let mut writer = ParcelWriter::new();
        write_null_field(&mut writer, 9);
        let bytes = writer.finish();
        let mut reader = ParcelReader::new(&bytes);
        let header = read_field_header(&mut reader).unwrap();
        assert!(header.is_null());
        assert_eq!(header.format, FieldFormat::Fixed);
    }

    #[test]
    fn delimited_field_backpatch() {
        let mut writer = ParcelWriter::new();
        let mark = begin_field(&mut writer, 3);
        writer.write_i64(1);
        finish_field(&mut writer, mark).unwrap();
        let bytes = writer.finish();

        let mut reader = ParcelReader::new(&bytes);
        let header = read_field_header(&mut reader).unwrap();
        assert_eq!(header.id, 3);
        assert_eq!(header.size, 8);
        assert_eq!(header.end(), bytes.len());
    }

    #[test]
    fn object_frame_roundtrip() {
        let mut writer = ParcelWriter::new();
        let mark = begin_object(&mut writer);
        write_field_header(&mut writer, 1, 4).unwrap();
        writer.write_i32(10);
        finish_object(&mut writer, mark).unwrap();
        let bytes = writer.finish();
        assert_eq!(&bytes[..4], &0xFFFF_4F45u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &8u32.to_le_bytes());

        let mut reader = ParcelReader::new(&bytes);
        let end = read_object_header(&mut reader).unwrap();
        assert_eq!(end, 16);
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn object_header_rejects_wrong_magic() {
        let mut writer = ParcelWriter::new();
        write_field_header(&mut writer, 1, 4).unwrap();
        writer.write_i32(0);
        let bytes = writer.finish();
        let mut reader = ParcelReader::new(&bytes);
        let err = read_object_header(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            WireError::Corruption(CorruptionError::InvalidObjectHeader { found: 0x0004_0001 })
        ));
    }

    #[test]
    fn object_header_detects_truncation() {
        let mut writer = ParcelWriter::new();
        let mark = begin_object(&mut writer);
        writer.write_i64(0);
        finish_object(&mut writer, mark).unwrap();
        let bytes = writer.finish();

        let mut reader = ParcelReader::new(&bytes[..12]);
        let err = read_object_header(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            WireError::Corruption(CorruptionError::Overread { end: 16, limit: 12 })
        ));
    }

    #[test]
    fn truncated_header_is_overread() {
        let bytes = 0xFFFF_0001u32.to_le_bytes();
        let mut reader = ParcelReader::new(&bytes);
        let err = read_field_header(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            WireError::Corruption(CorruptionError::Overread { .. })
        ));
    }

    #[test]
    fn skip_field_past_limit_is_overread() {
        let mut writer = ParcelWriter::new();
        write_field_header(&mut writer, 1, 8).unwrap();
        writer.write_i32(0);
        let bytes = writer.finish();
        let mut reader = ParcelReader::new(&bytes);
        let header = read_field_header(&mut reader).unwrap();
        assert!(skip_field(&mut reader, &header).is_err());
    }
}
