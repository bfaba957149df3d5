//! Structural walk over an encoded object without a schema.

use cursor::ParcelReader;

use crate::error::{LimitKind, WireError, WireResult};
use crate::header::{read_field_header, read_object_header, skip_field, FieldFormat, OBJECT_MAGIC};
use crate::limits::Limits;

const OBJECT_WORD: u32 = 0xFFFF_0000 | OBJECT_MAGIC as u32;

/// Layout of one object frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLayout {
    /// Offset of the object header word.
    pub offset: usize,
    /// Size of the field region in bytes.
    pub size: usize,
    /// Offset just past the field region.
    pub end: usize,
    /// Fields in wire order.
    pub fields: Vec<FieldLayout>,
}

/// Layout of one field entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub id: u16,
    /// Offset of the field header word.
    pub offset: usize,
    pub payload_offset: usize,
    pub size: usize,
    pub format: FieldFormat,
    /// Set when the payload is itself an object frame.
    pub nested: Option<ObjectLayout>,
}

/// Walks the object at the start of `bytes` and records its field layout.
pub fn scan_object(bytes: &[u8], limits: &Limits) -> WireResult<ObjectLayout> {
    if bytes.len() > limits.max_object_bytes {
        return Err(WireError::LimitsExceeded {
            kind: LimitKind::ObjectBytes,
            limit: limits.max_object_bytes,
            actual: bytes.len(),
        });
    }
    let mut reader = ParcelReader::new(bytes);
    scan_frame(bytes, &mut reader, limits, 0)
}

fn scan_frame(
    bytes: &[u8],
    reader: &mut ParcelReader<'_>,
    limits: &Limits,
    depth: usize,
) -> WireResult<ObjectLayout> {
    if depth >= limits.max_depth {
        return Err(WireError::LimitsExceeded {
            kind: LimitKind::Depth,
            limit: limits.max_depth,
            actual: depth + 1,
        });
    }
    let offset = reader.position();
    let end = read_object_header(reader)?;
    let size = end - reader.position();
    let mut fields = Vec::new();

    reader.with_limit(end, |r| {
        while r.position() < end {
            if fields.len() >= limits.max_elements {
                return Err(WireError::LimitsExceeded {
                    kind: LimitKind::Elements,
                    limit: limits.max_elements,
                    actual: fields.len() + 1,
                });
            }
            let field_offset = r.position();
            let header = read_field_header(r)?;
            let nested = if header.format == FieldFormat::Delimited && starts_object(bytes, header.payload_start) {
                let field_end = header.end().min(end);
                match r.with_limit(field_end, |inner| scan_frame(bytes, inner, limits, depth + 1)) {
                    Ok(layout) => Some(layout),
                    Err(err @ WireError::LimitsExceeded { .. }) => return Err(err),
                    Err(_) => None,
                }
            } else {
                None
            };
            skip_field(r, &header)?;
            fields.push(FieldLayout {
                id: header.id,
                offset: field_offset,
                payload_offset: header.payload_start,
                size: header.size,
                format: header.format,
                nested,
            });
        }
        Ok(())
    })?;

    Ok(ObjectLayout {
        offset,
        size,
        end,
        fields,
    })
}

fn starts_object(bytes: &[u8], at: usize) -> bool {
    bytes
        .get(at..at + 4)
        .and_then(|word| word.try_into().ok())
        .is_some_and(|word: [u8; 4]| u32::from_le_bytes(word) == OBJECT_WORD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{begin_field, begin_object, finish_field, finish_object, write_field_header};
    use crate::CorruptionError;
    use cursor::ParcelWriter;

    fn point(writer: &mut ParcelWriter, x: i32, y: i32) {
        let mark = begin_object(writer);
        write_field_header(writer, 1, 4).unwrap();
        writer.write_i32(x);
        write_field_header(writer, 2, 4).unwrap();
        writer.write_i32(y);
        finish_object(writer, mark).unwrap();
    }

    #[test]
    fn scan_flat_object() {
        let mut writer = ParcelWriter::new();
        point(&mut writer, 1, 2);
        let bytes = writer.finish();

        let layout = scan_object(&bytes, &Limits::for_testing()).unwrap();
        assert_eq!(layout.offset, 0);
        assert_eq!(layout.size, 16);
        assert_eq!(layout.end, bytes.len());
        let ids: Vec<u16> = layout.fields.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(layout.fields.iter().all(|f| f.format == FieldFormat::Fixed));
    }

    #[test]
    fn scan_accepts_packed_object_header() {
        let mut writer = ParcelWriter::new();
        write_field_header(&mut writer, OBJECT_MAGIC, 8).unwrap();
        write_field_header(&mut writer, 1, 4).unwrap();
        writer.write_i32(7);
        writer.write_i32(0);
        let bytes = writer.finish();

        let layout = scan_object(&bytes, &Limits::for_testing()).unwrap();
        assert_eq!(layout.size, 8);
        assert_eq!(layout.end, 12);
        assert_eq!(layout.fields.len(), 1);
    }

    #[test]
    fn scan_detects_nested_object() {
        let mut writer = ParcelWriter::new();
        let outer = begin_object(&mut writer);
        let field = begin_field(&mut writer, 5);
        point(&mut writer, 3, 4);
        finish_field(&mut writer, field).unwrap();
        finish_object(&mut writer, outer).unwrap();
        let bytes = writer.finish();

        let layout = scan_object(&bytes, &Limits::for_testing()).unwrap();
        assert_eq!(layout.fields.len(), 1);
        let nested = layout.fields[0].nested.as_ref().unwrap();
        assert_eq!(nested.offset, 16);
        assert_eq!(nested.fields.len(), 2);
    }

    #[test]
    fn scan_enforces_depth() {
        let mut writer = ParcelWriter::new();
        let outer = begin_object(&mut writer);
        let field = begin_field(&mut writer, 5);
        point(&mut writer, 3, 4);
        finish_field(&mut writer, field).unwrap();
        finish_object(&mut writer, outer).unwrap();
        let bytes = writer.finish();

        let limits = Limits {
            max_depth: 1,
            ..Limits::for_testing()
        };
        let err = scan_object(&bytes, &limits).unwrap_err();
        assert!(matches!(
            err,
            WireError::LimitsExceeded {
                kind: LimitKind::Depth,
                ..
            }
        ));
    }

    #[test]
    fn scan_rejects_field_past_object_end() {
        let mut writer = ParcelWriter::new();
        let mark = begin_object(&mut writer);
        write_field_header(&mut writer, 1, 12).unwrap();
        writer.write_i32(0);
        finish_object(&mut writer, mark).unwrap();
        let bytes = writer.finish();

        let err = scan_object(&bytes, &Limits::for_testing()).unwrap_err();
        assert!(matches!(
            err,
            WireError::Corruption(CorruptionError::Overread { .. })
        ));
    }

    #[test]
    fn scan_rejects_oversized_input() {
        let bytes = vec![0u8; 5000];
        let err = scan_object(&bytes, &Limits::for_testing()).unwrap_err();
        assert!(matches!(
            err,
            WireError::LimitsExceeded {
                kind: LimitKind::ObjectBytes,
                ..
            }
        ));
    }
}
