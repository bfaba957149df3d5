//! Opaque capability handles.

use cursor::{ParcelReader, ParcelWriter};

use crate::error::FieldError;

/// Size of a flattened handle on the wire.
pub const BINDER_SIZE: usize = 24;

/// A flattened cross-process handle.
///
/// The codec never interprets a handle; it only carries the four words the
/// platform writes for a strong binder reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BinderHandle {
    pub kind: u32,
    pub flags: u32,
    pub object: u64,
    pub cookie: u64,
}

impl BinderHandle {
    #[must_use]
    pub const fn new(kind: u32, flags: u32, object: u64, cookie: u64) -> Self {
        Self {
            kind,
            flags,
            object,
            cookie,
        }
    }

    pub(crate) fn write(&self, writer: &mut ParcelWriter) {
        writer.write_u32(self.kind);
        writer.write_u32(self.flags);
        writer.write_u64(self.object);
        writer.write_u64(self.cookie);
    }

    pub(crate) fn read(reader: &mut ParcelReader<'_>) -> Result<Self, FieldError> {
        Ok(Self {
            kind: reader.read_u32()?,
            flags: reader.read_u32()?,
            object: reader.read_u64()?,
            cookie: reader.read_u64()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_24_bytes() {
        let mut writer = ParcelWriter::new();
        BinderHandle::new(0x7362_2a85, 0x17f, 0xdead_beef, 7).write(&mut writer);
        let bytes = writer.finish();
        assert_eq!(bytes.len(), BINDER_SIZE);

        let mut reader = ParcelReader::new(&bytes);
        let handle = BinderHandle::read(&mut reader).unwrap();
        assert_eq!(handle.object, 0xdead_beef);
        assert_eq!(handle.cookie, 7);
    }

    #[test]
    fn truncated_handle_fails() {
        let bytes = [0u8; 20];
        let mut reader = ParcelReader::new(&bytes);
        assert!(BinderHandle::read(&mut reader).is_err());
    }
}
