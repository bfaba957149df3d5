//! Parcel primitives for the safeparcel codec.
//!
//! This crate provides [`ParcelWriter`] and [`ParcelReader`], a position-tracked
//! cursor over a byte buffer. Values follow the platform parcel layout:
//! little-endian 32/64-bit words, length-prefixed arrays padded to four bytes,
//! and UTF-16 strings with a NUL terminator.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - Every read is checked against the active limit.
//! - **No domain knowledge** - This crate knows nothing about fields or objects.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use cursor::{ParcelReader, ParcelWriter};
//!
//! let mut writer = ParcelWriter::new();
//! writer.write_i32(42);
//! writer.write_string16(Some("hi")).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ParcelReader::new(&bytes);
//! assert_eq!(reader.read_i32().unwrap(), 42);
//! assert_eq!(reader.read_string16().unwrap().as_deref(), Some("hi"));
//! ```

mod error;
mod reader;
mod writer;

pub use error::{CursorError, CursorResult};
pub use reader::ParcelReader;
pub use writer::{ParcelWriter, Slot};

/// Length prefix used for absent arrays and strings.
pub const NULL_LENGTH: i32 = -1;

/// Rounds `len` up to the next multiple of four.
#[must_use]
pub const fn pad4(len: usize) -> usize {
    (len + 3) & !3
}
