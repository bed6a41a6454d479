//! # Format - Employee Database File Format
//!
//! Fixed-width binary codec for the employee database file.
//!
//! A database file is a single header followed by `count` fixed-size employee
//! records. The file is always rewritten from offset 0, so there is no index
//! and no free-space tracking.
//!
//! ## File layout (v1 – current)
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ HEADER (12 bytes)                                              │
//! │                                                               │
//! │ magic (u32 BE) | version (u16 BE) | count (u16 BE)            │
//! │ filesize (u32 BE)                                             │
//! ├───────────────────────────────────────────────────────────────┤
//! │ RECORDS (count × 100 bytes)                                    │
//! │                                                               │
//! │ name [u8; 32] | address [u8; 64] | hours (u32 BE)             │
//! │                                                               │
//! │ ... repeated `count` times ...                                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All multi-byte integers are big-endian (network byte order). Text fields
//! are NUL-padded byte buffers; the codec copies them verbatim and never
//! checks their encoding.
//!
//! The header is valid only when the magic is [`HEADER_MAGIC`], the version is
//! [`HEADER_VERSION`], `filesize` matches the real length of the file, and
//! `filesize == HEADER_SIZE + count * RECORD_SIZE`.

mod header;
mod record;

use std::io::{self, Read};

use thiserror::Error;

pub use header::{
    decode_header, encode_header, read_header, validate_header, write_header, DbHeader,
    HEADER_MAGIC, HEADER_SIZE, HEADER_VERSION,
};
pub use record::{
    decode_record, decode_records, encode_record, read_records, write_records, EmployeeRecord,
    ADDRESS_CAPACITY, NAME_CAPACITY, RECORD_SIZE,
};

/// Errors raised while decoding or validating database bytes.
#[derive(Debug, Error)]
pub enum FormatError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Fewer bytes were available than a fixed-size structure requires.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// The header does not start with [`HEADER_MAGIC`].
    #[error("improper header magic: {found:#010x}")]
    BadMagic { found: u32 },

    /// The header carries a version other than [`HEADER_VERSION`].
    #[error("unsupported header version: {found}")]
    UnsupportedVersion { found: u16 },

    /// `filesize` in the header disagrees with the real file length.
    #[error("corrupted database: header says {header} bytes, file has {actual}")]
    SizeMismatch { header: u32, actual: u64 },

    /// `filesize` in the header disagrees with its own record `count`.
    #[error("corrupted database: header filesize {filesize} does not fit {count} records")]
    CountMismatch { count: u16, filesize: u32 },
}

/// Returns the byte length of a file holding exactly `count` records.
#[must_use]
pub fn expected_filesize(count: u16) -> u32 {
    // 12 + 65535 * 100 always fits in u32.
    (HEADER_SIZE + count as usize * RECORD_SIZE) as u32
}

/// Fills `buf` from `r` until it is full or the reader hits EOF.
///
/// Returns the number of bytes actually read so callers can report a
/// [`FormatError::ShortRead`] with the real count instead of a bare
/// `UnexpectedEof`.
pub(crate) fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
