//! Database header: constants, codec, and validation.
//!
//! ```text
//! [magic: u32 BE][version: u16 BE][count: u16 BE][filesize: u32 BE]
//! ```
//!
//! Encoding is a pure transform: [`encode_header`] returns fresh bytes and
//! never touches the caller's header, so writing the same header twice
//! produces identical output.

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::{Read, Write};
use tracing::warn;

use crate::{expected_filesize, read_full, FormatError};

/// Magic number identifying an employee database file (ASCII "LLAD").
pub const HEADER_MAGIC: u32 = 0x4c4c_4144;

/// The only header version this crate reads or writes.
pub const HEADER_VERSION: u16 = 1;

/// Size of the encoded header in bytes: 4 (`magic`) + 2 (`version`) + 2 (`count`) + 4 (`filesize`).
pub const HEADER_SIZE: usize = 4 + 2 + 2 + 4;

/// Host-order view of the database header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbHeader {
    pub magic: u32,
    pub version: u16,
    /// Number of records that follow the header.
    pub count: u16,
    /// Total byte length the file is expected to have.
    pub filesize: u32,
}

impl DbHeader {
    /// Creates the header of an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: HEADER_MAGIC,
            version: HEADER_VERSION,
            count: 0,
            filesize: HEADER_SIZE as u32,
        }
    }

    /// Recomputes `filesize` from the current `count`.
    pub fn sync_filesize(&mut self) {
        self.filesize = expected_filesize(self.count);
    }

    /// Returns `true` if `filesize` agrees with `count`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.filesize == expected_filesize(self.count)
    }
}

impl Default for DbHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes a header from the first [`HEADER_SIZE`] bytes of `bytes`.
///
/// No validation happens here; see [`validate_header`].
///
/// # Errors
///
/// Returns [`FormatError::ShortRead`] if `bytes` is shorter than the header.
pub fn decode_header(bytes: &[u8]) -> Result<DbHeader, FormatError> {
    if bytes.len() < HEADER_SIZE {
        return Err(FormatError::ShortRead {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    Ok(DbHeader {
        magic: BigEndian::read_u32(&bytes[0..4]),
        version: BigEndian::read_u16(&bytes[4..6]),
        count: BigEndian::read_u16(&bytes[6..8]),
        filesize: BigEndian::read_u32(&bytes[8..12]),
    })
}

/// Encodes `header` into its big-endian on-disk form.
#[must_use]
pub fn encode_header(header: &DbHeader) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];
    BigEndian::write_u32(&mut buf[0..4], header.magic);
    BigEndian::write_u16(&mut buf[4..6], header.version);
    BigEndian::write_u16(&mut buf[6..8], header.count);
    BigEndian::write_u32(&mut buf[8..12], header.filesize);
    buf
}

/// Checks `header` against the format constants and the real file length.
///
/// Checks run in order (magic, version, size, count) and the first failure
/// is returned, so the error always names the check that failed.
///
/// # Errors
///
/// - [`FormatError::BadMagic`] if `magic != HEADER_MAGIC`.
/// - [`FormatError::UnsupportedVersion`] if `version != HEADER_VERSION`.
/// - [`FormatError::SizeMismatch`] if `filesize != actual_len`.
/// - [`FormatError::CountMismatch`] if `filesize` does not equal
///   `HEADER_SIZE + count * RECORD_SIZE`.
pub fn validate_header(header: &DbHeader, actual_len: u64) -> Result<(), FormatError> {
    if header.magic != HEADER_MAGIC {
        warn!(found = header.magic, "improper header magic");
        return Err(FormatError::BadMagic {
            found: header.magic,
        });
    }
    if header.version != HEADER_VERSION {
        warn!(found = header.version, "unsupported header version");
        return Err(FormatError::UnsupportedVersion {
            found: header.version,
        });
    }
    if u64::from(header.filesize) != actual_len {
        warn!(
            header = header.filesize,
            actual = actual_len,
            "header filesize does not match file length"
        );
        return Err(FormatError::SizeMismatch {
            header: header.filesize,
            actual: actual_len,
        });
    }
    if !header.is_consistent() {
        warn!(
            count = header.count,
            filesize = header.filesize,
            "header filesize does not match record count"
        );
        return Err(FormatError::CountMismatch {
            count: header.count,
            filesize: header.filesize,
        });
    }
    Ok(())
}

/// Reads and decodes a header from `r`.
///
/// # Errors
///
/// Returns [`FormatError::ShortRead`] if the reader ends before
/// [`HEADER_SIZE`] bytes, or [`FormatError::Io`] on read failure.
pub fn read_header<R: Read>(r: &mut R) -> Result<DbHeader, FormatError> {
    let mut buf = [0u8; HEADER_SIZE];
    let n = read_full(r, &mut buf)?;
    decode_header(&buf[..n])
}

/// Writes `header` to `w` in big-endian order.
pub fn write_header<W: Write>(w: &mut W, header: &DbHeader) -> std::io::Result<()> {
    w.write_u32::<BigEndian>(header.magic)?;
    w.write_u16::<BigEndian>(header.version)?;
    w.write_u16::<BigEndian>(header.count)?;
    w.write_u32::<BigEndian>(header.filesize)?;
    Ok(())
}
