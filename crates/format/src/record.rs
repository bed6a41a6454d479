//! Fixed-width employee records.
//!
//! ```text
//! [name: [u8; 32]][address: [u8; 64]][hours: u32 BE]
//! ```

use byteorder::{BigEndian, ByteOrder};
use std::borrow::Cow;
use std::fmt;
use std::io::{Read, Write};

use crate::{read_full, FormatError};

/// Capacity of the name field, including the NUL terminator.
pub const NAME_CAPACITY: usize = 32;

/// Capacity of the address field, including the NUL terminator.
pub const ADDRESS_CAPACITY: usize = 64;

/// Size of an encoded record in bytes: 32 (`name`) + 64 (`address`) + 4 (`hours`).
pub const RECORD_SIZE: usize = NAME_CAPACITY + ADDRESS_CAPACITY + 4;

/// One employee as stored on disk.
///
/// `name` and `address` are NUL-padded buffers. Text longer than the field is
/// clamped to `capacity - 1` bytes so the field always ends in a terminator.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub name: [u8; NAME_CAPACITY],
    pub address: [u8; ADDRESS_CAPACITY],
    pub hours: u32,
}

impl EmployeeRecord {
    /// Builds a record, silently truncating `name` and `address` to fit.
    #[must_use]
    pub fn new(name: &str, address: &str, hours: u32) -> Self {
        Self {
            name: clamp_field(name.as_bytes()),
            address: clamp_field(address.as_bytes()),
            hours,
        }
    }

    /// Name bytes up to (not including) the first NUL.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        until_nul(&self.name)
    }

    /// Address bytes up to (not including) the first NUL.
    #[must_use]
    pub fn address_bytes(&self) -> &[u8] {
        until_nul(&self.address)
    }

    #[must_use]
    pub fn name_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    #[must_use]
    pub fn address_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.address_bytes())
    }
}

impl fmt::Debug for EmployeeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmployeeRecord")
            .field("name", &self.name_str())
            .field("address", &self.address_str())
            .field("hours", &self.hours)
            .finish()
    }
}

/// Copies at most `N - 1` bytes of `src` into a zeroed buffer.
fn clamp_field<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    let len = src.len().min(N - 1);
    buf[..len].copy_from_slice(&src[..len]);
    buf
}

fn until_nul(field: &[u8]) -> &[u8] {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    &field[..end]
}

/// Decodes one record. Text fields are copied verbatim.
#[must_use]
pub fn decode_record(bytes: &[u8; RECORD_SIZE]) -> EmployeeRecord {
    let mut name = [0u8; NAME_CAPACITY];
    let mut address = [0u8; ADDRESS_CAPACITY];
    name.copy_from_slice(&bytes[..NAME_CAPACITY]);
    address.copy_from_slice(&bytes[NAME_CAPACITY..NAME_CAPACITY + ADDRESS_CAPACITY]);
    let hours = BigEndian::read_u32(&bytes[NAME_CAPACITY + ADDRESS_CAPACITY..]);
    EmployeeRecord {
        name,
        address,
        hours,
    }
}

/// Encodes one record into its on-disk form.
#[must_use]
pub fn encode_record(record: &EmployeeRecord) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    buf[..NAME_CAPACITY].copy_from_slice(&record.name);
    buf[NAME_CAPACITY..NAME_CAPACITY + ADDRESS_CAPACITY].copy_from_slice(&record.address);
    BigEndian::write_u32(&mut buf[NAME_CAPACITY + ADDRESS_CAPACITY..], record.hours);
    buf
}

/// Decodes `count` consecutive records from the front of `bytes`.
///
/// Bytes past `count * RECORD_SIZE` are ignored. With `count == 0` this
/// returns an empty vector without looking at `bytes`.
///
/// # Errors
///
/// Returns [`FormatError::ShortRead`] if `bytes` holds fewer than
/// `count * RECORD_SIZE` bytes.
pub fn decode_records(bytes: &[u8], count: u16) -> Result<Vec<EmployeeRecord>, FormatError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let expected = count as usize * RECORD_SIZE;
    if bytes.len() < expected {
        return Err(FormatError::ShortRead {
            expected,
            actual: bytes.len(),
        });
    }
    let mut records = Vec::with_capacity(count as usize);
    for chunk in bytes[..expected].chunks_exact(RECORD_SIZE) {
        let mut raw = [0u8; RECORD_SIZE];
        raw.copy_from_slice(chunk);
        records.push(decode_record(&raw));
    }
    Ok(records)
}

/// Reads exactly `count` records from `r`.
///
/// # Errors
///
/// Returns [`FormatError::ShortRead`] if the reader ends early, or
/// [`FormatError::Io`] on read failure.
pub fn read_records<R: Read>(r: &mut R, count: u16) -> Result<Vec<EmployeeRecord>, FormatError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut buf = vec![0u8; count as usize * RECORD_SIZE];
    let n = read_full(r, &mut buf)?;
    decode_records(&buf[..n], count)
}

/// Writes every record in `records` to `w`, in order.
pub fn write_records<W: Write>(w: &mut W, records: &[EmployeeRecord]) -> std::io::Result<()> {
    for record in records {
        w.write_all(&encode_record(record))?;
    }
    Ok(())
}
