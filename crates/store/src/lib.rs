//! # Store - In-memory Employee Records
//!
//! Holds the database header together with the ordered list of records it
//! describes. Every public method keeps `header.count == records.len()`.

use format::{DbHeader, EmployeeRecord};
use thiserror::Error;
use tracing::debug;

/// Errors raised while mutating the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The add-employee text is not `name,address,hours`.
    #[error("malformed employee input: {0}")]
    MalformedInput(String),

    /// The 16-bit record count is already at its maximum.
    #[error("record count overflow (max {})", u16::MAX)]
    CountOverflow,

    /// A header and record list that disagree on the record count.
    #[error("header count {header} does not match {records} loaded records")]
    CountMismatch { header: u16, records: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeStore {
    header: DbHeader,
    records: Vec<EmployeeRecord>,
}

impl EmployeeStore {
    /// Creates an empty store with a fresh header.
    pub fn new() -> Self {
        Self {
            header: DbHeader::new(),
            records: Vec::new(),
        }
    }

    /// Rebuilds a store from a decoded header and its records.
    pub fn from_parts(header: DbHeader, records: Vec<EmployeeRecord>) -> Result<Self, StoreError> {
        if header.count as usize != records.len() {
            return Err(StoreError::CountMismatch {
                header: header.count,
                records: records.len(),
            });
        }
        Ok(Self { header, records })
    }

    pub fn header(&self) -> &DbHeader {
        &self.header
    }

    /// All records in insertion order.
    pub fn list_all(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends `record` and bumps the header count.
    ///
    /// The count is checked first, so on error neither the count nor the
    /// record list changes.
    pub fn add(&mut self, record: EmployeeRecord) -> Result<(), StoreError> {
        let count = self
            .header
            .count
            .checked_add(1)
            .ok_or(StoreError::CountOverflow)?;
        self.records.push(record);
        self.header.count = count;
        debug!(count, "employee appended");
        Ok(())
    }

    /// Parses `text` as `name,address,hours` and appends the result.
    ///
    /// Name and address are clamped to their field capacity.
    pub fn add_from_text(&mut self, text: &str) -> Result<&EmployeeRecord, StoreError> {
        let record = parse_employee(text)?;
        self.add(record)?;
        Ok(&self.records[self.records.len() - 1])
    }

    /// Recomputes `header.filesize` from the current count and returns the
    /// header ready to be written.
    pub fn sync_header(&mut self) -> DbHeader {
        self.header.sync_filesize();
        self.header
    }
}

impl Default for EmployeeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `name,address,hours` into a record.
///
/// Exactly three fields are required. Name and address must be non-empty
/// and free of NUL bytes. Hours must be plain ASCII digits (no sign) whose
/// value fits in `u32`.
pub fn parse_employee(text: &str) -> Result<EmployeeRecord, StoreError> {
    let text = text.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != 3 {
        return Err(StoreError::MalformedInput(format!(
            "expected 3 comma-separated fields (name,address,hours), got {}",
            fields.len()
        )));
    }

    let (name, address, hours) = (fields[0], fields[1], fields[2].trim());
    if name.is_empty() {
        return Err(StoreError::MalformedInput("empty name".into()));
    }
    if address.is_empty() {
        return Err(StoreError::MalformedInput("empty address".into()));
    }
    // A NUL would end the stored text early on read-back.
    if name.contains('\0') || address.contains('\0') {
        return Err(StoreError::MalformedInput("embedded NUL in name or address".into()));
    }
    let invalid_hours = || StoreError::MalformedInput(format!("invalid hours: {:?}", hours));
    if hours.is_empty() || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_hours());
    }
    let hours: u32 = hours.parse().map_err(|_| invalid_hours())?;

    Ok(EmployeeRecord::new(name, address, hours))
}
