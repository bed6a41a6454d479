//! # Engine - Employee Database File Controller
//!
//! Owns the database file handle and the in-memory [`EmployeeStore`], and
//! moves between the states of a single database file:
//!
//! ```text
//!             create_new()                 add_from_text()
//!   Closed ───────────────┐              ┌──────────────┐
//!                         v              v              │
//!             open_existing()  ┌──────────────────┐     │
//!   Closed ──────────────────> │       OPEN       │ ────┘
//!                              │  (file locked)   │ ────┐
//!                              └──────────────────┘     │ persist()
//!                                       │        ^──────┘
//!                                close() / drop
//!                                       v
//!                                    Closed
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module        | Purpose                                               |
//! |---------------|-------------------------------------------------------|
//! | [`lib.rs`]    | `Database` struct, accessors, `Debug`, `Drop`, errors |
//! | [`open`]      | `create_new()`, `open_existing()`                     |
//! | [`persist`]   | `persist()`, `persist_atomic()`                        |
//! | [`lock`]      | Advisory exclusive lock on the open file              |
//!
//! ## Persistence
//!
//! Every persist rewrites the header and all records from offset 0. The file
//! only grows because records are never removed, so no truncation is done.
//! [`Database::persist_atomic`] writes to a sibling temp file and renames it
//! over the target instead, for callers that cannot tolerate a torn write.

mod lock;
mod open;
mod persist;

use config::DbConfig;
use format::{DbHeader, EmployeeRecord, FormatError};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use store::{EmployeeStore, StoreError};
use thiserror::Error;

/// Errors returned by [`Database`] operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// An underlying I/O error (open, read, write, seek, sync).
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// `create_new` found a file already at the path.
    #[error("database file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// `open_existing` found no file at the path.
    #[error("database file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Another handle holds the exclusive lock on the file.
    #[error("database file is locked by another process: {}", .0.display())]
    Locked(PathBuf),

    /// The header or record bytes failed to decode or validate.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// An in-memory mutation was rejected.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A failed `persist_atomic` left this handle on a file that is no
    /// longer linked at the path. Reopen the database to continue.
    #[error("database handle is detached from {}; reopen it", .0.display())]
    Detached(PathBuf),
}

/// An open employee database.
///
/// The file handle is held (and locked, if configured) for the lifetime of
/// the value and released on drop, including on error paths.
pub struct Database {
    pub(crate) path: PathBuf,
    pub(crate) file: File,
    pub(crate) store: EmployeeStore,
    /// If `true`, every persist ends with `sync_all()`.
    pub(crate) sync: bool,
    /// `true` while this handle holds the advisory lock.
    pub(crate) locked: bool,
    /// Set when `file` no longer backs `path`; every persist then fails.
    pub(crate) detached: bool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("count", &self.store.header().count)
            .field("filesize", &self.store.header().filesize)
            .field("sync", &self.sync)
            .field("locked", &self.locked)
            .field("detached", &self.detached)
            .finish()
    }
}

impl Database {
    /// Opens the database at `path`, creating it first when `create` is set.
    pub fn open_or_create<P: AsRef<Path>>(
        path: P,
        create: bool,
        config: &DbConfig,
    ) -> Result<Self, DbError> {
        if create {
            Self::create_new(path, config)
        } else {
            Self::open_existing(path, config)
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the in-memory header. `filesize` is only refreshed on persist.
    #[must_use]
    pub fn header(&self) -> &DbHeader {
        self.store.header()
    }

    #[must_use]
    pub fn store(&self) -> &EmployeeStore {
        &self.store
    }

    /// Mutable access to the store. Changes reach disk on the next persist.
    pub fn store_mut(&mut self) -> &mut EmployeeStore {
        &mut self.store
    }

    /// All records in file order.
    #[must_use]
    pub fn list_all(&self) -> &[EmployeeRecord] {
        self.store.list_all()
    }

    /// Parses `name,address,hours` and appends it in memory.
    pub fn add_from_text(&mut self, text: &str) -> Result<&EmployeeRecord, DbError> {
        Ok(self.store.add_from_text(text)?)
    }

    /// Releases the lock and closes the file.
    ///
    /// Dropping the value does the same; this form reports unlock failures.
    pub fn close(mut self) -> Result<(), DbError> {
        if self.locked {
            self.locked = false;
            lock::unlock(&self.file)?;
        }
        Ok(())
    }
}

/// Best-effort unlock on drop. Closing the descriptor releases the lock
/// regardless, so the error is ignored.
impl Drop for Database {
    fn drop(&mut self) {
        if self.locked {
            let _ = lock::unlock(&self.file);
        }
    }
}

#[cfg(test)]
mod tests;
