//! Write path: `persist()` and `persist_atomic()`.
//!
//! Both serialize the header followed by every record in store order. The
//! header's `filesize` is recomputed from the in-memory count first, so the
//! bytes on disk always satisfy `filesize == 12 + count * 100`.

use format::{write_header, write_records, DbHeader, EmployeeRecord};
use std::ffi::OsString;
use std::fs::{rename, File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{lock, Database, DbError};

impl Database {
    /// Rewrites the whole database in place, starting at offset 0.
    ///
    /// The file is not truncated afterwards: records are only ever appended,
    /// so the new contents are never shorter than the old ones.
    ///
    /// A failure part-way leaves the file in an undefined state. Use
    /// [`persist_atomic`](Database::persist_atomic) when that matters.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Detached`] once an earlier `persist_atomic` has
    /// failed after its rename, and [`DbError::Io`] on write failure.
    pub fn persist(&mut self) -> Result<(), DbError> {
        self.ensure_attached()?;
        let header = self.store.sync_header();

        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        write_all_to(file, &header, self.store.list_all())?;

        if self.sync {
            self.file.sync_all()?;
        }

        debug!(count = header.count, filesize = header.filesize, "persisted database");
        Ok(())
    }

    /// Writes the database to `<path>.tmp`, fsyncs it, and renames it over
    /// the target.
    ///
    /// Afterwards the handle is reopened on the new file and the lock is
    /// retaken. Between the rename and the relock another process may grab
    /// the new file. If the reopen or the relock fails, the data is already
    /// on disk but this handle still points at the replaced file, so it is
    /// marked detached: the error is returned and every later persist fails
    /// with [`DbError::Detached`]. Drop it and reopen the database.
    pub fn persist_atomic(&mut self) -> Result<(), DbError> {
        self.ensure_attached()?;
        let header = self.store.sync_header();
        let tmp = tmp_path(&self.path);

        let raw = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)?;
        let written = write_all_to(&raw, &header, self.store.list_all())
            .and_then(|()| raw.sync_all().map_err(DbError::from));
        if let Err(e) = written {
            drop(raw);
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        drop(raw);

        if let Err(e) = rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        // Fsync the parent directory so the rename itself is durable.
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        match self.reopen() {
            Ok(file) => self.file = file,
            Err(e) => {
                self.detach();
                return Err(e);
            }
        }

        debug!(count = header.count, filesize = header.filesize, "atomically persisted database");
        Ok(())
    }

    /// Opens the file now at `path` and takes the lock on it if this handle
    /// holds one.
    fn reopen(&self) -> Result<File, DbError> {
        let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        if self.locked {
            lock::lock_exclusive(&file, &self.path)?;
        }
        Ok(file)
    }

    /// Marks the handle as no longer backing `path`.
    pub(crate) fn detach(&mut self) {
        warn!(path = %self.path.display(), "handle detached from database file");
        self.detached = true;
    }

    fn ensure_attached(&self) -> Result<(), DbError> {
        if self.detached {
            return Err(DbError::Detached(self.path.clone()));
        }
        Ok(())
    }
}

/// Writes `header` then `records` through a buffered writer.
fn write_all_to(file: &File, header: &DbHeader, records: &[EmployeeRecord]) -> Result<(), DbError> {
    let mut w = BufWriter::new(file);
    write_header(&mut w, header)?;
    write_records(&mut w, records)?;
    w.flush()?;
    Ok(())
}

/// Sibling temp path used by [`Database::persist_atomic`]: `<path>.tmp`.
pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}
