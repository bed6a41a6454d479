//! Cold-start paths: creating a fresh database file or loading an existing one.
//!
//! Loading reads the header, validates it against the real file length, and
//! then decodes exactly `header.count` records. Nothing is written on this
//! path, so a file that fails validation is left as it was.

use config::DbConfig;
use format::{read_header, read_records, validate_header};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use store::EmployeeStore;
use tracing::{debug, info, warn};

use crate::persist::tmp_path;
use crate::{lock, Database, DbError};

impl Database {
    /// Creates a new database file at `path` and writes an empty header.
    ///
    /// # Errors
    ///
    /// - [`DbError::AlreadyExists`] if a file is already at `path`.
    /// - [`DbError::Locked`] if the lock cannot be taken.
    /// - [`DbError::Io`] on any other open or write failure.
    pub fn create_new<P: AsRef<Path>>(path: P, config: &DbConfig) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        let file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(DbError::AlreadyExists(path));
            }
            Err(e) => return Err(DbError::Io(e)),
        };

        let db = Self::init_new(file, path, config)?;
        info!(path = %db.path.display(), "created new database");
        Ok(db)
    }

    /// Locks a freshly created file and writes the empty header to it.
    ///
    /// On failure the file at `path` is removed, so a retry of `create_new`
    /// does not trip over an empty or partial file.
    pub(crate) fn init_new(file: File, path: PathBuf, config: &DbConfig) -> Result<Self, DbError> {
        let written = Self::acquire(&file, &path, config).and_then(|locked| {
            let mut db = Database {
                path: path.clone(),
                file,
                store: EmployeeStore::new(),
                sync: config.sync,
                locked,
                detached: false,
            };
            db.persist()?;
            Ok(db)
        });
        if written.is_err() {
            warn!(path = %path.display(), "removing partially created database");
            let _ = std::fs::remove_file(&path);
        }
        written
    }

    /// Opens and fully loads the database at `path`.
    ///
    /// # Errors
    ///
    /// - [`DbError::NotFound`] if no file is at `path`.
    /// - [`DbError::Locked`] if another handle holds the lock.
    /// - [`DbError::Format`] if the header fails validation or the records
    ///   are short.
    /// - [`DbError::Io`] on any other read failure.
    pub fn open_existing<P: AsRef<Path>>(path: P, config: &DbConfig) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        let mut file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DbError::NotFound(path));
            }
            Err(e) => return Err(DbError::Io(e)),
        };

        let locked = Self::acquire(&file, &path, config)?;
        if locked {
            Self::cleanup_tmp_file(&path);
        }

        let actual_len = file.metadata()?.len();
        file.seek(SeekFrom::Start(0))?;

        let mut rdr = BufReader::new(&file);
        let header = read_header(&mut rdr)?;
        validate_header(&header, actual_len)?;
        let records = read_records(&mut rdr, header.count)?;
        drop(rdr);

        debug!(count = header.count, filesize = header.filesize, "loaded records");
        let store = EmployeeStore::from_parts(header, records)?;

        info!(path = %path.display(), count = store.len(), "opened database");
        Ok(Database {
            path,
            file,
            store,
            sync: config.sync,
            locked,
            detached: false,
        })
    }

    /// Takes the advisory lock when the config asks for it.
    fn acquire(file: &File, path: &Path, config: &DbConfig) -> Result<bool, DbError> {
        if !config.lock {
            return Ok(false);
        }
        lock::lock_exclusive(file, path)?;
        Ok(true)
    }

    /// Removes a temp file left behind by an interrupted `persist_atomic`.
    fn cleanup_tmp_file(path: &Path) {
        let tmp: PathBuf = tmp_path(path);
        if tmp.exists() {
            warn!(tmp = %tmp.display(), "removing leftover temp file");
            let _ = std::fs::remove_file(&tmp);
        }
    }
}
