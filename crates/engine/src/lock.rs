//! Advisory whole-file locking.
//!
//! On unix this is `flock(LOCK_EX | LOCK_NB)`: a second handle on the same
//! file fails immediately instead of blocking. The lock belongs to the open
//! file description and is dropped by the kernel when the descriptor closes.
//! Other platforms get no locking.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::DbError;

#[cfg(unix)]
pub(crate) fn lock_exclusive(file: &File, path: &Path) -> Result<(), DbError> {
    use std::os::unix::io::AsRawFd;

    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Err(DbError::Locked(path.to_path_buf()))
    } else {
        Err(DbError::Io(err))
    }
}

#[cfg(unix)]
pub(crate) fn unlock(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_UN) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub(crate) fn lock_exclusive(_file: &File, _path: &Path) -> Result<(), DbError> {
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn unlock(_file: &File) -> io::Result<()> {
    Ok(())
}
