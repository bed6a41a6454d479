use byteorder::{BigEndian, WriteBytesExt};
use config::DbConfig;
use std::fs;
use std::path::Path;

/// Config used by most tests: no fsync, locking on.
pub fn test_config() -> DbConfig {
    DbConfig {
        path: None,
        sync: false,
        lock: true,
    }
}

pub fn file_len(path: &Path) -> u64 {
    fs::metadata(path).unwrap().len()
}

/// Writes a raw header with arbitrary field values followed by `extra` bytes.
pub fn write_raw_db(path: &Path, magic: u32, version: u16, count: u16, filesize: u32, extra: &[u8]) {
    let mut buf = Vec::new();
    buf.write_u32::<BigEndian>(magic).unwrap();
    buf.write_u16::<BigEndian>(version).unwrap();
    buf.write_u16::<BigEndian>(count).unwrap();
    buf.write_u32::<BigEndian>(filesize).unwrap();
    buf.extend_from_slice(extra);
    fs::write(path, &buf).unwrap();
}
