/// Integration tests for the empdb binary.
/// Tests cover: create, add, list, header validation failures, malformed input
use byteorder::{BigEndian, WriteBytesExt};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

/// Helper to run the binary with `args` and capture its output.
fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_empdb"))
        .args(args)
        .env_remove("EMPDB_PATH")
        .env("EMPDB_SYNC", "false")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run empdb")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

fn write_header(path: &Path, magic: u32, version: u16, count: u16, filesize: u32) {
    let mut buf = Vec::new();
    buf.write_u32::<BigEndian>(magic).unwrap();
    buf.write_u16::<BigEndian>(version).unwrap();
    buf.write_u16::<BigEndian>(count).unwrap();
    buf.write_u32::<BigEndian>(filesize).unwrap();
    fs::write(path, &buf).unwrap();
}

#[test]
fn test_create_new_database() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.bin");

    let out = run_cli(&["-n", "-f", db.to_str().unwrap()]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(fs::metadata(&db).unwrap().len(), 12);
    assert_eq!(&fs::read(&db).unwrap()[..4], b"LLAD");
}

#[test]
fn test_add_and_list() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.bin");
    let p = db.to_str().unwrap();

    assert!(run_cli(&["-n", "-f", p]).status.success());
    assert!(run_cli(&["-f", p, "-a", "Ann,1 Oak Rd,40"]).status.success());
    assert!(run_cli(&["-f", p, "-a", "Bob,2 Elm St,35"]).status.success());

    let out = run_cli(&["-f", p, "-l"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Employee 0"));
    assert!(text.contains("Name: Ann"));
    assert!(text.contains("Address: 1 Oak Rd"));
    assert!(text.contains("Hours: 40"));
    assert!(text.contains("Employee 1"));
    assert!(text.contains("Name: Bob"));
    assert_eq!(fs::metadata(&db).unwrap().len(), 12 + 2 * 100);
}

#[test]
fn test_create_add_list_in_one_run() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.bin");

    let out = run_cli(&["-n", "-f", db.to_str().unwrap(), "-a", "Cy,3 Ash Ln,8", "-l"]);

    assert!(out.status.success());
    assert!(stdout(&out).contains("Name: Cy"));
    assert_eq!(fs::metadata(&db).unwrap().len(), 112);
}

#[test]
fn test_atomic_persist() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.bin");
    let p = db.to_str().unwrap();

    assert!(run_cli(&["-n", "-f", p]).status.success());
    let out = run_cli(&["-f", p, "--atomic", "-a", "Di,4 Fir Ct,20"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(!dir.path().join("db.bin.tmp").exists());
    assert!(stdout(&run_cli(&["-f", p, "-l"])).contains("Name: Di"));
}

#[test]
fn test_missing_filepath() {
    let out = run_cli(&["-l"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("filepath is a required argument"));
}

#[test]
fn test_create_existing_file_fails() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.bin");
    let p = db.to_str().unwrap();

    assert!(run_cli(&["-n", "-f", p]).status.success());
    let out = run_cli(&["-n", "-f", p]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("already exists"));
}

#[test]
fn test_open_missing_file_fails() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("missing.bin");

    let out = run_cli(&["-f", db.to_str().unwrap(), "-l"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("not found"));
}

#[test]
fn test_bad_magic_reported() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.bin");
    write_header(&db, 0xdead_beef, 1, 0, 12);

    let out = run_cli(&["-f", db.to_str().unwrap(), "-l"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("improper header magic"));
}

#[test]
fn test_bad_version_reported() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.bin");
    write_header(&db, 0x4c4c_4144, 9, 0, 12);

    let out = run_cli(&["-f", db.to_str().unwrap(), "-l"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unsupported header version"));
}

#[test]
fn test_size_mismatch_reported() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.bin");
    write_header(&db, 0x4c4c_4144, 1, 3, 312);

    let out = run_cli(&["-f", db.to_str().unwrap(), "-l"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("corrupted database"));
    // Failed validation must not rewrite the file.
    assert_eq!(fs::metadata(&db).unwrap().len(), 12);
}

#[test]
fn test_malformed_add_leaves_file_unchanged() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.bin");
    let p = db.to_str().unwrap();

    assert!(run_cli(&["-n", "-f", p, "-a", "Ann,1 Oak Rd,40"]).status.success());
    let before = fs::read(&db).unwrap();

    for bad in ["onlytwo,fields", "a,b,lots", "a,b,1,extra"] {
        let out = run_cli(&["-f", p, "-a", bad]);
        assert!(!out.status.success(), "accepted {:?}", bad);
        assert!(stderr(&out).contains("malformed employee input"));
    }
    assert_eq!(fs::read(&db).unwrap(), before);
}

#[test]
fn test_path_from_environment() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("env.bin");

    let out = Command::new(env!("CARGO_BIN_EXE_empdb"))
        .args(["-n", "-a", "Eve,5 Oak Rd,1"])
        .env("EMPDB_PATH", &db)
        .env("EMPDB_SYNC", "false")
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(fs::metadata(&db).unwrap().len(), 112);
}
