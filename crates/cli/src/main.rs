//! # CLI - Employee Database Tool
//!
//! Opens (or creates) a database file, optionally appends one employee,
//! optionally lists every record, then persists and exits.
//!
//! ```text
//! empdb [-n] -f <database filepath> [-a "name,address,hours"] [-l] [--atomic]
//!
//!   -n          create a new database file (fails if it exists)
//!   -f <path>   path to the database file (or EMPDB_PATH)
//!   -a <text>   add an employee, e.g. "Ann,1 Oak Rd,40"
//!   -l          list all employees
//!   --atomic    persist through a temp file + rename
//! ```
//!
//! ## Configuration
//!
//! ```text
//! EMPDB_PATH   default database path when -f is omitted
//! EMPDB_SYNC   fsync after persist        (default: "true")
//! EMPDB_LOCK   exclusive advisory lock    (default: "true")
//! RUST_LOG     log filter for stderr      (default: "warn")
//! ```
//!
//! Exits `0` on success. Any header, I/O or parse failure exits non-zero with
//! a message naming the check that failed.
//!
//! ## Example
//!
//! ```text
//! $ empdb -n -f employees.db
//! $ empdb -f employees.db -a "Ann,1 Oak Rd,40" -l
//! Employee 0
//!         Name: Ann
//!         Address: 1 Oak Rd
//!         Hours: 40
//! ```

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::DbConfig;
use engine::Database;
use format::EmployeeRecord;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "empdb", version, about = "Employee database file tool", long_about = None)]
struct Args {
    /// Create a new database file
    #[arg(short = 'n', long = "new")]
    new_file: bool,

    /// Path to the database file
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Add an employee as "name,address,hours"
    #[arg(short = 'a', long = "add")]
    add: Option<String>,

    /// List all employees
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Persist through a temp file and rename
    #[arg(long)]
    atomic: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = DbConfig::from_env();
    run(args, &config, &mut io::stdout().lock())
}

fn run<W: Write>(args: Args, config: &DbConfig, out: &mut W) -> Result<()> {
    let path = args
        .file
        .or_else(|| config.path.clone())
        .ok_or_else(|| anyhow!("filepath is a required argument (-f <path> or EMPDB_PATH)"))?;

    let mut db = Database::open_or_create(&path, args.new_file, config)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    debug!(path = %path.display(), count = db.list_all().len(), "database ready");

    if let Some(text) = &args.add {
        db.add_from_text(text)
            .with_context(|| format!("failed to add employee {:?}", text))?;
    }

    if args.list {
        list_employees(out, db.list_all())?;
    }

    let written = if args.atomic {
        db.persist_atomic()
    } else {
        db.persist()
    };
    written.with_context(|| format!("failed to write database {}", path.display()))?;

    db.close()?;
    Ok(())
}

/// Prints every record, numbered from 0. An empty slice prints nothing.
fn list_employees<W: Write>(out: &mut W, records: &[EmployeeRecord]) -> io::Result<()> {
    for (i, r) in records.iter().enumerate() {
        writeln!(out, "Employee {}", i)?;
        writeln!(out, "\tName: {}", r.name_str())?;
        writeln!(out, "\tAddress: {}", r.address_str())?;
        writeln!(out, "\tHours: {}", r.hours)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        Args::parse_from(std::iter::once("empdb").chain(list.iter().copied()))
    }

    fn no_sync() -> DbConfig {
        DbConfig {
            path: None,
            sync: false,
            lock: true,
        }
    }

    #[test]
    fn parses_all_flags() {
        let a = args(&["-n", "-f", "db.bin", "-a", "Ann,1 Oak Rd,40", "-l"]);
        assert!(a.new_file);
        assert_eq!(a.file, Some(PathBuf::from("db.bin")));
        assert_eq!(a.add.as_deref(), Some("Ann,1 Oak Rd,40"));
        assert!(a.list);
        assert!(!a.atomic);
    }

    #[test]
    fn missing_path_is_an_error() {
        let mut out = Vec::new();
        let err = run(args(&["-l"]), &no_sync(), &mut out).unwrap_err();
        assert!(err.to_string().contains("filepath is a required argument"));
    }

    #[test]
    fn path_falls_back_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.bin");
        let mut config = no_sync();
        config.path = Some(path.clone());

        let mut out = Vec::new();
        run(args(&["-n"]), &config, &mut out).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn create_add_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.bin");
        let p = path.to_str().unwrap();

        let mut out = Vec::new();
        run(args(&["-n", "-f", p]), &no_sync(), &mut out).unwrap();
        run(args(&["-f", p, "-a", "Ann,1 Oak Rd,40", "-l"]), &no_sync(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Employee 0\n\tName: Ann\n\tAddress: 1 Oak Rd\n\tHours: 40\n"
        );
    }

    #[test]
    fn list_empty_prints_nothing() {
        let mut out = Vec::new();
        list_employees(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn malformed_add_reports_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.bin");
        let p = path.to_str().unwrap();

        let mut out = Vec::new();
        let err = run(args(&["-n", "-f", p, "-a", "onlytwo,fields"]), &no_sync(), &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("failed to add employee"));
        assert!(format!("{:#}", err).contains("malformed employee input"));
    }
}
