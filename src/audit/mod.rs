//! Day-partitioned, append-only audit log.
//!
//! Every submission attempt leaves a trail here, one line per record:
//! `[<timestamp>] [<LEVEL>] <message>`, in a file named after the UTC
//! calendar day of the write (`email_YYYY-MM-DD.log`). Files are never
//! rewritten or removed by the service.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// File name prefix shared by every day partition.
pub const FILE_PREFIX: &str = "email_";
const FILE_SUFFIX: &str = ".log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes audit records into `dir`. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct AuditLog {
    dir: PathBuf,
    write_failures: AtomicU64,
}

impl AuditLog {
    /// Creates the log directory up front when possible. Failure here is not
    /// fatal; every write retries the creation.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("Could not create audit log directory {}: {}", dir.display(), e);
        }
        Self {
            dir,
            write_failures: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::Info, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::Error, message.as_ref());
    }

    /// Appends one record to today's file. Never fails: write errors are
    /// reported to the diagnostic log and counted.
    pub fn log(&self, level: Level, message: &str) {
        self.log_at(Utc::now(), level, message);
    }

    pub(crate) fn log_at(&self, at: DateTime<Utc>, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!(target: "audit", "{}", message),
            Level::Error => tracing::error!(target: "audit", "{}", message),
        }

        if let Err(e) = self.append(at, level, message) {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "Failed to write audit record to {}: {}",
                self.path_for(at).display(),
                e
            );
        }
    }

    /// Number of records that could not be written since startup.
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Path of the file that records written at `at` land in.
    pub fn path_for(&self, at: DateTime<Utc>) -> PathBuf {
        self.dir.join(file_name_for(at))
    }

    pub fn current_path(&self) -> PathBuf {
        self.path_for(Utc::now())
    }

    // Synchronous: records are a single short line on a local disk, written in
    // place on the caller's task. The viewer's bulk reads use spawn_blocking.
    fn append(&self, at: DateTime<Utc>, level: Level, message: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(at))?;
        // One write per record so concurrent appends never interleave mid-line.
        file.write_all(format_line(at, level, message).as_bytes())
    }
}

pub fn file_name_for(at: DateTime<Utc>) -> String {
    format!("{}{}{}", FILE_PREFIX, at.format("%Y-%m-%d"), FILE_SUFFIX)
}

/// Renders one record, newline included.
///
/// Line breaks inside `message` are flattened to spaces: a record is exactly
/// one physical line.
pub fn format_line(at: DateTime<Utc>, level: Level, message: &str) -> String {
    let message: String = message
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!(
        "[{}] [{}] {}\n",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        message
    )
}
