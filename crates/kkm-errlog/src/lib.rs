//! Append-only diagnostic log for failed operations.
//!
//! One JSON object per line, keys sorted. Each record carries the correlation
//! id that was handed back to the caller in the error outcome, so a reported
//! failure can be looked up here later.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    /// Uncategorized application fault.
    Program,
    /// Fault raised by the datastore or its driver.
    Database,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error_id: Uuid,
    pub ts_utc: DateTime<Utc>,
    pub error_type: ErrorType,
    /// Classified error name, e.g. `OperationalError`.
    pub error_name: String,
    /// Public operation that failed.
    pub operation: String,
    /// Arguments the operation was called with (`Debug` rendering).
    pub error_args: String,
    /// Full error chain.
    pub error_info: String,
}

impl ErrorRecord {
    pub fn new(
        error_id: Uuid,
        error_type: ErrorType,
        error_name: impl Into<String>,
        operation: impl Into<String>,
        error_args: impl Into<String>,
        error_info: impl Into<String>,
    ) -> Self {
        Self {
            error_id,
            ts_utc: Utc::now(),
            error_type,
            error_name: error_name.into(),
            operation: operation.into(),
            error_args: error_args.into(),
            error_info: error_info.into(),
        }
    }
}

/// Append-only writer. There is no API to rewrite or drop a record.
pub struct ErrorLogWriter {
    path: PathBuf,
    /// Records appended through this writer.
    seq: u64,
}

impl ErrorLogWriter {
    /// Creates the writer and ensures parent dirs exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create_dir_all {:?}", parent))?;
            }
        }
        Ok(Self { path, seq: 0 })
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn append(&mut self, record: &ErrorRecord) -> Result<()> {
        let line = canonical_json_line(record)?;
        append_line(&self.path, &line)?;
        self.seq += 1;
        Ok(())
    }
}

/// Read every record from a log file, in append order.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<ErrorRecord>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("read error log {:?}", path.as_ref()))?;

    let mut out = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let rec: ErrorRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("parse error record at line {}", i + 1))?;
        out.push(rec);
    }
    Ok(out)
}

/// Look up the diagnostics behind a correlation id.
pub fn find_record(path: impl AsRef<Path>, error_id: Uuid) -> Result<Option<ErrorRecord>> {
    Ok(read_records(path)?
        .into_iter()
        .find(|r| r.error_id == error_id))
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open error log {:?}", path))?;
    // Single write so concurrent appenders never interleave inside a line.
    let mut buf = String::with_capacity(line.len() + 1);
    buf.push_str(line);
    buf.push('\n');
    f.write_all(buf.as_bytes())
        .context("write error record failed")?;
    Ok(())
}

/// `Value` maps are ordered by key, so going through one sorts the fields.
fn canonical_json_line<T: Serialize>(v: &T) -> Result<String> {
    let raw = serde_json::to_value(v).context("serialize error record failed")?;
    serde_json::to_string(&raw).context("json stringify failed")
}
