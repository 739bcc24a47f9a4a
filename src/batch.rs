//! Batch import: one `address domain [domain...]` per line.
//!
//! Lines are applied one by one to a single in-memory copy. Failures are
//! counted and reported, never fatal; only a missing source file aborts. If
//! anything was added, the file is backed up once and rewritten once, so the
//! backup holds the content from before the whole batch.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::backup::Backup;
use crate::error::HostsError;
use crate::hosts::HostsStore;

/// Outcome of one batch line.
#[derive(Debug)]
pub struct LineResult {
    pub line_no: usize,
    pub line: String,
    pub result: Result<(), HostsError>,
}

/// Per-line results plus counts.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub lines: Vec<LineResult>,
    /// Set when at least one line was written.
    pub backup: Option<Backup>,
}

impl BatchSummary {
    pub fn failures(&self) -> impl Iterator<Item = &LineResult> {
        self.lines.iter().filter(|l| l.result.is_err())
    }
}

/// Split a batch line into address and domains field.
pub fn parse_line(line: &str) -> Result<(&str, &str), HostsError> {
    let line = line.trim();
    let (address, domains) = match line.split_once(char::is_whitespace) {
        Some((a, d)) => (a, d.trim()),
        None => (line, ""),
    };
    if domains.is_empty() {
        return Err(HostsError::EmptyField("domain"));
    }
    Ok((address, domains))
}

/// Add every entry listed in `source`. Blank and `#` lines are skipped.
pub fn import(store: &HostsStore, source: &Path) -> Result<BatchSummary, HostsError> {
    if !source.is_file() {
        return Err(HostsError::FileNotFound(source.to_path_buf()));
    }
    let content = fs::read_to_string(source).map_err(|e| HostsError::read(source, e))?;

    let mut file = store.load()?;
    let mut summary = BatchSummary::default();
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let result = parse_line(line)
            .and_then(|(address, domains)| file.add_entry(address, domains).map(|_| ()));
        match &result {
            Ok(()) => summary.succeeded += 1,
            Err(e) => {
                warn!("line {}: {e}", i + 1);
                summary.failed += 1;
            }
        }
        summary.lines.push(LineResult {
            line_no: i + 1,
            line: line.to_string(),
            result,
        });
    }

    if summary.succeeded > 0 {
        summary.backup = Some(store.commit(&file)?);
    }
    Ok(summary)
}
