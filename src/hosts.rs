//! Hosts file read/write.
//!
//! The file is the only state: every operation reads it fresh, and every
//! mutation runs as one edit (load, change in memory, back up, atomic
//! rewrite). Comments, blank lines and untouched entries are kept verbatim.
//!
//! Entries are addressed three ways. A position is the 1-based ordinal among
//! non-comment, non-blank lines and is recomputed on every read. An address
//! matches the first field exactly. A domain is a plain substring test, so
//! `app.test` also matches `myapp.test`.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::address::{is_valid_address, validate_address};
use crate::backup::{Backup, BackupManager};
use crate::domain::{normalize_domains, validate_domains};
use crate::error::HostsError;

/// One address-to-hostnames mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub address: String,
    pub domains: Vec<String>,
}

impl HostEntry {
    /// Parse an entry line. Returns None for comments, blank lines and lines
    /// without at least one hostname. An inline `#` ends the hostname list.
    pub fn parse(line: &str) -> Option<Self> {
        if !is_entry_line(line) {
            return None;
        }
        let mut fields = line.split_whitespace();
        let address = fields.next()?.to_string();
        let domains: Vec<String> = fields
            .take_while(|f| !f.starts_with('#'))
            .map(String::from)
            .collect();
        if domains.is_empty() {
            return None;
        }
        Some(Self { address, domains })
    }

    /// Hostnames joined by single spaces.
    pub fn domains_field(&self) -> String {
        self.domains.join(" ")
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.domains_field())
    }
}

/// A numbered entry line as shown by `list` and `search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedEntry {
    pub position: usize,
    pub line: String,
}

fn is_entry_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

fn first_field(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// One line of the file: the bytes as read, plus a lossy UTF-8 view used for
/// matching and display. Untouched lines are written back from `raw`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    raw: Vec<u8>,
    text: String,
}

impl Line {
    fn from_raw(raw: &[u8]) -> Self {
        Self {
            raw: raw.to_vec(),
            text: String::from_utf8_lossy(raw).into_owned(),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            raw: text.clone().into_bytes(),
            text,
        }
    }

    fn is_entry(&self) -> bool {
        is_entry_line(&self.text)
    }

    fn display(&self) -> String {
        self.text.trim_end_matches('\r').to_string()
    }
}

/// In-memory copy of the hosts file, one entry per line.
///
/// Bytes that are not valid UTF-8 (a Latin-1 comment, say) survive a rewrite
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostsFile {
    lines: Vec<Line>,
    trailing_newline: bool,
}

impl HostsFile {
    pub fn parse(content: impl AsRef<[u8]>) -> Self {
        let content = content.as_ref();
        let trailing_newline = content.ends_with(b"\n");
        let body = if trailing_newline {
            &content[..content.len() - 1]
        } else {
            content
        };
        let lines = if content.is_empty() {
            Vec::new()
        } else {
            body.split(|b| *b == b'\n').map(Line::from_raw).collect()
        };
        Self {
            lines,
            trailing_newline,
        }
    }

    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(&line.raw);
        }
        if self.trailing_newline && !self.lines.is_empty() {
            out.push(b'\n');
        }
        out
    }

    /// (position, line index) for each entry line, in file order.
    fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_entry())
            .enumerate()
            .map(|(pos, (idx, _))| (pos + 1, idx))
    }

    /// Entry lines numbered 1..N.
    pub fn entries(&self) -> Vec<ListedEntry> {
        self.positions()
            .map(|(position, idx)| ListedEntry {
                position,
                line: self.lines[idx].display(),
            })
            .collect()
    }

    fn index_of(&self, position: usize) -> Option<usize> {
        self.positions()
            .find(|(pos, _)| *pos == position)
            .map(|(_, idx)| idx)
    }

    /// Line at a position.
    pub fn line_at(&self, position: usize) -> Option<&str> {
        self.index_of(position).map(|idx| self.lines[idx].text.as_str())
    }

    /// True if a line starts with `address` plus whitespace and contains `domains` after it.
    pub fn exists(&self, address: &str, domains: &str) -> bool {
        self.lines.iter().filter(|l| l.is_entry()).any(|l| {
            l.text
                .trim_start()
                .strip_prefix(address)
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map(|rest| rest.contains(domains))
                .unwrap_or(false)
        })
    }

    /// Case-insensitive substring search over entry lines.
    pub fn search(&self, query: &str) -> Vec<ListedEntry> {
        let needle = query.to_lowercase();
        self.entries()
            .into_iter()
            .filter(|e| e.line.to_lowercase().contains(&needle))
            .collect()
    }

    /// Append a line, keeping the file newline-terminated.
    pub fn push(&mut self, line: String) {
        self.lines.push(Line::from_text(line));
        self.trailing_newline = true;
    }

    /// Validate and append `address domains`. Fails with `DuplicateEntry` if present.
    pub fn add_entry(&mut self, address: &str, domains: &str) -> Result<HostEntry, HostsError> {
        let address = address.trim();
        validate_address(address)?;
        validate_domains(domains)?;
        let domains = normalize_domains(domains);
        if self.exists(address, &domains) {
            return Err(HostsError::DuplicateEntry {
                address: address.to_string(),
                domains,
            });
        }
        let entry = HostEntry {
            address: address.to_string(),
            domains: domains.split(' ').map(String::from).collect(),
        };
        self.push(entry.to_string());
        Ok(entry)
    }

    /// Remove the entry line at `position`, returning it.
    pub fn remove_position(&mut self, position: usize) -> Option<String> {
        let idx = self.index_of(position)?;
        Some(self.lines.remove(idx).display())
    }

    /// Remove every entry line matching `pred`, returning the removed lines.
    pub fn remove_where(&mut self, pred: impl Fn(&str) -> bool) -> Vec<String> {
        let mut removed = Vec::new();
        self.lines.retain(|l| {
            if l.is_entry() && pred(l.text.as_str()) {
                removed.push(l.display());
                false
            } else {
                true
            }
        });
        removed
    }
}

/// How a removal argument is interpreted.
///
/// All-digit input is a position first, then a valid address literal is an
/// address, and anything else is a domain substring. An all-digit hostname
/// therefore cannot be removed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveTarget {
    Position(usize),
    Address(String),
    Domain(String),
}

impl RemoveTarget {
    pub fn parse(target: &str) -> Result<Self, HostsError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(HostsError::EmptyField("target"));
        }
        if target.bytes().all(|b| b.is_ascii_digit()) {
            return target
                .parse()
                .map(RemoveTarget::Position)
                .map_err(|_| HostsError::NotFound(format!("position {target}")));
        }
        if is_valid_address(target) {
            return Ok(RemoveTarget::Address(target.to_string()));
        }
        Ok(RemoveTarget::Domain(target.to_string()))
    }
}

/// Result of a successful mutation and the backup taken before it.
#[derive(Debug, Clone)]
pub struct Change<T> {
    pub outcome: T,
    pub backup: Backup,
}

/// Handle on the hosts file plus where its backups go.
#[derive(Debug, Clone)]
pub struct HostsStore {
    path: PathBuf,
    backups: BackupManager,
}

impl HostsStore {
    pub fn new(path: impl Into<PathBuf>, backups: BackupManager) -> Self {
        Self {
            path: path.into(),
            backups,
        }
    }

    /// Store whose backups sit next to the hosts file.
    pub fn colocated(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let backups = BackupManager::new(&path, dir);
        Self { path, backups }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Read the file fresh.
    pub fn load(&self) -> Result<HostsFile, HostsError> {
        let content = fs::read(&self.path).map_err(|e| HostsError::read(&self.path, e))?;
        Ok(HostsFile::parse(content))
    }

    pub fn list(&self) -> Result<Vec<ListedEntry>, HostsError> {
        Ok(self.load()?.entries())
    }

    pub fn find_by_position(&self, position: usize) -> Result<HostEntry, HostsError> {
        let file = self.load()?;
        file.line_at(position)
            .and_then(HostEntry::parse)
            .ok_or_else(|| HostsError::NotFound(format!("position {position}")))
    }

    pub fn exists(&self, address: &str, domains: &str) -> Result<bool, HostsError> {
        Ok(self.load()?.exists(address, &normalize_domains(domains)))
    }

    pub fn search(&self, query: &str) -> Result<Vec<ListedEntry>, HostsError> {
        Ok(self.load()?.search(query))
    }

    /// Validate and append `address domains`. Fails with `DuplicateEntry` if present.
    pub fn add(&self, address: &str, domains: &str) -> Result<Change<HostEntry>, HostsError> {
        validate_address(address.trim())?;
        validate_domains(domains)?;
        self.edit(|file| file.add_entry(address, domains))
    }

    /// Remove exactly the entry at `position`.
    pub fn remove_by_position(&self, position: usize) -> Result<Change<Vec<String>>, HostsError> {
        self.edit(|file| {
            file.remove_position(position)
                .map(|line| vec![line])
                .ok_or_else(|| HostsError::NotFound(format!("position {position}")))
        })
    }

    /// Remove every entry whose first field equals `address`.
    pub fn remove_by_address(&self, address: &str) -> Result<Change<Vec<String>>, HostsError> {
        self.edit(|file| {
            let removed = file.remove_where(|l| first_field(l) == Some(address));
            non_empty(removed, address)
        })
    }

    /// Remove every entry containing `domain` as a substring.
    pub fn remove_by_domain(&self, domain: &str) -> Result<Change<Vec<String>>, HostsError> {
        self.edit(|file| {
            let removed = file.remove_where(|l| l.trim_end().contains(domain));
            non_empty(removed, domain)
        })
    }

    /// Remove whatever a parsed target resolves to.
    pub fn remove(&self, target: &RemoveTarget) -> Result<Change<Vec<String>>, HostsError> {
        match target {
            RemoveTarget::Position(p) => self.remove_by_position(*p),
            RemoveTarget::Address(a) => self.remove_by_address(a),
            RemoveTarget::Domain(d) => self.remove_by_domain(d),
        }
    }

    /// Load, apply `f`, then back up and rewrite. Nothing is written if `f` fails.
    fn edit<T>(
        &self,
        f: impl FnOnce(&mut HostsFile) -> Result<T, HostsError>,
    ) -> Result<Change<T>, HostsError> {
        let mut file = self.load()?;
        let outcome = f(&mut file)?;
        let backup = self.commit(&file)?;
        Ok(Change { outcome, backup })
    }

    /// Back up the file as it is on disk, then replace it with `file`.
    pub fn commit(&self, file: &HostsFile) -> Result<Backup, HostsError> {
        let backup = self.backups.snapshot()?;
        write_atomic(&self.path, &file.render())?;
        debug!("rewrote {}", self.path.display());
        Ok(backup)
    }
}

fn non_empty(removed: Vec<String>, target: &str) -> Result<Vec<String>, HostsError> {
    if removed.is_empty() {
        Err(HostsError::NotFound(target.to_string()))
    } else {
        Ok(removed)
    }
}

/// Write to a temp file beside `path` and rename it over `path`.
///
/// A symlinked `path` is resolved first so the link itself stays in place.
/// Falls back to an in-place write when the target cannot be renamed over
/// (a bind-mounted /etc/hosts in a container reports EBUSY).
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), HostsError> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| HostsError::write(path, e))?;
    tmp.write_all(content)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| HostsError::write(path, e))?;
    if let Ok(meta) = fs::metadata(&target) {
        fs::set_permissions(tmp.path(), meta.permissions()).map_err(|e| HostsError::write(path, e))?;
    }
    match tmp.persist(&target) {
        Ok(_) => Ok(()),
        Err(e) if is_busy(&e.error) => {
            warn!("cannot replace {} atomically, writing in place", target.display());
            fs::write(&target, content).map_err(|e| HostsError::write(path, e))
        }
        Err(e) => Err(HostsError::write(path, e.error)),
    }
}

#[cfg(unix)]
fn is_busy(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(libc::EBUSY)
}

#[cfg(not(unix))]
fn is_busy(_err: &std::io::Error) -> bool {
    false
}
