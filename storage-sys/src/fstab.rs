// SPDX-License-Identifier: GPL-3.0-only

//! Persisted mount table store
//!
//! The table is a line-oriented fstab-style file. This store only ever
//! appends well-formed entries and removes entries by their mount-point
//! column; every other line, comments included, is preserved byte for byte.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use storage_types::MountTableEntry;
use tracing::{debug, info};

use crate::error::{Result, SysError};

/// Per-path write locks shared by every `MountTable` handle in the process.
static TABLE_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(Default::default);

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = TABLE_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks.entry(path.to_path_buf()).or_default().clone()
}

/// Handle to one persisted mount table file.
///
/// Operations on handles for the same path are serialized within this
/// process. Nothing guards against another process editing the file.
#[derive(Debug, Clone)]
pub struct MountTable {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl MountTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = lock_for(&path);
        Self { path, lock }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn table_error(&self, source: std::io::Error) -> SysError {
        SysError::MountTable {
            path: self.path.clone(),
            source,
        }
    }

    /// Append `"<device> <mount_point> defaults 1 2"` and flush it to disk.
    ///
    /// Entries are not deduplicated.
    pub fn append_entry(&self, device: &str, mount_point: &str) -> Result<()> {
        validate_field("device", device)?;
        validate_field("mount point", mount_point)?;

        let entry = MountTableEntry::with_defaults(device, mount_point);
        let _guard = self.guard();

        let needs_newline = match fs::read(&self.path) {
            Ok(bytes) => bytes.last().is_some_and(|last| *last != b'\n'),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(self.table_error(e)),
        };

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.table_error(e))?;

        let mut line = String::new();
        if needs_newline {
            line.push('\n');
        }
        line.push_str(&entry.to_string());
        line.push('\n');

        file.write_all(line.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| self.table_error(e))?;

        info!("Persisted {} in {:?}", entry, self.path);
        Ok(())
    }

    /// Remove every entry whose mount-point column equals `mount_point`.
    ///
    /// Returns the number of lines removed. With no match the file is left
    /// untouched. A missing table counts as empty.
    pub fn remove_entries_for_mount_point(&self, mount_point: &str) -> Result<usize> {
        let _guard = self.guard();

        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.table_error(e)),
        };

        let mut kept = Vec::with_capacity(content.len());
        let mut removed = 0;
        for line in content.split_inclusive(|byte| *byte == b'\n') {
            if is_entry_for(line, mount_point) {
                removed += 1;
            } else {
                kept.extend_from_slice(line);
            }
        }

        if removed == 0 {
            debug!("No entries for {} in {:?}", mount_point, self.path);
            return Ok(0);
        }

        self.replace_contents(&kept)?;
        info!(
            "Removed {} entries for {} from {:?}",
            removed, mount_point, self.path
        );
        Ok(removed)
    }

    /// All entries currently in the table. Comments and malformed lines are
    /// skipped; a missing table is empty.
    pub fn entries(&self) -> Result<Vec<MountTableEntry>> {
        let _guard = self.guard();

        match fs::read(&self.path) {
            Ok(content) => Ok(String::from_utf8_lossy(&content)
                .lines()
                .filter_map(MountTableEntry::parse_line)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.table_error(e)),
        }
    }

    /// Write `contents` to a sibling file and rename it over the table.
    ///
    /// A symlinked table is resolved first so the link stays in place and its
    /// target receives the new contents.
    fn replace_contents(&self, contents: &[u8]) -> Result<()> {
        let target = fs::canonicalize(&self.path).map_err(|e| self.table_error(e))?;
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "fstab".to_string());
        let temp_path = target.with_file_name(format!(".{file_name}.tmp"));

        let permissions = fs::metadata(&target)
            .map_err(|e| self.table_error(e))?
            .permissions();

        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            file.write_all(contents)?;
            file.sync_all()?;
            fs::set_permissions(&temp_path, permissions)?;
            fs::rename(&temp_path, &target)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            self.table_error(e)
        })
    }
}

fn is_entry_for(line: &[u8], mount_point: &str) -> bool {
    MountTableEntry::parse_line(&String::from_utf8_lossy(line)).is_some_and(|entry| entry.mount_point == mount_point)
}

/// Table fields are whitespace separated, so a value containing whitespace
/// would not read back as the same entry.
pub(crate) fn validate_field(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SysError::InvalidArgument(format!("{what} must not be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(SysError::InvalidArgument(format!(
            "{what} must not contain whitespace: {value:?}"
        )));
    }
    Ok(())
}
