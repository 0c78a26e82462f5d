// SPDX-License-Identifier: GPL-3.0-only

//! Persisted mount table (fstab-style) entries

use std::fmt;

use serde::{Deserialize, Serialize};

/// Options written for every entry this system persists.
pub const DEFAULT_OPTIONS: &str = "defaults";
pub const DEFAULT_DUMP: u32 = 1;
pub const DEFAULT_PASS: u32 = 2;

/// One line of the persisted mount table.
///
/// Entries appended by this system use the five-column layout
/// `device mount_point options dump pass`. Pre-existing six-column fstab lines
/// (`device mount_point type options dump pass`) are read with their type
/// column kept in `fs_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountTableEntry {
    pub device: String,
    pub mount_point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_type: Option<String>,
    pub options: String,
    pub dump: u32,
    pub pass: u32,
}

impl MountTableEntry {
    /// Entry with the default options used for persisted mounts.
    pub fn with_defaults(device: impl Into<String>, mount_point: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            mount_point: mount_point.into(),
            fs_type: None,
            options: DEFAULT_OPTIONS.to_string(),
            dump: DEFAULT_DUMP,
            pass: DEFAULT_PASS,
        }
    }

    /// Parse a single table line.
    ///
    /// Returns `None` for blank lines, comments and lines with fewer than two
    /// fields. Missing or non-numeric dump/pass columns read as 0.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            return None;
        }

        let (fs_type, rest) = if fields.len() >= 6 {
            (Some(fields[2].to_string()), &fields[3..])
        } else {
            (None, &fields[2..])
        };
        let number = |index: usize| rest.get(index).and_then(|v| v.parse().ok()).unwrap_or(0);

        Some(Self {
            device: fields[0].to_string(),
            mount_point: fields[1].to_string(),
            fs_type,
            options: rest.first().copied().unwrap_or(DEFAULT_OPTIONS).to_string(),
            dump: number(1),
            pass: number(2),
        })
    }
}

impl fmt::Display for MountTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.device, self.mount_point)?;
        if let Some(fs_type) = &self.fs_type {
            write!(f, "{fs_type} ")?;
        }
        write!(f, "{} {} {}", self.options, self.dump, self.pass)
    }
}
