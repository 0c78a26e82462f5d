// SPDX-License-Identifier: GPL-3.0-only

//! Mounted filesystem records

use serde::{Deserialize, Serialize};

/// One mounted filesystem as reported by `df -hT`.
///
/// Capacity columns are kept exactly as the utility printed them
/// (human-readable, e.g. `"20G"`, `"37%"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemRecord {
    /// Device path or label (e.g. `/dev/sda1`, `tmpfs`)
    pub filesystem: String,

    /// Filesystem type (e.g. "ext4", "xfs")
    #[serde(rename = "type")]
    pub fs_type: String,

    pub size: String,

    pub used: String,

    #[serde(rename = "avail")]
    pub available: String,

    #[serde(rename = "use%")]
    pub use_percent: String,

    /// Absolute path the filesystem is mounted on
    pub mounted_on: String,
}
