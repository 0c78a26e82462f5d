// SPDX-License-Identifier: GPL-3.0-only

//! Host file locations and utility executables
//!
//! Nothing in this crate reads a hard-coded path: orchestrators are built from
//! these structs so callers (and tests) can point them at other tables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kernel tables and the persisted mount table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostPaths {
    pub fstab: PathBuf,
    pub swaps: PathBuf,
    pub mounts: PathBuf,
}

impl Default for HostPaths {
    fn default() -> Self {
        Self {
            fstab: PathBuf::from("/etc/fstab"),
            swaps: PathBuf::from("/proc/swaps"),
            mounts: PathBuf::from("/proc/mounts"),
        }
    }
}

/// Executables invoked for each operation.
///
/// Bare names are resolved through `PATH` by the command runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub df: String,
    pub mount: String,
    pub umount: String,
    pub mkfs: String,
    pub mkswap: String,
    pub swapon: String,
    pub swapoff: String,
    pub dd: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            df: "df".to_string(),
            mount: "/bin/mount".to_string(),
            umount: "/bin/umount".to_string(),
            mkfs: "mkfs".to_string(),
            mkswap: "mkswap".to_string(),
            swapon: "swapon".to_string(),
            swapoff: "swapoff".to_string(),
            dd: "dd".to_string(),
        }
    }
}
