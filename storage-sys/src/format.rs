// SPDX-License-Identifier: GPL-3.0-only

//! Block device formatting

use std::sync::Arc;

use tracing::info;

use crate::command::CommandRunner;
use crate::error::{Result, SysError};
use crate::paths::ToolPaths;

/// Filesystem types checked by [`supported_filesystem_types`], with the
/// helper `mkfs` dispatches to for each.
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("ext2", "mkfs.ext2"),
    ("ext3", "mkfs.ext3"),
    ("ext4", "mkfs.ext4"),
    ("xfs", "mkfs.xfs"),
    ("btrfs", "mkfs.btrfs"),
    ("vfat", "mkfs.vfat"),
    ("ntfs", "mkfs.ntfs"),
    ("exfat", "mkfs.exfat"),
];

pub struct Formatter {
    runner: Arc<dyn CommandRunner>,
    mkfs: String,
}

impl Formatter {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: &ToolPaths) -> Self {
        Self {
            runner,
            mkfs: tools.mkfs.clone(),
        }
    }

    /// Run `mkfs -t <fs_type> -F <device>`.
    ///
    /// The result is not verified; whatever `mkfs` accepts is written.
    pub fn make_filesystem(&self, fs_type: &str, device: &str) -> Result<()> {
        self.runner
            .run(&self.mkfs, &["-t", fs_type, "-F", device])
            .map_err(|cause| SysError::FormatFailed {
                device: device.to_string(),
                fs_type: fs_type.to_string(),
                cause,
            })?;

        info!("Formatted {} as {}", device, fs_type);
        Ok(())
    }
}

/// Known filesystem types whose `mkfs.<type>` helper is installed.
pub fn supported_filesystem_types() -> Vec<String> {
    let supported: Vec<String> = KNOWN_TYPES
        .iter()
        .filter(|(_, helper)| which::which(helper).is_ok())
        .map(|(fs_type, _)| fs_type.to_string())
        .collect();

    tracing::debug!("Detected filesystem support: {:?}", supported);
    supported
}
