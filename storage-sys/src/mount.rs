// SPDX-License-Identifier: GPL-3.0-only

//! Mount and unmount lifecycle
//!
//! Neither direction is transactional. A mount whose table append fails stays
//! mounted, and an unmount whose table cleanup fails leaves the entry behind;
//! both surface as errors for the caller to reconcile.

use std::sync::Arc;

use tracing::{info, warn};

use crate::command::CommandRunner;
use crate::error::{Result, SysError};
use crate::fstab::{MountTable, validate_field};
use crate::paths::ToolPaths;

pub struct MountManager {
    runner: Arc<dyn CommandRunner>,
    table: MountTable,
    mount: String,
    umount: String,
}

impl MountManager {
    pub fn new(runner: Arc<dyn CommandRunner>, table: MountTable, tools: &ToolPaths) -> Self {
        Self {
            runner,
            table,
            mount: tools.mount.clone(),
            umount: tools.umount.clone(),
        }
    }

    pub fn table(&self) -> &MountTable {
        &self.table
    }

    /// Mount `device` on `mount_point`, then persist it when requested.
    ///
    /// There is no already-mounted pre-check; mounting a busy target fails at
    /// the mount step.
    pub fn create(&self, device: &str, mount_point: &str, persistent: bool) -> Result<String> {
        validate_field("device", device)?;
        validate_field("mount point", mount_point)?;

        self.runner
            .run(&self.mount, &[device, mount_point])
            .map_err(|cause| SysError::MountFailed {
                device: device.to_string(),
                mount_point: mount_point.to_string(),
                cause,
            })?;
        info!("Mounted {} on {}", device, mount_point);

        if persistent
            && let Err(e) = self.table.append_entry(device, mount_point)
        {
            warn!(
                "{} is mounted on {} but could not be persisted: {}",
                device, mount_point, e
            );
            return Err(e);
        }

        Ok(mount_point.to_string())
    }

    /// Unmount `mount_point` and drop its persisted entries.
    ///
    /// Table cleanup runs whether or not the mount was persisted; it is
    /// skipped only when the unmount itself fails.
    pub fn delete(&self, mount_point: &str) -> Result<()> {
        self.runner
            .run(&self.umount, &[mount_point])
            .map_err(|cause| SysError::UnmountFailed {
                mount_point: mount_point.to_string(),
                cause,
            })?;
        info!("Unmounted {}", mount_point);

        if let Err(e) = self.table.remove_entries_for_mount_point(mount_point) {
            warn!(
                "{} is unmounted but its persisted entries remain: {}",
                mount_point, e
            );
            return Err(e);
        }

        Ok(())
    }
}
