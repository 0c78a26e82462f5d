// SPDX-License-Identifier: GPL-3.0-only

//! Swap file and device lifecycle
//!
//! A target moves through `absent -> file created -> formatted -> active`
//! and back to `absent` on deactivation. Each step is a separate call so the
//! caller can resume after a failure.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use storage_types::{SwapRecord, match_swap_name};
use tracing::{debug, info};

use crate::command::CommandRunner;
use crate::error::{Result, SysError, path_io};
use crate::parse::{parse_swap_entry, parse_swaps_output};
use crate::paths::{HostPaths, ToolPaths};

const SWAP_FILE_MODE: u32 = 0o600;

pub struct SwapManager {
    runner: Arc<dyn CommandRunner>,
    swaps_table: PathBuf,
    tools: ToolPaths,
    owner: (u32, u32),
}

impl SwapManager {
    pub fn new(runner: Arc<dyn CommandRunner>, paths: &HostPaths, tools: &ToolPaths) -> Self {
        Self {
            runner,
            swaps_table: paths.swaps.clone(),
            tools: tools.clone(),
            owner: (0, 0),
        }
    }

    /// Owner given to swap files by [`format_as_swap`](Self::format_as_swap).
    /// Defaults to root.
    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.owner = (uid, gid);
        self
    }

    /// Allocate a zero-filled file of `size` (a `dd` block size such as
    /// `512M`) at `path`.
    pub fn create_backing_file(&self, size: &str, path: &str) -> Result<()> {
        let output_arg = format!("of={path}");
        let size_arg = format!("bs={size}");

        self.runner
            .run(
                &self.tools.dd,
                &["if=/dev/zero", &output_arg, &size_arg, "count=1"],
            )
            .map_err(|cause| SysError::BackingFileCreationFailed {
                path: path.to_string(),
                size: size.to_string(),
                cause,
            })?;

        info!("Created {} swap backing file {}", size, path);
        Ok(())
    }

    /// Restrict `path` to its owner and write a swap signature to it.
    pub fn format_as_swap(&self, path: &str) -> Result<()> {
        let format_error = |cause: SysError| SysError::SwapFormatFailed {
            path: path.to_string(),
            cause: Box::new(cause),
        };

        let (uid, gid) = self.owner;
        std::os::unix::fs::chown(path, Some(uid), Some(gid))
            .and_then(|()| fs::set_permissions(path, fs::Permissions::from_mode(SWAP_FILE_MODE)))
            .map_err(|e| format_error(path_io(Path::new(path))(e)))?;

        self.runner
            .run(&self.tools.mkswap, &[path])
            .map_err(|e| format_error(SysError::Command(e)))?;

        info!("Formatted {} as swap", path);
        Ok(())
    }

    pub fn activate(&self, path: &str) -> Result<()> {
        self.runner
            .run(&self.tools.swapon, &[path])
            .map_err(|cause| SysError::SwapActivationFailed {
                device: path.to_string(),
                cause,
            })?;

        info!("Activated swap on {}", path);
        Ok(())
    }

    /// Create, format and activate a swap file in one go, stopping at the
    /// first failing step.
    pub fn provision(&self, size: &str, path: &str) -> Result<()> {
        self.create_backing_file(size, path)?;
        self.format_as_swap(path)?;
        self.activate(path)
    }

    /// The active swap entry for `device`, matched by full path or by file
    /// name.
    ///
    /// A full-path match wins over file-name matches. Among several rows
    /// sharing the file name, the first in the swap table is returned.
    ///
    /// An inactive device is [`SysError::SwapNotFound`]; an unreadable or
    /// malformed swap table is [`SysError::SwapQueryFailed`].
    pub fn query(&self, device: &str) -> Result<SwapRecord> {
        let query_error = |cause: SysError| SysError::SwapQueryFailed {
            device: device.to_string(),
            cause: Box::new(cause),
        };

        let content = fs::read_to_string(&self.swaps_table)
            .map_err(|e| query_error(path_io(&self.swaps_table)(e)))?;

        let best = content
            .lines()
            .skip(1)
            .filter_map(|line| {
                let filename = line.split_whitespace().next()?;
                match_swap_name(filename, device).map(|kind| (kind, line))
            })
            .fold(None, |best, (kind, line)| match best {
                Some((best_kind, _)) if best_kind >= kind => best,
                _ => Some((kind, line)),
            });

        if let Some((_, line)) = best {
            return parse_swap_entry(line).map_err(|e| query_error(e.into()));
        }

        debug!("{} not in {:?}", device, self.swaps_table);
        Err(SysError::SwapNotFound {
            device: device.to_string(),
        })
    }

    /// Names of all active swap devices and files.
    pub fn list_devices(&self) -> Result<Vec<String>> {
        let content =
            fs::read_to_string(&self.swaps_table).map_err(path_io(&self.swaps_table))?;
        Ok(parse_swaps_output(&content))
    }

    /// Deactivate `device`; if it is a regular file, delete it afterwards.
    pub fn deactivate(&self, device: &str) -> Result<()> {
        self.runner
            .run(&self.tools.swapoff, &[device])
            .map_err(|cause| SysError::SwapDeactivationFailed {
                device: device.to_string(),
                cause,
            })?;
        info!("Deactivated swap on {}", device);

        let path = Path::new(device);
        if path.is_file() {
            fs::remove_file(path).map_err(path_io(path))?;
            info!("Removed swap file {}", device);
        }

        Ok(())
    }
}
