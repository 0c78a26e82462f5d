// SPDX-License-Identifier: GPL-3.0-only

//! Live mounted-filesystem queries
//!
//! Every call re-runs the capacity report; nothing is cached.

use std::sync::Arc;

use storage_types::FilesystemRecord;
use tracing::debug;

use crate::command::CommandRunner;
use crate::error::{Result, SysError, path_io};
use crate::parse::{parse_df_output, parse_proc_mounts};
use crate::paths::{HostPaths, ToolPaths};

const DF_ARGS: &[&str] = &["-hT"];

pub struct FilesystemDirectory {
    runner: Arc<dyn CommandRunner>,
    df: String,
    mounts_table: std::path::PathBuf,
}

impl FilesystemDirectory {
    pub fn new(runner: Arc<dyn CommandRunner>, paths: &HostPaths, tools: &ToolPaths) -> Self {
        Self {
            runner,
            df: tools.df.clone(),
            mounts_table: paths.mounts.clone(),
        }
    }

    /// Every mounted filesystem in the current capacity report.
    pub fn list(&self) -> Result<Vec<FilesystemRecord>> {
        let query = || -> Result<Vec<FilesystemRecord>> {
            let output = self.runner.run(&self.df, DF_ARGS)?;
            Ok(parse_df_output(&output)?)
        };

        let records = query().map_err(|cause| SysError::DirectoryQueryFailed {
            cause: Box::new(cause),
        })?;
        debug!("Found {} mounted filesystems", records.len());
        Ok(records)
    }

    /// Mount points of every mounted filesystem.
    pub fn mount_points(&self) -> Result<Vec<String>> {
        Ok(self
            .list()?
            .into_iter()
            .map(|record| record.mounted_on)
            .collect())
    }

    /// The filesystem mounted exactly on `mount_point`.
    pub fn lookup(&self, mount_point: &str) -> Result<FilesystemRecord> {
        self.list()?
            .into_iter()
            .find(|record| record.mounted_on == mount_point)
            .ok_or_else(|| SysError::NotFound {
                mount_point: mount_point.to_string(),
            })
    }

    /// Whether `/dev/<partition>` appears as a mounted device in the kernel
    /// mount table. A leading `/dev/` on `partition` is accepted.
    pub fn is_partition_mounted(&self, partition: &str) -> Result<bool> {
        let device = if partition.starts_with("/dev/") {
            partition.to_string()
        } else {
            format!("/dev/{partition}")
        };

        let content =
            std::fs::read_to_string(&self.mounts_table).map_err(path_io(&self.mounts_table))?;
        Ok(parse_proc_mounts(&content)
            .iter()
            .any(|(mounted, _, _)| *mounted == device))
    }
}
