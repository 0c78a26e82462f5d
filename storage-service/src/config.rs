// SPDX-License-Identifier: GPL-3.0-only

//! Service configuration
//!
//! ```toml
//! [paths]
//! fstab = "/etc/fstab"
//! swaps = "/proc/swaps"
//! mounts = "/proc/mounts"
//!
//! [tools]
//! mount = "/usr/bin/mount"
//! umount = "/usr/bin/umount"
//! ```
//!
//! Every key is optional; omitted keys keep their defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storage_sys::{HostPaths, ToolPaths};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/storage-mountctl.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub paths: HostPaths,
    pub tools: ToolPaths,
}

impl ServiceConfig {
    /// Load `explicit` if given (it must exist), otherwise the default
    /// location if present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    tracing::debug!("No config at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
