// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// An active swap device or file, as listed in `/proc/swaps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    /// Device or file path
    pub filename: String,

    /// "file" or "partition"
    #[serde(rename = "type")]
    pub swap_type: String,

    /// Size in KiB, as reported by the kernel
    pub size: String,

    /// Used KiB, as reported by the kernel
    pub used: String,

    pub priority: String,
}

/// How a swap table filename relates to a requested device name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SwapNameMatch {
    /// `device` is the final path component of the filename
    FileName,
    /// `device` is the full filename
    Exact,
}

/// Match a swap table `filename` against a requested `device`, which may be
/// a full path or just the file name.
pub fn match_swap_name(filename: &str, device: &str) -> Option<SwapNameMatch> {
    if filename == device {
        Some(SwapNameMatch::Exact)
    } else if filename.rsplit('/').next() == Some(device) {
        Some(SwapNameMatch::FileName)
    } else {
        None
    }
}
