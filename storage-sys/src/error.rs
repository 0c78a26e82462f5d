// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use thiserror::Error;

use crate::command::CommandError;
use crate::parse::ParseError;

/// Error types for host mount and swap operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error on {}: {source}", path.display())]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No filesystem mounted on {mount_point}")]
    NotFound { mount_point: String },

    #[error("Mount table {path:?}: {source}")]
    MountTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to query mounted filesystems: {cause}")]
    DirectoryQueryFailed {
        #[source]
        cause: Box<SysError>,
    },

    #[error("Failed to mount {device} on {mount_point}: {cause}")]
    MountFailed {
        device: String,
        mount_point: String,
        #[source]
        cause: CommandError,
    },

    #[error("Failed to unmount {mount_point}: {cause}")]
    UnmountFailed {
        mount_point: String,
        #[source]
        cause: CommandError,
    },

    #[error("Failed to format {device} as {fs_type}: {cause}")]
    FormatFailed {
        device: String,
        fs_type: String,
        #[source]
        cause: CommandError,
    },

    #[error("Failed to create {size} swap backing file {path}: {cause}")]
    BackingFileCreationFailed {
        path: String,
        size: String,
        #[source]
        cause: CommandError,
    },

    #[error("Failed to format {path} as swap: {cause}")]
    SwapFormatFailed {
        path: String,
        #[source]
        cause: Box<SysError>,
    },

    #[error("Failed to activate swap on {device}: {cause}")]
    SwapActivationFailed {
        device: String,
        #[source]
        cause: CommandError,
    },

    #[error("Failed to query swap device {device}: {cause}")]
    SwapQueryFailed {
        device: String,
        #[source]
        cause: Box<SysError>,
    },

    #[error("Swap device not active: {device}")]
    SwapNotFound { device: String },

    #[error("Failed to deactivate swap on {device}: {cause}")]
    SwapDeactivationFailed {
        device: String,
        #[source]
        cause: CommandError,
    },
}

impl SysError {
    /// True for errors that mean "the queried thing is not in live state",
    /// as opposed to a failing command or table.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SysError::NotFound { .. } | SysError::SwapNotFound { .. })
    }
}

/// Attach the path an I/O error happened on.
pub(crate) fn path_io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> SysError + '_ {
    move |source| SysError::PathIo {
        path: path.to_path_buf(),
        source,
    }
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;
