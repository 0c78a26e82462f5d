// SPDX-License-Identifier: GPL-3.0-only

//! Host mount, swap and persisted mount table operations
//!
//! This crate drives the host's own utilities (`df`, `mount`, `umount`,
//! `mkfs`, `mkswap`, `swapon`, `swapoff`, `dd`) and keeps the persisted mount
//! table in step with the mounts it creates:
//! - [`FilesystemDirectory`] lists and looks up live mounts
//! - [`MountManager`] mounts and unmounts, optionally persisting
//! - [`SwapManager`] creates, activates, queries and removes swap
//! - [`Formatter`] writes filesystems to block devices
//! - [`MountTable`] reads and edits the persisted table
//!
//! All operations block until the utility they invoke exits. They require
//! root privileges on a real host.

pub mod command;
pub mod directory;
pub mod error;
pub mod format;
pub mod fstab;
pub mod mount;
pub mod parse;
pub mod paths;
pub mod swap;

pub use command::{CommandError, CommandRunner, HostCommandRunner};
pub use directory::FilesystemDirectory;
pub use error::{Result, SysError};
pub use format::{Formatter, supported_filesystem_types};
pub use fstab::MountTable;
pub use mount::MountManager;
pub use parse::{
    ParseError, parse_df_output, parse_proc_mounts, parse_swap_entry, parse_swaps_output,
};
pub use paths::{HostPaths, ToolPaths};
pub use swap::SwapManager;
