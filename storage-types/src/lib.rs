// SPDX-License-Identifier: GPL-3.0-only

//! Domain models for host mount management
//!
//! These records are what the orchestration layer in `storage-sys` hands back
//! to its callers:
//!
//! - `FilesystemRecord` → one row of the live capacity report
//! - `SwapRecord` → one active swap device or file
//! - `MountTableEntry` → one line of the persisted mount table
//!
//! Only `MountTableEntry` describes durable state; the other two are rebuilt
//! from live kernel state on every query.

pub mod filesystem;
pub mod mount_table;
pub mod swap;

pub use filesystem::FilesystemRecord;
pub use mount_table::MountTableEntry;
pub use swap::{SwapNameMatch, SwapRecord, match_swap_name};
