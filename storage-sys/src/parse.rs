// SPDX-License-Identifier: GPL-3.0-only

//! Parsers for utility and kernel table output
//!
//! All functions here are pure: they take the captured text and return
//! records or a [`ParseError`]. They never return partial results.

use storage_types::{FilesystemRecord, SwapRecord};
use thiserror::Error;

const DF_COLUMNS: usize = 7;
const SWAP_COLUMNS: usize = 5;

/// Output did not match the fixed column layout of its source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source_name} line {line_number}: expected {expected} fields, found {found}: {line:?}")]
pub struct ParseError {
    pub source_name: &'static str,
    /// 1-based, counting the header
    pub line_number: usize,
    pub expected: usize,
    pub found: usize,
    pub line: String,
}

/// Parse `df -hT` output.
///
/// The first line is the header. Every other non-blank line must split into
/// exactly seven whitespace-separated columns; mount points containing
/// whitespace therefore fail to parse.
pub fn parse_df_output(output: &str) -> Result<Vec<FilesystemRecord>, ParseError> {
    let mut records = Vec::new();

    for (index, line) in output.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != DF_COLUMNS {
            return Err(ParseError {
                source_name: "df",
                line_number: index + 1,
                expected: DF_COLUMNS,
                found: fields.len(),
                line: line.to_string(),
            });
        }

        records.push(FilesystemRecord {
            filesystem: fields[0].to_string(),
            fs_type: fields[1].to_string(),
            size: fields[2].to_string(),
            used: fields[3].to_string(),
            available: fields[4].to_string(),
            use_percent: fields[5].to_string(),
            mounted_on: fields[6].to_string(),
        });
    }

    Ok(records)
}

/// Device names from `/proc/swaps` (first column, header skipped).
pub fn parse_swaps_output(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(ToString::to_string)
        .collect()
}

/// Parse one `/proc/swaps` row: `filename type size used priority`.
pub fn parse_swap_entry(line: &str) -> Result<SwapRecord, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != SWAP_COLUMNS {
        return Err(ParseError {
            source_name: "swaps",
            line_number: 1,
            expected: SWAP_COLUMNS,
            found: fields.len(),
            line: line.to_string(),
        });
    }

    Ok(SwapRecord {
        filename: fields[0].to_string(),
        swap_type: fields[1].to_string(),
        size: fields[2].to_string(),
        used: fields[3].to_string(),
        priority: fields[4].to_string(),
    })
}

/// `(device, mount_point, fs_type)` rows from `/proc/mounts`.
///
/// Octal escapes the kernel uses for whitespace in paths (`\040`) are decoded.
/// Lines with fewer than three fields are skipped.
pub fn parse_proc_mounts(output: &str) -> Vec<(String, String, String)> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mount_point = fields.next()?;
            let fs_type = fields.next()?;
            Some((
                unescape_mount_field(device),
                unescape_mount_field(mount_point),
                fs_type.to_string(),
            ))
        })
        .collect()
}

fn unescape_mount_field(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut output = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] == b'\\'
            && index + 3 < bytes.len()
            && bytes[index + 1..=index + 3]
                .iter()
                .all(|b| (b'0'..=b'7').contains(b))
            && let Ok(num) = u8::from_str_radix(&value[index + 1..index + 4], 8)
        {
            output.push(num);
            index += 4;
            continue;
        }

        output.push(bytes[index]);
        index += 1;
    }

    String::from_utf8_lossy(&output).into_owned()
}
