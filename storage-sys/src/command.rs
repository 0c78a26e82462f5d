// SPDX-License-Identifier: GPL-3.0-only

//! External utility invocation
//!
//! Every interaction with live mount and swap state goes through a
//! [`CommandRunner`]. The host implementation spawns the utility, waits for
//! it, and hands back stdout only; stderr is kept for the error path.

use std::process::Command;

use thiserror::Error;
use tracing::{debug, warn};

/// A utility that could not be run or exited non-zero.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{command} failed ({}): {}", exit_label(.status), .stderr.trim())]
pub struct CommandError {
    /// Rendered command line
    pub command: String,
    /// Exit code, `None` if the process could not be spawned or was killed
    pub status: Option<i32>,
    /// Captured stderr, or the spawn error text
    pub stderr: String,
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "not run to completion".to_string(),
    }
}

/// Runs an external utility to completion.
///
/// Implementations must block until the child exits, capture stdout and
/// stderr separately, and report a non-zero exit as [`CommandError`].
/// No retries: each call runs the utility exactly once.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;
}

/// Spawns real processes on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostCommandRunner;

impl CommandRunner for HostCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let rendered = render(program, args);
        debug!("Running {}", rendered);

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|error| CommandError {
                command: rendered.clone(),
                status: None,
                stderr: error.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            warn!("{} failed: {}", rendered, stderr.trim());
            return Err(CommandError {
                command: rendered,
                status: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

pub fn render(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
