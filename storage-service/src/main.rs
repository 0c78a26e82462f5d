// SPDX-License-Identifier: GPL-3.0-only

//! storage-mountctl - host mount, swap and fstab management
//!
//! A thin front end over `storage-sys`: every subcommand maps to one core
//! operation and prints its result as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt};

use storage_sys::{
    CommandRunner, FilesystemDirectory, Formatter, HostCommandRunner, MountManager, MountTable,
    SwapManager, supported_filesystem_types,
};

mod config;

use config::ServiceConfig;

#[derive(Debug, Parser)]
#[command(name = "storage-mountctl", version)]
#[command(about = "Inspect and manage host mounts, swap and the persisted mount table")]
struct Cli {
    /// Configuration file (default: /etc/storage-mountctl.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List mounted filesystems
    List,
    /// Show the filesystem mounted on a mount point
    Show { mount_point: String },
    /// Mount a block device, optionally persisting it in the mount table
    Mount {
        device: String,
        mount_point: String,
        #[arg(long)]
        persistent: bool,
    },
    /// Unmount a mount point and drop its mount table entries
    Unmount { mount_point: String },
    /// Format a block device
    Format { fs_type: String, device: String },
    /// Filesystem types with an installed mkfs helper
    FsTypes,
    /// List persisted mount table entries
    Fstab,
    /// Check whether a partition (e.g. sdb1) is mounted
    IsMounted { partition: String },
    /// Swap devices and files
    Swap {
        #[command(subcommand)]
        command: SwapCommand,
    },
}

#[derive(Debug, Subcommand)]
enum SwapCommand {
    /// List active swap devices
    List,
    /// Show one active swap device
    Show { device: String },
    /// Create a zero-filled backing file
    Create { size: String, path: String },
    /// Format a file or device as swap
    Format { path: String },
    /// Activate swap on a file or device
    On { path: String },
    /// Deactivate swap, deleting the backing file if it is a regular file
    Off { device: String },
    /// Create, format and activate a swap file
    Provision { size: String, path: String },
}

impl Command {
    fn is_mutating(&self) -> bool {
        match self {
            Command::Mount { .. } | Command::Unmount { .. } | Command::Format { .. } => true,
            Command::Swap { command } => !matches!(
                command,
                SwapCommand::List | SwapCommand::Show { .. }
            ),
            Command::List
            | Command::Show { .. }
            | Command::FsTypes
            | Command::Fstab
            | Command::IsMounted { .. } => false,
        }
    }
}

/// Core services wired to one configuration.
struct Host {
    directory: FilesystemDirectory,
    mounts: MountManager,
    swap: SwapManager,
    formatter: Formatter,
}

impl Host {
    fn new(config: &ServiceConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let table = MountTable::new(config.paths.fstab.clone());
        Self {
            directory: FilesystemDirectory::new(runner.clone(), &config.paths, &config.tools),
            mounts: MountManager::new(runner.clone(), table, &config.tools),
            swap: SwapManager::new(runner.clone(), &config.paths, &config.tools),
            formatter: Formatter::new(runner, &config.tools),
        }
    }

    fn run(&self, command: Command) -> storage_sys::Result<Value> {
        let value = match command {
            Command::List => json!(self.directory.list()?),
            Command::Show { mount_point } => json!(self.directory.lookup(&mount_point)?),
            Command::Mount {
                device,
                mount_point,
                persistent,
            } => json!({
                "mount_point": self.mounts.create(&device, &mount_point, persistent)?,
                "persistent": persistent,
            }),
            Command::Unmount { mount_point } => {
                self.mounts.delete(&mount_point)?;
                json!({ "unmounted": mount_point })
            }
            Command::Format { fs_type, device } => {
                self.formatter.make_filesystem(&fs_type, &device)?;
                json!({ "device": device, "type": fs_type })
            }
            Command::FsTypes => json!(supported_filesystem_types()),
            Command::Fstab => json!(self.mounts.table().entries()?),
            Command::IsMounted { partition } => json!({
                "partition": partition,
                "mounted": self.directory.is_partition_mounted(&partition)?,
            }),
            Command::Swap { command } => self.run_swap(command)?,
        };
        Ok(value)
    }

    fn run_swap(&self, command: SwapCommand) -> storage_sys::Result<Value> {
        let value = match command {
            SwapCommand::List => json!(self.swap.list_devices()?),
            SwapCommand::Show { device } => json!(self.swap.query(&device)?),
            SwapCommand::Create { size, path } => {
                self.swap.create_backing_file(&size, &path)?;
                json!({ "created": path, "size": size })
            }
            SwapCommand::Format { path } => {
                self.swap.format_as_swap(&path)?;
                json!({ "formatted": path })
            }
            SwapCommand::On { path } => {
                self.swap.activate(&path)?;
                json!({ "activated": path })
            }
            SwapCommand::Off { device } => {
                self.swap.deactivate(&device)?;
                json!({ "deactivated": device })
            }
            SwapCommand::Provision { size, path } => {
                self.swap.provision(&size, &path)?;
                json!({ "activated": path, "size": size })
            }
        };
        Ok(value)
    }
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storage_service=info,storage_sys=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::load(cli.config.as_deref())?;
    tracing::debug!("Using {:?}", config);

    if cli.command.is_mutating() && unsafe { libc::geteuid() } != 0 {
        tracing::error!("This operation must run as root");
        anyhow::bail!("{:?} requires root privileges", cli.command);
    }

    let host = Host::new(&config, Arc::new(HostCommandRunner));
    let value = host.run(cli.command)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
