// SPDX-License-Identifier: GPL-3.0-only

//! A scripted stand-in for the host's mount utilities.
//!
//! `FakeHost` answers `df`, `mount`, `umount`, `dd`, `mkswap`, `swapon` and
//! `swapoff` the way the real tools do, keeping its own mount list and writing
//! the swap table to a temporary file so `/proc/swaps` readers see it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use storage_sys::{
    CommandError, CommandRunner, FilesystemDirectory, HostPaths, MountManager, MountTable,
    SwapManager, ToolPaths, command::render,
};
use tempfile::TempDir;

const DF_HEADER: &str = "Filesystem     Type      Size  Used Avail Use% Mounted on";
const SWAPS_HEADER: &str = "Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority";

#[derive(Default)]
struct State {
    /// (device, mount point) in mount order
    mounts: Vec<(String, String)>,
    /// active swap paths in activation order
    swaps: Vec<String>,
    formatted_swaps: Vec<String>,
    calls: Vec<String>,
    failures: HashMap<String, CommandError>,
}

pub struct FakeHost {
    dir: TempDir,
    state: Mutex<State>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        let host = Arc::new(Self {
            dir: tempfile::tempdir().expect("tempdir"),
            state: Mutex::new(State::default()),
        });
        host.write_swaps(&[]);
        host
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn paths(&self) -> HostPaths {
        HostPaths {
            fstab: self.root().join("fstab"),
            swaps: self.root().join("swaps"),
            mounts: self.root().join("mounts"),
        }
    }

    pub fn tools() -> ToolPaths {
        ToolPaths::default()
    }

    pub fn directory(self: &Arc<Self>) -> FilesystemDirectory {
        FilesystemDirectory::new(self.clone(), &self.paths(), &Self::tools())
    }

    pub fn mount_manager(self: &Arc<Self>) -> MountManager {
        MountManager::new(
            self.clone(),
            MountTable::new(self.paths().fstab),
            &Self::tools(),
        )
    }

    pub fn mount_manager_with_table(self: &Arc<Self>, table: PathBuf) -> MountManager {
        MountManager::new(self.clone(), MountTable::new(table), &Self::tools())
    }

    /// Swap manager that chowns to the test user rather than root.
    pub fn swap_manager(self: &Arc<Self>) -> SwapManager {
        let meta = fs::metadata(self.root()).expect("tempdir metadata");
        SwapManager::new(self.clone(), &self.paths(), &Self::tools())
            .with_owner(meta.uid(), meta.gid())
    }

    /// Make the next invocation of `program` fail with `stderr`.
    pub fn fail_next(&self, program: &str, status: i32, stderr: &str) {
        self.state.lock().unwrap().failures.insert(
            program.to_string(),
            CommandError {
                command: program.to_string(),
                status: Some(status),
                stderr: stderr.to_string(),
            },
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn write_swaps(&self, swaps: &[String]) {
        let mut content = format!("{SWAPS_HEADER}\n");
        for (index, path) in swaps.iter().enumerate() {
            content.push_str(&format!(
                "{path:<40} file\t\t65532\t\t0\t\t-{}\n",
                index + 2
            ));
        }
        fs::write(self.paths().swaps, content).expect("write swaps table");
    }

    fn handle(&self, state: &mut State, program: &str, args: &[&str]) -> Result<String, String> {
        let name = program.rsplit('/').next().unwrap_or(program);
        match (name, args) {
            ("df", ["-hT"]) => {
                let mut out = format!("{DF_HEADER}\n/dev/sda2      ext4      468G  201G  244G  46% /\n");
                for (device, mount_point) in &state.mounts {
                    out.push_str(&format!(
                        "{device} ext4 976M 2.6M 907M 1% {mount_point}\n"
                    ));
                }
                Ok(out)
            }
            ("mount", [device, mount_point]) => {
                if let Some((d, m)) = state
                    .mounts
                    .iter()
                    .find(|(d, m)| d == device || m == mount_point)
                {
                    return Err(format!("mount: {mount_point}: {d} already mounted on {m}.\n"));
                }
                state
                    .mounts
                    .push((device.to_string(), mount_point.to_string()));
                Ok(String::new())
            }
            ("umount", [mount_point]) => {
                let before = state.mounts.len();
                state.mounts.retain(|(_, m)| m != mount_point);
                if state.mounts.len() == before {
                    return Err(format!("umount: {mount_point}: not mounted.\n"));
                }
                Ok(String::new())
            }
            ("dd", ["if=/dev/zero", output, size, "count=1"]) => {
                let path = output.strip_prefix("of=").ok_or("dd: missing of=")?;
                size.strip_prefix("bs=").ok_or("dd: missing bs=")?;
                fs::write(path, vec![0u8; 4096])
                    .map_err(|e| format!("dd: failed to open '{path}': {e}\n"))?;
                Ok(String::new())
            }
            ("mkswap", [path]) => {
                if !Path::new(path).exists() {
                    return Err(format!("mkswap: cannot open {path}: No such file or directory\n"));
                }
                state.formatted_swaps.push(path.to_string());
                Ok("Setting up swapspace version 1, size = 60 KiB\n".to_string())
            }
            ("swapon", [path]) => {
                if !state.formatted_swaps.iter().any(|p| p == path) {
                    return Err(format!("swapon: {path}: read swap header failed\n"));
                }
                if state.swaps.iter().any(|p| p == path) {
                    return Err(format!("swapon: {path}: swapon failed: Device or resource busy\n"));
                }
                state.swaps.push(path.to_string());
                self.write_swaps(&state.swaps);
                Ok(String::new())
            }
            ("swapoff", [path]) => {
                let before = state.swaps.len();
                state.swaps.retain(|p| p != path);
                if state.swaps.len() == before {
                    return Err(format!("swapoff: {path}: swapoff failed: Invalid argument\n"));
                }
                self.write_swaps(&state.swaps);
                Ok(String::new())
            }
            _ => Err(format!("{name}: unexpected invocation {args:?}\n")),
        }
    }
}

impl CommandRunner for FakeHost {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let rendered = render(program, args);
        let mut state = self.state.lock().unwrap();
        state.calls.push(rendered.clone());

        let name = program.rsplit('/').next().unwrap_or(program);
        if let Some(mut error) = state.failures.remove(name) {
            error.command = rendered;
            return Err(error);
        }

        self.handle(&mut state, program, args)
            .map_err(|stderr| CommandError {
                command: rendered,
                status: Some(32),
                stderr,
            })
    }
}
