// SPDX-License-Identifier: GPL-3.0-only

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;

use common::FakeHost;
use storage_sys::SysError;

fn swap_path(host: &FakeHost, name: &str) -> String {
    let dir = host.root().join("swap");
    fs::create_dir_all(&dir).unwrap();
    dir.join(name).to_string_lossy().into_owned()
}

#[test]
fn activate_query_deactivate_roundtrip() {
    let host = FakeHost::new();
    let swap = host.swap_manager();
    let path = swap_path(&host, "swapfileA");

    swap.create_backing_file("64K", &path).unwrap();
    swap.format_as_swap(&path).unwrap();
    swap.activate(&path).unwrap();

    let record = swap.query("swapfileA").unwrap();
    assert_eq!(record.filename, path);
    assert_eq!(record.swap_type, "file");
    assert_eq!(swap.query(&path).unwrap(), record);
    assert_eq!(swap.list_devices().unwrap(), vec![path.clone()]);

    swap.deactivate(&path).unwrap();

    let error = swap.query("swapfileA").unwrap_err();
    assert!(error.is_not_found());
    assert!(matches!(error, SysError::SwapNotFound { ref device } if device == "swapfileA"));
    assert!(!std::path::Path::new(&path).exists());
    assert!(swap.list_devices().unwrap().is_empty());
}

#[test]
fn provision_runs_each_step_in_order() {
    let host = FakeHost::new();
    let swap = host.swap_manager();
    let path = swap_path(&host, "swapfileB");

    swap.provision("64K", &path).unwrap();

    let calls = host.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], format!("dd if=/dev/zero of={path} bs=64K count=1"));
    assert_eq!(calls[1], format!("mkswap {path}"));
    assert_eq!(calls[2], format!("swapon {path}"));
    assert!(swap.query("swapfileB").is_ok());
}

#[test]
fn formatting_restricts_permissions_to_owner() {
    let host = FakeHost::new();
    let swap = host.swap_manager();
    let path = swap_path(&host, "swapfileC");
    swap.create_backing_file("64K", &path).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    swap.format_as_swap(&path).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[test]
fn backing_file_failure_names_path_and_size() {
    let host = FakeHost::new();
    host.fail_next("dd", 1, "dd: failed to open '/full/swap': No space left on device\n");

    let error = host
        .swap_manager()
        .create_backing_file("1G", "/full/swap")
        .unwrap_err();

    match &error {
        SysError::BackingFileCreationFailed { path, size, cause } => {
            assert_eq!(path, "/full/swap");
            assert_eq!(size, "1G");
            assert!(cause.stderr.contains("No space left"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn formatting_a_missing_file_fails_before_mkswap() {
    let host = FakeHost::new();
    let path = swap_path(&host, "missing");

    let error = host.swap_manager().format_as_swap(&path).unwrap_err();

    match error {
        SysError::SwapFormatFailed { cause, .. } => {
            assert!(matches!(*cause, SysError::PathIo { .. }));
            assert!(cause.to_string().contains(&path));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(host.calls().is_empty());
}

#[test]
fn mkswap_failure_is_a_format_failure() {
    let host = FakeHost::new();
    let swap = host.swap_manager();
    let path = swap_path(&host, "swapfileD");
    swap.create_backing_file("64K", &path).unwrap();
    host.fail_next("mkswap", 1, "mkswap: error: swap area needs to be at least 40 KiB\n");

    let error = swap.format_as_swap(&path).unwrap_err();

    match error {
        SysError::SwapFormatFailed { cause, .. } => {
            assert!(matches!(*cause, SysError::Command(_)));
            assert!(cause.to_string().contains("at least 40 KiB"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn activating_an_unformatted_file_fails() {
    let host = FakeHost::new();
    let swap = host.swap_manager();
    let path = swap_path(&host, "swapfileE");
    swap.create_backing_file("64K", &path).unwrap();

    let error = swap.activate(&path).unwrap_err();

    assert!(matches!(error, SysError::SwapActivationFailed { .. }));
    assert!(swap.query("swapfileE").unwrap_err().is_not_found());
}

#[test]
fn deactivating_an_inactive_file_keeps_it() {
    let host = FakeHost::new();
    let swap = host.swap_manager();
    let path = swap_path(&host, "swapfileF");
    swap.create_backing_file("64K", &path).unwrap();

    let error = swap.deactivate(&path).unwrap_err();

    assert!(matches!(error, SysError::SwapDeactivationFailed { .. }));
    assert!(std::path::Path::new(&path).exists());
}

#[test]
fn unreadable_swap_table_is_a_query_failure_not_absence() {
    let host = FakeHost::new();
    fs::remove_file(host.paths().swaps).unwrap();

    let error = host.swap_manager().query("swapfileA").unwrap_err();

    assert!(!error.is_not_found());
    match error {
        SysError::SwapQueryFailed { device, cause } => {
            assert_eq!(device, "swapfileA");
            assert!(matches!(*cause, SysError::PathIo { ref path, .. } if *path == host.paths().swaps));
            assert!(cause.to_string().contains("swaps"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreadable_swap_table_listing_names_the_table() {
    let host = FakeHost::new();
    let table = host.paths().swaps;
    fs::remove_file(&table).unwrap();

    let error = host.swap_manager().list_devices().unwrap_err();

    assert!(matches!(error, SysError::PathIo { ref path, .. } if *path == table));
    assert!(error.to_string().contains(&*table.to_string_lossy()));
}

#[test]
fn full_path_match_wins_over_earlier_file_name_match() {
    let host = FakeHost::new();
    fs::write(
        host.paths().swaps,
        concat!(
            "Filename Type Size Used Priority\n",
            "/a/swapfile file 1024 0 -2\n",
            "/b/swapfile file 2048 0 -3\n",
            "swapfile file 4096 0 -4\n",
        ),
    )
    .unwrap();
    let swap = host.swap_manager();

    assert_eq!(swap.query("/b/swapfile").unwrap().size, "2048");
    assert_eq!(swap.query("swapfile").unwrap().size, "4096");
}

#[test]
fn first_row_wins_among_file_name_matches() {
    let host = FakeHost::new();
    fs::write(
        host.paths().swaps,
        concat!(
            "Filename Type Size Used Priority\n",
            "/a/swapfile file 1024 0 -2\n",
            "/b/swapfile file 2048 0 -3\n",
        ),
    )
    .unwrap();

    let record = host.swap_manager().query("swapfile").unwrap();

    assert_eq!(record.filename, "/a/swapfile");
    assert_eq!(record.size, "1024");
}

#[test]
fn malformed_matching_swap_row_is_a_query_failure() {
    let host = FakeHost::new();
    fs::write(
        host.paths().swaps,
        "Filename Type Size Used Priority\n/dev/dm-1 partition 8388604 0 -2\n/swap/broken file\n",
    )
    .unwrap();
    let swap = host.swap_manager();

    assert!(swap.query("/dev/dm-1").is_ok());
    let error = swap.query("broken").unwrap_err();
    match error {
        SysError::SwapQueryFailed { cause, .. } => assert!(matches!(*cause, SysError::Parse(_))),
        other => panic!("unexpected error: {other}"),
    }
}
