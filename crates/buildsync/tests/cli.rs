use std::process::Command;

use tempfile::tempdir;

fn buildsync() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_buildsync"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_options() {
    let output = buildsync().arg("--help").output().unwrap();
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--start", "--end", "--platform", "--concurrency", "--publish-marker"] {
        assert!(help.contains(flag), "missing {flag} in help");
    }
}

#[test]
fn test_missing_range_fails_before_any_io() {
    let dir = tempdir().unwrap();
    let output = buildsync().current_dir(dir.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no start id"));
    assert!(!dir.path().join("hashes.json").exists());
}

#[test]
fn test_inverted_range_is_rejected() {
    let dir = tempdir().unwrap();
    let output = buildsync()
        .current_dir(dir.path())
        .args(["--start", "9", "--end", "3"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("greater than"));
}

#[test]
fn test_config_file_is_read() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("buildsync.toml"),
        "start = 5\nend = 1\n",
    )
    .unwrap();
    let output = buildsync().current_dir(dir.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("start id 5 is greater than end id 1"));
}
