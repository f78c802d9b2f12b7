use buildsync_fs::{AtomicWriteOptions, Error, Workspace, atomic_write, promote, read_if_exists};
use tempfile::tempdir;

#[test]
fn test_atomic_write_basic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.txt");

    atomic_write(&path, b"hello world", AtomicWriteOptions::new()).unwrap();

    assert!(path.exists());
    assert_eq!(std::fs::read(&path).unwrap(), b"hello world");
}

#[test]
fn test_atomic_write_replaces_existing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("existing.txt");

    std::fs::write(&path, "original").unwrap();

    atomic_write(&path, b"new content", AtomicWriteOptions::new()).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"new content");
}

#[test]
fn test_atomic_write_into_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing/dir/file.txt");

    let err = atomic_write(&path, b"data", AtomicWriteOptions::new()).unwrap_err();

    assert!(matches!(err, Error::Write { .. }));
    assert!(!path.exists());
}

#[test]
fn test_read_if_exists_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hashes.json");
    std::fs::create_dir(&path).unwrap();

    match read_if_exists(&path) {
        Err(Error::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected a read error, got {other:?}"),
    }
    assert!(read_if_exists(dir.path().join("absent.json")).unwrap().is_none());
}

#[test]
fn test_promote_overwrites_previous_artifact() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("products/10/os/linux/builds@generation=2");
    std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
    std::fs::write(&dest, "old").unwrap();

    let staged = dir.path().join("staged");
    std::fs::write(&staged, "new").unwrap();
    promote(&staged, &dest).unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"new");
}

#[test]
fn test_concurrent_workspaces_do_not_collide() {
    let dir = tempdir().unwrap();
    let staging_root = dir.path().join("staging");
    let out = dir.path().join("out");

    std::thread::scope(|scope| {
        for id in 0..16u32 {
            let staging_root = &staging_root;
            let out = &out;
            scope.spawn(move || {
                let name = format!("{id}.json");
                let workspace = Workspace::new(staging_root.join(id.to_string())).unwrap();
                workspace.write(&name, id.to_string().as_bytes()).unwrap();
                workspace.promote(&name, out.join(id.to_string())).unwrap();
            });
        }
    });

    for id in 0..16u32 {
        assert_eq!(
            std::fs::read(out.join(id.to_string())).unwrap(),
            id.to_string().as_bytes()
        );
    }
    assert_eq!(std::fs::read_dir(&staging_root).unwrap().count(), 0);
}
