mod error;
mod workspace;

pub use error::{Error, Result};
pub use workspace::Workspace;

use std::io::Write;
use std::path::Path;

use error::{create_dir_err, read_err, write_err};

const TMP_PREFIX: &str = ".tmp.";
const TMP_SUFFIX: &str = ".buildsync";

#[derive(Clone, Copy, Debug, Default)]
pub struct AtomicWriteOptions {
    sync: bool,
}

impl AtomicWriteOptions {
    pub fn new() -> Self { Self::default() }

    /// Flush file contents to disk before the rename.
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Published files are world-readable; temp files start out owner-only.
#[cfg(unix)]
fn published_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn published_permissions() -> Option<std::fs::Permissions> { None }

/// Parent directory of `path`, treating a bare file name as relative to `.`.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Replace `path` with `content` so readers observe either the old file or the new one.
///
/// The content goes to a temporary sibling first and is renamed over the target.
pub fn atomic_write(
    path: impl AsRef<Path>,
    content: &[u8],
    options: AtomicWriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let parent = parent_dir(path);

    let mut tmp = tempfile::Builder::new()
        .prefix(TMP_PREFIX)
        .suffix(TMP_SUFFIX)
        .tempfile_in(parent)
        .map_err(write_err(parent))?;

    tmp.write_all(content).map_err(write_err(tmp.path()))?;

    if options.sync {
        tmp.as_file().sync_all().map_err(write_err(tmp.path()))?;
    }

    if let Some(perms) = published_permissions() {
        std::fs::set_permissions(tmp.path(), perms).map_err(write_err(tmp.path()))?;
    }

    tmp.persist(path).map_err(|e| Error::Rename {
        from:   e.file.path().to_path_buf(),
        to:     path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

/// Read `path`; a missing file is `Ok(None)`.
pub fn read_if_exists(path: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(read_err(path)(e)),
    }
}

/// Move `src` to `dest` with a single rename, creating `dest`'s parent directories.
///
/// Both paths must be on the same filesystem. The rename never falls back to
/// copy-and-delete, so `dest` is never observed half written.
pub fn promote(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    let parent = dest
        .parent()
        .ok_or_else(|| Error::NoParent(dest.to_path_buf()))?;

    if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent).map_err(create_dir_err(parent))?;
    }

    std::fs::rename(src, dest).map_err(|source| Error::Rename {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    })
}
