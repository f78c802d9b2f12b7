use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{create_dir_err, read_err, remove_err, write_err};
use crate::Result;

/// Private scratch directory owned by one unit of work.
///
/// Files are written here first and leave only through [`Workspace::promote`].
/// The directory is removed on promote, on [`Workspace::discard`], or on drop.
#[derive(Debug)]
pub struct Workspace {
    root:     PathBuf,
    finished: bool,
}

impl Workspace {
    /// Create a fresh workspace at `root`.
    ///
    /// Leftovers from an earlier attempt at the same root are cleared first.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.exists() {
            std::fs::remove_dir_all(&root).map_err(remove_err(&root))?;
        }
        std::fs::create_dir_all(&root).map_err(create_dir_err(&root))?;
        Ok(Self {
            root,
            finished: false,
        })
    }

    pub fn write(&self, name: impl AsRef<Path>, content: &[u8]) -> Result<PathBuf> {
        let path = self.root.join(name);
        std::fs::write(&path, content).map_err(write_err(&path))?;
        Ok(path)
    }

    pub fn open(&self, name: impl AsRef<Path>) -> Result<File> {
        let path = self.root.join(name);
        File::open(&path).map_err(read_err(&path))
    }

    /// Rename `name` out of the workspace to `destination`, then remove the workspace.
    pub fn promote(mut self, name: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
        crate::promote(self.root.join(name), destination)?;
        self.cleanup()
    }

    /// Remove the workspace and everything staged in it.
    pub fn discard(mut self) -> Result<()> { self.cleanup() }

    fn cleanup(&mut self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root).map_err(remove_err(&self.root))?;
        }
        self.finished = true;
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.finished {
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }
}
