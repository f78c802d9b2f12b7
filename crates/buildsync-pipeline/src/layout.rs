use std::path::{Path, PathBuf};

use buildsync_manifest::{ItemId, PathScheme};

/// Default manifest file name, relative to the output root.
pub const MANIFEST_FILE: &str = "hashes.json";

/// Default staging directory name, relative to the output root.
///
/// Staging must share a filesystem with the output tree so promotion is a rename.
pub const STAGING_DIR: &str = ".buildsync-staging";

/// Where a run reads and writes on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    output_root:   PathBuf,
    staging_root:  PathBuf,
    manifest_path: PathBuf,
}

impl Layout {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        let output_root = output_root.into();
        Self {
            staging_root: output_root.join(STAGING_DIR),
            manifest_path: output_root.join(MANIFEST_FILE),
            output_root,
        }
    }

    pub fn staging_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.staging_root = path.into();
        self
    }

    pub fn manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn output(&self) -> &Path { &self.output_root }

    pub fn staging(&self) -> &Path { &self.staging_root }

    pub fn manifest(&self) -> &Path { &self.manifest_path }

    /// `{staging_root}/{id}`, owned by the worker for `id`.
    pub fn staging_dir(&self, id: ItemId) -> PathBuf { self.staging_root.join(id.to_string()) }

    /// `{id}.json`, relative to [`Layout::staging_dir`].
    pub fn staging_file_name(id: ItemId) -> String { format!("{id}.json") }

    /// Final location of `id` under the output root.
    pub fn artifact_path(&self, scheme: &PathScheme, id: ItemId) -> PathBuf {
        let mut path = self.output_root.clone();
        path.extend(scheme.artifact_key(id).split('/'));
        path
    }
}
