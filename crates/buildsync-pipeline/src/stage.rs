//! Write-through staging: stage, verify from disk, then promote or discard.

use std::collections::BTreeSet;
use std::io::BufReader;
use std::path::PathBuf;

use buildsync_fetch::ItemId;
use buildsync_fs::Workspace;
use buildsync_manifest::{Manifest, PathScheme};
use buildsync_verify::{ContentHash, Sha1Hasher, VerifiedReader};

use crate::error::StageError;
use crate::layout::Layout;

/// Digests of catalog responses that mean "nothing here".
pub const DEFAULT_SENTINELS: [&str; 2] = [
    "1ec5694531870760d651960574b6332325773e1d",
    "7312b29e8a2172bfdcc278d012711a8caada90e2",
];

/// Hashes that are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelSet(BTreeSet<ContentHash>);

impl SentinelSet {
    pub fn empty() -> Self { Self(BTreeSet::new()) }

    pub fn contains(&self, hash: &ContentHash) -> bool { self.0.contains(hash) }

    pub fn iter(&self) -> impl Iterator<Item = &ContentHash> { self.0.iter() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl Default for SentinelSet {
    fn default() -> Self {
        DEFAULT_SENTINELS
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

impl FromIterator<ContentHash> for SentinelSet {
    fn from_iter<I: IntoIterator<Item = ContentHash>>(iter: I) -> Self { Self(iter.into_iter().collect()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Promoted to `path` and recorded in the manifest.
    Written { path: PathBuf, hash: ContentHash },
    /// Matched a sentinel; nothing kept.
    Discarded(ContentHash),
}

/// Moves one item's bytes from memory to its final path through a private staging directory.
///
/// Blocking; run it off the async workers.
#[derive(Debug, Clone)]
pub struct StagedWriter {
    layout:    Layout,
    scheme:    PathScheme,
    sentinels: SentinelSet,
}

impl StagedWriter {
    pub fn new(layout: Layout, scheme: PathScheme, sentinels: SentinelSet) -> Self {
        Self {
            layout,
            scheme,
            sentinels,
        }
    }

    /// Stage `bytes` for `id`, re-hash them from disk, then discard or promote.
    ///
    /// `expected` is the in-memory hash of `bytes`. On promotion both manifest
    /// keys for `id` are updated with the verified hash. The staging directory
    /// is gone when this returns, whatever the outcome.
    pub fn stage(
        &self,
        id: ItemId,
        bytes: &[u8],
        expected: &ContentHash,
        manifest: &Manifest,
    ) -> Result<StageOutcome, StageError> {
        let workspace = Workspace::new(self.layout.staging_dir(id))?;
        let name = Layout::staging_file_name(id);
        let staged = workspace.write(&name, bytes)?;

        let file = workspace.open(&name)?;
        let actual = VerifiedReader::new(BufReader::new(file), Sha1Hasher::new())
            .digest()
            .map_err(|source| StageError::Verify {
                path: staged.clone(),
                source,
            })?;

        if self.sentinels.contains(&actual) {
            workspace.discard()?;
            return Ok(StageOutcome::Discarded(actual));
        }

        if &actual != expected {
            workspace.discard()?;
            return Err(StageError::Corrupted {
                path:     staged,
                expected: expected.to_string(),
                actual:   actual.to_string(),
            });
        }

        let path = self.layout.artifact_path(&self.scheme, id);
        workspace.promote(&name, &path)?;
        manifest.record(id, &self.scheme, actual.clone());

        Ok(StageOutcome::Written { path, hash: actual })
    }
}
