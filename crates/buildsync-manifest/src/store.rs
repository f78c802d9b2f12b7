use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

use buildsync_fs::AtomicWriteOptions;
use buildsync_verify::ContentHash;
use parking_lot::Mutex;

use crate::error::{ManifestError, Result};
use crate::flush::FlushDocument;
use crate::key::{ItemId, ManifestKey, PathScheme};

/// Content hashes known for a run, shared by every worker.
///
/// All mutation goes through `&self`; wrap in an `Arc` to share. The lock is
/// held only for the duration of each call, never across an await.
#[derive(Debug, Default)]
pub struct Manifest {
    entries: Mutex<BTreeMap<ManifestKey, ContentHash>>,
}

impl Manifest {
    pub fn new() -> Self { Self::default() }

    pub fn from_entries(entries: impl IntoIterator<Item = (ManifestKey, ContentHash)>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
        }
    }

    /// Load the manifest at `path`. A missing file is an empty manifest.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match buildsync_fs::read_if_exists(path).map_err(ManifestError::Read)? {
            Some(bytes) => Self::parse(&bytes, path),
            None => Ok(Self::new()),
        }
    }

    /// Parse a manifest document; `origin` is only used in errors.
    pub fn parse(bytes: &[u8], origin: impl AsRef<Path>) -> Result<Self> {
        let raw: BTreeMap<String, ContentHash> =
            serde_json::from_slice(bytes).map_err(|source| ManifestError::Parse {
                path: origin.as_ref().to_path_buf(),
                source,
            })?;
        Ok(Self::from_entries(
            raw.into_iter().map(|(k, v)| (ManifestKey::parse(&k), v)),
        ))
    }

    pub fn get(&self, key: &ManifestKey) -> Option<ContentHash> { self.entries.lock().get(key).cloned() }

    /// The recorded hash for `id`: its item key first, then its canonical path key.
    pub fn lookup(&self, id: ItemId, scheme: &PathScheme) -> Option<ContentHash> {
        let entries = self.entries.lock();
        entries
            .get(&ManifestKey::Item(id))
            .or_else(|| entries.get(&scheme.path_key(id)))
            .cloned()
    }

    /// Record a freshly written item under both of its keys in one critical section.
    pub fn record(&self, id: ItemId, scheme: &PathScheme, hash: ContentHash) {
        let mut entries = self.entries.lock();
        entries.insert(scheme.path_key(id), hash.clone());
        entries.insert(ManifestKey::Item(id), hash);
    }

    /// Mark `id` as processed this run without changing its content.
    pub fn confirm(&self, id: ItemId, hash: ContentHash) {
        self.entries.lock().insert(ManifestKey::Item(id), hash);
    }

    /// Keep a previously persisted entry for an item that was not processed.
    ///
    /// Returns whether there was anything to carry.
    pub fn carry_forward(&self, id: ItemId, scheme: &PathScheme) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&ManifestKey::Item(id)) {
            return true;
        }
        match entries.get(&scheme.path_key(id)).cloned() {
            Some(hash) => {
                entries.insert(ManifestKey::Item(id), hash);
                true
            }
            None => false,
        }
    }

    /// [`Manifest::carry_forward`] for every persisted entry of `scheme` inside `ids`.
    ///
    /// Walks the existing entries rather than the range. Returns how many were carried.
    pub fn carry_forward_range(&self, ids: RangeInclusive<ItemId>, scheme: &PathScheme) -> usize {
        let mut entries = self.entries.lock();
        let carried: Vec<(ItemId, ContentHash)> = entries
            .iter()
            .filter_map(|(key, hash)| match key {
                ManifestKey::Path(path) => scheme
                    .parse_artifact_key(path)
                    .filter(|id| ids.contains(id))
                    .map(|id| (id, hash.clone())),
                ManifestKey::Item(_) => None,
            })
            .collect();

        let mut count = 0;
        for (id, hash) in carried {
            entries.entry(ManifestKey::Item(id)).or_insert(hash);
            count += 1;
        }
        count
    }

    pub fn len(&self) -> usize { self.entries.lock().len() }

    pub fn is_empty(&self) -> bool { self.entries.lock().is_empty() }

    /// The persisted form: one path-keyed entry per item key, ascending by id.
    ///
    /// Path keys with no item key in this run are dropped.
    pub fn flush_document(&self, scheme: &PathScheme) -> FlushDocument {
        let entries = self.entries.lock();
        FlushDocument::new(
            entries
                .iter()
                .filter_map(|(key, hash)| key.item().map(|id| (scheme.artifact_key(id), hash.clone())))
                .collect(),
        )
    }

    /// Atomically replace `path` with the flushed document.
    pub fn save(&self, path: impl AsRef<Path>, scheme: &PathScheme) -> Result<FlushDocument> {
        let document = self.flush_document(scheme);
        let bytes = document.to_json_pretty().map_err(ManifestError::Serialize)?;
        buildsync_fs::atomic_write(path, &bytes, AtomicWriteOptions::new().sync(true))
            .map_err(ManifestError::Write)?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(s: &str) -> ContentHash { s.parse().unwrap() }

    #[test]
    fn test_lookup_prefers_item_key() {
        let scheme = PathScheme::new("p", 1);
        let manifest = Manifest::from_entries([
            (ManifestKey::Item(7), hash("aa")),
            (scheme.path_key(7), hash("bb")),
            (scheme.path_key(8), hash("cc")),
        ]);
        assert_eq!(manifest.lookup(7, &scheme), Some(hash("aa")));
        assert_eq!(manifest.lookup(8, &scheme), Some(hash("cc")));
        assert_eq!(manifest.lookup(9, &scheme), None);
    }

    #[test]
    fn test_lookup_ignores_other_generation() {
        let old = PathScheme::new("p", 1);
        let manifest = Manifest::from_entries([(old.path_key(3), hash("aa"))]);
        assert_eq!(manifest.lookup(3, &PathScheme::new("p", 2)), None);
    }

    #[test]
    fn test_record_sets_both_keys() {
        let scheme = PathScheme::new("p", 1);
        let manifest = Manifest::new();
        manifest.record(4, &scheme, hash("ab"));
        assert_eq!(manifest.get(&ManifestKey::Item(4)), Some(hash("ab")));
        assert_eq!(manifest.get(&scheme.path_key(4)), Some(hash("ab")));
        assert_eq!(manifest.len(), 2);

        manifest.record(4, &scheme, hash("cd"));
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get(&scheme.path_key(4)), Some(hash("cd")));
    }

    #[test]
    fn test_carry_forward() {
        let scheme = PathScheme::new("p", 1);
        let manifest = Manifest::from_entries([(scheme.path_key(3), hash("aa"))]);
        assert!(manifest.carry_forward(3, &scheme));
        assert!(!manifest.carry_forward(4, &scheme));
        let doc = manifest.flush_document(&scheme);
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec![scheme.artifact_key(3)]);
    }

    #[test]
    fn test_carry_forward_range() {
        let scheme = PathScheme::new("p", 1);
        let manifest = Manifest::from_entries([
            (scheme.path_key(3), hash("aa")),
            (scheme.path_key(50), hash("bb")),
            (PathScheme::new("p", 2).path_key(4), hash("cc")),
            (ManifestKey::Item(5), hash("dd")),
        ]);
        assert_eq!(manifest.carry_forward_range(0..=10, &scheme), 1);
        let doc = manifest.flush_document(&scheme);
        assert_eq!(
            doc.keys().collect::<Vec<_>>(),
            vec![scheme.artifact_key(3), scheme.artifact_key(5)]
        );
    }

    #[test]
    fn test_flush_drops_unprocessed_paths() {
        let scheme = PathScheme::new("p", 1);
        let manifest = Manifest::from_entries([
            (scheme.path_key(1), hash("aa")),
            (ManifestKey::Path("legacy/key".into()), hash("bb")),
        ]);
        manifest.confirm(2, hash("cc"));
        let doc = manifest.flush_document(&scheme);
        assert_eq!(doc.entries(), &[(scheme.artifact_key(2), hash("cc"))]);
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(
            Manifest::parse(b"[1, 2]", "hashes.json"),
            Err(ManifestError::Parse { .. })
        ));
        assert!(matches!(
            Manifest::parse(br#"{"1": "not hex"}"#, "hashes.json"),
            Err(ManifestError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_classifies_keys() {
        let manifest = Manifest::parse(
            br#"{"12": "AA", "products/3/os/p/builds@generation=1": "bb"}"#,
            "hashes.json",
        )
        .unwrap();
        assert_eq!(manifest.get(&ManifestKey::Item(12)), Some(hash("aa")));
        assert_eq!(manifest.lookup(3, &PathScheme::new("p", 1)), Some(hash("bb")));
    }

    #[test]
    fn test_parse_keeps_zero_padded_keys_apart() {
        let manifest = Manifest::parse(br#"{"012": "aa", "12": "bb"}"#, "hashes.json").unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get(&ManifestKey::Item(12)), Some(hash("bb")));
        assert_eq!(manifest.get(&ManifestKey::Path("012".into())), Some(hash("aa")));

        let flushed = manifest.flush_document(&PathScheme::new("p", 1));
        assert_eq!(flushed.keys().collect::<Vec<_>>(), vec!["products/12/os/p/builds@generation=1"]);
    }
}
