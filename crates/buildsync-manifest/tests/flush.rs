use std::sync::Arc;

use buildsync_manifest::{Manifest, ManifestKey, PathScheme};
use buildsync_verify::ContentHash;
use proptest::prelude::*;
use tempfile::tempdir;

fn hash(s: &str) -> ContentHash { s.parse().unwrap() }

#[test]
fn test_deterministic_flush() {
    let scheme = PathScheme::new("p", 1);
    let manifest = Manifest::from_entries([
        (ManifestKey::Item(5), hash("aa")),
        (ManifestKey::Item(2), hash("bb")),
        (ManifestKey::Item(10), hash("cc")),
    ]);

    let bytes = manifest.flush_document(&scheme).to_json_pretty().unwrap();
    let expected = "{\n  \"products/2/os/p/builds@generation=1\": \"bb\",\n  \"products/5/os/p/builds@generation=1\": \"aa\",\n  \"products/10/os/p/builds@generation=1\": \"cc\"\n}\n";
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[test]
fn test_save_then_load_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hashes.json");
    let scheme = PathScheme::new("windows", 2);

    let manifest = Manifest::new();
    manifest.record(1, &scheme, hash("0a"));
    manifest.record(3, &scheme, hash("0b"));
    manifest.save(&path, &scheme).unwrap();

    let loaded = Manifest::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.lookup(1, &scheme), Some(hash("0a")));
    assert_eq!(loaded.get(&ManifestKey::Item(1)), None);

    // Nothing processed yet, so a second flush would be empty; confirm both and
    // the document is byte-identical to the first.
    loaded.confirm(1, hash("0a"));
    loaded.confirm(3, hash("0b"));
    let first = std::fs::read(&path).unwrap();
    loaded.save(&path, &scheme).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), first);
}

#[test]
fn test_load_missing_is_empty() {
    let dir = tempdir().unwrap();
    let manifest = Manifest::load(dir.path().join("absent.json")).unwrap();
    assert!(manifest.is_empty());
}

#[test]
fn test_concurrent_record() {
    let scheme = PathScheme::new("p", 1);
    let manifest = Arc::new(Manifest::new());

    std::thread::scope(|s| {
        for t in 0..8u64 {
            let manifest = Arc::clone(&manifest);
            let scheme = &scheme;
            s.spawn(move || {
                for i in 0..100u64 {
                    let id = t * 100 + i;
                    manifest.record(id, scheme, ContentHash::of(&id.to_le_bytes()));
                }
            });
        }
    });

    assert_eq!(manifest.len(), 1600);
    assert_eq!(manifest.flush_document(&scheme).len(), 800);
}

proptest! {
    #[test]
    fn prop_flush_sorted_by_id(ids in proptest::collection::btree_set(any::<u64>(), 0..64)) {
        let scheme = PathScheme::new("p", 1);
        let manifest = Manifest::new();
        // insert in reverse to make sure order is not insertion order
        for id in ids.iter().rev() {
            manifest.confirm(*id, hash("ab"));
        }

        let doc = manifest.flush_document(&scheme);
        let expected: Vec<String> = ids.iter().map(|id| scheme.artifact_key(*id)).collect();
        let actual: Vec<String> = doc.keys().map(str::to_string).collect();
        prop_assert_eq!(actual, expected);
    }
}
