use serde::{Serialize, Serializer};

use buildsync_verify::ContentHash;

/// The persisted form of a manifest: path keys in ascending item order.
///
/// Order is carried by the vector itself and emitted through `collect_map`,
/// so the output does not depend on how `serde_json` orders its own maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushDocument {
    entries: Vec<(String, ContentHash)>,
}

impl FlushDocument {
    pub(crate) fn new(entries: Vec<(String, ContentHash)>) -> Self { Self { entries } }

    pub fn entries(&self) -> &[(String, ContentHash)] { &self.entries }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.entries.iter().map(|(k, _)| k.as_str()) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Two-space indented JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = serde_json::to_vec_pretty(self)?;
        out.push(b'\n');
        Ok(out)
    }
}

impl Serialize for FlushDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}
