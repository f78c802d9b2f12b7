use std::fmt;

/// Numeric catalog item identifier.
pub type ItemId = u64;

/// Key of a manifest entry.
///
/// Item keys are the transient in-run form; path keys are what gets persisted.
/// The derived ordering puts every item key before every path key and sorts
/// item keys numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ManifestKey {
    Item(ItemId),
    Path(String),
}

impl ManifestKey {
    /// Classify a raw document key: canonical decimal keys that fit an [`ItemId`]
    /// are items. `"012"` stays a path so it cannot collide with `"12"`.
    pub fn parse(raw: &str) -> Self {
        match parse_item_id(raw) {
            Some(id) => ManifestKey::Item(id),
            None => ManifestKey::Path(raw.to_string()),
        }
    }

    pub fn item(&self) -> Option<ItemId> {
        match self {
            ManifestKey::Item(id) => Some(*id),
            ManifestKey::Path(_) => None,
        }
    }
}

impl fmt::Display for ManifestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestKey::Item(id) => write!(f, "{id}"),
            ManifestKey::Path(path) => f.write_str(path),
        }
    }
}

/// Canonical output-path naming for one (platform, generation) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathScheme {
    platform:   String,
    generation: u32,
}

impl PathScheme {
    pub fn new(platform: impl Into<String>, generation: u32) -> Self {
        Self {
            platform: platform.into(),
            generation,
        }
    }

    pub fn platform(&self) -> &str { &self.platform }

    pub fn generation(&self) -> u32 { self.generation }

    /// `products/{id}/os/{platform}/builds@generation={gen}`, always `/`-separated.
    pub fn artifact_key(&self, id: ItemId) -> String {
        format!(
            "products/{id}/os/{}/builds@generation={}",
            self.platform, self.generation
        )
    }

    pub fn path_key(&self, id: ItemId) -> ManifestKey { ManifestKey::Path(self.artifact_key(id)) }

    /// Inverse of [`PathScheme::artifact_key`]; `None` for keys of another scheme.
    pub fn parse_artifact_key(&self, key: &str) -> Option<ItemId> {
        let rest = key.strip_prefix("products/")?;
        let (id, tail) = rest.split_once('/')?;
        let expected = format!("os/{}/builds@generation={}", self.platform, self.generation);
        if tail != expected {
            return None;
        }
        parse_item_id(id)
    }
}

/// Digits only, no sign, no leading zero.
fn parse_item_id(raw: &str) -> Option<ItemId> {
    let canonical = raw == "0" || !raw.starts_with('0');
    if !canonical || raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
