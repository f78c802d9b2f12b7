use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Result, VerificationError};

/// Lowercase hex digest of a payload's canonical serialization.
///
/// Used for change detection only.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn from_bytes(digest: &[u8]) -> Self { Self(hex::encode(digest)) }

    #[cfg(feature = "sha1")]
    pub fn of(data: &[u8]) -> Self { Self::from_bytes(&crate::Sha1Hasher::digest(data)) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for ContentHash {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(VerificationError::InvalidDigest(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str { &self.0 }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
