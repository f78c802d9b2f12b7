//! Content-hash manifest for buildsync runs.
//!
//! A [`Manifest`] maps item ids and canonical output paths to the
//! [`ContentHash`](buildsync_verify::ContentHash) last written for them. Workers
//! update it concurrently through `&self`; at the end of a run it is flushed
//! once, in a deterministic order, as a [`FlushDocument`].
//!
//! ```
//! use buildsync_manifest::{Manifest, PathScheme};
//!
//! let scheme = PathScheme::new("windows", 2);
//! let manifest = Manifest::new();
//! manifest.record(10, &scheme, "cc".parse().unwrap());
//! manifest.record(2, &scheme, "bb".parse().unwrap());
//!
//! let doc = manifest.flush_document(&scheme);
//! let keys: Vec<_> = doc.keys().collect();
//! assert_eq!(keys, [
//!     "products/2/os/windows/builds@generation=2",
//!     "products/10/os/windows/builds@generation=2",
//! ]);
//! ```

mod error;
mod flush;
mod key;
mod store;

pub use self::error::{ManifestError, Result};
pub use self::flush::FlushDocument;
pub use self::key::{ItemId, ManifestKey, PathScheme};
pub use self::store::Manifest;
