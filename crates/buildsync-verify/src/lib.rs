//! Content hashing and read-back verification for staged artifacts.
//!
//! Provides incremental hashing behind a minimal [`Hasher`] trait and the
//! [`ContentHash`] digest type used for change detection. A staged file is
//! re-hashed from disk through [`VerifiedReader`] rather than trusting the
//! digest computed in memory before the write.
//!
//! # Example
//!
//! ```
//! use buildsync_verify::{ContentHash, Sha1Hasher, VerifiedReader};
//!
//! let data = b"hello world";
//! let expected = ContentHash::of(data);
//!
//! let reader = VerifiedReader::new(&data[..], Sha1Hasher::new());
//! assert_eq!(reader.digest().unwrap(), expected);
//! ```

pub use self::content::ContentHash;
pub use self::error::{Result, VerificationError};
pub use self::hasher::Hasher;
pub use self::reader::VerifiedReader;

#[cfg(feature = "sha1")]
pub use self::hasher::Sha1Hasher;

mod content;
mod error;
mod hasher;
mod reader;
