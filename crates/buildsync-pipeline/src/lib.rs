//! The buildsync fetch, dedup and persist pipeline.
//!
//! # Architecture
//!
//! For every id in a configured range the [`Coordinator`] runs, under one
//! global concurrency bound:
//!
//! 1. fetch the build listing ([`buildsync_fetch::Fetcher`]),
//! 2. canonicalize and hash it, and skip it if the manifest already has that hash ([`detect`]),
//! 3. stage it, re-hash it from disk, then promote or discard it ([`stage`]).
//!
//! Failed attempts are retried per [`RetryPolicy`]. The shared
//! [`Manifest`](buildsync_manifest::Manifest) is flushed exactly once when
//! every item has settled.

pub mod detect;
pub mod stage;

mod config;
mod error;
mod layout;
mod pipeline;
mod report;

pub use config::{
    ConfigError, DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, MAX_BACKOFF, RunConfig,
    RunConfigBuilder,
};
pub use detect::{ChangeDetector, Decision, Detection, canonicalize};
pub use error::{ErrorKind, ItemError, PipelineError, RetryPolicy, StageError};
pub use layout::{Layout, MANIFEST_FILE, STAGING_DIR};
pub use pipeline::Coordinator;
pub use report::{FailedItem, ItemOutcome, RunReport};
pub use stage::{DEFAULT_SENTINELS, SentinelSet, StageOutcome, StagedWriter};
