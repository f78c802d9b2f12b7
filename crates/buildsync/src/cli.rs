use std::path::PathBuf;

use clap::{ArgAction, Parser};
use serde::Serialize;

/// Mirror catalog build listings for a range of product ids.
///
/// Every option can also come from `buildsync.toml` or a `BUILDSYNC_*`
/// environment variable; flags win over both.
#[derive(Debug, Clone, Parser)]
#[command(name = "buildsync", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Cli {
    /// First product id, inclusive
    #[arg(long)]
    pub start: Option<u64>,

    /// Last product id, inclusive
    #[arg(long)]
    pub end: Option<u64>,

    /// Target platform, e.g. windows or osx
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Build listing generation
    #[arg(short, long)]
    pub generation: Option<u32>,

    /// Catalog endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    /// Maximum items in flight at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Attempts per item before giving up
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Base delay between attempts in milliseconds; 0 retries immediately
    #[arg(long)]
    pub backoff_ms: Option<u64>,

    /// Retry payloads that are not valid JSON
    #[arg(long)]
    pub retry_malformed: bool,

    /// Root of the output tree
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Scratch directory; must be on the same filesystem as the output
    #[arg(long)]
    pub staging: Option<PathBuf>,

    /// Manifest file, `hashes.json` under the output root by default
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Configuration file [default: ./buildsync.toml if present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a commit message here when any item was discarded
    #[arg(long)]
    pub publish_marker: Option<PathBuf>,

    /// More output; repeat for trace
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Flags that were actually given, shaped like [`crate::settings::Settings`].
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    start:           Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end:             Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation:      Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    concurrency:     Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_attempts:    Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backoff_ms:      Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_malformed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output:          Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    staging:         Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest:        Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            start:           self.start,
            end:             self.end,
            platform:        self.platform.clone(),
            generation:      self.generation,
            base_url:        self.base_url.clone(),
            concurrency:     self.concurrency,
            max_attempts:    self.max_attempts,
            backoff_ms:      self.backoff_ms,
            retry_malformed: self.retry_malformed.then_some(true),
            output:          self.output.clone(),
            staging:         self.staging.clone(),
            manifest:        self.manifest.clone(),
        }
    }

    /// -1 quiet, 0 default, 1+ verbose.
    pub fn verbosity(&self) -> i8 {
        if self.quiet {
            -1
        } else {
            self.verbose.min(2) as i8
        }
    }
}
