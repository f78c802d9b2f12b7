//! Error types for buildsync-pipeline.

use std::fmt;
use std::path::PathBuf;

use buildsync_fetch::FetchError;
use buildsync_manifest::ManifestError;
use buildsync_verify::VerificationError;
use thiserror::Error;

/// Local disk failure while staging or promoting one item.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Fs(#[from] buildsync_fs::Error),

    #[error("failed to hash staged file {path}")]
    Verify {
        path:   PathBuf,
        #[source]
        source: VerificationError,
    },

    #[error("staged file {path} is corrupt: expected {expected}, found {actual}")]
    Corrupted {
        path:     PathBuf,
        expected: String,
        actual:   String,
    },

    #[error("failed to encode payload")]
    Encode(#[source] serde_json::Error),

    #[error("staging task failed: {0}")]
    Join(String),
}

/// Why one attempt at one item failed.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Network(FetchError),

    #[error(transparent)]
    Storage(#[from] StageError),

    #[error(transparent)]
    Parse(FetchError),

    #[error("cancelled")]
    Cancelled,
}

impl From<FetchError> for ItemError {
    fn from(err: FetchError) -> Self {
        if err.is_malformed() {
            ItemError::Parse(err)
        } else {
            ItemError::Network(err)
        }
    }
}

impl ItemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ItemError::Network(_) => ErrorKind::Network,
            ItemError::Storage(_) => ErrorKind::Storage,
            ItemError::Parse(_) => ErrorKind::Parse,
            ItemError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Storage,
    Parse,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Network => "network",
            ErrorKind::Storage => "storage",
            ErrorKind::Parse => "parse",
            ErrorKind::Cancelled => "cancelled",
        })
    }
}

/// Which failures are worth another attempt.
///
/// Network and storage failures always are, cancellation never is. Malformed
/// payloads are terminal unless `retry_malformed` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_malformed: bool,
}

impl RetryPolicy {
    pub fn should_retry(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Network | ErrorKind::Storage => true,
            ErrorKind::Parse => self.retry_malformed,
            ErrorKind::Cancelled => false,
        }
    }
}

/// Failures that stop a whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid catalog client configuration")]
    Client(#[source] FetchError),

    #[error("failed to create directory {path}")]
    Prepare {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load manifest {path}")]
    LoadManifest {
        path:   PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("failed to save manifest {path}")]
    SaveManifest {
        path:   PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("manifest task failed: {0}")]
    Join(String),
}
