use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest")]
    Read(#[source] buildsync_fs::Error),

    #[error("manifest {path} is not a string-to-digest JSON object")]
    Parse {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize manifest")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write manifest")]
    Write(#[source] buildsync_fs::Error),
}

pub type Result<T> = std::result::Result<T, ManifestError>;
