use std::io;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid hex digest: {0:?}")]
    InvalidDigest(String),
}

pub type Result<T> = std::result::Result<T, VerificationError>;
