//! Error taxonomy for the object store and the index codec
//!
//! Every core operation fails with one of these kinds. None of them is retried
//! internally; the command layer wraps them into `anyhow::Error` with extra context.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt compressed stream: {0}")]
    CorruptStream(String),

    #[error("Malformed object: {0}")]
    Malformed(String),

    #[error("Unsupported object type: {0}")]
    UnsupportedType(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Ambiguous or invalid object prefix (need at least 2 hex characters): {0:?}")]
    AmbiguousOrInvalidPrefix(String),

    #[error("Invalid index file signature: {0:?}")]
    BadSignature(Vec<u8>),

    #[error("Unsupported index file version: {0}")]
    UnsupportedVersion(u32),

    #[error("Index checksum does not match its contents")]
    ChecksumMismatch,

    #[error("Index is truncated: {0}")]
    TruncatedIndex(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Error::Malformed(message.into())
    }
}
