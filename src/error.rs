//! Error type shared by every stage of the download pipeline

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error("You did NOT specify access & secret key. See usage for more info")]
    MissingCredentials,

    #[error("invalid checksum {0:?}, expected <algorithm>:<hexdigest>")]
    InvalidChecksum(String),

    #[error("unsupported checksum algorithm {0:?}, supported are: sha256, sha1 & md5")]
    UnsupportedAlgorithm(String),

    #[error("checksum verification failed: expected {expected}, calculated {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("There was an error getting file size: {0}")]
    SizeProbe(String),

    #[error("failed to download file: {0}")]
    Download(String),

    #[error("failed to rename temp file to {}: {source}", path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Errors caused by bad invocation, reported together with the usage line.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::Usage(_)
                | Error::MissingCredentials
                | Error::InvalidChecksum(_)
                | Error::UnsupportedAlgorithm(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
