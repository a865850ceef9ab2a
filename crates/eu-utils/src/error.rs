use std::io;
use std::path::PathBuf;

/// Errors from checksum operations.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    /// The file is missing or could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result alias for checksum operations.
pub type ChecksumResult<T> = Result<T, ChecksumError>;

/// Errors from replicate lookups.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReplicateError {
    /// The input holds no replicate list at all.
    #[error("expected a list of replicates, found {found}")]
    NotAList { found: &'static str },

    /// A record lacks a field the lookup depends on, or has it with the wrong type.
    #[error("replicate #{index} is malformed: missing or invalid `{field}`")]
    Malformed { index: usize, field: &'static str },

    /// A record could not be decoded into a [`crate::Replicate`].
    #[error("replicate #{index} could not be decoded: {reason}")]
    Decode { index: usize, reason: String },
}

/// Result alias for replicate lookups.
pub type ReplicateResult<T> = Result<T, ReplicateError>;
