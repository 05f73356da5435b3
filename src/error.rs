use thiserror::Error;

use crate::codec::FORMAT_VERSION;

/// Failure of a single step's request.
///
/// Any of these aborts the run; the remaining steps are never attempted.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("invalid JSON in response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Malformed portable chain document.
///
/// Decoding is all-or-nothing: a `CodecError` means no chain was produced and
/// whatever chain the caller already holds is untouched.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed chain document: {0}")]
    Malformed(String),

    #[error("unsupported document version `{0}` (expected `{FORMAT_VERSION}`)")]
    UnsupportedVersion(String),

    #[error("invalid step at index {index}: {reason}")]
    InvalidStep { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt store contents: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("no chain saved under `{0}`")]
    NotFound(String),
}
