use thiserror::Error;
use trustchain_crypto::MerkleError;

use crate::record::RecordError;

/// Errors produced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Invalid or empty evidence batch. Raised before any mutation; the
    /// storage file is left untouched.
    #[error("invalid transaction batch: {0}")]
    Validation(#[from] MerkleError),

    /// The tail record failed HMAC verification. Fatal to a pending
    /// append: the ledger refuses to build on an unverifiable tail.
    #[error("tail block {index} failed HMAC verification")]
    TailSignature { index: u64 },

    /// The tail record could not be parsed.
    #[error("malformed tail record: {0}")]
    MalformedTail(#[from] RecordError),

    /// Storage file unreadable or unwritable.
    #[error("ledger storage error: {0}")]
    Io(#[from] std::io::Error),
}
