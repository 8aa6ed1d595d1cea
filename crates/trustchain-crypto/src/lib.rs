//! Cryptographic primitives for the TrustChain audit ledger.
//!
//! Provides Merkle root computation over batches of evidence digests and
//! HMAC-SHA256 signing/verification of block headers.
//!
//! All crypto operations wrap established libraries — no custom
//! cryptography. Hashing is plain SHA-256 with no domain separation: the
//! persisted chain format predates this implementation and must stay
//! byte-compatible.

pub mod merkle;
pub mod signer;

pub use merkle::{MerkleError, MerkleTree};
pub use signer::HmacSigner;
