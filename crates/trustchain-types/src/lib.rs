//! Foundation types for the TrustChain audit ledger.
//!
//! Every other TrustChain crate depends on `trustchain-types`.
//!
//! # Key Types
//!
//! - [`Digest`] — a SHA-256 digest, the ledger's unit of identity: evidence
//!   hashes, Merkle roots, previous-block links, and block content hashes
//!   are all `Digest` values
//! - [`TypeError`] — parse failures for the textual digest form

pub mod error;
pub mod hash;

pub use error::TypeError;
pub use hash::Digest;
