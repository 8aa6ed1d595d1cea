//! Append-only audit ledger for TrustChain.
//!
//! This crate is the heart of TrustChain. It provides:
//! - `BlockHeader` with canonical byte-stable serialization, content
//!   hashing, and HMAC signing/verification
//! - `BlockRecord`, the persisted one-line-per-block record format
//! - `LedgerFile`, the single storage file: exclusive-locked whole-line
//!   appends and a growing-window backward tail read
//! - `Ledger`, the orchestration layer: `append_block`, `last_header`,
//!   and full-replay `verify_chain`
//!
//! The chain layout is deliberately simple: block N stores the content
//! hash of block N−1 (`prevHash`), block 1 stores the all-zero genesis
//! sentinel, and every block carries the Merkle root of the evidence
//! batch it anchors.

pub mod block;
pub mod error;
pub mod ledger;
pub mod record;
pub mod store;

pub use block::BlockHeader;
pub use error::LedgerError;
pub use ledger::{ChainStatus, Ledger};
pub use record::{BlockRecord, RecordError};
pub use store::LedgerFile;
