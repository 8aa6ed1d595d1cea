use serde::{Deserialize, Serialize};

use trustchain_crypto::HmacSigner;
use trustchain_types::Digest;

/// The canonical, signable unit of the chain.
///
/// Immutable once constructed. Both the chain hash and the HMAC signature
/// are computed over [`BlockHeader::canonical_json`], so that encoding
/// must stay byte-identical across runs and across implementations.
///
/// Serde is used only to parse persisted records and to render headers for
/// display; verification always recomputes the canonical bytes from the
/// parsed field values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// 1-based position in the chain; gapless.
    pub index: u64,
    /// Seconds since the UNIX epoch at append time.
    pub timestamp: u64,
    /// Content hash of the previous block, or the all-zero genesis
    /// sentinel for block 1.
    pub prev_hash: Digest,
    /// Merkle root of the evidence batch anchored by this block.
    pub merkle_root: Digest,
}

impl BlockHeader {
    pub fn new(index: u64, timestamp: u64, prev_hash: Digest, merkle_root: Digest) -> Self {
        Self {
            index,
            timestamp,
            prev_hash,
            merkle_root,
        }
    }

    /// Canonical serialization: fixed field order
    /// `index, timestamp, prevHash, merkleRoot`, compact, hashes
    /// lowercased, no content-dependent escaping.
    ///
    /// Hand-rolled rather than delegated to a serializer so the byte
    /// layout cannot drift with library field ordering or number
    /// formatting.
    pub fn canonical_json(&self) -> String {
        format!(
            r#"{{"index":{},"timestamp":{},"prevHash":"{}","merkleRoot":"{}"}}"#,
            self.index,
            self.timestamp,
            self.prev_hash.to_hex(),
            self.merkle_root.to_hex()
        )
    }

    /// SHA-256 of the canonical serialization. Block N+1 stores this value
    /// as its `prevHash`.
    pub fn content_hash(&self) -> Digest {
        Digest::from_bytes(self.canonical_json().as_bytes())
    }

    /// HMAC-SHA256 over the canonical serialization, as lowercase hex.
    pub fn sign(&self, signer: &HmacSigner) -> String {
        signer.sign(self.canonical_json().as_bytes())
    }

    /// Constant-time signature check against a freshly recomputed
    /// signature. Returns a bool, never an error.
    pub fn verify(&self, signer: &HmacSigner, signature: &str) -> bool {
        signer.verify(self.canonical_json().as_bytes(), signature)
    }
}
