use trustchain_types::Digest;

/// Merkle root computation over a batch of evidence hashes.
///
/// Leaves arrive as 64-hex-character SHA-256 digests. Construction applies
/// lowercase normalization, drops entries that are not valid digests, and
/// fails if nothing survives. Reduction hashes the byte-concatenation of
/// each adjacent decoded pair with SHA-256; a level of odd length pairs its
/// last element with itself. The odd-leaf duplication is a convention of
/// the persisted chain format, not a general Merkle-tree requirement — it
/// is preserved so existing ledger files keep verifying.
///
/// The root is order-sensitive: permuting the leaves changes it.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    root: Digest,
    leaves: Vec<Digest>,
}

impl MerkleTree {
    /// Build a tree from raw leaf strings.
    ///
    /// Entries that are not valid 64-hex-character digests are filtered
    /// out after case normalization; an empty post-filter batch is an
    /// error.
    pub fn new<S: AsRef<str>>(leaves: &[S]) -> Result<Self, MerkleError> {
        let leaves: Vec<Digest> = leaves
            .iter()
            .filter_map(|s| Digest::from_hex(s.as_ref()).ok())
            .collect();
        Self::from_digests(leaves)
    }

    /// Build a tree from already-parsed leaf digests.
    pub fn from_digests(leaves: Vec<Digest>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::NoValidLeaves);
        }
        let root = reduce(&leaves);
        Ok(Self { root, leaves })
    }

    /// The root digest of the tree.
    pub fn root(&self) -> Digest {
        self.root
    }

    /// Number of leaves that survived validation.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }
}

/// Errors from Merkle construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MerkleError {
    #[error("no valid sha256 leaf hashes in batch")]
    NoValidLeaves,
}

fn reduce(leaves: &[Digest]) -> Digest {
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let hash = if pair.len() == 2 {
                hash_pair(&pair[0], &pair[1])
            } else {
                // Odd leaf: paired with itself.
                hash_pair(&pair[0], &pair[0])
            };
            next.push(hash);
        }
        level = next;
    }
    level[0]
}

fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_bytes());
    buf[32..].copy_from_slice(right.as_bytes());
    Digest::from_bytes(&buf)
}
