use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use trustchain_crypto::{HmacSigner, MerkleTree};
use trustchain_types::Digest;

use crate::block::BlockHeader;
use crate::error::LedgerError;
use crate::record::BlockRecord;
use crate::store::LedgerFile;

/// Result of a full chain replay.
///
/// A broken chain is a result, not an error: `ok = false` with `blocks`
/// counting the records that verified before the first failure, and the
/// timestamps observed up to that point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    pub ok: bool,
    pub blocks: u64,
    pub first_ts: Option<u64>,
    pub last_ts: Option<u64>,
}

impl ChainStatus {
    fn genesis() -> Self {
        Self {
            ok: true,
            blocks: 0,
            first_ts: None,
            last_ts: None,
        }
    }
}

/// The append-only audit ledger: one storage file, one signing key.
///
/// `append_block` anchors a batch of evidence hashes as a new signed
/// block; `verify_chain` replays the whole file and reports chain health.
/// The only mutation primitive is append — records are never updated or
/// deleted.
pub struct Ledger {
    file: LedgerFile,
    signer: HmacSigner,
}

impl Ledger {
    /// Open a ledger over `path`, signing with `key`. Neither the file nor
    /// its directory needs to exist yet; both appear on the first append.
    pub fn new(path: impl Into<PathBuf>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            file: LedgerFile::new(path),
            signer: HmacSigner::new(key),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Anchor a batch of evidence hashes as the next block.
    ///
    /// Validation precedes every side effect: an invalid batch leaves the
    /// storage file untouched. The new header links to the verified tail
    /// (or the genesis sentinel), is signed, and is persisted as exactly
    /// one record line.
    pub fn append_block<S: AsRef<str>>(&self, tx_hashes: &[S]) -> Result<BlockHeader, LedgerError> {
        let tree = MerkleTree::new(tx_hashes)?;

        let last = self.last_header()?;
        let header = BlockHeader::new(
            last.as_ref().map_or(1, |h| h.index + 1),
            unix_now(),
            last.as_ref().map_or(Digest::zero(), |h| h.content_hash()),
            tree.root(),
        );
        let signature = header.sign(&self.signer);
        let record = BlockRecord { header, signature };
        self.file.append_line(&record.to_line())?;

        debug!(
            index = record.header.index,
            leaves = tree.leaf_count(),
            root = %record.header.merkle_root.short_hex(),
            "block appended"
        );
        Ok(record.header)
    }

    /// The verified tail of the chain, or `None` in genesis state (missing
    /// or empty file).
    ///
    /// The tail record's signature is re-verified before it is trusted; a
    /// mismatch is fatal rather than something to build on.
    pub fn last_header(&self) -> Result<Option<BlockHeader>, LedgerError> {
        let Some(line) = self.file.last_line()? else {
            return Ok(None);
        };
        let record = BlockRecord::parse(&line)?;
        if !record.header.verify(&self.signer, &record.signature) {
            return Err(LedgerError::TailSignature {
                index: record.header.index,
            });
        }
        Ok(Some(record.header))
    }

    /// Replay every record from the start of the file and report chain
    /// health.
    ///
    /// Each record must carry a valid signature and link to the content
    /// hash of its predecessor (the genesis sentinel for block 1). The
    /// replay stops at the first bad signature, broken link, or malformed
    /// record. No verification state is cached between calls.
    pub fn verify_chain(&self) -> Result<ChainStatus, LedgerError> {
        let Some(reader) = self.file.open_reader()? else {
            return Ok(ChainStatus::genesis());
        };

        let mut status = ChainStatus::genesis();
        let mut expected_prev = Digest::zero();

        for line in reader.lines() {
            let line = line.map_err(LedgerError::Io)?;
            let record = match BlockRecord::parse(&line) {
                Ok(record) => record,
                Err(err) => {
                    warn!(blocks = status.blocks, %err, "chain verification failed: malformed record");
                    status.ok = false;
                    return Ok(status);
                }
            };

            let header = &record.header;
            if !header.verify(&self.signer, &record.signature) || header.prev_hash != expected_prev
            {
                warn!(
                    index = header.index,
                    blocks = status.blocks,
                    "chain verification failed: bad signature or broken link"
                );
                status.ok = false;
                return Ok(status);
            }

            expected_prev = header.content_hash();
            status.first_ts.get_or_insert(header.timestamp);
            status.last_ts = Some(header.timestamp);
            status.blocks += 1;
        }

        debug!(blocks = status.blocks, "chain verified");
        Ok(status)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
