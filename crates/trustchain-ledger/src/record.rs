use crate::block::BlockHeader;

/// One persisted ledger entry: canonical header JSON, a TAB, and the hex
/// HMAC signature. Records are written as single whole lines and never
/// rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRecord {
    pub header: BlockHeader,
    pub signature: String,
}

impl BlockRecord {
    /// Encode as a ledger line, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!("{}\t{}", self.header.canonical_json(), self.signature)
    }

    /// Parse a ledger line. Trailing line terminators are ignored; content
    /// past a second TAB is ignored, matching the historical reader.
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut parts = line.splitn(3, '\t');
        let json = parts.next().unwrap_or_default();
        let signature = parts.next().ok_or(RecordError::MissingSignature)?;
        let header: BlockHeader =
            serde_json::from_str(json).map_err(|e| RecordError::BadHeader(e.to_string()))?;
        Ok(Self {
            header,
            signature: signature.to_string(),
        })
    }
}

/// Errors from record encoding/decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record has no TAB-separated signature")]
    MissingSignature,

    #[error("record header is not valid JSON: {0}")]
    BadHeader(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustchain_crypto::HmacSigner;
    use trustchain_types::Digest;

    fn record() -> BlockRecord {
        let header = BlockHeader::new(
            1,
            1_700_000_000,
            Digest::zero(),
            Digest::from_bytes(b"root"),
        );
        let signature = header.sign(&HmacSigner::new(b"key".to_vec()));
        BlockRecord { header, signature }
    }

    #[test]
    fn line_roundtrip() {
        let rec = record();
        let parsed = BlockRecord::parse(&rec.to_line()).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn line_has_single_tab_and_no_newline() {
        let line = record().to_line();
        assert_eq!(line.matches('\t').count(), 1);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn parse_ignores_trailing_newline() {
        let rec = record();
        let parsed = BlockRecord::parse(&format!("{}\n", rec.to_line())).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn parse_without_tab_fails() {
        let err = BlockRecord::parse("{\"index\":1}").unwrap_err();
        assert_eq!(err, RecordError::MissingSignature);
    }

    #[test]
    fn parse_with_bad_json_fails() {
        let err = BlockRecord::parse("not json\tdeadbeef").unwrap_err();
        assert!(matches!(err, RecordError::BadHeader(_)));
    }

    #[test]
    fn parse_with_missing_field_fails() {
        let err = BlockRecord::parse("{\"index\":1,\"timestamp\":2}\tdeadbeef").unwrap_err();
        assert!(matches!(err, RecordError::BadHeader(_)));
    }

    #[test]
    fn parse_ignores_content_past_second_tab() {
        let rec = record();
        let parsed = BlockRecord::parse(&format!("{}\tjunk", rec.to_line())).unwrap();
        assert_eq!(parsed.signature, rec.signature);
    }
}
