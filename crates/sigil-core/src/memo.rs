//! On-chain memo encoding for credential digests.

use crate::types::Digest;

/// Prefix that marks a memo as a credential anchor.
pub const MEMO_PREFIX: &str = "CREDENTIAL_HASH:";

/// Encode a digest into its on-chain memo form.
pub fn encode(digest: &Digest) -> String {
    format!("{}{}", MEMO_PREFIX, digest.as_str())
}

/// Decode a memo back into a digest.
///
/// Returns `None` if the prefix is missing or the remainder is not a
/// well-formed digest.
pub fn decode(memo: &str) -> Option<Digest> {
    let hex = memo.strip_prefix(MEMO_PREFIX)?;
    Digest::parse(hex).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "f6bbf36fc9b1c96f747d38f6f838b54ce26d393e92e199e073744859c84c479f";

    #[test]
    fn test_encode() {
        let digest = Digest::parse(HEX).unwrap();
        assert_eq!(encode(&digest), format!("CREDENTIAL_HASH:{}", HEX));
    }

    #[test]
    fn test_decode_roundtrip() {
        let digest = Digest::parse(HEX).unwrap();
        assert_eq!(decode(&encode(&digest)), Some(digest));
    }

    #[test]
    fn test_decode_missing_prefix() {
        assert_eq!(decode(HEX), None);
    }

    #[test]
    fn test_decode_wrong_prefix() {
        assert_eq!(decode(&format!("CRED_HASH:{}", HEX)), None);
    }

    #[test]
    fn test_decode_bad_payload() {
        assert_eq!(decode("CREDENTIAL_HASH:nothex"), None);
        assert_eq!(decode("CREDENTIAL_HASH:"), None);
    }
}
