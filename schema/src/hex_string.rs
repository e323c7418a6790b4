//! Hex strings are the semantic value of every byte-array shaped type.

use crate::error::CodecError;

/// A `0x`-prefixed, lowercase hex encoding of a byte sequence.
pub type Hex = String;

/// Encodes raw bytes as a `0x`-prefixed lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> Hex {
    format!("0x{}", ::hex::encode(bytes))
}

/// Parses a hex string into raw bytes. The `0x` prefix is optional and both
/// letter cases are accepted.
pub fn from_hex(value: &str) -> Result<Vec<u8>, CodecError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    ::hex::decode(digits).map_err(|_| CodecError::InvalidHex(value.to_string()))
}

#[test]
fn hex_round_trip() {
    assert_eq!(to_hex(&[]), "0x");
    assert_eq!(to_hex(&[0x00, 0xab, 0x10]), "0x00ab10");
    assert_eq!(from_hex("0x00ab10"), Ok(vec![0x00, 0xab, 0x10]));
    assert_eq!(from_hex("00AB10"), Ok(vec![0x00, 0xab, 0x10]));
    assert_eq!(from_hex("0x"), Ok(vec![]));
}

#[test]
fn hex_rejects_garbage() {
    assert_eq!(from_hex("0x123"), Err(CodecError::InvalidHex("0x123".to_string())));
    assert_eq!(from_hex("0xzz"), Err(CodecError::InvalidHex("0xzz".to_string())));
}
