use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Unexpected end of input: needed {needed} bytes at offset {offset}, {available} available")]
    UnexpectedEof {
        offset:    usize,
        needed:    usize,
        available: usize,
    },

    #[error("{name}: expected {expected} bytes but found {actual}")]
    SizeMismatch {
        name:     &'static str,
        expected: usize,
        actual:   usize,
    },

    #[error("{name}: invalid header: {msg}")]
    InvalidHeader {
        name: &'static str,
        msg:  String,
    },

    #[error("{name}: expected {expected} fields but found {actual}")]
    FieldCount {
        name:     &'static str,
        expected: usize,
        actual:   usize,
    },

    #[error("{name}: item {index} is out of range ({len} items)")]
    IndexOutOfRange {
        name:  &'static str,
        index: usize,
        len:   usize,
    },

    #[error("Invalid hex string \"{0}\"")]
    InvalidHex(String),

    #[error("Integer does not fit in {bytes} bytes")]
    IntegerOverflow { bytes: usize },

    #[error("Invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    #[error("Invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("Invalid {name} tag {tag:#04x}")]
    InvalidTag {
        name: &'static str,
        tag:  u8,
    },

    #[error("{name}: item codec has no fixed size")]
    NotFixedSize { name: &'static str },

    #[error("{name}: item encodes to zero bytes")]
    ZeroSizeItem { name: &'static str },

    #[error("{name}: encoded size exceeds the 4 GiB molecule limit")]
    TooLarge { name: &'static str },
}
