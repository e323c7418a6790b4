//! Generic numeric and byte primitives, plus their vector and option forms.
//!
//! Small integers decode to native Rust integers. `Uint64` and wider decode to
//! [`BigUint`] so callers never juggle different widths for on-chain amounts.

use num_bigint::BigUint;

use crate::{
    bb::{ByteBuffer, ByteBufferMut},
    codec::{expect_len, Codec, DynVec, FixVec, FixedBytes, Opt},
    error::CodecError,
    hex_string::{from_hex, to_hex, Hex},
};

macro_rules! native_uint {
    ($codec:ident, $konst:ident, $ty:ty, $size:expr, $name:expr) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $codec;

        pub const $konst: $codec = $codec;

        impl Codec for $codec {
            type Value = $ty;

            fn encode(&self, value: &$ty) -> Result<Vec<u8>, CodecError> {
                Ok(value.to_le_bytes().to_vec())
            }

            fn decode(&self, bytes: &[u8]) -> Result<$ty, CodecError> {
                let array: [u8; $size] = bytes.try_into().map_err(|_| CodecError::SizeMismatch {
                    name:     $name,
                    expected: $size,
                    actual:   bytes.len(),
                })?;
                Ok(<$ty>::from_le_bytes(array))
            }

            fn fixed_size(&self) -> Option<usize> {
                Some($size)
            }
        }
    };
}

native_uint!(ByteCodec, BYTE, u8, 1, "Byte");
native_uint!(Uint8Codec, UINT8, u8, 1, "Uint8");
native_uint!(Uint16Codec, UINT16, u16, 2, "Uint16");
native_uint!(Uint32Codec, UINT32, u32, 4, "Uint32");

/// A little-endian unsigned integer of `N` bytes carried as a [`BigUint`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WideUint<const N: usize>;

impl<const N: usize> Codec for WideUint<N> {
    type Value = BigUint;

    fn encode(&self, value: &BigUint) -> Result<Vec<u8>, CodecError> {
        let mut bytes = value.to_bytes_le();
        if bytes.len() > N {
            return Err(CodecError::IntegerOverflow { bytes: N });
        }
        bytes.resize(N, 0);
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<BigUint, CodecError> {
        expect_len("Uint", N, bytes.len())?;
        Ok(BigUint::from_bytes_le(bytes))
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(N)
    }
}

pub type Uint64Codec = WideUint<8>;
pub type Uint128Codec = WideUint<16>;
pub type Uint256Codec = WideUint<32>;

pub const UINT64: Uint64Codec = WideUint::<8>;
pub const UINT128: Uint128Codec = WideUint::<16>;
pub const UINT256: Uint256Codec = WideUint::<32>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolCodec;

pub const BOOL: BoolCodec = BoolCodec;

impl Codec for BoolCodec {
    type Value = bool;

    fn encode(&self, value: &bool) -> Result<Vec<u8>, CodecError> {
        let mut bb = ByteBufferMut::with_capacity(1);
        bb.write_bool(*value);
        Ok(bb.data())
    }

    fn decode(&self, bytes: &[u8]) -> Result<bool, CodecError> {
        expect_len("Bool", 1, bytes.len())?;
        match bytes[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(1)
    }
}

pub type Byte4Codec = FixedBytes<4>;
pub type Byte8Codec = FixedBytes<8>;
pub type Byte16Codec = FixedBytes<16>;
pub type Byte32Codec = FixedBytes<32>;

pub const BYTE4: Byte4Codec = FixedBytes::<4>;
pub const BYTE8: Byte8Codec = FixedBytes::<8>;
pub const BYTE16: Byte16Codec = FixedBytes::<16>;
pub const BYTE32: Byte32Codec = FixedBytes::<32>;

// `Bytes` and `String` are both a fixvec of `byte`.
fn write_byte_vec(name: &'static str, raw: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut bb = ByteBufferMut::with_capacity(4 + raw.len());
    bb.write_header(name, raw.len())?;
    bb.write_bytes(raw);
    Ok(bb.data())
}

fn read_byte_vec<'a>(name: &'static str, bytes: &'a [u8]) -> Result<&'a [u8], CodecError> {
    let mut bb = ByteBuffer::new(bytes);
    let len = bb.read_u32_le()? as usize;
    expect_len(name, len + 4, bytes.len())?;
    bb.read_bytes(len)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BytesCodec;

pub const BYTES: BytesCodec = BytesCodec;

impl Codec for BytesCodec {
    type Value = Hex;

    fn encode(&self, value: &Hex) -> Result<Vec<u8>, CodecError> {
        write_byte_vec("Bytes", &from_hex(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Hex, CodecError> {
        Ok(to_hex(read_byte_vec("Bytes", bytes)?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringCodec;

pub const STRING: StringCodec = StringCodec;

impl Codec for StringCodec {
    type Value = String;

    fn encode(&self, value: &String) -> Result<Vec<u8>, CodecError> {
        write_byte_vec("String", value.as_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        let raw = read_byte_vec("String", bytes)?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }
}

pub type BytesVecCodec = DynVec<BytesCodec>;
pub type StringVecCodec = DynVec<StringCodec>;
pub type Byte32VecCodec = FixVec<Byte32Codec>;
pub type Uint32VecCodec = FixVec<Uint32Codec>;
pub type Uint64VecCodec = FixVec<Uint64Codec>;
pub type Uint128VecCodec = FixVec<Uint128Codec>;

pub const BYTES_VEC: BytesVecCodec = DynVec(BYTES);
pub const STRING_VEC: StringVecCodec = DynVec(STRING);
pub const BYTE32_VEC: Byte32VecCodec = FixVec(BYTE32);
pub const UINT32_VEC: Uint32VecCodec = FixVec(UINT32);
pub const UINT64_VEC: Uint64VecCodec = FixVec(UINT64);
pub const UINT128_VEC: Uint128VecCodec = FixVec(UINT128);

pub type BytesOptCodec = Opt<BytesCodec>;
pub type StringOptCodec = Opt<StringCodec>;
pub type Byte32OptCodec = Opt<Byte32Codec>;
pub type BoolOptCodec = Opt<BoolCodec>;
pub type Uint8OptCodec = Opt<Uint8Codec>;
pub type Uint32OptCodec = Opt<Uint32Codec>;
pub type Uint64OptCodec = Opt<Uint64Codec>;
pub type Uint128OptCodec = Opt<Uint128Codec>;

pub const BYTES_OPT: BytesOptCodec = Opt(BYTES);
pub const STRING_OPT: StringOptCodec = Opt(STRING);
pub const BYTE32_OPT: Byte32OptCodec = Opt(BYTE32);
pub const BOOL_OPT: BoolOptCodec = Opt(BOOL);
pub const UINT8_OPT: Uint8OptCodec = Opt(UINT8);
pub const UINT32_OPT: Uint32OptCodec = Opt(UINT32);
pub const UINT64_OPT: Uint64OptCodec = Opt(UINT64);
pub const UINT128_OPT: Uint128OptCodec = Opt(UINT128);

#[test]
fn native_uints_are_little_endian() {
    assert_eq!(UINT8.encode(&0xab), Ok(vec![0xab]));
    assert_eq!(UINT16.encode(&0x0102), Ok(vec![0x02, 0x01]));
    assert_eq!(UINT32.encode(&0x01020304), Ok(vec![4, 3, 2, 1]));
    assert_eq!(UINT32.decode(&[4, 3, 2, 1]), Ok(0x01020304));
    assert_eq!(
        UINT32.decode(&[4, 3, 2]),
        Err(CodecError::SizeMismatch { name: "Uint32", expected: 4, actual: 3 })
    );
}

#[test]
fn fixed_sizes_match_the_size_table() {
    assert_eq!(BYTE.fixed_size(), Some(1));
    assert_eq!(BOOL.fixed_size(), Some(1));
    assert_eq!(UINT8.fixed_size(), Some(1));
    assert_eq!(UINT16.fixed_size(), Some(2));
    assert_eq!(UINT32.fixed_size(), Some(4));
    assert_eq!(UINT64.fixed_size(), Some(8));
    assert_eq!(UINT128.fixed_size(), Some(16));
    assert_eq!(UINT256.fixed_size(), Some(32));
    assert_eq!(BYTE4.fixed_size(), Some(4));
    assert_eq!(BYTE8.fixed_size(), Some(8));
    assert_eq!(BYTE16.fixed_size(), Some(16));
    assert_eq!(BYTE32.fixed_size(), Some(32));
    assert_eq!(BYTES.fixed_size(), None);
}

#[test]
fn wide_uints_keep_full_precision() {
    let max_u64 = BigUint::from(u64::MAX);
    assert_eq!(UINT64.encode(&max_u64), Ok(vec![0xff; 8]));
    assert_eq!(UINT64.decode(&[0xff; 8]), Ok(max_u64));

    let big = BigUint::from(u128::MAX) + 1u32;
    assert_eq!(UINT128.encode(&big), Err(CodecError::IntegerOverflow { bytes: 16 }));
    let bytes = UINT256.encode(&big).unwrap();
    assert_eq!(bytes.len(), 32);
    assert_eq!(bytes[16], 1);
    assert_eq!(UINT256.decode(&bytes), Ok(big));

    assert_eq!(UINT64.encode(&BigUint::from(0u32)), Ok(vec![0; 8]));
}

#[test]
fn bool_rejects_other_bytes() {
    assert_eq!(BOOL.encode(&true), Ok(vec![1]));
    assert_eq!(BOOL.decode(&[0]), Ok(false));
    assert_eq!(BOOL.decode(&[2]), Err(CodecError::InvalidBool(2)));
}

#[test]
fn bytes_and_strings() {
    assert_eq!(BYTES.encode(&"0x".to_string()), Ok(vec![0, 0, 0, 0]));
    assert_eq!(BYTES.encode(&"0xabcd".to_string()), Ok(vec![2, 0, 0, 0, 0xab, 0xcd]));
    assert_eq!(BYTES.decode(&[2, 0, 0, 0, 0xab, 0xcd]), Ok("0xabcd".to_string()));
    assert!(BYTES.decode(&[3, 0, 0, 0, 0xab, 0xcd]).is_err());

    assert_eq!(STRING.encode(&"quest".to_string()), Ok(vec![5, 0, 0, 0, b'q', b'u', b'e', b's', b't']));
    assert_eq!(STRING.decode(&[2, 0, 0, 0, b'o', b'k']), Ok("ok".to_string()));
    assert_eq!(STRING.decode(&[1, 0, 0, 0, 0xff]), Err(CodecError::InvalidUtf8));
}

#[test]
fn vector_and_option_forms() {
    let hashes = vec![format!("0x{}", "00".repeat(32)), format!("0x{}", "ff".repeat(32))];
    let bytes = BYTE32_VEC.encode(&hashes).unwrap();
    assert_eq!(bytes.len(), 4 + 64);
    assert_eq!(BYTE32_VEC.decode(&bytes), Ok(hashes));

    let blobs = vec!["0x01".to_string()];
    assert_eq!(BYTES_VEC.decode(&BYTES_VEC.encode(&blobs).unwrap()), Ok(blobs));

    assert_eq!(UINT32_OPT.encode(&None), Ok(vec![]));
    assert_eq!(UINT32_OPT.decode(&[1, 0, 0, 0]), Ok(Some(1)));
}
