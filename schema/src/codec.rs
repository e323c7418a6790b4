use crate::{
    bb::{ByteBuffer, ByteBufferMut},
    error::CodecError,
    hex_string::{from_hex, to_hex, Hex},
};

/// A paired encoder/decoder between a semantic value and its molecule bytes.
///
/// Every generated codec, every primitive codec and every chain entity (through
/// [`EntityCodec`](crate::EntityCodec)) implements this trait, so call sites
/// never need to know where a codec came from.
pub trait Codec {
    type Value;

    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Value, CodecError>;

    /// The exact encoded size for fixed-size layouts (arrays and structs).
    fn fixed_size(&self) -> Option<usize> {
        None
    }
}

pub(crate) fn expect_len(name: &'static str, expected: usize, actual: usize) -> Result<(), CodecError> {
    if expected != actual {
        return Err(CodecError::SizeMismatch { name, expected, actual });
    }
    Ok(())
}

/// An array of `N` raw bytes, carried as a hex string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedBytes<const N: usize>;

impl<const N: usize> Codec for FixedBytes<N> {
    type Value = Hex;

    fn encode(&self, value: &Hex) -> Result<Vec<u8>, CodecError> {
        let bytes = from_hex(value)?;
        expect_len("FixedBytes", N, bytes.len())?;
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Hex, CodecError> {
        expect_len("FixedBytes", N, bytes.len())?;
        Ok(to_hex(bytes))
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(N)
    }
}

/// A vector of fixed-size items: an item count followed by the items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixVec<C>(pub C);

impl<C: Codec> FixVec<C> {
    fn item_size(&self) -> Result<usize, CodecError> {
        match self.0.fixed_size() {
            Some(0) => Err(CodecError::ZeroSizeItem { name: "FixVec" }),
            Some(size) => Ok(size),
            None => Err(CodecError::NotFixedSize { name: "FixVec" }),
        }
    }
}

impl<C: Codec> Codec for FixVec<C> {
    type Value = Vec<C::Value>;

    fn encode(&self, value: &Vec<C::Value>) -> Result<Vec<u8>, CodecError> {
        let item_size = self.item_size()?;
        let mut bb = ByteBufferMut::with_capacity(4 + item_size * value.len());
        bb.write_header("FixVec", value.len())?;
        for item in value {
            let bytes = self.0.encode(item)?;
            expect_len("FixVec", item_size, bytes.len())?;
            bb.write_bytes(&bytes);
        }
        Ok(bb.data())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<C::Value>, CodecError> {
        let item_size = self.item_size()?;
        let mut bb = ByteBuffer::new(bytes);
        let count = bb.read_u32_le()? as usize;
        let expected = count
            .checked_mul(item_size)
            .and_then(|size| size.checked_add(4))
            .ok_or(CodecError::TooLarge { name: "FixVec" })?;
        expect_len("FixVec", expected, bytes.len())?;
        (0..count)
            .map(|_| {
                let chunk = bb.read_bytes(item_size)?;
                self.0.decode(chunk)
            })
            .collect()
    }
}

/// A vector of variable-size items, laid out with an offset header like a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DynVec<C>(pub C);

impl<C: Codec> Codec for DynVec<C> {
    type Value = Vec<C::Value>;

    fn encode(&self, value: &Vec<C::Value>) -> Result<Vec<u8>, CodecError> {
        let mut writer = TableWriter::new("DynVec");
        for item in value {
            writer.write(&self.0, item)?;
        }
        writer.finish()
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<C::Value>, CodecError> {
        let reader = TableReader::any("DynVec", bytes)?;
        (0..reader.len())
            .map(|index| reader.field(index, &self.0))
            .collect()
    }
}

/// Zero or one item. Absent encodes to no bytes at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Opt<C>(pub C);

impl<C: Codec> Codec for Opt<C> {
    type Value = Option<C::Value>;

    fn encode(&self, value: &Option<C::Value>) -> Result<Vec<u8>, CodecError> {
        match value {
            Some(inner) => {
                let bytes = self.0.encode(inner)?;
                // Empty bytes mean `None`; a present item must not look the same.
                if bytes.is_empty() {
                    return Err(CodecError::ZeroSizeItem { name: "Opt" });
                }
                Ok(bytes)
            }
            None => Ok(Vec::new()),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Option<C::Value>, CodecError> {
        if bytes.is_empty() {
            Ok(None)
        } else {
            self.0.decode(bytes).map(Some)
        }
    }
}

/// Concatenates fixed-size fields into a struct of a known total size.
pub struct StructWriter {
    name: &'static str,
    size: usize,
    bb:   ByteBufferMut,
}

impl StructWriter {
    pub fn new(name: &'static str, size: usize) -> StructWriter {
        StructWriter { name, size, bb: ByteBufferMut::with_capacity(size) }
    }

    pub fn write<C: Codec>(&mut self, codec: &C, value: &C::Value) -> Result<(), CodecError> {
        let field_size = codec
            .fixed_size()
            .ok_or(CodecError::NotFixedSize { name: self.name })?;
        let bytes = codec.encode(value)?;
        expect_len(self.name, field_size, bytes.len())?;
        self.bb.write_bytes(&bytes);
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, CodecError> {
        expect_len(self.name, self.size, self.bb.len())?;
        Ok(self.bb.data())
    }
}

/// Reads fixed-size fields back out of a struct, in declaration order.
pub struct StructReader<'a> {
    name: &'static str,
    bb:   ByteBuffer<'a>,
}

impl<'a> StructReader<'a> {
    pub fn new(name: &'static str, bytes: &'a [u8], size: usize) -> Result<StructReader<'a>, CodecError> {
        expect_len(name, size, bytes.len())?;
        Ok(StructReader { name, bb: ByteBuffer::new(bytes) })
    }

    pub fn read<C: Codec>(&mut self, codec: &C) -> Result<C::Value, CodecError> {
        let field_size = codec
            .fixed_size()
            .ok_or(CodecError::NotFixedSize { name: self.name })?;
        let chunk = self.bb.read_bytes(field_size)?;
        codec.decode(chunk)
    }
}

/// Builds a table (or dynvec): total size, one offset per part, then the parts.
pub struct TableWriter {
    name:  &'static str,
    parts: Vec<Vec<u8>>,
}

impl TableWriter {
    pub fn new(name: &'static str) -> TableWriter {
        TableWriter { name, parts: Vec::new() }
    }

    pub fn write<C: Codec>(&mut self, codec: &C, value: &C::Value) -> Result<(), CodecError> {
        self.parts.push(codec.encode(value)?);
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, CodecError> {
        let header_size = 4 * (1 + self.parts.len());
        let total_size = header_size + self.parts.iter().map(Vec::len).sum::<usize>();

        let mut bb = ByteBufferMut::with_capacity(total_size);
        bb.write_header(self.name, total_size)?;
        let mut offset = header_size;
        for part in &self.parts {
            bb.write_header(self.name, offset)?;
            offset += part.len();
        }
        for part in &self.parts {
            bb.write_bytes(part);
        }
        Ok(bb.data())
    }
}

/// A validated view over the offset header of a table (or dynvec).
#[derive(Debug)]
pub struct TableReader<'a> {
    name:    &'static str,
    data:    &'a [u8],
    // One start offset per item, plus the total size as a sentinel.
    offsets: Vec<usize>,
}

impl<'a> TableReader<'a> {
    /// Parses a table that must hold exactly `field_count` fields.
    pub fn new(name: &'static str, data: &'a [u8], field_count: usize) -> Result<TableReader<'a>, CodecError> {
        let reader = TableReader::any(name, data)?;
        if reader.len() != field_count {
            return Err(CodecError::FieldCount {
                name,
                expected: field_count,
                actual:   reader.len(),
            });
        }
        Ok(reader)
    }

    /// Parses a header with any number of items.
    pub fn any(name: &'static str, data: &'a [u8]) -> Result<TableReader<'a>, CodecError> {
        let mut bb = ByteBuffer::new(data);
        let total_size = bb.read_u32_le()? as usize;
        expect_len(name, total_size, data.len())?;
        if total_size == 4 {
            return Ok(TableReader { name, data, offsets: vec![4] });
        }

        let header_size = bb.read_u32_le()? as usize;
        if header_size % 4 != 0 || header_size < 8 {
            return Err(CodecError::InvalidHeader {
                name,
                msg: format!("first offset {} is not a valid header size", header_size),
            });
        }
        if header_size > total_size {
            return Err(CodecError::InvalidHeader {
                name,
                msg: format!("header size {} exceeds total size {}", header_size, total_size),
            });
        }

        let count = header_size / 4 - 1;
        let mut offsets = Vec::with_capacity(count + 1);
        offsets.push(header_size);
        for _ in 1..count {
            offsets.push(bb.read_u32_le()? as usize);
        }
        offsets.push(total_size);

        if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(CodecError::InvalidHeader {
                name,
                msg: "offsets are not in ascending order".to_string(),
            });
        }

        Ok(TableReader { name, data, offsets })
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw bytes of item `index`.
    pub fn item(&self, index: usize) -> Result<&'a [u8], CodecError> {
        if index >= self.len() {
            return Err(CodecError::IndexOutOfRange {
                name: self.name,
                index,
                len: self.len(),
            });
        }
        Ok(&self.data[self.offsets[index]..self.offsets[index + 1]])
    }

    pub fn field<C: Codec>(&self, index: usize, codec: &C) -> Result<C::Value, CodecError> {
        codec.decode(self.item(index)?)
    }
}

#[cfg(test)]
use crate::primitives::{BYTE32, BYTES, UINT32, UINT8};

#[test]
fn fixed_bytes_layout() {
    let codec = FixedBytes::<4>;
    assert_eq!(codec.fixed_size(), Some(4));
    assert_eq!(codec.encode(&"0x01020304".to_string()), Ok(vec![1, 2, 3, 4]));
    assert_eq!(codec.decode(&[1, 2, 3, 4]), Ok("0x01020304".to_string()));
    assert_eq!(
        codec.encode(&"0x0102".to_string()),
        Err(CodecError::SizeMismatch { name: "FixedBytes", expected: 4, actual: 2 })
    );
    assert!(codec.decode(&[1, 2, 3, 4, 5]).is_err());
}

#[test]
fn fixvec_layout() {
    let codec = FixVec(UINT32);
    assert_eq!(codec.encode(&vec![]), Ok(vec![0, 0, 0, 0]));
    assert_eq!(
        codec.encode(&vec![1, 0x0100]),
        Ok(vec![2, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0])
    );
    assert_eq!(codec.decode(&[2, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0]), Ok(vec![1, 0x0100]));
    assert_eq!(codec.decode(&[0, 0, 0, 0]), Ok(vec![]));
    assert_eq!(
        codec.decode(&[2, 0, 0, 0, 1, 0, 0, 0]),
        Err(CodecError::SizeMismatch { name: "FixVec", expected: 12, actual: 8 })
    );
}

#[test]
fn fixvec_requires_fixed_items() {
    let codec = FixVec(BYTES);
    assert_eq!(
        codec.encode(&vec!["0x".to_string()]),
        Err(CodecError::NotFixedSize { name: "FixVec" })
    );
}

#[test]
fn zero_size_items_are_refused() {
    // A count header alone must not expand into items that take no bytes.
    let codec = FixVec(FixedBytes::<0>);
    assert_eq!(codec.decode(&[0, 0, 0, 1]), Err(CodecError::ZeroSizeItem { name: "FixVec" }));
    assert_eq!(
        codec.encode(&vec!["0x".to_string()]),
        Err(CodecError::ZeroSizeItem { name: "FixVec" })
    );

    // `Some` of an empty item would read back as `None`.
    let codec = Opt(FixedBytes::<0>);
    assert_eq!(codec.encode(&Some("0x".to_string())), Err(CodecError::ZeroSizeItem { name: "Opt" }));
    assert_eq!(codec.encode(&None), Ok(vec![]));
}

#[test]
fn dynvec_layout() {
    let codec = DynVec(BYTES);
    assert_eq!(codec.encode(&vec![]), Ok(vec![4, 0, 0, 0]));
    assert_eq!(codec.decode(&[4, 0, 0, 0]), Ok(vec![]));

    let items = vec!["0x12".to_string(), "0x".to_string()];
    let bytes = codec.encode(&items).unwrap();
    assert_eq!(
        bytes,
        vec![
            21, 0, 0, 0, // total size
            12, 0, 0, 0, // offset of item 0
            17, 0, 0, 0, // offset of item 1
            1, 0, 0, 0, 0x12, // item 0
            0, 0, 0, 0, // item 1
        ]
    );
    assert_eq!(codec.decode(&bytes), Ok(items));
}

#[test]
fn dynvec_rejects_bad_headers() {
    let codec = DynVec(BYTES);
    assert_eq!(
        codec.decode(&[9, 0, 0, 0, 8, 0, 0, 0]),
        Err(CodecError::SizeMismatch { name: "DynVec", expected: 9, actual: 8 })
    );
    assert!(matches!(
        codec.decode(&[8, 0, 0, 0, 6, 0, 0, 0]),
        Err(CodecError::InvalidHeader { .. })
    ));
    assert!(matches!(
        codec.decode(&[12, 0, 0, 0, 12, 0, 0, 0, 4, 0, 0, 0]),
        Err(CodecError::InvalidHeader { .. })
    ));
}

#[test]
fn option_layout() {
    let codec = Opt(UINT8);
    assert_eq!(codec.encode(&None), Ok(vec![]));
    assert_eq!(codec.encode(&Some(7)), Ok(vec![7]));
    assert_eq!(codec.decode(&[]), Ok(None));
    assert_eq!(codec.decode(&[7]), Ok(Some(7)));

    // An empty byte vector is still present: it carries its own header.
    let codec = Opt(BYTES);
    assert_eq!(codec.encode(&Some("0x".to_string())), Ok(vec![0, 0, 0, 0]));
    assert_eq!(codec.decode(&[0, 0, 0, 0]), Ok(Some("0x".to_string())));
}

#[test]
fn struct_round_trip() {
    let hash = format!("0x{}", "11".repeat(32));

    let mut writer = StructWriter::new("Pair", 33);
    writer.write(&UINT8, &1).unwrap();
    writer.write(&BYTE32, &hash).unwrap();
    let bytes = writer.finish().unwrap();
    assert_eq!(bytes.len(), 33);
    assert_eq!(bytes[0], 1);
    assert!(bytes[1..].iter().all(|b| *b == 0x11));

    let mut reader = StructReader::new("Pair", &bytes, 33).unwrap();
    assert_eq!(reader.read(&UINT8), Ok(1));
    assert_eq!(reader.read(&BYTE32), Ok(hash));
}

#[test]
fn struct_rejects_wrong_size() {
    assert!(matches!(
        StructReader::new("Pair", &[1, 2, 3], 33),
        Err(CodecError::SizeMismatch { name: "Pair", expected: 33, actual: 3 })
    ));

    let mut writer = StructWriter::new("Pair", 33);
    writer.write(&UINT8, &1).unwrap();
    assert_eq!(
        writer.finish(),
        Err(CodecError::SizeMismatch { name: "Pair", expected: 33, actual: 1 })
    );
}

#[test]
fn table_field_count() {
    let mut writer = TableWriter::new("Pair");
    writer.write(&UINT8, &1).unwrap();
    writer.write(&BYTES, &"0xff".to_string()).unwrap();
    let bytes = writer.finish().unwrap();

    let reader = TableReader::new("Pair", &bytes, 2).unwrap();
    assert_eq!(reader.field(0, &UINT8), Ok(1));
    assert_eq!(reader.field(1, &BYTES), Ok("0xff".to_string()));
    assert!(matches!(
        reader.item(2),
        Err(CodecError::IndexOutOfRange { index: 2, len: 2, .. })
    ));

    assert!(matches!(
        TableReader::new("Pair", &bytes, 3),
        Err(CodecError::FieldCount { expected: 3, actual: 2, .. })
    ));
}

#[test]
fn empty_table() {
    let bytes = TableWriter::new("Empty").finish().unwrap();
    assert_eq!(bytes, vec![4, 0, 0, 0]);
    let reader = TableReader::new("Empty", &bytes, 0).unwrap();
    assert!(reader.is_empty());
}
