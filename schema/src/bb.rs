use crate::error::CodecError;

/// A molecule byte buffer meant for reading.
///
/// Example usage:
///
/// ```
/// let mut bb = molgen_schema::ByteBuffer::new(&[8, 0, 0, 0, 1, 2, 3, 4]);
/// assert_eq!(bb.read_u32_le(), Ok(8));
/// assert_eq!(bb.read_bytes(4), Ok(&[1u8, 2, 3, 4][..]));
/// assert!(bb.is_exhausted());
/// ```
///
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> ByteBuffer<'a> {
    /// Create a new ByteBuffer that wraps the provided byte slice. The lifetime
    /// of the returned ByteBuffer must not outlive the lifetime of the byte
    /// slice.
    pub fn new(data: &'a [u8]) -> ByteBuffer<'a> {
        ByteBuffer { data, index: 0 }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Retrieves the current index into the underlying byte slice. This starts
    /// off as 0 and ends up as `self.data().len()` when everything has been
    /// read.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.index == self.data.len()
    }

    /// Try to read a byte starting at the current index.
    pub fn read_byte(&mut self) -> Result<u8, CodecError> {
        let value = self.read_bytes(1)?;
        Ok(value[0])
    }

    /// Try to read `len` bytes starting at the current index. The returned
    /// slice aliases the underlying memory.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                offset:    self.index,
                needed:    len,
                available: self.remaining(),
            });
        }
        let value = &self.data[self.index..self.index + len];
        self.index += len;
        Ok(value)
    }

    /// Try to read a little-endian unsigned 32-bit integer, the unit molecule
    /// uses for item counts, total sizes and offsets.
    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

#[cfg(test)]
fn eof(offset: usize, needed: usize, available: usize) -> CodecError {
    CodecError::UnexpectedEof { offset, needed, available }
}

#[test]
fn read_byte() {
    let read = |bytes| ByteBuffer::new(bytes).read_byte();
    assert_eq!(read(&[]), Err(eof(0, 1, 0)));
    assert_eq!(read(&[0]), Ok(0));
    assert_eq!(read(&[1]), Ok(1));
    assert_eq!(read(&[254]), Ok(254));
    assert_eq!(read(&[255]), Ok(255));
}

#[test]
fn read_bytes() {
    let read = |bytes, len| ByteBuffer::new(bytes).read_bytes(len);
    assert_eq!(read(&[], 0), Ok(vec![].as_slice()));
    assert_eq!(read(&[], 1), Err(eof(0, 1, 0)));
    assert_eq!(read(&[0], 0), Ok(vec![].as_slice()));
    assert_eq!(read(&[0], 1), Ok(vec![0].as_slice()));
    assert_eq!(read(&[0], 2), Err(eof(0, 2, 1)));

    let mut bb = ByteBuffer::new(&[1, 2, 3, 4, 5]);
    assert_eq!(bb.read_bytes(3), Ok(vec![1, 2, 3].as_slice()));
    assert_eq!(bb.remaining(), 2);
    assert_eq!(bb.read_bytes(2), Ok(vec![4, 5].as_slice()));
    assert_eq!(bb.read_bytes(1), Err(eof(5, 1, 0)));
    assert!(bb.is_exhausted());
}

#[test]
fn read_u32_le() {
    let read = |bytes| ByteBuffer::new(bytes).read_u32_le();
    assert_eq!(read(&[]), Err(eof(0, 4, 0)));
    assert_eq!(read(&[1, 0, 0]), Err(eof(0, 4, 3)));
    assert_eq!(read(&[0, 0, 0, 0]), Ok(0));
    assert_eq!(read(&[4, 0, 0, 0]), Ok(4));
    assert_eq!(read(&[0, 1, 0, 0]), Ok(256));
    assert_eq!(read(&[0x78, 0x56, 0x34, 0x12]), Ok(0x1234_5678));
    assert_eq!(read(&[255, 255, 255, 255]), Ok(u32::MAX));
}

#[test]
fn read_sequence() {
    let mut bb = ByteBuffer::new(&[12, 0, 0, 0, 8, 0, 0, 0, 9, 10, 11, 12]);
    assert_eq!(bb.read_u32_le(), Ok(12));
    assert_eq!(bb.read_u32_le(), Ok(8));
    assert_eq!(bb.index(), 8);
    assert_eq!(bb.read_byte(), Ok(9));
    assert_eq!(bb.read_bytes(3), Ok(vec![10, 11, 12].as_slice()));
}

/// A molecule byte buffer meant for writing.
///
/// Example usage:
///
/// ```
/// let mut bb = molgen_schema::ByteBufferMut::new();
/// bb.write_u32_le(4);
/// bb.write_byte(7);
/// assert_eq!(bb.data(), [4, 0, 0, 0, 7]);
/// ```
///
#[derive(Debug, Default)]
pub struct ByteBufferMut {
    data: Vec<u8>,
}

impl ByteBufferMut {
    /// Creates an empty ByteBufferMut ready for writing.
    pub fn new() -> ByteBufferMut {
        ByteBufferMut { data: vec![] }
    }

    /// Creates an empty ByteBufferMut with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> ByteBufferMut {
        ByteBufferMut { data: Vec::with_capacity(capacity) }
    }

    /// Consumes this buffer and returns the underlying backing store. Use this
    /// to get the data out when you're done writing to the buffer.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a boolean value to the end of the buffer.
    pub fn write_bool(&mut self, value: bool) {
        self.data.push(if value { 1 } else { 0 });
    }

    /// Write a byte to the end of the buffer.
    pub fn write_byte(&mut self, value: u8) {
        self.data.push(value);
    }

    /// Write a raw byte slice to the end of the buffer.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    /// Write a little-endian unsigned 32-bit integer to the end of the buffer.
    pub fn write_u32_le(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a length or offset as a molecule header word. Fails when the value
    /// does not fit in 32 bits.
    pub fn write_header(&mut self, name: &'static str, value: usize) -> Result<(), CodecError> {
        let value = u32::try_from(value).map_err(|_| CodecError::TooLarge { name })?;
        self.write_u32_le(value);
        Ok(())
    }
}

#[cfg(test)]
fn write_once(cb: fn(&mut ByteBufferMut)) -> Vec<u8> {
    let mut bb = ByteBufferMut::new();
    cb(&mut bb);
    bb.data()
}

#[test]
fn write_bool() {
    assert_eq!(write_once(|bb| bb.write_bool(false)), [0]);
    assert_eq!(write_once(|bb| bb.write_bool(true)), [1]);
}

#[test]
fn write_byte() {
    assert_eq!(write_once(|bb| bb.write_byte(0)), [0]);
    assert_eq!(write_once(|bb| bb.write_byte(1)), [1]);
    assert_eq!(write_once(|bb| bb.write_byte(254)), [254]);
    assert_eq!(write_once(|bb| bb.write_byte(255)), [255]);
}

#[test]
fn write_bytes() {
    let mut bb = ByteBufferMut::new();
    bb.write_bytes(&[1, 2, 3]);
    assert_eq!(bb.len(), 3);
    bb.write_bytes(&[]);
    bb.write_bytes(&[4, 5]);
    assert_eq!(bb.data(), [1, 2, 3, 4, 5]);
}

#[test]
fn write_u32_le() {
    assert_eq!(write_once(|bb| bb.write_u32_le(0)), [0, 0, 0, 0]);
    assert_eq!(write_once(|bb| bb.write_u32_le(4)), [4, 0, 0, 0]);
    assert_eq!(write_once(|bb| bb.write_u32_le(256)), [0, 1, 0, 0]);
    assert_eq!(write_once(|bb| bb.write_u32_le(0x1234_5678)), [0x78, 0x56, 0x34, 0x12]);
    assert_eq!(write_once(|bb| bb.write_u32_le(u32::MAX)), [255, 255, 255, 255]);
}

#[test]
fn write_header() {
    let mut bb = ByteBufferMut::new();
    assert_eq!(bb.write_header("Test", 12), Ok(()));
    assert_eq!(bb.data(), [12, 0, 0, 0]);

    #[cfg(target_pointer_width = "64")]
    {
        let mut bb = ByteBufferMut::new();
        assert_eq!(
            bb.write_header("Test", u32::MAX as usize + 1),
            Err(CodecError::TooLarge { name: "Test" })
        );
        assert!(bb.is_empty());
    }
}

#[test]
fn write_sequence() {
    let mut bb = ByteBufferMut::new();
    bb.write_u32_le(9);
    bb.write_u32_le(1);
    bb.write_bool(true);
    assert_eq!(bb.data(), [9, 0, 0, 0, 1, 0, 0, 0, 1]);
}
