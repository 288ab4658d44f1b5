//! Binary decoders for the legacy asset formats.
//!
//! Every decoder takes a byte slice and returns an owned, fully decoded
//! structure. Malformed input never panics: it surfaces as a [`FormatError`].
//!
//! - [`dat`] – 256-entry BGR palettes
//! - [`dc6`] – run-length encoded frame sheets (UI, fonts, inventory art)
//! - [`dcc`] – bit-packed, cell-compressed animations (units, monsters)
//! - [`tbl`] – font glyph tables paired with a DC6 glyph sheet
//! - [`bitreader`] – LSB-first bit stream used by the DCC decoder

pub mod bitreader;
pub mod dat;
pub mod dc6;
pub mod dcc;
pub mod tbl;

use thiserror::Error;

/// Error raised while decoding one of the binary asset formats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The input ended before a field could be read.
    #[error("unexpected end of data at offset {offset} (wanted {wanted} more bytes)")]
    UnexpectedEof { offset: usize, wanted: usize },
    /// The bit stream ended before a field could be read.
    #[error("unexpected end of bit stream at bit {bit}")]
    BitStreamEof { bit: usize },
    /// A magic number or signature did not match.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    /// The file is well-formed but uses a layout the decoder does not handle.
    #[error("unsupported layout: {0}")]
    Unsupported(String),
    /// A structural value is out of range for the data that follows it.
    #[error("corrupt data: {0}")]
    Corrupt(String),
}

/// Little-endian cursor over a byte slice.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub(crate) fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        if self.remaining() < len {
            return Err(FormatError::UnexpectedEof {
                offset: self.offset,
                wanted: len,
            });
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<(), FormatError> {
        self.bytes(len).map(|_| ())
    }

    pub(crate) fn u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.bytes(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, FormatError> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, FormatError> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn i32(&mut self) -> Result<i32, FormatError> {
        Ok(self.u32()? as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_reader_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.u16().unwrap(), 0x0201);
        assert_eq!(r.u16().unwrap(), 0x0403);
        assert_eq!(r.i32().unwrap(), -1);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_byte_reader_eof_reports_offset() {
        let data = [0u8; 3];
        let mut r = ByteReader::new(&data);
        r.skip(2).unwrap();
        assert_eq!(
            r.u32(),
            Err(FormatError::UnexpectedEof {
                offset: 2,
                wanted: 4
            })
        );
    }
}
