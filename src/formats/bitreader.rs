//! LSB-first bit reader.
//!
//! Bits are consumed from the least significant bit of each byte upward,
//! and multi-bit values are assembled least significant bit first. Readers
//! are cheap to clone: the DCC decoder forks one reader per sub-stream.

use super::FormatError;

#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current position in bits from the start of the data.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn skip(&mut self, bits: usize) {
        self.position += bits;
    }

    pub fn bit(&mut self) -> Result<u32, FormatError> {
        let byte = self
            .data
            .get(self.position / 8)
            .ok_or(FormatError::BitStreamEof { bit: self.position })?;
        let value = (byte >> (self.position % 8)) & 1;
        self.position += 1;
        Ok(u32::from(value))
    }

    /// Reads `count` bits (at most 32) as an unsigned value.
    pub fn bits(&mut self, count: u32) -> Result<u32, FormatError> {
        debug_assert!(count <= 32);
        let mut value = 0u32;
        for i in 0..count {
            value |= self.bit()? << i;
        }
        Ok(value)
    }

    /// Reads `count` bits as a two's complement value.
    ///
    /// A single bit reads as `0` or `-1`.
    pub fn signed_bits(&mut self, count: u32) -> Result<i32, FormatError> {
        let raw = self.bits(count)?;
        Ok(sign_extend(raw, count))
    }
}

fn sign_extend(value: u32, count: u32) -> i32 {
    match count {
        0 => 0,
        32 => value as i32,
        _ => {
            let shift = 32 - count;
            ((value << shift) as i32) >> shift
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_read_lsb_first() {
        // 0b1011_0010
        let data = [0xB2];
        let mut r = BitReader::new(&data);
        assert_eq!(r.bit().unwrap(), 0);
        assert_eq!(r.bit().unwrap(), 1);
        assert_eq!(r.bits(3).unwrap(), 0b100);
        assert_eq!(r.bits(3).unwrap(), 0b101);
        assert!(r.bit().is_err());
    }

    #[test]
    fn test_bits_span_bytes() {
        let data = [0xFF, 0x01];
        let mut r = BitReader::new(&data);
        r.skip(4);
        assert_eq!(r.bits(5).unwrap(), 0b11111);
        assert_eq!(r.position(), 9);
    }

    #[test]
    fn test_signed_bits() {
        assert_eq!(sign_extend(1, 1), -1);
        assert_eq!(sign_extend(0, 1), 0);
        assert_eq!(sign_extend(0b0111, 4), 7);
        assert_eq!(sign_extend(0b1000, 4), -8);
        assert_eq!(sign_extend(0b1111, 4), -1);
        assert_eq!(sign_extend(0xFFFF_FFFF, 32), -1);
    }

    #[test]
    fn test_forked_reader_is_independent() {
        let data = [0b0000_0101];
        let mut a = BitReader::new(&data);
        let mut b = a.clone();
        assert_eq!(a.bits(2).unwrap(), 0b01);
        assert_eq!(b.bit().unwrap(), 1);
        assert_eq!(b.bit().unwrap(), 0);
        assert_eq!(a.bit().unwrap(), 1);
    }
}
