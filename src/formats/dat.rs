//! DAT palette decoder.
//!
//! A palette file is 256 consecutive colour triples stored in BGR order.
//! Trailing bytes (some tools append them) are ignored.

use super::{ByteReader, FormatError};

pub const PALETTE_SIZE: usize = 256;
const ENTRY_SIZE: usize = 3;

/// One decoded palette: 256 RGB triples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatPalette {
    pub colors: [[u8; 3]; PALETTE_SIZE],
}

impl DatPalette {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        let mut reader = ByteReader::new(data);
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for color in colors.iter_mut() {
            let bgr = reader.bytes(ENTRY_SIZE)?;
            *color = [bgr[2], bgr[1], bgr[0]];
        }
        Ok(Self { colors })
    }
}
