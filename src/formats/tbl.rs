//! TBL font table decoder.
//!
//! A font is a glyph table (`.tbl`) plus a DC6 sheet holding one frame per
//! glyph. The table starts with the `Woo!\x01` signature and 7 unknown bytes,
//! followed by 14-byte glyph records:
//!
//! ```text
//! code:u16 _:u8 width:u8 height:u8 _:[u8;3] frame:u16 _:[u8;4]
//! ```

use rustc_hash::FxHashMap;

use super::{ByteReader, FormatError};

const SIGNATURE: &[u8; 5] = b"Woo!\x01";
const HEADER_PADDING: usize = 7;
const GLYPH_RECORD_SIZE: usize = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub width: u8,
    pub height: u8,
    /// Frame index in the companion DC6 sheet.
    pub frame: u16,
}

#[derive(Clone, Debug, Default)]
pub struct FontTable {
    glyphs: FxHashMap<u16, Glyph>,
}

impl FontTable {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        let mut r = ByteReader::new(data);
        let signature = r.bytes(SIGNATURE.len())?;
        if signature != SIGNATURE {
            return Err(FormatError::InvalidSignature(format!(
                "font table starts with {signature:?}"
            )));
        }
        r.skip(HEADER_PADDING)?;

        let mut glyphs = FxHashMap::default();
        while r.remaining() >= GLYPH_RECORD_SIZE {
            let code = r.u16()?;
            r.skip(1)?;
            let width = r.u8()?;
            let height = r.u8()?;
            r.skip(3)?;
            let frame = r.u16()?;
            r.skip(4)?;
            glyphs.insert(
                code,
                Glyph {
                    width,
                    height,
                    frame,
                },
            );
        }

        Ok(Self { glyphs })
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        u16::try_from(u32::from(c))
            .ok()
            .and_then(|code| self.glyphs.get(&code))
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: u16, width: u8, height: u8, frame: u16) -> Vec<u8> {
        let mut r = Vec::new();
        r.extend_from_slice(&code.to_le_bytes());
        r.push(0);
        r.push(width);
        r.push(height);
        r.extend_from_slice(&[0; 3]);
        r.extend_from_slice(&frame.to_le_bytes());
        r.extend_from_slice(&[0; 4]);
        r
    }

    #[test]
    fn test_decode_glyphs() {
        let mut data = SIGNATURE.to_vec();
        data.extend_from_slice(&[0; HEADER_PADDING]);
        data.extend(record('A' as u16, 8, 12, 33));
        data.extend(record('b' as u16, 6, 12, 66));
        let table = FontTable::from_bytes(&data).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.glyph('A'),
            Some(&Glyph {
                width: 8,
                height: 12,
                frame: 33
            })
        );
        assert!(table.glyph('z').is_none());
    }

    #[test]
    fn test_bad_signature() {
        let data = b"Nope!\x00\x00\x00\x00\x00\x00\x00".to_vec();
        assert!(matches!(
            FontTable::from_bytes(&data),
            Err(FormatError::InvalidSignature(_))
        ));
    }
}
