//! DC6 frame sheet decoder.
//!
//! Layout (all little-endian):
//!
//! ```text
//! header   version:i32 flags:u32 encoding:u32 termination:[u8;4]
//!          directions:u32 frames_per_direction:u32
//! pointers u32 * directions * frames_per_direction   (absolute offsets)
//! frame    flipped:u32 width:u32 height:u32 offset_x:i32 offset_y:i32
//!          unknown:u32 next_block:u32 length:u32 data:[u8; length] terminator:[u8;3]
//! ```
//!
//! Frame data is run-length encoded bottom row first. `0x80` ends a scan
//! line, a byte with the high bit set skips `b & 0x7F` transparent pixels,
//! and any other byte copies that many literal indices.

use super::{ByteReader, FormatError};

const END_OF_LINE: u8 = 0x80;
const TRANSPARENT_RUN: u8 = 0x80;
const MAX_FRAME_PIXELS: usize = 4096 * 4096;

#[derive(Clone, Debug)]
pub struct Dc6 {
    pub version: i32,
    pub flags: u32,
    pub encoding: u32,
    pub directions: Vec<Dc6Direction>,
}

#[derive(Clone, Debug, Default)]
pub struct Dc6Direction {
    pub frames: Vec<Dc6Frame>,
}

/// A decoded frame. Pixels are palette indices, row-major, top row first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dc6Frame {
    pub flipped: bool,
    pub width: u32,
    pub height: u32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub pixels: Vec<u8>,
}

impl Dc6Frame {
    /// Palette index at `(x, y)`, or `0` outside the frame.
    pub fn color_index_at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return 0;
        }
        self.pixels
            .get(x as usize + y as usize * self.width as usize)
            .copied()
            .unwrap_or(0)
    }
}

impl Dc6 {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        let mut header = ByteReader::new(data);
        let version = header.i32()?;
        let flags = header.u32()?;
        let encoding = header.u32()?;
        header.skip(4)?;
        let direction_count = header.u32()? as usize;
        let frames_per_direction = header.u32()? as usize;

        let total = direction_count
            .checked_mul(frames_per_direction)
            .filter(|n| n.checked_mul(4).is_some_and(|bytes| bytes <= header.remaining()))
            .ok_or_else(|| {
                FormatError::Corrupt(format!(
                    "{direction_count} directions x {frames_per_direction} frames exceeds file size"
                ))
            })?;

        let mut pointers = Vec::with_capacity(total);
        for _ in 0..total {
            pointers.push(header.u32()? as usize);
        }

        let mut directions = Vec::with_capacity(direction_count);
        for dir in 0..direction_count {
            let mut frames = Vec::with_capacity(frames_per_direction);
            for frame in 0..frames_per_direction {
                let pointer = pointers[dir * frames_per_direction + frame];
                frames.push(decode_frame(data, pointer)?);
            }
            directions.push(Dc6Direction { frames });
        }

        Ok(Self {
            version,
            flags,
            encoding,
            directions,
        })
    }
}

fn decode_frame(data: &[u8], offset: usize) -> Result<Dc6Frame, FormatError> {
    let mut r = ByteReader::at(data, offset);
    let flipped = r.u32()? != 0;
    let width = r.u32()?;
    let height = r.u32()?;
    let offset_x = r.i32()?;
    let offset_y = r.i32()?;
    r.skip(4)?; // unknown
    r.skip(4)?; // next block
    let length = r.u32()? as usize;
    let encoded = r.bytes(length)?;

    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .filter(|n| *n <= MAX_FRAME_PIXELS)
        .ok_or_else(|| FormatError::Corrupt(format!("frame size {width}x{height}")))?;
    let mut pixels = vec![0u8; pixel_count];

    if pixel_count > 0 {
        decode_rle(encoded, width as usize, height as usize, &mut pixels)?;
    }

    Ok(Dc6Frame {
        flipped,
        width,
        height,
        offset_x,
        offset_y,
        pixels,
    })
}

fn decode_rle(
    encoded: &[u8],
    width: usize,
    height: usize,
    pixels: &mut [u8],
) -> Result<(), FormatError> {
    let mut x = 0usize;
    let mut y = height - 1;
    let mut bytes = encoded.iter().copied();

    while let Some(b) = bytes.next() {
        if b == END_OF_LINE {
            if y == 0 {
                break;
            }
            y -= 1;
            x = 0;
        } else if b & TRANSPARENT_RUN != 0 {
            x += usize::from(b & 0x7F);
        } else {
            for _ in 0..b {
                let index = bytes.next().ok_or_else(|| {
                    FormatError::Corrupt("literal run past end of frame data".into())
                })?;
                if x < width {
                    pixels[x + y * width] = index;
                }
                x += 1;
            }
        }
    }
    Ok(())
}
