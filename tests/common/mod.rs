//! Shared helpers for integration tests: byte builders for the asset
//! formats and a loader backed by an in-memory archive.

#![allow(dead_code)]

use abyssengine::resources::loader::{ArchiveProvider, Loader, MemoryArchive};

/// Builds a DC6 file. Frames are given as `(width, height, pixels)` with
/// pixels row-major, top row first. Every direction must have the same
/// number of frames.
pub fn dc6(directions: &[Vec<(u32, u32, Vec<u8>)>]) -> Vec<u8> {
    let frames_per_direction = directions.first().map_or(0, |d| d.len());
    let total = directions.len() * frames_per_direction;

    let mut encoded_frames = Vec::new();
    for direction in directions {
        for (width, height, pixels) in direction {
            let mut data = Vec::new();
            // Scan lines are stored bottom row first.
            for row in (0..*height as usize).rev() {
                let start = row * *width as usize;
                data.push(*width as u8);
                data.extend_from_slice(&pixels[start..start + *width as usize]);
                data.push(0x80);
            }
            let mut frame = Vec::new();
            for value in [0u32, *width, *height, 0, 0, 0, 0, data.len() as u32] {
                frame.extend_from_slice(&value.to_le_bytes());
            }
            frame.extend_from_slice(&data);
            frame.extend_from_slice(&[0xEE, 0xEE, 0xEE]);
            encoded_frames.push(frame);
        }
    }

    let mut out = Vec::new();
    out.extend_from_slice(&6i32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&[0xEE; 4]);
    out.extend_from_slice(&(directions.len() as u32).to_le_bytes());
    out.extend_from_slice(&(frames_per_direction as u32).to_le_bytes());

    let mut offset = out.len() + total * 4;
    for frame in &encoded_frames {
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += frame.len();
    }
    for frame in encoded_frames {
        out.extend_from_slice(&frame);
    }
    out
}

#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    len: usize,
}

impl BitWriter {
    fn push(&mut self, value: u32, count: u32) -> &mut Self {
        for i in 0..count {
            if self.len % 8 == 0 {
                self.bytes.push(0);
            }
            let bit = ((value >> i) & 1) as u8;
            *self.bytes.last_mut().unwrap() |= bit << (self.len % 8);
            self.len += 1;
        }
        self
    }
}

/// A one-direction, one-frame DCC of 4x2 pixels. Its rows decode to
/// `[30, 20, 10, 10]` and `[10, 10, 20, 30]`.
pub fn dcc_4x2() -> Vec<u8> {
    let mut w = BitWriter::default();
    w.push(0, 32).push(0, 2);
    for code in [0, 5, 5, 5, 5, 0, 0] {
        w.push(code, 4);
    }
    w.push(4, 8).push(2, 8).push(0, 8).push(1, 8).push(0, 1);
    w.push(0, 20);
    for i in 0..256 {
        w.push(u32::from(i == 10 || i == 20 || i == 30), 1);
    }
    w.push(1, 4).push(1, 4).push(0, 4);
    for slot in [0, 1, 2, 3, 2, 2, 1, 0] {
        w.push(slot, 2);
    }

    let mut out = vec![0x74, 6, 1];
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&19u32.to_le_bytes());
    out.extend_from_slice(&w.bytes);
    out
}

/// A single-frame DC6 filled with one colour index.
pub fn solid_dc6(width: u32, height: u32, index: u8) -> Vec<u8> {
    dc6(&[vec![(width, height, vec![index; (width * height) as usize])]])
}

/// A DAT palette: 256 black BGR entries except `(index, [r, g, b])` overrides.
pub fn dat(overrides: &[(usize, [u8; 3])]) -> Vec<u8> {
    let mut bytes = vec![0u8; 768];
    for (index, [r, g, b]) in overrides {
        bytes[index * 3] = *b;
        bytes[index * 3 + 1] = *g;
        bytes[index * 3 + 2] = *r;
    }
    bytes
}

pub fn loader_with(entries: &[(&str, Vec<u8>)]) -> Loader {
    let mut archive = MemoryArchive::new();
    for (path, bytes) in entries {
        archive.insert(path, bytes.clone());
    }
    let mut loader = Loader::new();
    loader.add_provider(Box::new(ArchiveProvider::new(archive)));
    loader
}

/// A TBL font table from `(char, width, height, frame)` glyph records.
pub fn tbl(glyphs: &[(char, u8, u8, u16)]) -> Vec<u8> {
    let mut bytes = b"Woo!\x01".to_vec();
    bytes.extend_from_slice(&[0; 7]);
    for (c, width, height, frame) in glyphs {
        bytes.extend_from_slice(&(*c as u16).to_le_bytes());
        bytes.push(0);
        bytes.push(*width);
        bytes.push(*height);
        bytes.extend_from_slice(&[0; 3]);
        bytes.extend_from_slice(&frame.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);
    }
    bytes
}
