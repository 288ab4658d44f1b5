//! Format-agnostic access to decoded animations.
//!
//! Both sprite formats are exposed through [`SequenceProvider`]. Accessors
//! never fail: an out-of-range sequence or frame yields `0`, which lets the
//! composition loop read pixels without a branch per error. A zero is not a
//! success signal; callers that need validation check the counts first.
//!
//! The format is picked once, by file extension, when the file is loaded.

use std::path::Path;

use crate::formats::dc6::{Dc6, Dc6Direction, Dc6Frame};
use crate::formats::dcc::{Dcc, DccDirection, DccFrame};
use crate::resources::loader::Loader;

use super::SpriteError;

pub trait SequenceProvider {
    fn sequence_count(&self) -> usize;
    fn frame_count(&self, sequence: usize) -> usize;
    fn frame_width(&self, sequence: usize, frame: usize) -> u32;
    fn frame_height(&self, sequence: usize, frame: usize) -> u32;
    fn color_index_at(&self, sequence: usize, frame: usize, x: u32, y: u32) -> u8;
}

/// DC6 directions, frames stored as flat pixel arrays.
#[derive(Clone, Debug, Default)]
pub struct Dc6Sequences {
    directions: Vec<Dc6Direction>,
}

impl Dc6Sequences {
    pub fn new(directions: Vec<Dc6Direction>) -> Self {
        Self { directions }
    }

    fn frame(&self, sequence: usize, frame: usize) -> Option<&Dc6Frame> {
        self.directions.get(sequence)?.frames.get(frame)
    }
}

impl From<Dc6> for Dc6Sequences {
    fn from(dc6: Dc6) -> Self {
        Self::new(dc6.directions)
    }
}

impl SequenceProvider for Dc6Sequences {
    fn sequence_count(&self) -> usize {
        self.directions.len()
    }

    fn frame_count(&self, sequence: usize) -> usize {
        self.directions.get(sequence).map_or(0, |d| d.frames.len())
    }

    fn frame_width(&self, sequence: usize, frame: usize) -> u32 {
        self.frame(sequence, frame).map_or(0, |f| f.width)
    }

    fn frame_height(&self, sequence: usize, frame: usize) -> u32 {
        self.frame(sequence, frame).map_or(0, |f| f.height)
    }

    fn color_index_at(&self, sequence: usize, frame: usize, x: u32, y: u32) -> u8 {
        self.frame(sequence, frame)
            .map_or(0, |f| f.color_index_at(x as i32, y as i32))
    }
}

/// DCC directions, frames read through their accessor.
#[derive(Clone, Debug, Default)]
pub struct DccSequences {
    directions: Vec<DccDirection>,
}

impl DccSequences {
    pub fn new(directions: Vec<DccDirection>) -> Self {
        Self { directions }
    }

    fn frame(&self, sequence: usize, frame: usize) -> Option<&DccFrame> {
        self.directions.get(sequence)?.frames.get(frame)
    }
}

impl From<Dcc> for DccSequences {
    fn from(dcc: Dcc) -> Self {
        Self::new(dcc.directions)
    }
}

impl SequenceProvider for DccSequences {
    fn sequence_count(&self) -> usize {
        self.directions.len()
    }

    fn frame_count(&self, sequence: usize) -> usize {
        self.directions.get(sequence).map_or(0, |d| d.frames.len())
    }

    fn frame_width(&self, sequence: usize, frame: usize) -> u32 {
        self.frame(sequence, frame).map_or(0, DccFrame::width)
    }

    fn frame_height(&self, sequence: usize, frame: usize) -> u32 {
        self.frame(sequence, frame).map_or(0, DccFrame::height)
    }

    fn color_index_at(&self, sequence: usize, frame: usize, x: u32, y: u32) -> u8 {
        self.frame(sequence, frame)
            .map_or(0, |f| f.color_index_at(x as i32, y as i32))
    }
}

/// A decoded sprite file of either format.
#[derive(Clone, Debug)]
pub enum Sequences {
    Dc6(Dc6Sequences),
    Dcc(DccSequences),
}

impl Sequences {
    /// Decodes `bytes`, choosing the format from the extension of `path`.
    pub fn from_bytes(path: &str, bytes: &[u8]) -> Result<Self, SpriteError> {
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "dc6" => Ok(Self::Dc6(Dc6::from_bytes(bytes)?.into())),
            "dcc" => Ok(Self::Dcc(Dcc::from_bytes(bytes)?.into())),
            _ => Err(SpriteError::UnsupportedFormat(path.to_string())),
        }
    }

    /// Loads and decodes a sprite file through the loader.
    pub fn load(loader: &Loader, path: &str) -> Result<Self, SpriteError> {
        // Reject unknown formats before touching any provider.
        Self::check_extension(path)?;
        let bytes = loader.load_bytes(path)?;
        Self::from_bytes(path, &bytes)
    }

    fn check_extension(path: &str) -> Result<(), SpriteError> {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".dc6") || lower.ends_with(".dcc") {
            Ok(())
        } else {
            Err(SpriteError::UnsupportedFormat(path.to_string()))
        }
    }

    fn provider(&self) -> &dyn SequenceProvider {
        match self {
            Self::Dc6(s) => s,
            Self::Dcc(s) => s,
        }
    }
}

impl SequenceProvider for Sequences {
    fn sequence_count(&self) -> usize {
        self.provider().sequence_count()
    }

    fn frame_count(&self, sequence: usize) -> usize {
        self.provider().frame_count(sequence)
    }

    fn frame_width(&self, sequence: usize, frame: usize) -> u32 {
        self.provider().frame_width(sequence, frame)
    }

    fn frame_height(&self, sequence: usize, frame: usize) -> u32 {
        self.provider().frame_height(sequence, frame)
    }

    fn color_index_at(&self, sequence: usize, frame: usize, x: u32, y: u32) -> u8 {
        self.provider().color_index_at(sequence, frame, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::dcc::Rect;

    fn one_frame() -> Dc6Sequences {
        Dc6Sequences::new(vec![Dc6Direction {
            frames: vec![Dc6Frame {
                width: 2,
                height: 1,
                pixels: vec![7, 8],
                ..Default::default()
            }],
        }])
    }

    #[test]
    fn test_dc6_out_of_range_returns_zero() {
        let seq = one_frame();
        assert_eq!(seq.frame_count(1), 0);
        assert_eq!(seq.frame_width(0, 1), 0);
        assert_eq!(seq.frame_height(3, 0), 0);
        assert_eq!(seq.color_index_at(0, 0, 1, 0), 8);
        assert_eq!(seq.color_index_at(0, 0, 2, 0), 0);
        assert_eq!(seq.color_index_at(0, 5, 0, 0), 0);
    }

    #[test]
    fn test_dcc_out_of_range_returns_zero() {
        let frame = DccFrame::new(Rect::default(), 2, 1, vec![7, 8]);
        let seq = DccSequences::new(vec![DccDirection {
            bounds: Rect { left: 0, top: 0, width: 2, height: 1 },
            frames: vec![frame],
        }]);
        assert_eq!(seq.sequence_count(), 1);
        assert_eq!(seq.frame_count(1), 0);
        assert_eq!(seq.frame_width(0, 0), 2);
        assert_eq!(seq.frame_width(0, 1), 0);
        assert_eq!(seq.frame_height(3, 0), 0);
        assert_eq!(seq.color_index_at(0, 0, 1, 0), 8);
        assert_eq!(seq.color_index_at(0, 0, 2, 0), 0);
        assert_eq!(seq.color_index_at(0, 0, 0, 1), 0);
        assert_eq!(seq.color_index_at(0, 5, 0, 0), 0);
        assert_eq!(seq.color_index_at(2, 0, 0, 0), 0);
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = Sequences::from_bytes("data/global/ui/panel.png", &[]).unwrap_err();
        assert!(matches!(err, SpriteError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_rejects_extension_before_lookup() {
        let loader = Loader::new();
        let err = Sequences::load(&loader, "ui/cursor.pcx").unwrap_err();
        assert!(matches!(err, SpriteError::UnsupportedFormat(_)));
    }
}
