//! Frame grid composition.
//!
//! Large UI panels are stored as several frames that tile into one picture.
//! A `cell_x` by `cell_y` grid starting at `start_frame` is laid out row by
//! row: frame `start + cx + cy * cell_x` sits in column `cx` of row `cy`.
//! The image is as wide as the first row and as tall as the first column,
//! and each row is placed below the previous one using the height of the
//! row's first frame.

use crate::render::IndexedImage;

use super::sequence::SequenceProvider;

/// Composes a grid of frames from `sequence` into a single indexed image.
pub fn compose_cells(
    provider: &dyn SequenceProvider,
    sequence: usize,
    start_frame: usize,
    cell_x: usize,
    cell_y: usize,
) -> IndexedImage {
    let width: u32 = (0..cell_x)
        .map(|cx| provider.frame_width(sequence, start_frame + cx))
        .sum();
    let height: u32 = (0..cell_y)
        .map(|cy| provider.frame_height(sequence, start_frame + cy * cell_x))
        .sum();

    let mut image = IndexedImage::new(width, height);
    let mut origin_y = 0u32;
    for cy in 0..cell_y {
        let row_start = start_frame + cy * cell_x;
        let mut origin_x = 0u32;
        for cx in 0..cell_x {
            let frame = row_start + cx;
            let frame_width = provider.frame_width(sequence, frame);
            let frame_height = provider.frame_height(sequence, frame);
            blit(provider, sequence, frame, frame_width, frame_height, origin_x, origin_y, &mut image);
            origin_x += frame_width;
        }
        origin_y += provider.frame_height(sequence, row_start);
    }
    image
}

#[allow(clippy::too_many_arguments)]
fn blit(
    provider: &dyn SequenceProvider,
    sequence: usize,
    frame: usize,
    frame_width: u32,
    frame_height: u32,
    origin_x: u32,
    origin_y: u32,
    image: &mut IndexedImage,
) {
    for y in 0..frame_height {
        let dst_y = origin_y + y;
        if dst_y >= image.height {
            break;
        }
        for x in 0..frame_width {
            let dst_x = origin_x + x;
            if dst_x >= image.width {
                break;
            }
            let index = (dst_x + dst_y * image.width) as usize;
            image.pixels[index] = provider.color_index_at(sequence, frame, x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frames filled with their own frame number.
    struct Solid {
        sizes: Vec<(u32, u32)>,
    }

    impl SequenceProvider for Solid {
        fn sequence_count(&self) -> usize {
            1
        }
        fn frame_count(&self, sequence: usize) -> usize {
            if sequence == 0 { self.sizes.len() } else { 0 }
        }
        fn frame_width(&self, _: usize, frame: usize) -> u32 {
            self.sizes.get(frame).map_or(0, |s| s.0)
        }
        fn frame_height(&self, _: usize, frame: usize) -> u32 {
            self.sizes.get(frame).map_or(0, |s| s.1)
        }
        fn color_index_at(&self, _: usize, frame: usize, x: u32, y: u32) -> u8 {
            match self.sizes.get(frame) {
                Some(&(w, h)) if x < w && y < h => frame as u8 + 1,
                _ => 0,
            }
        }
    }

    #[test]
    fn test_single_cell_is_frame_copy() {
        let provider = Solid {
            sizes: vec![(3, 2)],
        };
        let image = compose_cells(&provider, 0, 0, 1, 1);
        assert_eq!((image.width, image.height), (3, 2));
        assert!(image.pixels.iter().all(|&p| p == 1));
    }

    #[test]
    fn test_two_by_one_row() {
        let provider = Solid {
            sizes: vec![(10, 20), (14, 20)],
        };
        let image = compose_cells(&provider, 0, 0, 2, 1);
        assert_eq!((image.width, image.height), (24, 20));
        assert_eq!(image.index_at(9, 0), 1);
        assert_eq!(image.index_at(10, 0), 2);
        assert_eq!(image.index_at(23, 19), 2);
    }

    #[test]
    fn test_rows_stack_by_first_frame_height() {
        let provider = Solid {
            sizes: vec![(2, 1), (2, 1), (2, 3), (2, 3)],
        };
        let image = compose_cells(&provider, 0, 0, 2, 2);
        assert_eq!((image.width, image.height), (4, 4));
        assert_eq!(image.index_at(0, 0), 1);
        assert_eq!(image.index_at(3, 0), 2);
        assert_eq!(image.index_at(0, 1), 3);
        assert_eq!(image.index_at(3, 3), 4);
    }

    #[test]
    fn test_start_frame_offsets_grid() {
        let provider = Solid {
            sizes: vec![(1, 1), (5, 4)],
        };
        let image = compose_cells(&provider, 0, 1, 1, 1);
        assert_eq!((image.width, image.height), (5, 4));
        assert!(image.pixels.iter().all(|&p| p == 2));
    }

    #[test]
    fn test_missing_frames_compose_empty() {
        let provider = Solid { sizes: vec![] };
        let image = compose_cells(&provider, 0, 0, 1, 1);
        assert!(image.is_empty());
    }
}
