//! DCC animation decoder.
//!
//! File layout:
//!
//! ```text
//! signature:u8 (0x74) version:u8 directions:u8 frames_per_direction:u32
//! tag:u32 final_dc6_size:u32 direction_offsets:[u32; directions]
//! ```
//!
//! Each direction is a bit stream (see [`BitReader`]) holding the frame
//! headers, up to four optional sub-stream sizes, a 256-bit palette-entry
//! mask and finally the sub-streams themselves. Pixels are reconstructed on
//! a grid of 4x4 cells shared by every frame of the direction, so a frame
//! only stores the cells that changed since the previous one.
//!
//! Every decoded frame covers the direction's bounding box, which keeps the
//! frames of one animation aligned with each other.

use super::bitreader::BitReader;
use super::{ByteReader, FormatError};

const SIGNATURE: u8 = 0x74;
const CELL_SIZE: i32 = 4;
const MAX_DIRECTION_PIXELS: i64 = 4096 * 4096;
/// Upper bound on the pixels decoded for one direction, across all frames.
const MAX_DECODED_PIXELS: i64 = 64 * 1024 * 1024;

/// Maps a 4-bit width code to a field width in bits.
const BIT_WIDTHS: [u32; 16] = [0, 1, 2, 4, 6, 8, 10, 12, 14, 16, 20, 24, 26, 28, 30, 32];

/// Number of set bits in a 4-bit pixel mask.
const MASK_POPCOUNT: [usize; 16] = [0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }
}

#[derive(Clone, Debug)]
pub struct Dcc {
    pub version: u8,
    pub frames_per_direction: u32,
    pub directions: Vec<DccDirection>,
}

#[derive(Clone, Debug, Default)]
pub struct DccDirection {
    /// Union of every frame's bounds.
    pub bounds: Rect,
    pub frames: Vec<DccFrame>,
}

#[derive(Clone, Debug, Default)]
pub struct DccFrame {
    /// The frame's own bounds, as stored in its header.
    pub bounds: Rect,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DccFrame {
    /// A frame covering a `width` by `height` direction box. `pixels` is
    /// row-major and must hold `width * height` indices.
    pub fn new(bounds: Rect, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            bounds,
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Palette index at `(x, y)` in direction-box coordinates, `0` outside it.
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

impl Dcc {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        let mut r = ByteReader::new(data);
        let signature = r.u8()?;
        if signature != SIGNATURE {
            return Err(FormatError::InvalidSignature(format!(
                "expected 0x{SIGNATURE:02x}, found 0x{signature:02x}"
            )));
        }
        let version = r.u8()?;
        let direction_count = r.u8()? as usize;
        let frames_per_direction = r.u32()?;
        r.skip(4)?; // tag
        r.skip(4)?; // final dc6 size

        let mut offsets = Vec::with_capacity(direction_count);
        for _ in 0..direction_count {
            offsets.push(r.u32()? as usize);
        }

        let mut directions = Vec::with_capacity(direction_count);
        for (i, &start) in offsets.iter().enumerate() {
            let end = offsets.get(i + 1).copied().unwrap_or(data.len());
            if start > end || end > data.len() {
                return Err(FormatError::Corrupt(format!(
                    "direction {i} spans {start}..{end} in a {} byte file",
                    data.len()
                )));
            }
            // Every frame header takes at least one bit.
            let available_bits = (end - start).saturating_mul(8);
            if frames_per_direction as usize > available_bits {
                return Err(FormatError::Corrupt(format!(
                    "{frames_per_direction} frames do not fit in direction {i} ({available_bits} bits)"
                )));
            }
            directions.push(decode_direction(
                &data[start..end],
                frames_per_direction as usize,
            )?);
        }

        Ok(Self {
            version,
            frames_per_direction,
            directions,
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Cell {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct LastCell {
    width: usize,
    height: usize,
    x: usize,
    y: usize,
}

#[derive(Clone, Copy, Debug)]
struct PixelBufferEntry {
    value: [u8; 4],
    frame: isize,
    frame_cell: isize,
}

impl Default for PixelBufferEntry {
    fn default() -> Self {
        Self {
            value: [0; 4],
            frame: -1,
            frame_cell: -1,
        }
    }
}

struct FrameLayout {
    bounds: Rect,
    h_cells: usize,
    v_cells: usize,
    cells: Vec<Cell>,
}

struct StreamSizes {
    equal_cells: usize,
    pixel_mask: usize,
    encoding_type: usize,
    raw_pixel: usize,
}

fn decode_direction(data: &[u8], frame_count: usize) -> Result<DccDirection, FormatError> {
    let mut bits = BitReader::new(data);
    bits.bits(32)?; // coded output size
    let compression = bits.bits(2)?;
    let variable0_bits = width_code(&mut bits)?;
    let width_bits = width_code(&mut bits)?;
    let height_bits = width_code(&mut bits)?;
    let x_offset_bits = width_code(&mut bits)?;
    let y_offset_bits = width_code(&mut bits)?;
    let optional_bits = width_code(&mut bits)?;
    let coded_bytes_bits = width_code(&mut bits)?;

    let mut frame_bounds = Vec::with_capacity(frame_count);
    for index in 0..frame_count {
        bits.bits(variable0_bits)?;
        let width = bits.bits(width_bits)?;
        let height = bits.bits(height_bits)?;
        let x_offset = bits.signed_bits(x_offset_bits)?;
        let y_offset = bits.signed_bits(y_offset_bits)?;
        let optional_bytes = bits.bits(optional_bits)?;
        bits.bits(coded_bytes_bits)?;
        let bottom_up = bits.bit()? == 1;
        if bottom_up {
            return Err(FormatError::Unsupported(format!(
                "frame {index} is stored bottom-up"
            )));
        }
        if optional_bytes > 0 {
            return Err(FormatError::Unsupported(format!(
                "frame {index} carries optional data"
            )));
        }
        frame_bounds.push(frame_rect(x_offset, y_offset, width, height).ok_or_else(|| {
            FormatError::Corrupt(format!(
                "frame {index} bounds {width}x{height} at ({x_offset}, {y_offset})"
            ))
        })?);
    }

    let bounds = union_bounds(&frame_bounds)
        .ok_or_else(|| FormatError::Corrupt("direction bounds overflow".into()))?;
    let area = i64::from(bounds.width) * i64::from(bounds.height);
    if area > MAX_DIRECTION_PIXELS || area.saturating_mul(frame_count as i64) > MAX_DECODED_PIXELS {
        return Err(FormatError::Corrupt(format!(
            "direction bounds {}x{} over {frame_count} frames",
            bounds.width, bounds.height
        )));
    }

    let sizes = StreamSizes {
        equal_cells: if compression & 0x2 != 0 {
            bits.bits(20)? as usize
        } else {
            0
        },
        pixel_mask: bits.bits(20)? as usize,
        encoding_type: if compression & 0x1 != 0 {
            bits.bits(20)? as usize
        } else {
            0
        },
        raw_pixel: if compression & 0x1 != 0 {
            bits.bits(20)? as usize
        } else {
            0
        },
    };

    let mut palette_entries = [0u8; 256];
    let mut entry_count = 0usize;
    for i in 0..256 {
        if bits.bit()? != 0 {
            palette_entries[entry_count] = i as u8;
            entry_count += 1;
        }
    }

    if bounds.width <= 0 || bounds.height <= 0 {
        let frames = frame_bounds
            .into_iter()
            .map(|b| DccFrame {
                bounds: b,
                ..Default::default()
            })
            .collect();
        return Ok(DccDirection { bounds, frames });
    }

    let mut equal_cells = bits.clone();
    bits.skip(sizes.equal_cells);
    let mut pixel_mask = bits.clone();
    bits.skip(sizes.pixel_mask);
    let mut encoding_type = bits.clone();
    bits.skip(sizes.encoding_type);
    let mut raw_pixel = bits.clone();
    bits.skip(sizes.raw_pixel);
    let mut pixel_codes = bits;

    let (dir_h_cells, dir_cells) = direction_cells(&bounds);
    let layouts: Vec<FrameLayout> = frame_bounds
        .iter()
        .map(|fb| frame_layout(fb, &bounds))
        .collect();

    let pixel_buffer = fill_pixel_buffer(
        &layouts,
        &bounds,
        dir_h_cells,
        dir_cells.len(),
        &sizes,
        &palette_entries,
        Streams {
            pixel_codes: &mut pixel_codes,
            equal_cells: &mut equal_cells,
            pixel_mask: &mut pixel_mask,
            encoding_type: &mut encoding_type,
            raw_pixel: &mut raw_pixel,
        },
    )?;

    let frames = generate_frames(
        &layouts,
        &bounds,
        dir_h_cells,
        dir_cells.len(),
        &pixel_buffer,
        &mut pixel_codes,
    )?;

    Ok(DccDirection { bounds, frames })
}

fn width_code(bits: &mut BitReader<'_>) -> Result<u32, FormatError> {
    Ok(BIT_WIDTHS[bits.bits(4)? as usize])
}

/// Frame header fields to a rect. `y_offset` is the frame's bottom row.
/// Returns `None` when the rect does not fit in `i32` coordinates.
fn frame_rect(x_offset: i32, y_offset: i32, width: u32, height: u32) -> Option<Rect> {
    let width = i32::try_from(width).ok()?;
    let height = i32::try_from(height).ok()?;
    let top = y_offset.checked_sub(height)?.checked_add(1)?;
    x_offset.checked_add(width)?;
    top.checked_add(height)?;
    Some(Rect {
        left: x_offset,
        top,
        width,
        height,
    })
}

/// Smallest rect holding every frame, `None` if it does not fit in `i32`.
fn union_bounds(frames: &[Rect]) -> Option<Rect> {
    if frames.is_empty() {
        return Some(Rect::default());
    }
    let min_x = frames.iter().map(|f| i64::from(f.left)).min()?;
    let min_y = frames.iter().map(|f| i64::from(f.top)).min()?;
    let max_x = frames
        .iter()
        .map(|f| i64::from(f.left) + i64::from(f.width))
        .max()?;
    let max_y = frames
        .iter()
        .map(|f| i64::from(f.top) + i64::from(f.height))
        .max()?;
    Some(Rect {
        left: i32::try_from(min_x).ok()?,
        top: i32::try_from(min_y).ok()?,
        width: i32::try_from(max_x - min_x).ok()?,
        height: i32::try_from(max_y - min_y).ok()?,
    })
}

/// Splits `total` pixels into a leading cell of `first` pixels followed by
/// 4-pixel cells, with the remainder in the last cell.
fn split_cells(total: i32, first: i32) -> Vec<usize> {
    let count = if total - first <= 1 {
        1
    } else {
        let tmp = total - first - 1;
        let mut n = 2 + tmp / CELL_SIZE;
        if tmp % CELL_SIZE == 0 {
            n -= 1;
        }
        n
    } as usize;

    if count == 1 {
        return vec![total.max(0) as usize];
    }
    let mut sizes = vec![CELL_SIZE as usize; count];
    sizes[0] = first as usize;
    sizes[count - 1] = (total - first - CELL_SIZE * (count as i32 - 2)).max(0) as usize;
    sizes
}

/// The direction-wide 4x4 grid. Returns the horizontal cell count and cells.
fn direction_cells(bounds: &Rect) -> (usize, Vec<Cell>) {
    let h_count = (1 + (bounds.width - 1) / CELL_SIZE) as usize;
    let v_count = (1 + (bounds.height - 1) / CELL_SIZE) as usize;
    let widths = uniform_cells(bounds.width, h_count);
    let heights = uniform_cells(bounds.height, v_count);

    let mut cells = Vec::with_capacity(h_count * v_count);
    for (cy, &height) in heights.iter().enumerate() {
        for (cx, &width) in widths.iter().enumerate() {
            cells.push(Cell {
                x: cx * CELL_SIZE as usize,
                y: cy * CELL_SIZE as usize,
                width,
                height,
            });
        }
    }
    (h_count, cells)
}

fn uniform_cells(total: i32, count: usize) -> Vec<usize> {
    if count == 1 {
        return vec![total as usize];
    }
    let mut sizes = vec![CELL_SIZE as usize; count];
    sizes[count - 1] = (total - CELL_SIZE * (count as i32 - 1)) as usize;
    sizes
}

fn frame_layout(frame: &Rect, direction: &Rect) -> FrameLayout {
    let dx = frame.left - direction.left;
    let dy = frame.top - direction.top;
    let widths = split_cells(frame.width, CELL_SIZE - dx % CELL_SIZE);
    let heights = split_cells(frame.height, CELL_SIZE - dy % CELL_SIZE);

    let mut cells = Vec::with_capacity(widths.len() * heights.len());
    let mut y = dy as usize;
    for &height in &heights {
        let mut x = dx as usize;
        for &width in &widths {
            cells.push(Cell {
                x,
                y,
                width,
                height,
            });
            x += width;
        }
        y += height;
    }

    FrameLayout {
        bounds: *frame,
        h_cells: widths.len(),
        v_cells: heights.len(),
        cells,
    }
}

struct Streams<'s, 'a> {
    pixel_codes: &'s mut BitReader<'a>,
    equal_cells: &'s mut BitReader<'a>,
    pixel_mask: &'s mut BitReader<'a>,
    encoding_type: &'s mut BitReader<'a>,
    raw_pixel: &'s mut BitReader<'a>,
}

fn fill_pixel_buffer(
    layouts: &[FrameLayout],
    bounds: &Rect,
    dir_h_cells: usize,
    dir_cell_count: usize,
    sizes: &StreamSizes,
    palette_entries: &[u8; 256],
    streams: Streams<'_, '_>,
) -> Result<Vec<PixelBufferEntry>, FormatError> {
    // At most one entry per frame cell.
    let capacity: usize = layouts.iter().map(|l| l.cells.len()).sum();
    let mut buffer = vec![PixelBufferEntry::default(); capacity];
    let mut cell_buffer: Vec<Option<usize>> = vec![None; dir_cell_count];
    let mut next_entry = 0usize;

    for (frame_index, layout) in layouts.iter().enumerate() {
        let origin_x = ((layout.bounds.left - bounds.left) / CELL_SIZE) as usize;
        let origin_y = ((layout.bounds.top - bounds.top) / CELL_SIZE) as usize;

        for cell_y in 0..layout.v_cells {
            for cell_x in 0..layout.h_cells {
                let current = origin_x + cell_x + (origin_y + cell_y) * dir_h_cells;
                let previous = *cell_buffer.get(current).ok_or_else(|| {
                    FormatError::Corrupt(format!("frame {frame_index} cell outside direction"))
                })?;

                let pixel_mask = match previous {
                    Some(_) => {
                        let equal = if sizes.equal_cells > 0 {
                            streams.equal_cells.bit()?
                        } else {
                            0
                        };
                        if equal != 0 {
                            continue;
                        }
                        streams.pixel_mask.bits(4)? as usize
                    }
                    None => 0x0F,
                };

                let pixel_count = MASK_POPCOUNT[pixel_mask];
                let raw_encoding = pixel_count != 0
                    && sizes.encoding_type > 0
                    && streams.encoding_type.bit()? != 0;

                let mut stack = [0u32; 4];
                let mut last_pixel = 0u32;
                let mut decoded = 0usize;
                for slot in stack.iter_mut().take(pixel_count) {
                    if raw_encoding {
                        *slot = streams.raw_pixel.bits(8)?;
                    } else {
                        *slot = last_pixel;
                        loop {
                            let displacement = streams.pixel_codes.bits(4)?;
                            *slot = slot.saturating_add(displacement);
                            if displacement != 15 {
                                break;
                            }
                        }
                    }
                    if *slot == last_pixel {
                        *slot = 0;
                        break;
                    }
                    last_pixel = *slot;
                    decoded += 1;
                }

                let old_value = previous.map(|i| buffer[i].value).unwrap_or([0; 4]);
                let entry = buffer.get_mut(next_entry).ok_or_else(|| {
                    FormatError::Corrupt("pixel buffer overflow".into())
                })?;
                let mut cursor = decoded;
                for (i, value) in entry.value.iter_mut().enumerate() {
                    if pixel_mask & (1 << i) != 0 {
                        *value = if cursor > 0 {
                            cursor -= 1;
                            (stack[cursor] & 0xFF) as u8
                        } else {
                            0
                        };
                    } else {
                        *value = old_value[i];
                    }
                }
                entry.frame = frame_index as isize;
                entry.frame_cell = (cell_x + cell_y * layout.h_cells) as isize;
                cell_buffer[current] = Some(next_entry);
                next_entry += 1;
            }
        }
    }

    for entry in buffer.iter_mut().take(next_entry) {
        for value in entry.value.iter_mut() {
            *value = palette_entries[*value as usize];
        }
    }

    Ok(buffer)
}

fn generate_frames(
    layouts: &[FrameLayout],
    bounds: &Rect,
    dir_h_cells: usize,
    dir_cell_count: usize,
    pixel_buffer: &[PixelBufferEntry],
    pixel_codes: &mut BitReader<'_>,
) -> Result<Vec<DccFrame>, FormatError> {
    let box_w = bounds.width as usize;
    let box_h = bounds.height as usize;
    let at = |x: usize, y: usize| x + y * box_w;

    let mut last_cells: Vec<Option<LastCell>> = vec![None; dir_cell_count];
    let mut canvas = vec![0u8; box_w * box_h];
    let mut frames = Vec::with_capacity(layouts.len());
    let mut entry_index = 0usize;

    for (frame_index, layout) in layouts.iter().enumerate() {
        let mut pixels = vec![0u8; box_w * box_h];

        for (cell_index, cell) in layout.cells.iter().enumerate() {
            if cell.x + cell.width > box_w || cell.y + cell.height > box_h {
                return Err(FormatError::Corrupt(format!(
                    "frame {frame_index} cell exceeds direction bounds"
                )));
            }
            let grid_index = cell.x / CELL_SIZE as usize + (cell.y / CELL_SIZE as usize) * dir_h_cells;
            let last = last_cells.get(grid_index).copied().ok_or_else(|| {
                FormatError::Corrupt(format!("frame {frame_index} cell outside direction grid"))
            })?;

            let entry = pixel_buffer
                .get(entry_index)
                .filter(|e| e.frame == frame_index as isize && e.frame_cell == cell_index as isize);

            match entry {
                None => match last {
                    Some(prev) if prev.width == cell.width && prev.height == cell.height => {
                        for fy in 0..cell.height {
                            for fx in 0..cell.width {
                                let value = canvas[at(prev.x + fx, prev.y + fy)];
                                canvas[at(cell.x + fx, cell.y + fy)] = value;
                                pixels[at(cell.x + fx, cell.y + fy)] = value;
                            }
                        }
                    }
                    _ => {
                        for fy in 0..cell.height {
                            for fx in 0..cell.width {
                                canvas[at(cell.x + fx, cell.y + fy)] = 0;
                            }
                        }
                    }
                },
                Some(entry) => {
                    if entry.value[0] == entry.value[1] {
                        for fy in 0..cell.height {
                            for fx in 0..cell.width {
                                canvas[at(cell.x + fx, cell.y + fy)] = entry.value[0];
                            }
                        }
                    } else {
                        let width = if entry.value[1] == entry.value[2] { 1 } else { 2 };
                        for fy in 0..cell.height {
                            for fx in 0..cell.width {
                                let slot = pixel_codes.bits(width)? as usize;
                                canvas[at(cell.x + fx, cell.y + fy)] = entry.value[slot];
                            }
                        }
                    }
                    for fy in 0..cell.height {
                        for fx in 0..cell.width {
                            pixels[at(cell.x + fx, cell.y + fy)] =
                                canvas[at(cell.x + fx, cell.y + fy)];
                        }
                    }
                    entry_index += 1;
                }
            }

            last_cells[grid_index] = Some(LastCell {
                width: cell.width,
                height: cell.height,
                x: cell.x,
                y: cell.y,
            });
        }

        frames.push(DccFrame::new(
            layout.bounds,
            box_w as u32,
            box_h as u32,
            pixels,
        ));
    }

    Ok(frames)
}
