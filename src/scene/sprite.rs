//! Palette-indexed animated sprite.
//!
//! A sprite owns its decoded [`Sequences`], the current sequence/frame and
//! cell-size selection, and one composed texture. Any selection change
//! marks the sprite uninitialized; the next update recomposes the texture
//! from the frame grid and uploads it, releasing the previous one.
//!
//! Pointer interaction is only evaluated when at least one handler is
//! registered. The press/hover state machine lives in [`PointerTracker`].

use log::warn;

use crate::events::pointer::{CallbackId, PointerEvent, PointerEventKind};
use crate::render::{DrawCmd, TextureId};
use crate::resources::loader::Loader;
use crate::resources::palette::PaletteRegistry;

use super::compose::compose_cells;
use super::sequence::{SequenceProvider, Sequences};
use super::{ComposedTexture, NodeId, RenderContext, SpriteError, UpdateContext};

/// Edge-triggered press and hover tracking for one sprite.
///
/// `can_press` is cleared when the button goes down outside the sprite so
/// that dragging into the sprite with the button held never counts as a
/// press. It is restored on release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerTracker {
    pressed: bool,
    mouse_over: bool,
    can_press: bool,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            pressed: false,
            mouse_over: false,
            can_press: true,
        }
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_mouse_over(&self) -> bool {
        self.mouse_over
    }

    pub fn can_press(&self) -> bool {
        self.can_press
    }

    /// Advances the machine by one frame and returns the edges crossed, in
    /// the order press/release first, then hover.
    pub fn step(&mut self, over: bool, button_down: bool) -> Vec<PointerEventKind> {
        let mut edges = Vec::new();
        if button_down {
            if !self.pressed {
                if self.can_press && over {
                    self.pressed = true;
                    edges.push(PointerEventKind::ButtonDown);
                } else {
                    self.can_press = false;
                }
            }
        } else {
            if self.pressed {
                self.pressed = false;
                if over {
                    edges.push(PointerEventKind::ButtonUp);
                }
            }
            self.can_press = true;
        }

        if over && !self.mouse_over {
            self.mouse_over = true;
            edges.push(PointerEventKind::MouseOver);
        } else if !over && self.mouse_over {
            self.mouse_over = false;
            edges.push(PointerEventKind::MouseLeave);
        }
        edges
    }
}

/// Script callbacks, one slot per pointer event kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerHandlers {
    pub button_down: Option<CallbackId>,
    pub button_up: Option<CallbackId>,
    pub mouse_over: Option<CallbackId>,
    pub mouse_leave: Option<CallbackId>,
}

impl PointerHandlers {
    pub fn get(&self, kind: PointerEventKind) -> Option<CallbackId> {
        match kind {
            PointerEventKind::ButtonDown => self.button_down,
            PointerEventKind::ButtonUp => self.button_up,
            PointerEventKind::MouseOver => self.mouse_over,
            PointerEventKind::MouseLeave => self.mouse_leave,
        }
    }

    /// Replaces a slot, returning the previous callback.
    pub fn set(&mut self, kind: PointerEventKind, callback: Option<CallbackId>) -> Option<CallbackId> {
        let slot = match kind {
            PointerEventKind::ButtonDown => &mut self.button_down,
            PointerEventKind::ButtonUp => &mut self.button_up,
            PointerEventKind::MouseOver => &mut self.mouse_over,
            PointerEventKind::MouseLeave => &mut self.mouse_leave,
        };
        std::mem::replace(slot, callback)
    }

    pub fn any(&self) -> bool {
        PointerEventKind::ALL.iter().any(|k| self.get(*k).is_some())
    }

    pub fn ids(&self) -> impl Iterator<Item = CallbackId> + '_ {
        PointerEventKind::ALL.iter().filter_map(move |k| self.get(*k))
    }
}

#[derive(Debug)]
pub struct Sprite {
    sequences: Sequences,
    palette: String,
    sequence: usize,
    frame: usize,
    cell_size: (usize, usize),
    initialized: bool,
    texture: Option<ComposedTexture>,
    handlers: PointerHandlers,
    tracker: PointerTracker,
}

impl Sprite {
    /// Wraps decoded sequences. Fails if `palette` is not registered.
    pub fn new(
        sequences: Sequences,
        palette: &str,
        palettes: &PaletteRegistry,
    ) -> Result<Self, SpriteError> {
        if !palettes.contains(palette) {
            return Err(SpriteError::UnknownPalette(palette.to_string()));
        }
        Ok(Self {
            sequences,
            palette: palette.to_string(),
            sequence: 0,
            frame: 0,
            cell_size: (1, 1),
            initialized: false,
            texture: None,
            handlers: PointerHandlers::default(),
            tracker: PointerTracker::new(),
        })
    }

    /// Loads a DC6 or DCC file through the loader.
    pub fn load(
        loader: &Loader,
        path: &str,
        palette: &str,
        palettes: &PaletteRegistry,
    ) -> Result<Self, SpriteError> {
        if !palettes.contains(palette) {
            return Err(SpriteError::UnknownPalette(palette.to_string()));
        }
        let sequences = Sequences::load(loader, path)?;
        Self::new(sequences, palette, palettes)
    }

    pub fn palette(&self) -> &str {
        &self.palette
    }

    pub fn sequences(&self) -> &Sequences {
        &self.sequences
    }

    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn cell_size(&self) -> (usize, usize) {
        self.cell_size
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.sequence_count()
    }

    /// Frames in the current sequence.
    pub fn frame_count(&self) -> usize {
        self.sequences.frame_count(self.sequence)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn texture(&self) -> Option<ComposedTexture> {
        self.texture
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    pub fn handlers(&self) -> &PointerHandlers {
        &self.handlers
    }

    /// Selects a sequence and rewinds to its first frame.
    pub fn set_sequence(&mut self, index: usize) -> Result<(), SpriteError> {
        let count = self.sequence_count();
        if index >= count {
            return Err(SpriteError::SequenceOutOfRange { index, count });
        }
        self.sequence = index;
        self.frame = 0;
        self.initialized = false;
        Ok(())
    }

    pub fn set_frame(&mut self, index: usize) -> Result<(), SpriteError> {
        let count = self.frame_count();
        if index >= count {
            return Err(SpriteError::FrameOutOfRange { index, count });
        }
        self.frame = index;
        self.initialized = false;
        Ok(())
    }

    /// Changes the cell grid. The current texture is handed back to the
    /// caller so it can be released on the render thread.
    ///
    /// The grid may not hold more cells than the current sequence has frames.
    pub fn set_cell_size(&mut self, x: usize, y: usize) -> Result<Option<TextureId>, SpriteError> {
        if x == 0 || y == 0 {
            return Err(SpriteError::InvalidCellSize(x, y));
        }
        let frames = self.frame_count();
        if x.checked_mul(y).is_none_or(|cells| cells > frames) {
            return Err(SpriteError::CellGridTooLarge { x, y, frames });
        }
        self.cell_size = (x, y);
        self.initialized = false;
        Ok(self.texture.take().map(|t| t.id))
    }

    /// Registers or clears a handler, returning the one it replaced.
    pub fn set_handler(
        &mut self,
        kind: PointerEventKind,
        callback: Option<CallbackId>,
    ) -> Option<CallbackId> {
        self.handlers.set(kind, callback)
    }

    /// Gives up the texture and every handler. Used when the node is destroyed.
    pub(crate) fn teardown(&mut self) -> (Option<TextureId>, Vec<CallbackId>) {
        let handlers = self.handlers.ids().collect();
        self.handlers = PointerHandlers::default();
        self.initialized = false;
        (self.texture.take().map(|t| t.id), handlers)
    }

    /// Recomposes the texture if needed, then hit-tests the cursor against
    /// the sprite placed at world position `(x, y)`.
    pub(crate) fn update(&mut self, id: NodeId, x: i32, y: i32, ctx: &mut UpdateContext<'_>) {
        if !self.initialized {
            self.initialized = true;
            self.compose(id, ctx);
        }

        if !self.handlers.any() {
            return;
        }

        let (width, height) = self
            .texture
            .map_or((0, 0), |t| (t.width as i32, t.height as i32));
        let cursor = ctx.cursor;
        let over = cursor.x >= x && cursor.y >= y && cursor.x < x + width && cursor.y < y + height;

        for kind in self.tracker.step(over, cursor.button_down) {
            if let Some(callback) = self.handlers.get(kind) {
                ctx.events.push(PointerEvent {
                    node: id,
                    kind,
                    callback,
                });
            }
        }
    }

    fn compose(&mut self, id: NodeId, ctx: &mut UpdateContext<'_>) {
        if let Some(old) = self.texture.take() {
            ctx.backend.release_texture(old.id);
        }
        let (cell_x, cell_y) = self.cell_size;
        let image = compose_cells(&self.sequences, self.sequence, self.frame, cell_x, cell_y);
        if image.is_empty() {
            return;
        }
        match ctx.backend.create_indexed_texture(&image) {
            Ok(texture) => {
                self.texture = Some(ComposedTexture {
                    id: texture,
                    width: image.width,
                    height: image.height,
                });
            }
            Err(e) => {
                warn!("Sprite {} failed to upload its texture: {}", id, e);
                ctx.errors.push((id, e));
            }
        }
    }

    /// Queues the composed texture at world position `(x, y)`.
    pub(crate) fn render(
        &self,
        x: i32,
        y: i32,
        palettes: &mut PaletteRegistry,
        ctx: &mut RenderContext<'_>,
    ) {
        let Some(texture) = self.texture.filter(|_| self.initialized) else {
            return;
        };
        match palettes.texture(&self.palette, ctx.backend) {
            Ok(palette) => ctx.draw_list.push(DrawCmd {
                texture: texture.id,
                palette,
                x,
                y,
                width: texture.width,
                height: texture.height,
            }),
            Err(e) => ctx.errors.push(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::dc6::{Dc6Direction, Dc6Frame};
    use crate::render::RecordingBackend;
    use crate::resources::cursor::CursorState;
    use crate::scene::sequence::Dc6Sequences;

    fn frame(width: u32, height: u32, value: u8) -> Dc6Frame {
        Dc6Frame {
            width,
            height,
            pixels: vec![value; (width * height) as usize],
            ..Default::default()
        }
    }

    fn palettes() -> PaletteRegistry {
        let mut palettes = PaletteRegistry::new();
        palettes.insert_colors("act1", &[[0; 3]; 256]);
        palettes
    }

    fn sprite() -> Sprite {
        let sequences = Sequences::Dc6(Dc6Sequences::new(vec![
            Dc6Direction {
                frames: vec![frame(10, 10, 1), frame(4, 4, 2), frame(4, 4, 3)],
            },
            Dc6Direction {
                frames: vec![frame(2, 2, 9)],
            },
        ]));
        Sprite::new(sequences, "act1", &palettes()).unwrap()
    }

    #[test]
    fn test_unknown_palette_rejected() {
        let sequences = Sequences::Dc6(Dc6Sequences::default());
        let err = Sprite::new(sequences, "units", &palettes()).unwrap_err();
        assert!(matches!(err, SpriteError::UnknownPalette(p) if p == "units"));
    }

    #[test]
    fn test_setters_validate_and_invalidate() {
        let mut sprite = sprite();
        assert!(matches!(
            sprite.set_frame(3),
            Err(SpriteError::FrameOutOfRange { index: 3, count: 3 })
        ));
        sprite.set_frame(2).unwrap();
        assert_eq!(sprite.frame(), 2);

        sprite.set_sequence(1).unwrap();
        assert_eq!((sprite.sequence(), sprite.frame()), (1, 0));
        assert!(!sprite.is_initialized());
        assert!(matches!(
            sprite.set_sequence(2),
            Err(SpriteError::SequenceOutOfRange { index: 2, count: 2 })
        ));
        assert!(matches!(sprite.set_cell_size(0, 1), Err(SpriteError::InvalidCellSize(0, 1))));
        assert_eq!(sprite.cell_size(), (1, 1));
    }

    #[test]
    fn test_cell_grid_is_bounded_by_frame_count() {
        let mut sprite = sprite();
        sprite.set_cell_size(3, 1).unwrap();
        assert!(matches!(
            sprite.set_cell_size(2, 2),
            Err(SpriteError::CellGridTooLarge { x: 2, y: 2, frames: 3 })
        ));
        assert!(matches!(
            sprite.set_cell_size(1 << 62, 4),
            Err(SpriteError::CellGridTooLarge { .. })
        ));
        assert!(matches!(
            sprite.set_cell_size(usize::MAX, usize::MAX),
            Err(SpriteError::CellGridTooLarge { .. })
        ));
        assert_eq!(sprite.cell_size(), (3, 1));

        sprite.set_sequence(1).unwrap();
        assert!(sprite.set_cell_size(2, 1).is_err());
        sprite.set_cell_size(1, 1).unwrap();
    }

    #[test]
    fn test_update_composes_once_and_recomposes_after_change() {
        let mut sprite = sprite();
        let mut backend = RecordingBackend::new();
        let id = NodeId::next();
        {
            let mut ctx = UpdateContext::new(&mut backend, CursorState::default());
            sprite.update(id, 0, 0, &mut ctx);
            sprite.update(id, 0, 0, &mut ctx);
        }
        assert_eq!(backend.indexed_uploads, 1);
        let first = sprite.texture().unwrap();
        assert_eq!((first.width, first.height), (10, 10));

        sprite.set_frame(1).unwrap();
        {
            let mut ctx = UpdateContext::new(&mut backend, CursorState::default());
            sprite.update(id, 0, 0, &mut ctx);
        }
        assert_eq!(backend.indexed_uploads, 2);
        assert_eq!(backend.released, vec![first.id]);
        assert_eq!(backend.live_textures(), 1);
    }

    #[test]
    fn test_cell_size_hands_back_texture() {
        let mut sprite = sprite();
        let mut backend = RecordingBackend::new();
        let id = NodeId::next();
        sprite.update(id, 0, 0, &mut UpdateContext::new(&mut backend, CursorState::default()));
        let old = sprite.texture().unwrap().id;

        sprite.set_frame(1).unwrap();
        assert_eq!(sprite.set_cell_size(2, 1).unwrap(), Some(old));
        assert!(sprite.texture().is_none());

        sprite.update(id, 0, 0, &mut UpdateContext::new(&mut backend, CursorState::default()));
        let composed = sprite.texture().unwrap();
        assert_eq!((composed.width, composed.height), (8, 4));
        assert_eq!(backend.indexed(composed.id).unwrap().index_at(5, 0), 3);
    }

    #[test]
    fn test_hit_testing_skipped_without_handlers() {
        let mut sprite = sprite();
        let mut backend = RecordingBackend::new();
        let mut ctx = UpdateContext::new(&mut backend, CursorState::new(5, 5, true));
        sprite.update(NodeId::next(), 0, 0, &mut ctx);
        assert!(ctx.events.is_empty());
        assert_eq!(sprite.tracker(), &PointerTracker::new());
    }

    #[test]
    fn test_only_registered_handlers_emit() {
        let mut sprite = sprite();
        sprite.set_handler(PointerEventKind::MouseOver, Some(CallbackId(7)));
        let mut backend = RecordingBackend::new();
        let id = NodeId::next();
        let mut ctx = UpdateContext::new(&mut backend, CursorState::new(5, 5, true));
        sprite.update(id, 0, 0, &mut ctx);
        assert_eq!(
            ctx.events,
            vec![PointerEvent {
                node: id,
                kind: PointerEventKind::MouseOver,
                callback: CallbackId(7),
            }]
        );
        assert!(sprite.tracker().is_pressed());
    }

    #[test]
    fn test_tracker_drag_in_is_not_a_press() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.step(false, true).is_empty());
        assert!(!tracker.can_press());
        assert_eq!(tracker.step(true, true), vec![PointerEventKind::MouseOver]);
        assert!(!tracker.is_pressed());
        assert!(tracker.step(true, false).is_empty());
        assert!(tracker.can_press());
        assert_eq!(tracker.step(true, true), vec![PointerEventKind::ButtonDown]);
    }

    #[test]
    fn test_tracker_release_outside_fires_nothing() {
        let mut tracker = PointerTracker::new();
        tracker.step(true, false);
        assert_eq!(tracker.step(true, true), vec![PointerEventKind::ButtonDown]);
        assert_eq!(tracker.step(false, true), vec![PointerEventKind::MouseLeave]);
        assert!(tracker.step(false, false).is_empty());
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn test_teardown_returns_texture_and_handlers() {
        let mut sprite = sprite();
        sprite.set_handler(PointerEventKind::ButtonUp, Some(CallbackId(1)));
        sprite.set_handler(PointerEventKind::MouseLeave, Some(CallbackId(2)));
        let mut backend = RecordingBackend::new();
        sprite.update(NodeId::next(), 0, 0, &mut UpdateContext::new(&mut backend, CursorState::default()));
        let texture = sprite.texture().map(|t| t.id);

        let (released, handlers) = sprite.teardown();
        assert_eq!(released, texture);
        assert_eq!(handlers, vec![CallbackId(1), CallbackId(2)]);
        assert!(!sprite.handlers().any());
    }
}
