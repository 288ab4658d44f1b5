//! Retained-mode scene graph.
//!
//! Every visual or interactive element is a [`Node`] in a [`SceneTree`].
//! The tree owns all nodes in an arena keyed by [`NodeId`]; parents own
//! their children through an ordered child list and children point back
//! with a non-owning parent id.
//!
//! Each frame the engine runs [`SceneTree::update`] then
//! [`SceneTree::render`]. Update composes textures that became stale,
//! hit-tests sprites against the cursor and sweeps nodes flagged for
//! removal. Render walks the active, visible part of the tree and fills a
//! [`DrawList`](crate::render::DrawList).
//!
//! - [`node`] – the node record and its kind variants
//! - [`tree`] – arena, ownership operations, update and render passes
//! - [`sequence`] – format-agnostic access to decoded animation frames
//! - [`compose`] – frame grid composition into one indexed image
//! - [`sprite`] – palette-indexed animated sprite with pointer callbacks
//! - [`label`] – bitmap-font text

pub mod compose;
pub mod label;
pub mod node;
pub mod sequence;
pub mod sprite;
pub mod tree;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::formats::FormatError;
use crate::render::{DrawList, RenderError, TextureBackend, TextureId};
use crate::resources::cursor::CursorState;
use crate::resources::loader::LoaderError;
use crate::events::pointer::PointerEvent;

pub use label::Label;
pub use node::{Node, NodeKind, NodePin};
pub use sequence::{SequenceProvider, Sequences};
pub use sprite::{PointerTracker, Sprite};
pub use tree::SceneTree;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity. Ids increase with creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuilds an id received from a script.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A texture composed from indexed pixels, with its size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposedTexture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Structural errors on the node tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {child} already has a parent ({parent})")]
    AlreadyParented { child: NodeId, parent: NodeId },
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("adding {child} under {parent} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
    #[error("the root node cannot be destroyed")]
    RootNode,
    #[error("node {0} is not a {1}")]
    WrongKind(NodeId, &'static str),
}

/// Errors constructing or mutating sprites and labels.
#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("unsupported sprite format: {0:?}")]
    UnsupportedFormat(String),
    #[error("palette {0:?} is not loaded")]
    UnknownPalette(String),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("invalid sprite data: {0}")]
    Format(#[from] FormatError),
    #[error("sequence index out of bounds: {index} (sequence count {count})")]
    SequenceOutOfRange { index: usize, count: usize },
    #[error("frame index out of bounds: {index} (frame count {count})")]
    FrameOutOfRange { index: usize, count: usize },
    #[error("cell size must be at least 1x1, got {0}x{1}")]
    InvalidCellSize(usize, usize),
    #[error("cell grid {x}x{y} exceeds the sequence's {frames} frames")]
    CellGridTooLarge { x: usize, y: usize, frames: usize },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Per-frame inputs and outputs of the update pass.
pub struct UpdateContext<'a> {
    pub backend: &'a mut dyn TextureBackend,
    pub cursor: CursorState,
    /// Pointer events produced during this pass, in traversal order.
    pub events: Vec<PointerEvent>,
    /// Texture failures are logged and collected rather than aborting the pass.
    pub errors: Vec<(NodeId, RenderError)>,
}

impl<'a> UpdateContext<'a> {
    pub fn new(backend: &'a mut dyn TextureBackend, cursor: CursorState) -> Self {
        Self {
            backend,
            cursor,
            events: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Inputs and outputs of the render pass.
pub struct RenderContext<'a> {
    pub backend: &'a mut dyn TextureBackend,
    pub draw_list: &'a mut DrawList,
    pub errors: Vec<RenderError>,
}

impl<'a> RenderContext<'a> {
    pub fn new(backend: &'a mut dyn TextureBackend, draw_list: &'a mut DrawList) -> Self {
        Self {
            backend,
            draw_list,
            errors: Vec::new(),
        }
    }
}
