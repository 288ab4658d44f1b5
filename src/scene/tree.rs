//! Node arena and the per-frame passes.
//!
//! # Removal
//!
//! Removal is two-phase. [`SceneTree::destroy`] only flags the node, turns
//! it inactive and retires its texture and callbacks. The parent's next
//! update sweeps flagged children after its own children were updated,
//! clearing their parent link. A swept (or destroyed detached) node is
//! dropped from the arena, subtree included, at the start of the
//! following update, which is also when retired textures are released.
//!
//! Nodes detached without being destroyed stay while something can still
//! reach them: a [`NodePin`] on the node or on one of its descendants.
//! Unpinned detached subtrees are dropped by the same purge.
//!
//! # Traversal
//!
//! Update skips inactive subtrees. Render skips subtrees that are inactive
//! or invisible. World positions are the sum of offsets along the parent
//! chain and are never cached.

use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::events::pointer::{CallbackId, PointerEventKind};
use crate::render::{TextureBackend, TextureId};
use crate::resources::palette::PaletteRegistry;

use super::node::{Node, NodeKind, NodePin};
use super::{Label, NodeId, RenderContext, SceneError, Sprite, SpriteError, UpdateContext};

#[derive(Debug)]
pub struct SceneTree {
    nodes: FxHashMap<NodeId, Node>,
    root: NodeId,
    /// Textures given up outside the update pass, released at the next update.
    retired: Vec<TextureId>,
    /// Script callbacks no longer referenced by any node.
    released_callbacks: Vec<CallbackId>,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    pub fn new() -> Self {
        let root = Node::new(NodeKind::Plain);
        let root_id = root.id();
        let mut nodes = FxHashMap::default();
        nodes.insert(root_id, root);
        Self {
            nodes,
            root: root_id,
            retired: Vec::new(),
            released_callbacks: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Adds a detached node of the given kind.
    pub fn insert(&mut self, kind: impl Into<NodeKind>) -> NodeId {
        let node = Node::new(kind.into());
        let id = node.id();
        trace!("created {} node {}", node.kind.name(), id);
        self.nodes.insert(id, node);
        id
    }

    /// Adds a detached plain node.
    pub fn create_node(&mut self) -> NodeId {
        self.insert(NodeKind::Plain)
    }

    /// Holds `id` in the arena while it is detached. See [`NodePin`].
    pub fn pin(&self, id: NodeId) -> Result<NodePin, SceneError> {
        self.get(id).map(Node::pin)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn sprite(&self, id: NodeId) -> Result<&Sprite, SceneError> {
        self.get(id)?
            .sprite()
            .ok_or(SceneError::WrongKind(id, "sprite"))
    }

    pub fn sprite_mut(&mut self, id: NodeId) -> Result<&mut Sprite, SceneError> {
        self.get_mut(id)?
            .sprite_mut()
            .ok_or(SceneError::WrongKind(id, "sprite"))
    }

    pub fn label(&self, id: NodeId) -> Result<&Label, SceneError> {
        self.get(id)?.label().ok_or(SceneError::WrongKind(id, "label"))
    }

    pub fn label_mut(&mut self, id: NodeId) -> Result<&mut Label, SceneError> {
        self.get_mut(id)?
            .label_mut()
            .ok_or(SceneError::WrongKind(id, "label"))
    }

    /// Appends `child` to `parent`'s children.
    ///
    /// Fails if the child already has a parent; it must be removed first.
    /// Attaching a node below itself or its own descendant is refused too.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.get(parent)?;
        let child_node = self.get(child)?;
        if let Some(current) = child_node.parent {
            return Err(SceneError::AlreadyParented {
                child,
                parent: current,
            });
        }
        if child == self.root || self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::WouldCycle { parent, child });
        }

        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        trace!("added node {} to {}", child, parent);
        Ok(())
    }

    /// Detaches `child` from `parent`, keeping it in the arena.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let parent_node = self.get_mut(parent)?;
        let Some(index) = parent_node.children.iter().position(|c| *c == child) else {
            return Err(SceneError::NotAChild { parent, child });
        };
        parent_node.children.remove(index);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        trace!("removed node {} from {}", child, parent);
        Ok(())
    }

    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<(), SceneError> {
        let children = std::mem::take(&mut self.get_mut(parent)?.children);
        for child in children {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = None;
            }
        }
        Ok(())
    }

    /// Searches the direct children of `parent` first, then each child's
    /// subtree depth-first.
    pub fn find_child(&self, parent: NodeId, target: NodeId) -> Option<NodeId> {
        let node = self.nodes.get(&parent)?;
        if node.children.contains(&target) {
            return Some(target);
        }
        node.children
            .iter()
            .find_map(|child| self.find_child(*child, target))
    }

    /// World position: the sum of local offsets up the parent chain.
    pub fn position(&self, id: NodeId) -> Result<(i32, i32), SceneError> {
        let mut node = self.get(id)?;
        let (mut x, mut y) = (node.x, node.y);
        while let Some(parent) = node.parent {
            node = self.get(parent)?;
            x += node.x;
            y += node.y;
        }
        Ok((x, y))
    }

    /// Flags a node for removal and deactivates it. Its texture is released
    /// at the next update and its callbacks are handed back through
    /// [`SceneTree::drain_released_callbacks`].
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        if id == self.root {
            return Err(SceneError::RootNode);
        }
        let node = self.get_mut(id)?;
        node.should_remove = true;
        node.active = false;
        let (texture, callbacks) = match &mut node.kind {
            NodeKind::Plain => (None, Vec::new()),
            NodeKind::Sprite(sprite) => sprite.teardown(),
            NodeKind::Label(label) => (label.teardown(), Vec::new()),
        };
        self.retired.extend(texture);
        self.released_callbacks.extend(callbacks);
        debug!("node {} marked for removal", id);
        Ok(())
    }

    /// True when the node was destroyed or no longer exists.
    pub fn is_pending_removal(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_none_or(|n| n.should_remove)
    }

    /// Changes a sprite's cell grid, retiring its current texture.
    pub fn set_cell_size(&mut self, id: NodeId, x: usize, y: usize) -> Result<(), SpriteError> {
        let released = self.sprite_mut(id)?.set_cell_size(x, y)?;
        self.retired.extend(released);
        Ok(())
    }

    /// Sets or clears a sprite pointer handler. A replaced callback is
    /// handed back through [`SceneTree::drain_released_callbacks`].
    pub fn set_handler(
        &mut self,
        id: NodeId,
        kind: PointerEventKind,
        callback: Option<CallbackId>,
    ) -> Result<(), SceneError> {
        let node = self.get_mut(id)?;
        let pending = node.should_remove;
        let sprite = node
            .sprite_mut()
            .ok_or(SceneError::WrongKind(id, "sprite"))?;
        // Destroyed sprites never fire again.
        let released = if pending {
            callback
        } else {
            sprite.set_handler(kind, callback)
        };
        self.released_callbacks.extend(released);
        Ok(())
    }

    pub fn drain_released_callbacks(&mut self) -> Vec<CallbackId> {
        std::mem::take(&mut self.released_callbacks)
    }

    /// Runs one update pass from the root.
    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        self.purge();
        for texture in self.retired.drain(..) {
            ctx.backend.release_texture(texture);
        }
        self.update_subtree(self.root, 0, 0, ctx);
    }

    fn update_subtree(&mut self, id: NodeId, origin_x: i32, origin_y: i32, ctx: &mut UpdateContext<'_>) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if !node.active {
            return;
        }
        let (x, y) = (origin_x + node.x, origin_y + node.y);
        match &mut node.kind {
            NodeKind::Plain => {}
            NodeKind::Sprite(sprite) => sprite.update(id, x, y, ctx),
            NodeKind::Label(label) => label.update(id, ctx),
        }

        let children = node.children.clone();
        for child in &children {
            if self.nodes.get(child).is_some_and(|c| c.active) {
                self.update_subtree(*child, x, y, ctx);
            }
        }
        self.sweep(id);
    }

    /// Detaches every flagged direct child of `id`.
    fn sweep(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let flagged: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|c| self.nodes.get(c).is_some_and(|n| n.should_remove))
            .collect();
        if flagged.is_empty() {
            return;
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children.retain(|c| !flagged.contains(c));
        }
        for child in flagged {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = None;
            }
            trace!("swept node {} from {}", child, id);
        }
    }

    /// Drops every node that is neither under the root nor under the top of
    /// a detached subtree holding a live pin. Destroyed subtrees go once
    /// detached, pinned or not.
    fn purge(&mut self) {
        let detached = self
            .nodes
            .values()
            .any(|n| n.parent.is_none() && n.id() != self.root);
        if !detached {
            return;
        }

        let mut stack = vec![self.root];
        for node in self.nodes.values() {
            if node.is_pinned() && !node.should_remove {
                let top = self.top_ancestor(node.id());
                if self.nodes.get(&top).is_some_and(|n| !n.should_remove) {
                    stack.push(top);
                }
            }
        }
        let mut reachable = FxHashSet::default();
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().copied());
            }
        }

        let unreachable: Vec<NodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|id| !reachable.contains(id))
            .collect();
        for id in unreachable {
            self.drop_node(id);
        }
    }

    fn drop_node(&mut self, id: NodeId) {
        let Some(mut node) = self.nodes.remove(&id) else {
            return;
        };
        match &mut node.kind {
            NodeKind::Plain => {}
            NodeKind::Sprite(sprite) => {
                let (texture, callbacks) = sprite.teardown();
                self.retired.extend(texture);
                self.released_callbacks.extend(callbacks);
            }
            NodeKind::Label(label) => self.retired.extend(label.teardown()),
        }
        trace!("dropped node {}", id);
    }

    /// Walks the active, visible tree and queues draw commands.
    pub fn render(&self, palettes: &mut PaletteRegistry, ctx: &mut RenderContext<'_>) {
        self.render_subtree(self.root, 0, 0, palettes, ctx);
    }

    fn render_subtree(
        &self,
        id: NodeId,
        origin_x: i32,
        origin_y: i32,
        palettes: &mut PaletteRegistry,
        ctx: &mut RenderContext<'_>,
    ) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.active || !node.visible {
            return;
        }
        let (x, y) = (origin_x + node.x, origin_y + node.y);
        match &node.kind {
            NodeKind::Plain => {}
            NodeKind::Sprite(sprite) => sprite.render(x, y, palettes, ctx),
            NodeKind::Label(label) => label.render(x, y, palettes, ctx),
        }
        for child in &node.children {
            self.render_subtree(*child, x, y, palettes, ctx);
        }
    }

    /// Releases every texture held by the tree. Called once at shutdown.
    pub fn release_all(&mut self, backend: &mut dyn TextureBackend) {
        for texture in self.retired.drain(..) {
            backend.release_texture(texture);
        }
        for node in self.nodes.values_mut() {
            let texture = match &mut node.kind {
                NodeKind::Plain => None,
                NodeKind::Sprite(sprite) => sprite.teardown().0,
                NodeKind::Label(label) => label.teardown(),
            };
            if let Some(texture) = texture {
                backend.release_texture(texture);
            }
        }
    }

    fn top_ancestor(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) {
            id = parent;
        }
        id
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(&id).and_then(|n| n.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::dc6::{Dc6Direction, Dc6Frame};
    use crate::render::{DrawList, RecordingBackend};
    use crate::resources::cursor::CursorState;
    use crate::scene::sequence::{Dc6Sequences, Sequences};

    fn palettes() -> PaletteRegistry {
        let mut palettes = PaletteRegistry::new();
        palettes.insert_colors("act1", &[[0; 3]; 256]);
        palettes
    }

    fn sprite(palettes: &PaletteRegistry) -> Sprite {
        let sequences = Sequences::Dc6(Dc6Sequences::new(vec![Dc6Direction {
            frames: vec![Dc6Frame {
                width: 4,
                height: 4,
                pixels: vec![1; 16],
                ..Default::default()
            }],
        }]));
        Sprite::new(sequences, "act1", palettes).unwrap()
    }

    fn update(tree: &mut SceneTree, backend: &mut RecordingBackend) {
        let mut ctx = UpdateContext::new(backend, CursorState::default());
        tree.update(&mut ctx);
    }

    #[test]
    fn test_add_child_requires_detached_child() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.add_child(root, a).unwrap();
        assert_eq!(
            tree.add_child(b, a),
            Err(SceneError::AlreadyParented { child: a, parent: root })
        );
        assert_eq!(tree.get(root).unwrap().children(), &[a]);
        assert_eq!(tree.get(a).unwrap().parent(), Some(root));
    }

    #[test]
    fn test_add_child_refuses_cycles() {
        let mut tree = SceneTree::new();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.add_child(a, b).unwrap();
        assert_eq!(tree.add_child(b, a), Err(SceneError::WouldCycle { parent: b, child: a }));
        assert_eq!(tree.add_child(a, a), Err(SceneError::WouldCycle { parent: a, child: a }));
        let root = tree.root();
        assert_eq!(tree.add_child(a, root), Err(SceneError::WouldCycle { parent: a, child: root }));
    }

    #[test]
    fn test_remove_child_and_reparent() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.add_child(root, a).unwrap();
        assert_eq!(tree.remove_child(b, a), Err(SceneError::NotAChild { parent: b, child: a }));
        tree.remove_child(root, a).unwrap();
        assert_eq!(tree.get(a).unwrap().parent(), None);
        tree.add_child(b, a).unwrap();
        assert_eq!(tree.get(a).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_remove_all_children_clears_links() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let kids: Vec<_> = (0..3).map(|_| tree.create_node()).collect();
        for kid in &kids {
            tree.add_child(root, *kid).unwrap();
        }
        tree.remove_all_children(root).unwrap();
        assert!(tree.get(root).unwrap().children().is_empty());
        assert!(kids.iter().all(|k| tree.get(*k).unwrap().parent().is_none()));
    }

    #[test]
    fn test_find_child_prefers_direct_then_deep() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.create_node();
        let b = tree.create_node();
        let c = tree.create_node();
        tree.add_child(root, a).unwrap();
        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();
        assert_eq!(tree.find_child(root, a), Some(a));
        assert_eq!(tree.find_child(root, c), Some(c));
        assert_eq!(tree.find_child(b, a), None);
    }

    #[test]
    fn test_position_sums_chain() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.create_node();
        let b = tree.create_node();
        tree.add_child(root, a).unwrap();
        tree.add_child(a, b).unwrap();
        tree.get_mut(root).unwrap().set_local_position(1, 2);
        tree.get_mut(a).unwrap().set_local_position(10, 20);
        tree.get_mut(b).unwrap().set_local_position(100, 200);
        assert_eq!(tree.position(b), Ok((111, 222)));
        tree.get_mut(a).unwrap().x = 0;
        assert_eq!(tree.position(b), Ok((101, 222)));
    }

    #[test]
    fn test_destroyed_child_swept_once_siblings_keep_order() {
        let mut tree = SceneTree::new();
        let mut backend = RecordingBackend::new();
        let root = tree.root();
        let kids: Vec<_> = (0..3).map(|_| tree.create_node()).collect();
        for kid in &kids {
            tree.add_child(root, *kid).unwrap();
        }
        tree.destroy(kids[1]).unwrap();
        assert!(tree.is_pending_removal(kids[1]));
        assert_eq!(tree.get(root).unwrap().children().len(), 3);

        update(&mut tree, &mut backend);
        assert_eq!(tree.get(root).unwrap().children(), &[kids[0], kids[2]]);
        assert_eq!(tree.get(kids[1]).unwrap().parent(), None);

        update(&mut tree, &mut backend);
        assert!(!tree.contains(kids[1]));
        assert!(tree.is_pending_removal(kids[1]));
    }

    #[test]
    fn test_unreachable_nodes_are_purged_unless_pinned() {
        let palettes = palettes();
        let mut tree = SceneTree::new();
        let mut backend = RecordingBackend::new();
        let root = tree.root();
        let attached = tree.create_node();
        let held = tree.create_node();
        let held_child = tree.create_node();
        let loose = tree.insert(sprite(&palettes));
        let loose_child = tree.create_node();
        tree.add_child(root, attached).unwrap();
        tree.add_child(held, held_child).unwrap();
        tree.add_child(root, loose).unwrap();
        tree.add_child(loose, loose_child).unwrap();
        tree.set_handler(loose, PointerEventKind::MouseOver, Some(CallbackId(9))).unwrap();
        // A pin on a descendant keeps its detached ancestors too.
        let pin = tree.pin(held_child).unwrap();
        assert!(tree.get(held_child).unwrap().is_pinned());
        assert!(!tree.get(held).unwrap().is_pinned());
        update(&mut tree, &mut backend);
        let texture = tree.sprite(loose).unwrap().texture().unwrap().id;

        tree.remove_child(root, loose).unwrap();
        update(&mut tree, &mut backend);
        assert!(tree.contains(attached) && tree.contains(held) && tree.contains(held_child));
        assert!(!tree.contains(loose) && !tree.contains(loose_child));
        assert_eq!(tree.drain_released_callbacks(), vec![CallbackId(9)]);
        assert_eq!(backend.released, vec![texture]);

        drop(pin);
        update(&mut tree, &mut backend);
        assert!(!tree.contains(held) && !tree.contains(held_child));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_pinned_destroyed_node_is_still_dropped() {
        let mut tree = SceneTree::new();
        let mut backend = RecordingBackend::new();
        let node = tree.create_node();
        let _pin = tree.pin(node).unwrap();
        update(&mut tree, &mut backend);
        assert!(tree.contains(node));

        tree.destroy(node).unwrap();
        update(&mut tree, &mut backend);
        assert!(!tree.contains(node));
        assert!(tree.pin(node).is_err());
    }

    #[test]
    fn test_destroy_root_is_refused() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        assert_eq!(tree.destroy(root), Err(SceneError::RootNode));
    }

    #[test]
    fn test_inactive_subtree_not_updated() {
        let palettes = palettes();
        let mut tree = SceneTree::new();
        let mut backend = RecordingBackend::new();
        let group = tree.create_node();
        let s = tree.insert(sprite(&palettes));
        tree.add_child(tree.root(), group).unwrap();
        tree.add_child(group, s).unwrap();
        tree.get_mut(group).unwrap().active = false;

        update(&mut tree, &mut backend);
        assert!(!tree.sprite(s).unwrap().is_initialized());

        tree.get_mut(group).unwrap().active = true;
        update(&mut tree, &mut backend);
        assert!(tree.sprite(s).unwrap().is_initialized());
    }

    #[test]
    fn test_render_skips_invisible_and_offsets_children() {
        let mut palettes = palettes();
        let mut tree = SceneTree::new();
        let mut backend = RecordingBackend::new();
        let group = tree.create_node();
        let a = tree.insert(sprite(&palettes));
        let b = tree.insert(sprite(&palettes));
        tree.add_child(tree.root(), group).unwrap();
        tree.add_child(group, a).unwrap();
        tree.add_child(tree.root(), b).unwrap();
        tree.get_mut(group).unwrap().set_local_position(5, 6);
        tree.get_mut(a).unwrap().set_local_position(1, 1);
        tree.get_mut(b).unwrap().visible = false;
        update(&mut tree, &mut backend);

        let mut draw_list = DrawList::new();
        let mut ctx = RenderContext::new(&mut backend, &mut draw_list);
        tree.render(&mut palettes, &mut ctx);
        assert!(ctx.errors.is_empty());
        assert_eq!(draw_list.len(), 1);
        assert_eq!((draw_list.commands()[0].x, draw_list.commands()[0].y), (6, 7));
    }

    #[test]
    fn test_destroyed_sprite_texture_released_next_update() {
        let palettes = palettes();
        let mut tree = SceneTree::new();
        let mut backend = RecordingBackend::new();
        let s = tree.insert(sprite(&palettes));
        tree.add_child(tree.root(), s).unwrap();
        tree.set_handler(s, PointerEventKind::ButtonUp, Some(CallbackId(3))).unwrap();
        update(&mut tree, &mut backend);
        let texture = tree.sprite(s).unwrap().texture().unwrap().id;

        tree.destroy(s).unwrap();
        assert_eq!(tree.drain_released_callbacks(), vec![CallbackId(3)]);
        assert!(backend.released.is_empty());
        update(&mut tree, &mut backend);
        assert_eq!(backend.released, vec![texture]);
    }

    #[test]
    fn test_set_cell_size_retires_texture() {
        let palettes = palettes();
        let mut tree = SceneTree::new();
        let mut backend = RecordingBackend::new();
        let s = tree.insert(sprite(&palettes));
        tree.add_child(tree.root(), s).unwrap();
        update(&mut tree, &mut backend);
        let texture = tree.sprite(s).unwrap().texture().unwrap().id;

        tree.set_cell_size(s, 1, 1).unwrap();
        assert!(tree.sprite(s).unwrap().texture().is_none());
        update(&mut tree, &mut backend);
        assert_eq!(backend.released, vec![texture]);
        assert_eq!(backend.indexed_uploads, 2);
    }

    #[test]
    fn test_wrong_kind_is_reported() {
        let mut tree = SceneTree::new();
        let plain = tree.create_node();
        assert!(matches!(tree.sprite(plain), Err(SceneError::WrongKind(id, "sprite")) if id == plain));
        assert!(matches!(
            tree.set_cell_size(plain, 2, 2),
            Err(SpriteError::Scene(SceneError::WrongKind(_, _)))
        ));
    }
}
