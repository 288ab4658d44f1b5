//! The node record.
//!
//! Nodes are plain data; structural changes go through
//! [`SceneTree`](super::SceneTree) so the parent/child links stay
//! consistent. Behaviour differs per [`NodeKind`].

use std::rc::Rc;

use super::{Label, NodeId, Sprite};

#[derive(Debug, Default)]
pub enum NodeKind {
    /// Grouping node with no content of its own.
    #[default]
    Plain,
    Sprite(Box<Sprite>),
    Label(Box<Label>),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Plain => "node",
            NodeKind::Sprite(_) => "sprite",
            NodeKind::Label(_) => "label",
        }
    }
}

impl From<Sprite> for NodeKind {
    fn from(sprite: Sprite) -> Self {
        NodeKind::Sprite(Box::new(sprite))
    }
}

impl From<Label> for NodeKind {
    fn from(label: Label) -> Self {
        NodeKind::Label(Box::new(label))
    }
}

/// Keeps a detached node in the arena while it is held. Script handles
/// carry one, so a node removed from the tree survives until the script
/// lets go of it.
#[derive(Clone, Debug)]
pub struct NodePin(Rc<()>);

#[derive(Debug)]
pub struct Node {
    id: NodeId,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) should_remove: bool,
    /// Gates update and render for this node and its descendants.
    pub active: bool,
    /// Gates render only.
    pub visible: bool,
    /// Offset from the parent.
    pub x: i32,
    pub y: i32,
    pub kind: NodeKind,
    pins: Rc<()>,
}

impl Node {
    pub(super) fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            parent: None,
            children: Vec::new(),
            should_remove: false,
            active: true,
            visible: true,
            x: 0,
            y: 0,
            kind,
            pins: Rc::new(()),
        }
    }

    pub(super) fn pin(&self) -> NodePin {
        NodePin(Rc::clone(&self.pins))
    }

    /// True while any [`NodePin`] for this node is alive.
    pub fn is_pinned(&self) -> bool {
        Rc::strong_count(&self.pins) > 1
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Set once the node has been destroyed; it is swept by its parent's
    /// next update.
    pub fn should_remove(&self) -> bool {
        self.should_remove
    }

    pub fn local_position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_local_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        match &self.kind {
            NodeKind::Sprite(sprite) => Some(sprite),
            _ => None,
        }
    }

    pub fn sprite_mut(&mut self) -> Option<&mut Sprite> {
        match &mut self.kind {
            NodeKind::Sprite(sprite) => Some(sprite),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&Label> {
        match &self.kind {
            NodeKind::Label(label) => Some(label),
            _ => None,
        }
    }

    pub fn label_mut(&mut self) -> Option<&mut Label> {
        match &mut self.kind {
            NodeKind::Label(label) => Some(label),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_defaults() {
        let node = Node::new(NodeKind::Plain);
        assert!(node.active);
        assert!(node.visible);
        assert!(!node.should_remove());
        assert_eq!(node.parent(), None);
        assert!(node.children().is_empty());
        assert_eq!(node.local_position(), (0, 0));
        assert_eq!(node.kind.name(), "node");
    }

    #[test]
    fn test_ids_increase() {
        let a = Node::new(NodeKind::Plain);
        let b = Node::new(NodeKind::Plain);
        assert!(b.id() > a.id());
    }
}
