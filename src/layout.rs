//! Layout snapshot consumed by the event engine
//!
//! This module provides the geometry the router works with:
//! - Integer cell geometry (`Point`, `Size`, `Rect`)
//! - An arena of positioned nodes with parent back-references
//! - Flattening of the arena into paint-ordered boxes
//!
//! The layout engine that measures and positions nodes lives outside this
//! crate; a `LayoutTree` is only ever read during a dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::events::EventError;

/// Represents a terminal cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Translate this point into the coordinate space whose origin is `origin`
    pub fn relative_to(&self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Represents a size measured in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }
}

/// Represents a rectangle with position and size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn zero() -> Self {
        Self {
            origin: Point::zero(),
            size: Size::zero(),
        }
    }

    pub fn x(&self) -> i32 {
        self.origin.x
    }

    pub fn y(&self) -> i32 {
        self.origin.y
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn max_x(&self) -> i32 {
        self.origin.x.saturating_add(self.size.width)
    }

    pub fn max_y(&self) -> i32 {
        self.origin.y.saturating_add(self.size.height)
    }

    /// A rectangle that has not been laid out yet occupies no cells
    pub fn is_empty(&self) -> bool {
        self.size.width <= 0 || self.size.height <= 0
    }

    /// Cells are half-open: the right and bottom edges belong to the neighbour
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x()
            && point.x < self.max_x()
            && point.y >= self.y()
            && point.y < self.max_y()
    }
}

/// Index of a node inside a [`LayoutTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A positioned node in the layout snapshot
#[derive(Debug)]
pub struct LayoutNode {
    /// Identifier of this node inside its tree
    pub id: NodeId,
    /// Absolute position and measured size
    pub rect: Rect,
    /// Parent node (non-owning back-reference)
    pub parent: Option<NodeId>,
    /// Child nodes in paint order
    pub children: Vec<NodeId>,
    /// Component bound to this node, if any
    pub component: Option<Component>,
}

impl LayoutNode {
    fn new(id: NodeId, rect: Rect, parent: Option<NodeId>) -> Self {
        Self {
            id,
            rect,
            parent,
            children: Vec::new(),
            component: None,
        }
    }

    /// Absolute position of the node's top-left cell
    pub fn position(&self) -> Point {
        self.rect.origin
    }

    /// Whether the bound component advertises itself as focusable
    pub fn is_focusable(&self) -> bool {
        self.component.as_ref().is_some_and(Component::is_focusable)
    }
}

/// A flattened `(node, rect)` entry; index 0 of a box list is the bottom of the z-stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBox {
    pub node: NodeId,
    pub rect: Rect,
}

impl LayoutBox {
    pub fn new(node: NodeId, rect: Rect) -> Self {
        Self { node, rect }
    }
}

/// Arena of layout nodes produced once per layout pass
///
/// Children are owned by the arena and listed by their parent; parents are
/// plain indices, so the shape stays a tree.
#[derive(Debug, Default)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
    root: Option<NodeId>,
}

impl LayoutTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the root node, replacing any previous root reference
    pub fn add_root(&mut self, rect: Rect) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(LayoutNode::new(id, rect, None));
        self.root = Some(id);
        id
    }

    /// Append a child to `parent`; the child is painted after its earlier siblings
    pub fn add_child(&mut self, parent: NodeId, rect: Rect) -> Result<NodeId, EventError> {
        if parent.0 >= self.nodes.len() {
            return Err(EventError::NodeNotFound(parent));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(LayoutNode::new(id, rect, Some(parent)));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Bind a component to a node
    pub fn bind(&mut self, node: NodeId, component: Component) -> Result<(), EventError> {
        let entry = self
            .nodes
            .get_mut(node.0)
            .ok_or(EventError::NodeNotFound(node))?;
        entry.component = Some(component);
        Ok(())
    }

    /// Get the root node ID
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(id.0)
    }

    /// Parent of a node, `None` for the root or an unknown id
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flatten the tree into paint order (parents before children, siblings in order)
    pub fn boxes(&self) -> Vec<LayoutBox> {
        let mut out = Vec::with_capacity(self.nodes.len());
        if let Some(root) = self.root {
            self.collect_boxes(root, &mut out);
        }
        out
    }

    fn collect_boxes(&self, id: NodeId, out: &mut Vec<LayoutBox>) {
        let Some(node) = self.get(id) else {
            return;
        };
        out.push(LayoutBox::new(id, node.rect));
        for &child in &node.children {
            self.collect_boxes(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(10, 10, 20, 20);
        assert!(rect.contains_point(Point::new(10, 10)));
        assert!(rect.contains_point(Point::new(29, 29)));
        assert!(!rect.contains_point(Point::new(30, 15)));
        assert!(!rect.contains_point(Point::new(15, 30)));
        assert!(!rect.contains_point(Point::new(9, 15)));
    }

    #[test]
    fn test_rect_edges_saturate_at_i32_max() {
        let rect = Rect::new(i32::MAX - 5, i32::MAX - 5, 10, 10);
        assert_eq!(rect.max_x(), i32::MAX);
        assert_eq!(rect.max_y(), i32::MAX);
        assert!(rect.contains_point(Point::new(i32::MAX - 1, i32::MAX - 1)));
        assert!(!rect.contains_point(Point::new(i32::MAX - 6, i32::MAX - 1)));
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::new(5, 5, 0, 3).is_empty());
        assert!(Rect::new(5, 5, 3, 0).is_empty());
        assert!(!Rect::new(5, 5, 1, 1).is_empty());
    }

    #[test]
    fn test_add_child_links_parent() {
        let mut tree = LayoutTree::new();
        let root = tree.add_root(Rect::new(0, 0, 80, 24));
        let child = tree.add_child(root, Rect::new(1, 1, 10, 3)).unwrap();

        assert_eq!(tree.parent_of(child), Some(root));
        assert_eq!(tree.parent_of(root), None);
        assert_eq!(tree.get(root).unwrap().children, vec![child]);
    }

    #[test]
    fn test_add_child_unknown_parent() {
        let mut tree = LayoutTree::new();
        let err = tree.add_child(NodeId(3), Rect::zero()).unwrap_err();
        assert!(matches!(err, EventError::NodeNotFound(NodeId(3))));
    }

    #[test]
    fn test_boxes_in_paint_order() {
        let mut tree = LayoutTree::new();
        let root = tree.add_root(Rect::new(0, 0, 80, 24));
        let a = tree.add_child(root, Rect::new(0, 0, 40, 24)).unwrap();
        let b = tree.add_child(root, Rect::new(40, 0, 40, 24)).unwrap();
        let a1 = tree.add_child(a, Rect::new(2, 2, 5, 1)).unwrap();

        let order: Vec<NodeId> = tree.boxes().iter().map(|b| b.node).collect();
        assert_eq!(order, vec![root, a, a1, b]);
    }
}
